//! Bytes to [`Document`] and back.
//!
//! The facade chains a codec with the reader or writer. RDF/XML input is
//! bridged from SBOL1 whenever it binds the SBOL1 namespace; SBOL1 output
//! must be requested with [`Syntax::RdfXmlV1`].

use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::codec::{decode_json, decode_rdfxml, decode_turtle, encode_json, encode_rdfxml, encode_turtle};
use crate::document::{Document, DocumentConfig};
use crate::error::SbolError;
use crate::read::read;
use crate::write::{SchemaVersion, write};

/// A concrete syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Syntax {
    #[default]
    RdfXml,
    /// RDF/XML downgraded to SBOL1 on write. Reads like [`Syntax::RdfXml`].
    RdfXmlV1,
    Turtle,
    Json,
}

impl Syntax {
    /// Guesses the syntax from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xml" | "rdf" | "sbol" => Some(Syntax::RdfXml),
            "ttl" => Some(Syntax::Turtle),
            "json" => Some(Syntax::Json),
            _ => None,
        }
    }
}

/// Reads a document from bytes.
pub fn read_bytes(input: &[u8], syntax: Syntax, config: DocumentConfig) -> Result<Document, SbolError> {
    debug!(?syntax, len = input.len(), "decoding document");
    let root = match syntax {
        Syntax::RdfXml | Syntax::RdfXmlV1 => decode_rdfxml(input)?,
        Syntax::Turtle => decode_turtle(input)?,
        Syntax::Json => decode_json(input)?,
    };
    Ok(read(&root, config)?)
}

/// Writes a document to bytes.
pub fn write_bytes(doc: &Document, syntax: Syntax) -> Result<Vec<u8>, SbolError> {
    let version = if syntax == Syntax::RdfXmlV1 {
        SchemaVersion::V1
    } else {
        SchemaVersion::V2
    };
    let root = write(doc, version);
    let bytes = match syntax {
        Syntax::RdfXml | Syntax::RdfXmlV1 => encode_rdfxml(&root)?,
        Syntax::Turtle => encode_turtle(&root)?,
        Syntax::Json => encode_json(&root)?,
    };
    debug!(?syntax, len = bytes.len(), "encoded document");
    Ok(bytes)
}

/// Reads a document from a reader, consuming it to the end.
pub fn read_from<R: Read>(mut reader: R, syntax: Syntax, config: DocumentConfig) -> Result<Document, SbolError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    read_bytes(&input, syntax, config)
}

/// Writes a document to a writer.
pub fn write_to<W: Write>(doc: &Document, syntax: Syntax, mut writer: W) -> Result<(), SbolError> {
    writer.write_all(&write_bytes(doc, syntax)?)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::model::{AccessType, Annotation, DirectionType};
    use crate::tree::{QName, Value};
    use crate::vocab::terms;

    fn config() -> DocumentConfig {
        DocumentConfig::new()
            .with_default_uri_prefix("http://example.org")
            .with_types_in_uris(true)
    }

    fn sample() -> Document {
        let mut doc = Document::with_config(config());
        doc.add_namespace("http://myapp.org/", "myapp").unwrap();
        doc.create_sequence("gene_seq", "1", "ACGTACGTAC", terms::IUPAC_DNA).unwrap();
        doc.create_component_definition("part", "1", [terms::DNA.to_string()]).unwrap();

        let cd = doc
            .create_component_definition("gene", "1", [terms::DNA.to_string()])
            .unwrap();
        cd.roles.insert(terms::CDS.to_string());
        cd.sequences.insert("http://example.org/seq/gene_seq/1".to_string());
        cd.identified.description = Some("a coding sequence".into());
        cd.identified.annotations.push(Annotation::new(
            QName::new("http://myapp.org/", "weight", "myapp"),
            Value::Literal(2.5f64.into()),
        ));
        let c = cd
            .create_component("sub", AccessType::Public, "http://example.org/cd/part/1")
            .unwrap()
            .identified
            .identity
            .clone();
        let sa_uri = cd
            .create_sequence_annotation("sa", "r", 1, 4)
            .unwrap()
            .identified
            .identity
            .clone();
        cd.set_annotation_component(&sa_uri, Some(&c)).unwrap();

        let md = doc.create_module_definition("circuit", "1").unwrap();
        md.create_functional_component(
            "gene_fc",
            AccessType::Public,
            DirectionType::Input,
            "http://example.org/cd/gene/1",
        )
        .unwrap();
        doc
    }

    #[test]
    fn test_round_trip_through_each_syntax() {
        let doc = sample();
        for syntax in [Syntax::RdfXml, Syntax::Turtle, Syntax::Json] {
            let bytes = write_bytes(&doc, syntax).unwrap();
            let back = read_bytes(&bytes, syntax, config()).unwrap();
            assert_eq!(back, doc, "round trip through {syntax:?}");
        }
    }

    #[test]
    fn test_sequence_without_version() {
        let mut doc = Document::with_config(config());
        doc.create_sequence("foo", "", "AGCT", terms::IUPAC_DNA).unwrap();
        let seq = doc.get_sequence("http://example.org/seq/foo").unwrap();
        assert_eq!(seq.identified.persistent_identity.as_deref(), Some("http://example.org/seq/foo"));

        let bytes = write_bytes(&doc, Syntax::RdfXml).unwrap();
        let back = read_bytes(&bytes, Syntax::RdfXml, config()).unwrap();
        let seq = back.get_sequence("http://example.org/seq/foo").unwrap();
        assert_eq!(seq.elements, "AGCT");
        assert_eq!(seq.encoding, terms::IUPAC_DNA);
        assert_eq!(seq.identified.version, None);
    }

    #[test]
    fn test_v1_output_is_bridged_on_read() {
        let doc = sample();
        let bytes = write_bytes(&doc, Syntax::RdfXmlV1).unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("http://sbols.org/v1#"));

        let back = read_bytes(&bytes, Syntax::RdfXml, DocumentConfig::new()).unwrap();
        assert_eq!(back.module_definitions().count(), 0);
        let gene = back.get_component_definition("http://example.org/cd/gene/1").unwrap();
        assert!(gene.roles.contains(terms::CDS));
        assert_eq!(gene.sequence_annotations.len(), 1);
    }

    #[test]
    fn test_reader_and_writer_variants() {
        let doc = sample();
        let mut out = Vec::new();
        write_to(&doc, Syntax::Turtle, &mut out).unwrap();
        let back = read_from(std::io::Cursor::new(out), Syntax::Turtle, config()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_codec_errors_surface() {
        let err = read_bytes(b"not json", Syntax::Json, config()).unwrap_err();
        assert!(matches!(err, SbolError::Codec(CodecError::Json(_))));
    }

    #[test]
    fn test_syntax_from_path() {
        assert_eq!(Syntax::from_path("design.ttl"), Some(Syntax::Turtle));
        assert_eq!(Syntax::from_path("design.XML"), Some(Syntax::RdfXml));
        assert_eq!(Syntax::from_path("design"), None);
    }
}
