//! RDF/XML codec.
//!
//! Parsing and triple emission use `rio_xml`. The formatter declares only the
//! `rdf` prefix, so the document's other bindings are added to the root
//! element afterwards.

use lazy_static::lazy_static;
use regex::Regex;
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_xml::{RdfXmlError, RdfXmlFormatter, RdfXmlParser};

use crate::codec::triples::{for_each_rio, from_rio, scan_declarations, triples_to_tree, tree_to_triples};
use crate::error::CodecError;
use crate::tree::DocumentRoot;
use crate::vocab::RDF_NS;

lazy_static! {
    static ref XMLNS: Regex =
        Regex::new(r#"xmlns:([A-Za-z_][\w.-]*)\s*=\s*["']([^"']*)["']"#).expect("static regex");
}

const ROOT_ELEMENT: &str = "<rdf:RDF";

impl From<RdfXmlError> for CodecError {
    fn from(e: RdfXmlError) -> Self {
        CodecError::RdfXml(e.to_string())
    }
}

/// Decodes an RDF/XML document into a property tree.
pub fn decode_rdfxml(input: &[u8]) -> Result<DocumentRoot, CodecError> {
    let mut triples = Vec::new();
    let mut parser = RdfXmlParser::new(input, None);
    parser.parse_all(&mut |t| -> Result<(), CodecError> {
        triples.push(from_rio(t)?);
        Ok(())
    })?;
    let declared = scan_declarations(&String::from_utf8_lossy(input), &XMLNS);
    Ok(triples_to_tree(triples, declared))
}

/// Encodes a property tree as RDF/XML.
pub fn encode_rdfxml(root: &DocumentRoot) -> Result<Vec<u8>, CodecError> {
    let triples = tree_to_triples(root);
    let mut formatter = RdfXmlFormatter::new(Vec::new()).map_err(io_error)?;
    for_each_rio(&triples, |t| formatter.format(t)).map_err(io_error)?;
    let output = formatter.finish().map_err(io_error)?;
    let text = String::from_utf8(output).map_err(|e| CodecError::RdfXml(e.to_string()))?;
    Ok(declare_namespaces(text, root).into_bytes())
}

fn io_error(e: std::io::Error) -> CodecError {
    CodecError::RdfXml(e.to_string())
}

/// Adds an `xmlns` attribute to the root element for every prefixed binding
/// other than `rdf`.
fn declare_namespaces(mut text: String, root: &DocumentRoot) -> String {
    let declarations: String = root
        .namespaces
        .iter()
        .filter(|b| !b.prefix.is_empty() && b.namespace != RDF_NS && !b.namespace.contains('"'))
        .map(|b| format!(" xmlns:{}=\"{}\"", b.prefix, b.namespace))
        .collect();
    if let Some(at) = text.find(ROOT_ELEMENT) {
        text.insert_str(at + ROOT_ELEMENT.len(), &declarations);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{IdentifiableDocument, NamedProperty, Value};
    use crate::vocab::{SBOL1_NS, SBOL2_NS, sbol1, sbol2};

    const V1_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:s1="http://sbols.org/v1#">
  <s1:DnaComponent rdf:about="http://example.org/device">
    <s1:displayId>device</s1:displayId>
    <s1:annotation>
      <s1:SequenceAnnotation rdf:about="http://example.org/device/a">
        <s1:bioStart>1</s1:bioStart>
        <s1:bioEnd>10</s1:bioEnd>
        <s1:strand>+</s1:strand>
      </s1:SequenceAnnotation>
    </s1:annotation>
  </s1:DnaComponent>
</rdf:RDF>"#;

    #[test]
    fn test_decode_v1_document() {
        let root = decode_rdfxml(V1_DOC.as_bytes()).unwrap();
        assert_eq!(root.prefix_of(SBOL1_NS), Some("s1"));
        assert_eq!(root.top_levels.len(), 1);
        let part = &root.top_levels[0];
        assert_eq!(part.rdf_type, sbol1::DNA_COMPONENT);
        let sa = part.first(&sbol1::ANNOTATION).and_then(Value::as_nested).unwrap();
        assert_eq!(sa.first(&sbol1::BIO_START).and_then(Value::as_text).as_deref(), Some("1"));
    }

    #[test]
    fn test_encode_declares_bindings() {
        let mut root = DocumentRoot::new();
        root.bind(SBOL2_NS, "sbol");
        root.top_levels.push(
            IdentifiableDocument::new(sbol2::SEQUENCE, "http://example.org/s")
                .with(NamedProperty::literal(sbol2::ELEMENTS, "acgt")),
        );
        let text = String::from_utf8(encode_rdfxml(&root).unwrap()).unwrap();
        assert!(text.contains(r#"xmlns:sbol="http://sbols.org/v2#""#));

        let back = decode_rdfxml(text.as_bytes()).unwrap();
        assert_eq!(back.top_levels, root.top_levels);
        assert_eq!(back.prefix_of(SBOL2_NS), Some("sbol"));
    }

    #[test]
    fn test_malformed_input() {
        let input = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="http://example.org/a"></rdf:Descr>
</rdf:RDF>"#;
        let err = decode_rdfxml(input.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::RdfXml(_)));
    }
}
