//! Turtle codec.

use lazy_static::lazy_static;
use regex::Regex;
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleError, TurtleFormatter, TurtleParser};

use crate::codec::triples::{for_each_rio, from_rio, scan_declarations, triples_to_tree, tree_to_triples};
use crate::error::CodecError;
use crate::tree::DocumentRoot;

lazy_static! {
    /// Both `@prefix p: <ns> .` and SPARQL-style `PREFIX p: <ns>`.
    static ref PREFIX: Regex =
        Regex::new(r"(?i)@?prefix\s+([A-Za-z_][\w.-]*)?:\s*<([^>]*)>").expect("static regex");
}

impl From<TurtleError> for CodecError {
    fn from(e: TurtleError) -> Self {
        CodecError::Turtle(e.to_string())
    }
}

/// Decodes a Turtle document into a property tree.
pub fn decode_turtle(input: &[u8]) -> Result<DocumentRoot, CodecError> {
    let mut triples = Vec::new();
    TurtleParser::new(input, None).parse_all(&mut |t| -> Result<(), CodecError> {
        triples.push(from_rio(t)?);
        Ok(())
    })?;
    let declared = scan_declarations(&String::from_utf8_lossy(input), &PREFIX);
    Ok(triples_to_tree(triples, declared))
}

/// Encodes a property tree as Turtle, preceded by a prefix declaration for
/// every binding.
pub fn encode_turtle(root: &DocumentRoot) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    for b in root.namespaces.iter().filter(|b| !b.namespace.contains('>')) {
        out.extend_from_slice(format!("@prefix {}: <{}> .\n", b.prefix, b.namespace).as_bytes());
    }
    if !out.is_empty() {
        out.push(b'\n');
    }

    let triples = tree_to_triples(root);
    let mut formatter = TurtleFormatter::new(out);
    for_each_rio(&triples, |t| formatter.format(t)).map_err(|e| CodecError::Turtle(e.to_string()))?;
    formatter.finish().map_err(|e| CodecError::Turtle(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{IdentifiableDocument, NamedProperty, QName, Value};
    use crate::vocab::{SBOL2_NS, sbol2};

    #[test]
    fn test_round_trip_with_nested_blank_node() {
        let mut root = DocumentRoot::new();
        root.bind(SBOL2_NS, "sbol");
        root.bind("http://myapp.org/", "myapp");
        let note = IdentifiableDocument::new(QName::new("http://myapp.org/", "Note", "myapp"), "_:n1")
            .with(NamedProperty::literal(QName::new("http://myapp.org/", "text", "myapp"), "hello"));
        root.top_levels.push(
            IdentifiableDocument::new(sbol2::SEQUENCE, "http://example.org/s")
                .with(NamedProperty::literal(sbol2::ELEMENTS, "acgt"))
                .with(NamedProperty::literal(QName::new("http://myapp.org/", "gc", "myapp"), 0.5f64))
                .with(NamedProperty::nested(QName::new("http://myapp.org/", "note", "myapp"), note)),
        );

        let bytes = encode_turtle(&root).unwrap();
        assert!(String::from_utf8_lossy(&bytes).starts_with("@prefix sbol: <http://sbols.org/v2#> ."));
        let back = decode_turtle(&bytes).unwrap();
        assert_eq!(back.prefix_of("http://myapp.org/"), Some("myapp"));

        let s = &back.top_levels[0];
        assert_eq!(back.top_levels.len(), 1);
        let gc = QName::new("http://myapp.org/", "gc", "myapp");
        assert_eq!(s.first(&gc).and_then(Value::as_text).as_deref(), Some("0.5"));
        let nested = s
            .first(&QName::new("http://myapp.org/", "note", "myapp"))
            .and_then(Value::as_nested)
            .unwrap();
        assert!(nested.identity.starts_with("_:"));
        assert_eq!(nested.rdf_type.local, "Note");
    }

    #[test]
    fn test_syntax_error() {
        let err = decode_turtle(b"<http://example.org/a> <http://example.org/b> .").unwrap_err();
        assert!(matches!(err, CodecError::Turtle(_)));
    }
}
