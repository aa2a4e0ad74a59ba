//! Property tree to [`Document`].
//!
//! Each top-level node is converted into a fully built entity, or a batch of
//! entities when bridging SBOL1, before anything is registered. Failures of
//! independent nodes are collected, so a [`ReadError`] carries every failure
//! together with the document built from the nodes that did succeed.

mod v1;
mod v2;

use std::borrow::Cow;

use tracing::debug;

use crate::document::{Document, DocumentConfig};
use crate::error::{ReadError, ValidationError};
use crate::model::{Annotation, Identified};
use crate::tree::{DocumentRoot, IdentifiableDocument, Literal, NamedProperty, Value};
use crate::validate::{Rule, validate_document};
use crate::vocab::{self, SBOL1_NS, SBOL2_NS};

/// Reads a property tree into a new document.
///
/// Trees that bind the SBOL1 namespace are bridged to SBOL2. In complete mode
/// every reference must dereference once all nodes are read.
pub fn read(root: &DocumentRoot, config: DocumentConfig) -> Result<Document, ReadError> {
    let complete = config.complete;
    let mut doc = Document::with_config(config.with_complete(false));
    let mut errors = Vec::new();

    for binding in &root.namespaces {
        if Document::is_builtin_namespace(&binding.namespace) || binding.namespace == SBOL1_NS {
            continue;
        }
        if let Err(e) = doc.add_namespace(&binding.namespace, &binding.prefix) {
            debug!(namespace = %binding.namespace, error = %e, "skipping namespace binding");
        }
    }

    if root.has_namespace(SBOL1_NS) {
        debug!(nodes = root.top_levels.len(), "reading SBOL1 document");
        v1::read_all(root, &mut doc, &mut errors);
    } else {
        debug!(nodes = root.top_levels.len(), "reading SBOL2 document");
        for node in &root.top_levels {
            let added = v2::read_top_level(node).and_then(|top| doc.add(top));
            if let Err(e) = added {
                errors.push(e);
            }
        }
    }

    if complete {
        doc.set_complete(true);
        errors.extend(validate_document(&doc));
    }

    if errors.is_empty() {
        Ok(doc)
    } else {
        Err(ReadError {
            document: Box::new(doc),
            errors,
        })
    }
}

// =============================================================================
// Literal conversion
// =============================================================================

fn conversion_error(node: &IdentifiableDocument, p: &NamedProperty) -> ValidationError {
    ValidationError::rule(Rule::LiteralConversion, [node.identity.clone(), p.name.uri()])
}

/// A literal's lexical form.
fn literal_text(node: &IdentifiableDocument, p: &NamedProperty) -> Result<String, ValidationError> {
    match &p.value {
        Value::Literal(l) => Ok(l.lexical().into_owned()),
        _ => Err(conversion_error(node, p)),
    }
}

/// A reference, accepting a string literal in place of an IRI.
fn uri_value(node: &IdentifiableDocument, p: &NamedProperty) -> Result<String, ValidationError> {
    match &p.value {
        Value::Uri(u) => Ok(u.clone()),
        Value::Literal(Literal::String(s)) => Ok(s.clone()),
        Value::Nested(n) => Ok(n.identity.clone()),
        _ => Err(conversion_error(node, p)),
    }
}

/// A non-negative integer from an integer or string literal.
fn position_value(node: &IdentifiableDocument, p: &NamedProperty) -> Result<u64, ValidationError> {
    let parsed = match &p.value {
        Value::Literal(Literal::Integer(i)) => u64::try_from(*i).ok(),
        Value::Literal(Literal::String(s)) | Value::Literal(Literal::Typed { value: s, .. }) => {
            s.trim().parse::<u64>().ok()
        }
        _ => None,
    };
    parsed.ok_or_else(|| conversion_error(node, p))
}

/// The nested node of an owning property.
fn nested<'a>(
    node: &IdentifiableDocument,
    p: &'a NamedProperty,
) -> Result<&'a IdentifiableDocument, ValidationError> {
    p.value.as_nested().ok_or_else(|| {
        ValidationError::message(
            format!("expected a nested node for {}", p.name),
            [node.identity.as_str()],
        )
    })
}

fn missing(rule: Rule, node: &IdentifiableDocument) -> ValidationError {
    ValidationError::rule(rule, [node.identity.as_str()])
}

// =============================================================================
// Shared properties
// =============================================================================

/// Consumes the properties every entity shares. Returns false when the
/// property is not one of them.
fn take_identified(
    identified: &mut Identified,
    node: &IdentifiableDocument,
    p: &NamedProperty,
) -> Result<bool, ValidationError> {
    let name = &p.name;
    if let Some(local) = name.local_in(SBOL2_NS) {
        match local {
            "persistentIdentity" => identified.persistent_identity = Some(uri_value(node, p)?),
            "displayId" => identified.display_id = Some(literal_text(node, p)?),
            "version" => identified.version = Some(literal_text(node, p)?),
            _ => return Ok(false),
        }
        return Ok(true);
    }
    if *name == vocab::WAS_DERIVED_FROM {
        identified.was_derived_from = Some(uri_value(node, p)?);
    } else if *name == vocab::TITLE {
        identified.name = Some(literal_text(node, p)?);
    } else if *name == vocab::DESCRIPTION {
        identified.description = Some(literal_text(node, p)?);
    } else {
        return Ok(false);
    }
    Ok(true)
}

/// Keeps an unrecognized property as an annotation. Unrecognized properties
/// in a reserved namespace are dropped.
fn annotate(identified: &mut Identified, p: &NamedProperty, reserved: &str) {
    if p.name.in_namespace(reserved) {
        debug!(property = %p.name, identity = %identified.identity, "dropping unknown property");
        return;
    }
    identified.annotations.push(Annotation::from(p.clone()));
}

/// The text of a value, for diagnostics.
fn describe(value: &Value) -> Cow<'_, str> {
    value.as_text().unwrap_or(Cow::Borrowed("<nested>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::QName;
    use crate::vocab::sbol2;

    fn node() -> IdentifiableDocument {
        IdentifiableDocument::new(sbol2::RANGE, "http://example.org/r")
    }

    #[test]
    fn test_position_conversion() {
        let n = node();
        let int = NamedProperty::literal(sbol2::START, 5i64);
        assert_eq!(position_value(&n, &int).unwrap(), 5);
        let text = NamedProperty::literal(sbol2::START, "7");
        assert_eq!(position_value(&n, &text).unwrap(), 7);

        let bad = NamedProperty::literal(sbol2::START, "seven");
        assert_eq!(
            position_value(&n, &bad).unwrap_err().rule_id(),
            Some(Rule::LiteralConversion)
        );
        let negative = NamedProperty::literal(sbol2::START, -1i64);
        assert!(position_value(&n, &negative).is_err());
    }

    #[test]
    fn test_uri_accepts_string_literal() {
        let n = node();
        let p = NamedProperty::literal(sbol2::ENCODING, "http://example.org/enc");
        assert_eq!(uri_value(&n, &p).unwrap(), "http://example.org/enc");
        let p = NamedProperty::literal(sbol2::ENCODING, 3i64);
        assert!(uri_value(&n, &p).is_err());
    }

    #[test]
    fn test_annotate_filters_reserved_namespace() {
        let mut id = Identified::new("http://example.org/x");
        annotate(&mut id, &NamedProperty::literal(sbol2::START, 1i64), SBOL2_NS);
        let custom = QName::new("http://myapp.org/", "note", "myapp");
        annotate(&mut id, &NamedProperty::literal(custom.clone(), "hi"), SBOL2_NS);
        assert_eq!(id.annotations.len(), 1);
        assert_eq!(id.annotations[0].name, custom);
    }

    #[test]
    fn test_take_identified() {
        let n = node();
        let mut id = Identified::new(&n.identity);
        assert!(take_identified(&mut id, &n, &NamedProperty::literal(sbol2::DISPLAY_ID, "r")).unwrap());
        assert!(take_identified(&mut id, &n, &NamedProperty::literal(vocab::TITLE, "Range")).unwrap());
        assert!(!take_identified(&mut id, &n, &NamedProperty::literal(sbol2::START, 1i64)).unwrap());
        assert_eq!(id.display_id.as_deref(), Some("r"));
        assert_eq!(id.name.as_deref(), Some("Range"));
    }
}
