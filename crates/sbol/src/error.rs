//! Error types for SBOL reading, writing and validation.

use thiserror::Error;

use crate::document::Document;
use crate::validate::Rule;

/// A structural or referential validation failure.
///
/// Rendering follows the rule-table format: a rule failure prints its id and
/// description followed by the implicated identities, a free-text failure
/// prints the message followed by the identities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", render_rule(*rule, objects))]
    Rule { rule: Rule, objects: Vec<String> },

    #[error("{}", render_message(message, objects))]
    Message { message: String, objects: Vec<String> },

    /// A reference that does not dereference while the document is in
    /// complete mode.
    #[error("unresolved reference {uri} in {referrer}")]
    Unresolved { uri: String, referrer: String },

    #[error("document is read-only")]
    ReadOnly,
}

impl ValidationError {
    /// Creates a rule failure implicating the given identities.
    pub fn rule<I, S>(rule: Rule, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValidationError::Rule {
            rule,
            objects: objects.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a free-text failure implicating the given identities.
    pub fn message<I, S>(message: impl Into<String>, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValidationError::Message {
            message: message.into(),
            objects: objects.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a failure from a textual rule id.
    ///
    /// Ids missing from the rule table degrade to a free-text failure that
    /// carries the id as its message.
    pub fn from_rule_id<I, S>(id: &str, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match Rule::from_id(id) {
            Some(rule) => Self::rule(rule, objects),
            None => Self::message(id.trim(), objects),
        }
    }

    pub fn unresolved(uri: impl Into<String>, referrer: impl Into<String>) -> Self {
        ValidationError::Unresolved {
            uri: uri.into(),
            referrer: referrer.into(),
        }
    }

    /// Returns the rule this failure was raised for, if any.
    pub fn rule_id(&self) -> Option<Rule> {
        match self {
            ValidationError::Rule { rule, .. } => Some(*rule),
            _ => None,
        }
    }

    /// Returns the identities implicated by this failure.
    pub fn objects(&self) -> &[String] {
        match self {
            ValidationError::Rule { objects, .. } | ValidationError::Message { objects, .. } => {
                objects
            }
            _ => &[],
        }
    }
}

fn render_rule(rule: Rule, objects: &[String]) -> String {
    let mut out = format!("{}: {}", rule.id(), rule.description());
    if !objects.is_empty() {
        out.push_str("\n: ");
        out.push_str(&objects.join(", "));
    }
    out
}

fn render_message(message: &str, objects: &[String]) -> String {
    if objects.is_empty() {
        message.to_string()
    } else {
        format!("{}: {}", message, objects.join(", "))
    }
}

/// Error from a syntax codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("RDF/XML syntax error: {0}")]
    RdfXml(String),

    #[error("Turtle syntax error: {0}")]
    Turtle(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("invalid IRI {iri:?}: {reason}")]
    InvalidIri { iri: String, reason: String },

    #[error("unsupported RDF term in {context}")]
    UnsupportedTerm { context: &'static str },
}

/// A read that failed for one or more top-level nodes.
///
/// Independent nodes that did read successfully are kept in `document`; the
/// caller decides whether the partial document is usable.
#[derive(Debug, Error)]
#[error("{}", render_all(errors))]
pub struct ReadError {
    pub document: Box<Document>,
    pub errors: Vec<ValidationError>,
}

fn render_all(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Top-level error for byte-level reading and writing.
#[derive(Debug, Error)]
pub enum SbolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
