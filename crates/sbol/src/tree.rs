//! Syntax-independent property tree.
//!
//! Every codec parses into and serializes from these types, so the reader and
//! writer never see RDF/XML, Turtle or JSON directly. A document is a list of
//! typed top-level nodes; each node is an ordered list of qualified-name to
//! value pairs, where a value is a literal, a reference or a nested node.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::vocab;

/// A namespace-qualified name.
///
/// Equality and hashing only consider the namespace and local part; the
/// prefix is a serialization hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QName {
    pub namespace: Cow<'static, str>,
    pub local: Cow<'static, str>,
    #[serde(default)]
    pub prefix: Cow<'static, str>,
}

impl QName {
    /// Creates a name from static parts (usable in constants).
    pub const fn from_static(
        namespace: &'static str,
        local: &'static str,
        prefix: &'static str,
    ) -> Self {
        Self {
            namespace: Cow::Borrowed(namespace),
            local: Cow::Borrowed(local),
            prefix: Cow::Borrowed(prefix),
        }
    }

    /// Creates a name from owned parts.
    pub fn new(
        namespace: impl Into<String>,
        local: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            namespace: Cow::Owned(namespace.into()),
            local: Cow::Owned(local.into()),
            prefix: Cow::Owned(prefix.into()),
        }
    }

    /// Splits a full IRI into namespace and local part.
    ///
    /// The split happens after the last `#`, or after the last `/` when there
    /// is no fragment. Returns `None` when either side would be empty.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let split = uri
            .rfind('#')
            .or_else(|| uri.rfind('/'))
            .map(|i| i + 1)?;
        let (namespace, local) = uri.split_at(split);
        if namespace.is_empty() || local.is_empty() {
            return None;
        }
        let prefix = vocab::known_prefix(namespace).unwrap_or("");
        Some(Self::new(namespace, local, prefix))
    }

    /// Returns the full IRI.
    pub fn uri(&self) -> String {
        format!("{}{}", self.namespace, self.local)
    }

    /// Returns true if this name is in the given namespace.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace == namespace
    }

    /// Returns the local part if this name is in the given namespace.
    pub fn local_in(&self, namespace: &str) -> Option<&str> {
        self.in_namespace(namespace).then_some(&*self.local)
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.local == other.local
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}{}", self.namespace, self.local)
        } else {
            write!(f, "{}:{}", self.prefix, self.local)
        }
    }
}

/// A literal property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Literal {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    /// Any other datatype, kept lexically.
    Typed { value: String, datatype: String },
}

impl Literal {
    /// Returns the lexical form.
    pub fn lexical(&self) -> Cow<'_, str> {
        match self {
            Literal::String(s) => Cow::Borrowed(s),
            Literal::Integer(i) => Cow::Owned(i.to_string()),
            Literal::Double(d) => Cow::Owned(d.to_string()),
            Literal::Boolean(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Literal::Typed { value, .. } => Cow::Borrowed(value),
        }
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Integer(i)
    }
}

impl From<f64> for Literal {
    fn from(d: f64) -> Self {
        Literal::Double(d)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

/// The value side of a named property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Literal(Literal),
    /// A reference to another node by IRI.
    Uri(String),
    Nested(Box<IdentifiableDocument>),
}

impl Value {
    /// Returns the IRI for references, or the lexical form for literals.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Uri(u) => Some(Cow::Borrowed(u)),
            Value::Literal(l) => Some(l.lexical()),
            Value::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&IdentifiableDocument> {
        match self {
            Value::Nested(doc) => Some(doc),
            _ => None,
        }
    }
}

/// A qualified name paired with a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedProperty {
    pub name: QName,
    pub value: Value,
}

impl NamedProperty {
    pub fn literal(name: QName, value: impl Into<Literal>) -> Self {
        Self {
            name,
            value: Value::Literal(value.into()),
        }
    }

    pub fn uri(name: QName, uri: impl Into<String>) -> Self {
        Self {
            name,
            value: Value::Uri(uri.into()),
        }
    }

    pub fn nested(name: QName, doc: IdentifiableDocument) -> Self {
        Self {
            name,
            value: Value::Nested(Box::new(doc)),
        }
    }
}

/// A typed node with an identity and ordered properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiableDocument {
    pub rdf_type: QName,
    pub identity: String,
    #[serde(default)]
    pub properties: Vec<NamedProperty>,
}

/// A node at the root of a document.
pub type TopLevelDocument = IdentifiableDocument;
/// A node owned by another node.
pub type NestedDocument = IdentifiableDocument;

impl IdentifiableDocument {
    pub fn new(rdf_type: QName, identity: impl Into<String>) -> Self {
        Self {
            rdf_type,
            identity: identity.into(),
            properties: Vec::new(),
        }
    }

    /// Appends a property.
    pub fn push(&mut self, property: NamedProperty) {
        self.properties.push(property);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, property: NamedProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Iterates over the values of every property with the given name.
    pub fn values_of<'a, 'n>(&'a self, name: &'n QName) -> impl Iterator<Item = &'a Value> + use<'a, 'n> {
        self.properties
            .iter()
            .filter(move |p| &p.name == name)
            .map(|p| &p.value)
    }

    /// Returns the first value of the given property.
    pub fn first(&self, name: &QName) -> Option<&Value> {
        self.values_of(name).next()
    }
}

/// A prefix bound to a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceBinding {
    pub namespace: String,
    pub prefix: String,
}

impl NamespaceBinding {
    pub fn new(namespace: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            prefix: prefix.into(),
        }
    }
}

/// A whole document: namespace bindings plus top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRoot {
    #[serde(default)]
    pub namespaces: Vec<NamespaceBinding>,
    #[serde(default)]
    pub top_levels: Vec<TopLevelDocument>,
}

impl DocumentRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if some binding names the given namespace.
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|b| b.namespace == namespace)
    }

    /// Binds a namespace unless it is already bound.
    pub fn bind(&mut self, namespace: impl Into<String>, prefix: impl Into<String>) {
        let namespace = namespace.into();
        if !self.has_namespace(&namespace) {
            self.namespaces.push(NamespaceBinding::new(namespace, prefix));
        }
    }

    /// Returns the prefix bound to a namespace.
    pub fn prefix_of(&self, namespace: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|b| b.namespace == namespace)
            .map(|b| b.prefix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_equality_ignores_prefix() {
        let a = QName::new("http://example.org/", "thing", "ex");
        let b = QName::new("http://example.org/", "thing", "other");
        assert_eq!(a, b);
        assert_ne!(a, QName::new("http://example.org/ns#", "thing", "ex"));
    }

    #[test]
    fn test_qname_from_uri() {
        let q = QName::from_uri("http://sbols.org/v2#displayId").unwrap();
        assert_eq!(q.namespace, "http://sbols.org/v2#");
        assert_eq!(q.local, "displayId");
        assert_eq!(q.prefix, "sbol");

        let q = QName::from_uri("http://purl.org/dc/terms/title").unwrap();
        assert_eq!(q.namespace, "http://purl.org/dc/terms/");
        assert_eq!(q.local, "title");

        assert!(QName::from_uri("http://example.org/").is_none());
        assert!(QName::from_uri("nocolon").is_none());
    }

    #[test]
    fn test_values_of() {
        let name = QName::from_static("http://example.org/", "p", "ex");
        let other = QName::from_static("http://example.org/", "q", "ex");
        let doc = IdentifiableDocument::new(vocab::RDF_DESCRIPTION, "http://example.org/x")
            .with(NamedProperty::literal(name.clone(), "a"))
            .with(NamedProperty::uri(other.clone(), "http://example.org/y"))
            .with(NamedProperty::literal(name.clone(), 3i64));

        let values: Vec<_> = doc.values_of(&name).collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1].as_text().unwrap(), "3");
        assert_eq!(doc.first(&other), Some(&Value::Uri("http://example.org/y".into())));
    }

    #[test]
    fn test_bind_dedupes() {
        let mut root = DocumentRoot::new();
        root.bind(vocab::SBOL2_NS, "sbol");
        root.bind(vocab::SBOL2_NS, "other");
        assert_eq!(root.namespaces.len(), 1);
        assert_eq!(root.prefix_of(vocab::SBOL2_NS), Some("sbol"));
    }
}
