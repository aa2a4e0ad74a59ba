//! Property tree to RDF triples and back.
//!
//! Both RDF syntaxes go through this module. Decoding groups triples by
//! subject, picks each subject's class from its `rdf:type` values and nests
//! the objects of owning properties under their subject. Subjects that are
//! owned by nothing become top-level nodes.

use std::io;

use rio_api::model::{BlankNode, Literal as RioLiteral, NamedNode, Subject, Term as RioTerm, Triple};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::error::CodecError;
use crate::tree::{
    DocumentRoot, IdentifiableDocument, Literal, NamedProperty, NamespaceBinding, QName, Value,
};
use crate::vocab::{self, RDF_NS, SBOL1_NS, SBOL2_NS, XSD_NS};

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

/// Object of an owned triple.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Object {
    /// An IRI, or a blank node label in `_:label` form.
    Node(String),
    Literal(Literal),
}

/// An owned triple. Blank node subjects use the `_:label` form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OwnedTriple {
    pub subject: String,
    pub predicate: String,
    pub object: Object,
}

fn is_blank(id: &str) -> bool {
    id.starts_with("_:")
}

// =============================================================================
// rio conversion
// =============================================================================

/// Copies a parsed triple. Quoted triples have no tree form.
pub(crate) fn from_rio(t: Triple<'_>) -> Result<OwnedTriple, CodecError> {
    let subject = match t.subject {
        Subject::NamedNode(n) => n.iri.to_string(),
        Subject::BlankNode(b) => format!("_:{}", b.id),
        _ => return Err(CodecError::UnsupportedTerm { context: "subject" }),
    };
    let object = match t.object {
        RioTerm::NamedNode(n) => Object::Node(n.iri.to_string()),
        RioTerm::BlankNode(b) => Object::Node(format!("_:{}", b.id)),
        RioTerm::Literal(l) => Object::Literal(literal_from_rio(l)),
        _ => return Err(CodecError::UnsupportedTerm { context: "object" }),
    };
    Ok(OwnedTriple {
        subject,
        predicate: t.predicate.iri.to_string(),
        object,
    })
}

fn literal_from_rio(l: RioLiteral<'_>) -> Literal {
    match l {
        RioLiteral::Simple { value } => Literal::String(value.to_string()),
        RioLiteral::LanguageTaggedString { value, language } => {
            debug!(language, "dropping language tag");
            Literal::String(value.to_string())
        }
        RioLiteral::Typed { value, datatype } => typed_literal(value, datatype.iri),
    }
}

fn typed_literal(value: &str, datatype: &str) -> Literal {
    let parsed = match datatype.strip_prefix(XSD_NS) {
        Some("string") => Some(Literal::String(value.to_string())),
        Some("integer" | "int" | "long" | "nonNegativeInteger") => value.trim().parse().ok().map(Literal::Integer),
        Some("double" | "float" | "decimal") => value.trim().parse().ok().map(Literal::Double),
        Some("boolean") => match value.trim() {
            "true" | "1" => Some(Literal::Boolean(true)),
            "false" | "0" => Some(Literal::Boolean(false)),
            _ => None,
        },
        _ => None,
    };
    parsed.unwrap_or_else(|| Literal::Typed {
        value: value.to_string(),
        datatype: datatype.to_string(),
    })
}

/// Hands every triple to `sink` as a rio triple.
pub(crate) fn for_each_rio<F>(triples: &[OwnedTriple], mut sink: F) -> Result<(), io::Error>
where
    F: FnMut(&Triple<'_>) -> Result<(), io::Error>,
{
    for t in triples {
        let subject = if is_blank(&t.subject) {
            Subject::BlankNode(BlankNode { id: &t.subject[2..] })
        } else {
            Subject::NamedNode(NamedNode { iri: &t.subject })
        };
        let lexical;
        let object = match &t.object {
            Object::Node(id) if is_blank(id) => RioTerm::BlankNode(BlankNode { id: &id[2..] }),
            Object::Node(iri) => RioTerm::NamedNode(NamedNode { iri }),
            Object::Literal(l) => {
                lexical = l.lexical();
                let datatype = match l {
                    Literal::String(_) => None,
                    Literal::Integer(_) => Some(XSD_INTEGER),
                    Literal::Double(_) => Some(XSD_DOUBLE),
                    Literal::Boolean(_) => Some(XSD_BOOLEAN),
                    Literal::Typed { datatype, .. } => Some(datatype.as_str()),
                };
                match datatype {
                    None | Some(XSD_STRING) => RioTerm::Literal(RioLiteral::Simple { value: &lexical }),
                    Some(iri) => RioTerm::Literal(RioLiteral::Typed {
                        value: &lexical,
                        datatype: NamedNode { iri },
                    }),
                }
            }
        };
        sink(&Triple {
            subject,
            predicate: NamedNode { iri: &t.predicate },
            object,
        })?;
    }
    Ok(())
}

// =============================================================================
// Tree to triples
// =============================================================================

/// Flattens a property tree into triples, depth first.
pub(crate) fn tree_to_triples(root: &DocumentRoot) -> Vec<OwnedTriple> {
    let mut out = Vec::new();
    for node in &root.top_levels {
        flatten(node, &mut out);
    }
    out
}

fn flatten(node: &IdentifiableDocument, out: &mut Vec<OwnedTriple>) {
    if node.rdf_type != vocab::RDF_DESCRIPTION {
        out.push(OwnedTriple {
            subject: node.identity.clone(),
            predicate: vocab::RDF_TYPE.uri(),
            object: Object::Node(node.rdf_type.uri()),
        });
    }
    for p in &node.properties {
        let object = match &p.value {
            Value::Literal(l) => Object::Literal(l.clone()),
            Value::Uri(u) => Object::Node(u.clone()),
            Value::Nested(child) => Object::Node(child.identity.clone()),
        };
        out.push(OwnedTriple {
            subject: node.identity.clone(),
            predicate: p.name.uri(),
            object,
        });
        if let Value::Nested(child) = &p.value {
            flatten(child, out);
        }
    }
}

// =============================================================================
// Triples to tree
// =============================================================================

/// Prefix assignment for the namespaces a document uses.
struct Prefixes {
    bindings: Vec<NamespaceBinding>,
    generated: usize,
}

impl Prefixes {
    fn new(declared: Vec<NamespaceBinding>) -> Self {
        Self {
            bindings: declared,
            generated: 0,
        }
    }

    /// Splits an IRI into a qualified name, binding its namespace when it is
    /// new.
    fn qname(&mut self, iri: &str) -> Option<QName> {
        let mut name = QName::from_uri(iri)?;
        let prefix = match self.bindings.iter().find(|b| b.namespace == name.namespace) {
            Some(b) => b.prefix.clone(),
            None => {
                let prefix = match vocab::known_prefix(&name.namespace) {
                    Some(known) => known.to_string(),
                    None => {
                        self.generated += 1;
                        format!("ns{}", self.generated)
                    }
                };
                self.bindings
                    .push(NamespaceBinding::new(name.namespace.to_string(), prefix.clone()));
                prefix
            }
        };
        name.prefix = prefix.into();
        Some(name)
    }
}

struct Described {
    types: Vec<String>,
    edges: Vec<(String, Object)>,
}

/// Rebuilds a property tree from triples.
///
/// `declared` carries the prefixes the source declared; namespaces used by
/// classes and properties but not declared get a conventional or generated
/// prefix.
pub(crate) fn triples_to_tree(triples: Vec<OwnedTriple>, declared: Vec<NamespaceBinding>) -> DocumentRoot {
    let rdf_type = vocab::RDF_TYPE.uri();
    let mut order: Vec<String> = Vec::new();
    let mut subjects: FxHashMap<String, Described> = FxHashMap::default();
    for t in triples {
        let entry = subjects.entry(t.subject.clone()).or_insert_with(|| {
            order.push(t.subject.clone());
            Described {
                types: Vec::new(),
                edges: Vec::new(),
            }
        });
        match t.object {
            Object::Node(class) if t.predicate == rdf_type => entry.types.push(class),
            object => entry.edges.push((t.predicate, object)),
        }
    }

    let mut prefixes = Prefixes::new(declared);
    let mut classes: FxHashMap<&str, QName> = FxHashMap::default();
    for id in &order {
        let Some(subject) = subjects.get(id) else { continue };
        // SBOL classes win over any other type the subject carries
        let primary = subject
            .types
            .iter()
            .find(|t| t.starts_with(SBOL2_NS) || t.starts_with(SBOL1_NS))
            .or_else(|| subject.types.first());
        if let Some(class) = primary.and_then(|t| prefixes.qname(t)) {
            classes.insert(id.as_str(), class);
        }
    }

    let mut owned: FxHashSet<&str> = FxHashSet::default();
    for id in &order {
        let Some(subject) = subjects.get(id) else { continue };
        for (predicate, object) in &subject.edges {
            let Object::Node(target) = object else { continue };
            if target == id || !subjects.contains_key(target) {
                continue;
            }
            if is_blank(target) || owning_edge(classes.get(id.as_str()), predicate) {
                owned.insert(target.as_str());
            }
        }
    }

    let mut builder = Builder {
        subjects: &subjects,
        classes: &classes,
        prefixes: &mut prefixes,
        path: Vec::new(),
    };
    let mut top_levels = Vec::new();
    for id in &order {
        if owned.contains(id.as_str()) {
            continue;
        }
        if !classes.contains_key(id.as_str()) {
            warn!(subject = %id, "skipping untyped top-level subject");
            continue;
        }
        top_levels.push(builder.node(id));
    }

    let mut namespaces = prefixes.bindings;
    if !namespaces.iter().any(|b| b.namespace == RDF_NS) {
        namespaces.push(NamespaceBinding::new(RDF_NS, "rdf"));
    }
    DocumentRoot {
        namespaces,
        top_levels,
    }
}

fn owning_edge(class: Option<&QName>, predicate: &str) -> bool {
    match (class, QName::from_uri(predicate)) {
        (Some(class), Some(p)) => vocab::is_owning(class, &p),
        _ => false,
    }
}

struct Builder<'a> {
    subjects: &'a FxHashMap<String, Described>,
    classes: &'a FxHashMap<&'a str, QName>,
    prefixes: &'a mut Prefixes,
    /// Subjects on the current nesting path.
    path: Vec<&'a str>,
}

impl<'a> Builder<'a> {
    fn node(&mut self, id: &'a str) -> IdentifiableDocument {
        let class = self.classes.get(id).cloned();
        let rdf_type = class.clone().unwrap_or(vocab::RDF_DESCRIPTION);
        let mut node = IdentifiableDocument::new(rdf_type, id);
        let Some(subject) = self.subjects.get(id) else {
            return node;
        };
        self.path.push(id);

        let primary = class.as_ref().map(QName::uri);
        for extra in subject.types.iter().filter(|t| Some(*t) != primary.as_ref()) {
            node.push(NamedProperty::uri(vocab::RDF_TYPE, extra.as_str()));
        }
        for (predicate, object) in &subject.edges {
            let Some(name) = self.prefixes.qname(predicate) else {
                warn!(predicate = %predicate, "skipping property with an unsplittable IRI");
                continue;
            };
            let value = match object {
                Object::Literal(l) => Value::Literal(l.clone()),
                Object::Node(target) => {
                    let nest = self.subjects.contains_key(target)
                        && !self.path.contains(&target.as_str())
                        && (is_blank(target) || owning_edge(class.as_ref(), predicate));
                    if nest {
                        Value::Nested(Box::new(self.node(target)))
                    } else {
                        Value::Uri(target.clone())
                    }
                }
            };
            node.push(NamedProperty { name, value });
        }
        self.path.pop();
        node
    }
}

/// Namespace declarations found in a document's text, as
/// `(prefix, namespace)` captures of `pattern`.
pub(crate) fn scan_declarations(text: &str, pattern: &regex::Regex) -> Vec<NamespaceBinding> {
    let mut out: Vec<NamespaceBinding> = Vec::new();
    for caps in pattern.captures_iter(text) {
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        let Some(namespace) = caps.get(2).map(|m| m.as_str()) else { continue };
        if !out.iter().any(|b| b.namespace == namespace) {
            out.push(NamespaceBinding::new(namespace, prefix));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{sbol1, sbol2};

    fn triple(s: &str, p: &str, o: Object) -> OwnedTriple {
        OwnedTriple {
            subject: s.to_string(),
            predicate: p.to_string(),
            object: o,
        }
    }

    fn node(s: &str) -> Object {
        Object::Node(s.to_string())
    }

    #[test]
    fn test_owning_edges_nest() {
        let triples = vec![
            triple("http://ex.org/cd", &vocab::RDF_TYPE.uri(), node(&sbol2::COMPONENT_DEFINITION.uri())),
            triple("http://ex.org/cd", &sbol2::COMPONENT_PROP.uri(), node("http://ex.org/cd/c")),
            triple("http://ex.org/cd/c", &vocab::RDF_TYPE.uri(), node(&sbol2::COMPONENT.uri())),
            triple("http://ex.org/cd/c", &sbol2::DEFINITION.uri(), node("http://ex.org/other")),
            triple("http://ex.org/other", &vocab::RDF_TYPE.uri(), node(&sbol2::COMPONENT_DEFINITION.uri())),
        ];
        let root = triples_to_tree(triples, Vec::new());
        assert_eq!(root.top_levels.len(), 2);
        let cd = &root.top_levels[0];
        let c = cd.first(&sbol2::COMPONENT_PROP).and_then(Value::as_nested).unwrap();
        // definition is a reference, not ownership
        assert_eq!(c.first(&sbol2::DEFINITION), Some(&Value::Uri("http://ex.org/other".into())));
        assert_eq!(root.prefix_of(SBOL2_NS), Some("sbol"));
    }

    #[test]
    fn test_blank_nodes_nest_and_untyped_roots_are_skipped() {
        let triples = vec![
            triple("http://ex.org/x", &vocab::RDF_TYPE.uri(), node("http://myapp.org/Thing")),
            triple("http://ex.org/x", "http://myapp.org/detail", node("_:b0")),
            triple("_:b0", "http://myapp.org/size", Object::Literal(Literal::Integer(3))),
            triple("http://ex.org/loose", "http://myapp.org/size", Object::Literal(Literal::Integer(1))),
        ];
        let root = triples_to_tree(triples, Vec::new());
        assert_eq!(root.top_levels.len(), 1);
        let detail = root.top_levels[0].properties[0].value.as_nested().unwrap();
        assert_eq!(detail.rdf_type, vocab::RDF_DESCRIPTION);
        assert_eq!(detail.identity, "_:b0");
        assert_eq!(root.prefix_of("http://myapp.org/"), Some("ns1"));
    }

    #[test]
    fn test_sbol_class_wins_and_extra_types_are_kept() {
        let so = "http://purl.obolibrary.org/obo/SO_0000167";
        let triples = vec![
            triple("http://ex.org/p", &vocab::RDF_TYPE.uri(), node(so)),
            triple("http://ex.org/p", &vocab::RDF_TYPE.uri(), node(&sbol1::DNA_COMPONENT.uri())),
        ];
        let root = triples_to_tree(triples, Vec::new());
        let p = &root.top_levels[0];
        assert_eq!(p.rdf_type, sbol1::DNA_COMPONENT);
        assert_eq!(p.first(&vocab::RDF_TYPE), Some(&Value::Uri(so.into())));
        assert!(root.has_namespace(SBOL1_NS));
    }

    #[test]
    fn test_flatten_skips_description_type() {
        let mut root = DocumentRoot::new();
        root.top_levels.push(
            IdentifiableDocument::new(sbol2::SEQUENCE, "http://ex.org/s").with(NamedProperty::nested(
                QName::new("http://myapp.org/", "extra", "myapp"),
                IdentifiableDocument::new(vocab::RDF_DESCRIPTION, "_:e")
                    .with(NamedProperty::literal(QName::new("http://myapp.org/", "n", "myapp"), 1i64)),
            )),
        );
        let triples = tree_to_triples(&root);
        assert_eq!(triples.len(), 3);
        assert!(triples.iter().all(|t| t.object != node(&vocab::RDF_DESCRIPTION.uri())));
    }

    #[test]
    fn test_typed_literals() {
        assert_eq!(typed_literal("42", XSD_INTEGER), Literal::Integer(42));
        assert_eq!(typed_literal("true", XSD_BOOLEAN), Literal::Boolean(true));
        assert_eq!(typed_literal("x", XSD_STRING), Literal::String("x".into()));
        assert_eq!(
            typed_literal("forty", XSD_INTEGER),
            Literal::Typed {
                value: "forty".into(),
                datatype: XSD_INTEGER.into()
            }
        );
    }
}
