//! Document-wide validation.
//!
//! Structural checks that only need one entity run when that entity is added
//! to a [`Document`]. This module holds the checks that need the whole
//! document: references dereference to the right kind, and every MapsTo's
//! remote side names a public instance of the linked definition.

pub mod rules;

pub use rules::Rule;

use crate::document::Document;
use crate::error::ValidationError;
use crate::model::{
    AccessType, ComponentInstanceRef, Identifiable, MapsTo, MapsToOwner, TopLevelKind, TopLevelRef,
};

/// One outgoing reference of a top-level entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reference<'a> {
    pub uri: &'a str,
    /// Identity of the entity holding the reference.
    pub referrer: &'a str,
    /// Kind the target must have, if any.
    pub expected: Option<TopLevelKind>,
    /// Rule raised when the reference is broken.
    pub rule: Rule,
}

/// Lists the references from a top-level entity (and everything it owns) to
/// other top-level entities.
pub(crate) fn references(top: TopLevelRef<'_>) -> Vec<Reference<'_>> {
    let mut out = Vec::new();
    match top {
        TopLevelRef::ComponentDefinition(cd) => {
            for uri in &cd.sequences {
                out.push(Reference {
                    uri,
                    referrer: cd.identity(),
                    expected: Some(TopLevelKind::Sequence),
                    rule: Rule::ComponentDefinitionSequence,
                });
            }
            for c in &cd.components {
                out.push(Reference {
                    uri: &c.definition,
                    referrer: c.identity(),
                    expected: Some(TopLevelKind::ComponentDefinition),
                    rule: Rule::InstanceDefinitionReference,
                });
            }
        }
        TopLevelRef::ModuleDefinition(md) => {
            for fc in &md.functional_components {
                out.push(Reference {
                    uri: &fc.definition,
                    referrer: fc.identity(),
                    expected: Some(TopLevelKind::ComponentDefinition),
                    rule: Rule::InstanceDefinitionReference,
                });
            }
            for m in &md.modules {
                out.push(Reference {
                    uri: &m.definition,
                    referrer: m.identity(),
                    expected: Some(TopLevelKind::ModuleDefinition),
                    rule: Rule::ModuleDefinitionReference,
                });
            }
            for uri in &md.models {
                out.push(Reference {
                    uri,
                    referrer: md.identity(),
                    expected: Some(TopLevelKind::Model),
                    rule: Rule::ModuleDefinitionModel,
                });
            }
        }
        TopLevelRef::Collection(col) => {
            for uri in &col.members {
                out.push(Reference {
                    uri,
                    referrer: col.identity(),
                    expected: None,
                    rule: Rule::CollectionMembers,
                });
            }
        }
        TopLevelRef::Model(_) | TopLevelRef::Sequence(_) | TopLevelRef::GenericTopLevel(_) => {}
    }
    out
}

/// Runs every document-wide check and returns all failures.
///
/// Collection members may be of any kind; every other reference must
/// dereference to its expected kind.
pub fn validate_document(doc: &Document) -> Vec<ValidationError> {
    let compliant = doc.config().compliant;
    let mut errors = Vec::new();

    for top in doc.top_levels() {
        if let Err(e) = top.check(compliant) {
            errors.push(e);
        }
        for r in references(top) {
            match doc.get(r.uri) {
                None => errors.push(ValidationError::unresolved(r.uri, r.referrer)),
                Some(target) if r.expected.is_some_and(|k| k != target.kind()) => {
                    errors.push(ValidationError::rule(r.rule, [r.referrer, r.uri]));
                }
                Some(_) => {}
            }
        }
    }

    for cd in doc.component_definitions() {
        let is_local = |uri: &str| cd.get_component(uri).is_some();
        for c in &cd.components {
            check_maps_tos(doc, c, false, &is_local, &mut errors);
        }
    }
    for md in doc.module_definitions() {
        let is_local = |uri: &str| md.get_functional_component(uri).is_some();
        for fc in &md.functional_components {
            check_maps_tos(doc, fc, false, &is_local, &mut errors);
        }
        for m in &md.modules {
            check_maps_tos(doc, m, true, &is_local, &mut errors);
        }
    }
    errors
}

/// Checks both sides of each MapsTo of `owner`. `is_local` accepts the
/// instances of the owner's parent. A missing definition is reported by the
/// reference pass and skipped here.
fn check_maps_tos(
    doc: &Document,
    owner: &dyn MapsToOwner,
    module: bool,
    is_local: &dyn Fn(&str) -> bool,
    errors: &mut Vec<ValidationError>,
) {
    for maps_to in owner.maps_tos() {
        if !is_local(&maps_to.local) {
            errors.push(ValidationError::rule(
                Rule::MapsToLocal,
                [maps_to.identity(), maps_to.local.as_str()],
            ));
        }
        let instance = remote_of(doc, owner.definition(), maps_to, module);
        match instance {
            RemoteLookup::DefinitionMissing => {}
            RemoteLookup::Missing => errors.push(ValidationError::rule(
                Rule::MapsToRemote,
                [maps_to.identity(), maps_to.remote.as_str()],
            )),
            RemoteLookup::Found(i) if i.access() == AccessType::Private => {
                errors.push(ValidationError::rule(
                    Rule::MapsToRemotePrivate,
                    [maps_to.identity(), maps_to.remote.as_str()],
                ))
            }
            RemoteLookup::Found(_) => {}
        }
    }
}

enum RemoteLookup<'a> {
    DefinitionMissing,
    Missing,
    Found(ComponentInstanceRef<'a>),
}

fn remote_of<'a>(doc: &'a Document, definition: &str, maps_to: &MapsTo, module: bool) -> RemoteLookup<'a> {
    let found = if module {
        let Some(md) = doc.get_module_definition(definition) else {
            return RemoteLookup::DefinitionMissing;
        };
        md.get_functional_component(&maps_to.remote)
            .map(ComponentInstanceRef::FunctionalComponent)
    } else {
        let Some(cd) = doc.get_component_definition(definition) else {
            return RemoteLookup::DefinitionMissing;
        };
        cd.get_component(&maps_to.remote).map(ComponentInstanceRef::Component)
    };
    match found {
        Some(i) => RemoteLookup::Found(i),
        None => RemoteLookup::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentConfig;
    use crate::model::{ComponentDefinition, Identified, MapsTo, RefinementType, Sequence};
    use crate::vocab::terms;

    #[test]
    fn test_dangling_and_wrong_kind_references() {
        let mut doc = Document::new();
        let mut cd = ComponentDefinition::new(
            Identified::new("http://example.org/cd"),
            [terms::DNA.to_string()],
        );
        cd.sequences.insert("http://example.org/missing".to_string());
        cd.sequences.insert("http://example.org/other_cd".to_string());
        doc.add_component_definition(cd).unwrap();
        doc.add_component_definition(ComponentDefinition::new(
            Identified::new("http://example.org/other_cd"),
            [terms::DNA.to_string()],
        ))
        .unwrap();

        let errors = validate_document(&doc);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Unresolved { .. })));
        assert!(errors
            .iter()
            .any(|e| e.rule_id() == Some(Rule::ComponentDefinitionSequence)));
    }

    #[test]
    fn test_private_remote_is_reported() {
        let mut doc = Document::with_config(DocumentConfig::new().with_compliant(false));
        let mut inner = ComponentDefinition::new(
            Identified::new("http://example.org/inner"),
            [terms::DNA.to_string()],
        );
        inner
            .add_component(crate::model::Component::new(
                Identified::new("http://example.org/inner/hidden"),
                AccessType::Private,
                "http://example.org/leaf",
            ))
            .unwrap();
        let mut outer = ComponentDefinition::new(
            Identified::new("http://example.org/outer"),
            [terms::DNA.to_string()],
        );
        for id in ["a", "b"] {
            outer
                .add_component(crate::model::Component::new(
                    Identified::new(format!("http://example.org/outer/{id}")),
                    AccessType::Public,
                    if id == "a" { "http://example.org/inner" } else { "http://example.org/leaf" },
                ))
                .unwrap();
        }
        outer.components[0].maps_tos.push(MapsTo::new(
            Identified::new("http://example.org/outer/a/m"),
            RefinementType::UseRemote,
            "http://example.org/outer/b",
            "http://example.org/inner/hidden",
        ));
        doc.add_component_definition(inner).unwrap();
        doc.add_component_definition(outer).unwrap();
        doc.add_component_definition(ComponentDefinition::new(
            Identified::new("http://example.org/leaf"),
            [terms::DNA.to_string()],
        ))
        .unwrap();
        doc.add_sequence(Sequence::new(
            Identified::new("http://example.org/unused"),
            "A",
            terms::IUPAC_DNA,
        ))
        .unwrap();

        let errors = validate_document(&doc);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule_id(), Some(Rule::MapsToRemotePrivate));
    }

    #[test]
    fn test_unchecked_maps_to_is_reported() {
        let mut doc = Document::new();
        let mut leaf = ComponentDefinition::new(Identified::new("http://example.org/leaf"), [terms::DNA.to_string()]);
        leaf.add_component(crate::model::Component::new(
            Identified::new("http://example.org/leaf/open"),
            AccessType::Public,
            "http://example.org/leaf",
        ))
        .unwrap();
        let mut outer = ComponentDefinition::new(Identified::new("http://example.org/outer"), [terms::DNA.to_string()]);
        outer
            .add_component(crate::model::Component::new(
                Identified::new("http://example.org/outer/a"),
                AccessType::Public,
                "http://example.org/leaf",
            ))
            .unwrap();
        // bypasses Document::create_maps_to, so nothing checks the link yet
        outer.components[0]
            .add_maps_to(MapsTo::new(
                Identified::new("http://example.org/outer/a/m"),
                RefinementType::UseLocal,
                "http://example.org/elsewhere/x",
                "http://example.org/leaf/open",
            ))
            .unwrap();
        doc.add_component_definition(leaf).unwrap();
        doc.add_component_definition(outer).unwrap();

        let errors = validate_document(&doc);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule_id(), Some(Rule::MapsToLocal));
        assert_eq!(errors[0].objects()[1], "http://example.org/elsewhere/x");
    }
}
