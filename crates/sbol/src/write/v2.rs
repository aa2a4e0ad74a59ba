//! SBOL2 tree emission.

use crate::document::Document;
use crate::model::{
    Collection, ComponentDefinition, GenericTopLevel, Identified, Location, MapsTo, Model,
    ModuleDefinition, Range, Sequence, TopLevelRef,
};
use crate::tree::{DocumentRoot, IdentifiableDocument, NamedProperty, QName};
use crate::vocab::{self, DCTERMS_NS, PROV_NS, SBOL2_NS, sbol2};

use super::position;

pub(super) fn write_all(doc: &Document) -> DocumentRoot {
    let mut root = DocumentRoot::new();
    root.bind(SBOL2_NS, "sbol");
    root.bind(DCTERMS_NS, "dcterms");
    root.bind(PROV_NS, "prov");
    for binding in doc.namespaces() {
        root.bind(binding.namespace.clone(), binding.prefix.clone());
    }
    root.top_levels = doc.top_levels().map(top_level).collect();
    root
}

fn top_level(top: TopLevelRef<'_>) -> IdentifiableDocument {
    match top {
        TopLevelRef::Collection(x) => collection(x),
        TopLevelRef::ModuleDefinition(x) => module_definition(x),
        TopLevelRef::Model(x) => model(x),
        TopLevelRef::ComponentDefinition(x) => component_definition(x),
        TopLevelRef::Sequence(x) => sequence(x),
        TopLevelRef::GenericTopLevel(x) => generic(x),
    }
}

/// Starts a node with the fields every entity shares.
fn open(rdf_type: QName, identified: &Identified) -> IdentifiableDocument {
    let mut node = IdentifiableDocument::new(rdf_type, &identified.identity);
    if let Some(pid) = &identified.persistent_identity {
        node.push(NamedProperty::uri(sbol2::PERSISTENT_IDENTITY, pid));
    }
    if let Some(display_id) = &identified.display_id {
        node.push(NamedProperty::literal(sbol2::DISPLAY_ID, display_id.as_str()));
    }
    if let Some(version) = &identified.version {
        node.push(NamedProperty::literal(sbol2::VERSION, version.as_str()));
    }
    if let Some(source) = &identified.was_derived_from {
        node.push(NamedProperty::uri(vocab::WAS_DERIVED_FROM, source));
    }
    if let Some(name) = &identified.name {
        node.push(NamedProperty::literal(vocab::TITLE, name.as_str()));
    }
    if let Some(description) = &identified.description {
        node.push(NamedProperty::literal(vocab::DESCRIPTION, description.as_str()));
    }
    node
}

/// Appends the annotations and returns the finished node.
fn close(mut node: IdentifiableDocument, identified: &Identified) -> IdentifiableDocument {
    node.properties.extend(
        identified
            .annotations
            .iter()
            .filter(|a| !a.name.in_namespace(SBOL2_NS))
            .cloned()
            .map(NamedProperty::from),
    );
    node
}

fn uris<'a>(node: &mut IdentifiableDocument, name: &QName, values: impl IntoIterator<Item = &'a String>) {
    for v in values {
        node.push(NamedProperty::uri(name.clone(), v));
    }
}

fn collection(col: &Collection) -> IdentifiableDocument {
    let mut node = open(sbol2::COLLECTION, &col.identified);
    uris(&mut node, &sbol2::MEMBER, &col.members);
    close(node, &col.identified)
}

fn model(m: &Model) -> IdentifiableDocument {
    let mut node = open(sbol2::MODEL, &m.identified);
    node.push(NamedProperty::uri(sbol2::SOURCE, &m.source));
    node.push(NamedProperty::uri(sbol2::LANGUAGE, &m.language));
    node.push(NamedProperty::uri(sbol2::FRAMEWORK, &m.framework));
    uris(&mut node, &sbol2::ROLE, &m.roles);
    close(node, &m.identified)
}

fn sequence(s: &Sequence) -> IdentifiableDocument {
    let node = open(sbol2::SEQUENCE, &s.identified)
        .with(NamedProperty::literal(sbol2::ELEMENTS, s.elements.as_str()))
        .with(NamedProperty::uri(sbol2::ENCODING, &s.encoding));
    close(node, &s.identified)
}

fn generic(g: &GenericTopLevel) -> IdentifiableDocument {
    let node = open(g.rdf_type.clone(), &g.identified);
    close(node, &g.identified)
}

fn component_definition(cd: &ComponentDefinition) -> IdentifiableDocument {
    let mut node = open(sbol2::COMPONENT_DEFINITION, &cd.identified);
    uris(&mut node, &sbol2::TYPE, &cd.types);
    uris(&mut node, &sbol2::ROLE, &cd.roles);
    uris(&mut node, &sbol2::SEQUENCE_PROP, &cd.sequences);

    for c in &cd.components {
        let mut child = open(sbol2::COMPONENT, &c.identified)
            .with(NamedProperty::uri(sbol2::DEFINITION, &c.definition))
            .with(NamedProperty::uri(sbol2::ACCESS, c.access.uri()));
        maps_tos(&mut child, &c.maps_tos);
        node.push(NamedProperty::nested(sbol2::COMPONENT_PROP, close(child, &c.identified)));
    }
    for sa in &cd.sequence_annotations {
        let mut child = open(sbol2::SEQUENCE_ANNOTATION, &sa.identified);
        for l in &sa.locations {
            child.push(NamedProperty::nested(sbol2::LOCATION, location(l)));
        }
        if let Some(component) = &sa.component {
            child.push(NamedProperty::uri(sbol2::COMPONENT_PROP, component));
        }
        uris(&mut child, &sbol2::ROLE, &sa.roles);
        node.push(NamedProperty::nested(
            sbol2::SEQUENCE_ANNOTATION_PROP,
            close(child, &sa.identified),
        ));
    }
    for sc in &cd.sequence_constraints {
        let child = open(sbol2::SEQUENCE_CONSTRAINT, &sc.identified)
            .with(NamedProperty::uri(sbol2::RESTRICTION, sc.restriction.uri()))
            .with(NamedProperty::uri(sbol2::SUBJECT, &sc.subject))
            .with(NamedProperty::uri(sbol2::OBJECT, &sc.object));
        node.push(NamedProperty::nested(
            sbol2::SEQUENCE_CONSTRAINT_PROP,
            close(child, &sc.identified),
        ));
    }
    close(node, &cd.identified)
}

fn module_definition(md: &ModuleDefinition) -> IdentifiableDocument {
    let mut node = open(sbol2::MODULE_DEFINITION, &md.identified);
    uris(&mut node, &sbol2::ROLE, &md.roles);

    for fc in &md.functional_components {
        let mut child = open(sbol2::FUNCTIONAL_COMPONENT, &fc.identified)
            .with(NamedProperty::uri(sbol2::DEFINITION, &fc.definition))
            .with(NamedProperty::uri(sbol2::ACCESS, fc.access.uri()))
            .with(NamedProperty::uri(sbol2::DIRECTION, fc.direction.uri()));
        maps_tos(&mut child, &fc.maps_tos);
        node.push(NamedProperty::nested(
            sbol2::FUNCTIONAL_COMPONENT_PROP,
            close(child, &fc.identified),
        ));
    }
    for m in &md.modules {
        let mut child = open(sbol2::MODULE, &m.identified)
            .with(NamedProperty::uri(sbol2::DEFINITION, &m.definition));
        maps_tos(&mut child, &m.maps_tos);
        node.push(NamedProperty::nested(sbol2::MODULE_PROP, close(child, &m.identified)));
    }
    for i in &md.interactions {
        let mut child = open(sbol2::INTERACTION, &i.identified);
        uris(&mut child, &sbol2::TYPE, &i.types);
        for p in &i.participations {
            let mut participation = open(sbol2::PARTICIPATION, &p.identified);
            uris(&mut participation, &sbol2::ROLE, &p.roles);
            participation.push(NamedProperty::uri(sbol2::PARTICIPANT, &p.participant));
            child.push(NamedProperty::nested(
                sbol2::PARTICIPATION_PROP,
                close(participation, &p.identified),
            ));
        }
        node.push(NamedProperty::nested(sbol2::INTERACTION_PROP, close(child, &i.identified)));
    }
    uris(&mut node, &sbol2::MODEL_PROP, &md.models);
    close(node, &md.identified)
}

fn maps_tos(node: &mut IdentifiableDocument, items: &[MapsTo]) {
    for m in items {
        let child = open(sbol2::MAPS_TO, &m.identified)
            .with(NamedProperty::uri(sbol2::REFINEMENT, m.refinement.uri()))
            .with(NamedProperty::uri(sbol2::LOCAL, &m.local))
            .with(NamedProperty::uri(sbol2::REMOTE, &m.remote));
        node.push(NamedProperty::nested(sbol2::MAPS_TO_PROP, close(child, &m.identified)));
    }
}

fn range(r: &Range) -> IdentifiableDocument {
    let mut node = open(sbol2::RANGE, &r.identified)
        .with(NamedProperty::literal(sbol2::START, position(r.start)))
        .with(NamedProperty::literal(sbol2::END, position(r.end)));
    if let Some(o) = r.orientation {
        node.push(NamedProperty::uri(sbol2::ORIENTATION, o.uri()));
    }
    close(node, &r.identified)
}

fn location(l: &Location) -> IdentifiableDocument {
    match l {
        Location::Range(r) => range(r),
        Location::Cut(c) => {
            let mut node =
                open(sbol2::CUT, &c.identified).with(NamedProperty::literal(sbol2::AT, position(c.at)));
            if let Some(o) = c.orientation {
                node.push(NamedProperty::uri(sbol2::ORIENTATION, o.uri()));
            }
            close(node, &c.identified)
        }
        Location::GenericLocation(g) => {
            let mut node = open(sbol2::GENERIC_LOCATION, &g.identified);
            if let Some(o) = g.orientation {
                node.push(NamedProperty::uri(sbol2::ORIENTATION, o.uri()));
            }
            close(node, &g.identified)
        }
        Location::MultiRange(m) => {
            let mut node = open(sbol2::MULTI_RANGE, &m.identified);
            for r in &m.ranges {
                node.push(NamedProperty::nested(sbol2::RANGE_PROP, range(r)));
            }
            close(node, &m.identified)
        }
    }
}
