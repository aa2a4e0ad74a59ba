//! SBOL2 to SBOL1 downgrade.
//!
//! Only DNA parts survive: ComponentDefinitions with the DNA type, their
//! first IUPAC sequence, their annotations with Range or GenericLocation
//! positions, subcomponent links and PRECEDES constraints. Modules,
//! interactions, models and MapsTo have no SBOL1 counterpart and are dropped.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::document::Document;
use crate::model::{
    Collection, ComponentDefinition, Identified, Location, RestrictionType, SequenceAnnotation,
};
use crate::tree::{DocumentRoot, IdentifiableDocument, NamedProperty};
use crate::vocab::{RDF_NS, RDF_TYPE, SBOL1_NS, SBOL2_NS, sbol1, terms};

use super::position;

pub(super) fn downgrade(doc: &Document) -> DocumentRoot {
    let mut root = DocumentRoot::new();
    root.bind(SBOL1_NS, "s1");
    root.bind(RDF_NS, "rdf");

    let mut writer = Downgrade {
        doc,
        visiting: FxHashSet::default(),
    };
    if doc.collections().next().is_some() {
        root.top_levels = doc.collections().map(|c| writer.collection(c)).collect();
    } else {
        root.top_levels = doc
            .root_component_definitions()
            .into_iter()
            .filter(|cd| cd.types.contains(terms::DNA))
            .map(|cd| writer.component(cd))
            .collect();
    }

    let dropped = doc.module_definitions().count() + doc.models().count() + doc.generic_top_levels().count();
    if dropped > 0 {
        warn!(dropped, "entities without an SBOL1 form were not written");
    }
    root
}

struct Downgrade<'a> {
    doc: &'a Document,
    /// Definitions on the current subcomponent path.
    visiting: FxHashSet<&'a str>,
}

impl<'a> Downgrade<'a> {
    fn collection(&mut self, col: &'a Collection) -> IdentifiableDocument {
        let mut node = IdentifiableDocument::new(sbol1::COLLECTION, &col.identified.identity);
        self.describe(&mut node, &col.identified);
        for member in &col.members {
            match self.doc.get_component_definition(member) {
                Some(cd) if cd.types.contains(terms::DNA) => {
                    node.push(NamedProperty::nested(sbol1::COMPONENT, self.component(cd)));
                }
                _ => debug!(member = %member, "collection member has no SBOL1 form"),
            }
        }
        node
    }

    fn describe(&self, node: &mut IdentifiableDocument, identified: &Identified) {
        if let Some(display_id) = &identified.display_id {
            node.push(NamedProperty::literal(sbol1::DISPLAY_ID, display_id.as_str()));
        }
        if let Some(name) = &identified.name {
            node.push(NamedProperty::literal(sbol1::NAME, name.as_str()));
        }
        if let Some(description) = &identified.description {
            node.push(NamedProperty::literal(sbol1::DESCRIPTION, description.as_str()));
        }
    }

    fn component(&mut self, cd: &'a ComponentDefinition) -> IdentifiableDocument {
        let mut node = IdentifiableDocument::new(sbol1::DNA_COMPONENT, &cd.identified.identity);
        self.visiting.insert(&cd.identified.identity);

        self.describe(&mut node, &cd.identified);
        for role in &cd.roles {
            node.push(NamedProperty::uri(RDF_TYPE, terms::so_to_v1(role)));
        }
        let dna = cd
            .sequences
            .iter()
            .filter_map(|uri| self.doc.get_sequence(uri))
            .find(|s| s.encoding == terms::IUPAC_DNA);
        if let Some(seq) = dna {
            let seq_node = IdentifiableDocument::new(sbol1::DNA_SEQUENCE, &seq.identified.identity)
                .with(NamedProperty::literal(sbol1::NUCLEOTIDES, seq.elements.as_str()));
            node.push(NamedProperty::nested(sbol1::DNA_SEQUENCE_PROP, seq_node));
        }

        let precedes = precedes(cd);
        for sa in &cd.sequence_annotations {
            let mut sa_node = self.annotation(cd, sa);
            for object in precedes.get(sa.identified.identity.as_str()).into_iter().flatten() {
                sa_node.push(NamedProperty::uri(sbol1::PRECEDES, *object));
            }
            node.push(NamedProperty::nested(sbol1::ANNOTATION, sa_node));
        }

        node.properties.extend(
            cd.identified
                .annotations
                .iter()
                .filter(|a| !a.name.in_namespace(SBOL2_NS))
                .cloned()
                .map(NamedProperty::from),
        );
        self.visiting.remove(cd.identified.identity.as_str());
        node
    }

    fn annotation(&mut self, cd: &'a ComponentDefinition, sa: &'a SequenceAnnotation) -> IdentifiableDocument {
        let mut node = IdentifiableDocument::new(sbol1::SEQUENCE_ANNOTATION, &sa.identified.identity);
        let located = sa.locations.iter().find_map(|l| match l {
            Location::Range(r) => Some((Some((r.start, r.end)), r.orientation)),
            Location::GenericLocation(g) => Some((None, g.orientation)),
            Location::Cut(_) | Location::MultiRange(_) => None,
        });
        if located.is_none() {
            debug!(identity = %sa.identified.identity, "annotation location has no SBOL1 form");
        }
        let (bounds, orientation) = located.unwrap_or((None, None));
        if let Some((start, end)) = bounds {
            node.push(NamedProperty::literal(sbol1::BIO_START, position(start)));
            node.push(NamedProperty::literal(sbol1::BIO_END, position(end)));
        }
        if let Some(o) = orientation {
            node.push(NamedProperty::literal(sbol1::STRAND, o.strand()));
        }

        let definition = sa
            .component
            .as_deref()
            .and_then(|c| cd.get_component(c))
            .map(|c| c.definition.as_str());
        if let Some(definition) = definition {
            if self.visiting.contains(definition) {
                // a cycle: refer to the part being written instead of nesting it
                node.push(NamedProperty::uri(sbol1::SUB_COMPONENT, definition));
            } else if let Some(sub) = self.doc.get_component_definition(definition) {
                node.push(NamedProperty::nested(sbol1::SUB_COMPONENT, self.component(sub)));
            } else {
                node.push(NamedProperty::uri(sbol1::SUB_COMPONENT, definition));
            }
        }
        node
    }
}

/// Maps each annotation to the annotations it precedes, following PRECEDES
/// constraints through the annotations that point at their components.
fn precedes(cd: &ComponentDefinition) -> FxHashMap<&str, Vec<&str>> {
    let annotation_of = |component: &str| {
        cd.sequence_annotations
            .iter()
            .find(|sa| sa.component.as_deref() == Some(component))
            .map(|sa| sa.identified.identity.as_str())
    };
    let mut out: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for sc in &cd.sequence_constraints {
        if sc.restriction != RestrictionType::Precedes {
            continue;
        }
        match (annotation_of(&sc.subject), annotation_of(&sc.object)) {
            (Some(s), Some(o)) => out.entry(s).or_default().push(o),
            _ => debug!(constraint = %sc.identified.identity, "constraint endpoints are not annotated"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentConfig;
    use crate::model::{AccessType, Identifiable, OrientationType};
    use crate::read::read;
    use crate::write::{SchemaVersion, write};

    fn device() -> Document {
        let mut doc = Document::with_config(DocumentConfig::new().with_default_uri_prefix("http://example.org"));
        doc.create_component_definition("promoter", "1", [terms::DNA.to_string()])
            .unwrap()
            .roles
            .insert(terms::PROMOTER.to_string());
        doc.create_component_definition("cds", "1", [terms::DNA.to_string()]).unwrap();
        doc.create_sequence("device_seq", "1", "acgtacgtacgtacgtacgt", terms::IUPAC_DNA)
            .unwrap();

        let cd = doc
            .create_component_definition("device", "1", [terms::DNA.to_string()])
            .unwrap();
        cd.sequences.insert("http://example.org/device_seq/1".to_string());
        let p = cd
            .create_component("p", AccessType::Public, "http://example.org/promoter/1")
            .unwrap()
            .identity()
            .to_string();
        let c = cd
            .create_component("c", AccessType::Public, "http://example.org/cds/1")
            .unwrap()
            .identity()
            .to_string();
        for (id, start, end, component) in [("a1", 1, 10, &p), ("a2", 11, 20, &c)] {
            let sa = cd.create_sequence_annotation(id, "range", start, end).unwrap();
            if let Location::Range(r) = &mut sa.locations[0] {
                r.orientation = Some(OrientationType::Inline);
            }
            let sa_uri = sa.identity().to_string();
            cd.set_annotation_component(&sa_uri, Some(component.as_str())).unwrap();
        }
        cd.create_sequence_constraint("order", RestrictionType::Precedes, &p, &c)
            .unwrap();

        let md = doc.create_module_definition("circuit", "1").unwrap();
        md.create_functional_component(
            "fc",
            AccessType::Public,
            crate::model::DirectionType::None,
            "http://example.org/device/1",
        )
        .unwrap();
        doc
    }

    #[test]
    fn test_downgrade_writes_root_parts() {
        let root = write(&device(), SchemaVersion::V1);
        assert!(root.has_namespace(SBOL1_NS));
        assert!(!root.has_namespace(SBOL2_NS));
        // promoter and cds are subcomponents, only the device is a root
        assert_eq!(root.top_levels.len(), 1);
        let top = &root.top_levels[0];
        assert_eq!(top.rdf_type, sbol1::DNA_COMPONENT);

        let annotations: Vec<_> = top
            .values_of(&sbol1::ANNOTATION)
            .filter_map(|v| v.as_nested())
            .collect();
        assert_eq!(annotations.len(), 2);
        assert_eq!(
            annotations[0].first(&sbol1::PRECEDES).and_then(|v| v.as_text()).as_deref(),
            Some(annotations[1].identity.as_str())
        );
        assert!(annotations[0].first(&sbol1::SUB_COMPONENT).unwrap().as_nested().is_some());
        assert_eq!(
            annotations[1].first(&sbol1::STRAND).and_then(|v| v.as_text()).as_deref(),
            Some("+")
        );
    }

    #[test]
    fn test_downgrade_round_trip_keeps_dna_subset() {
        let original = device();
        let root = write(&original, SchemaVersion::V1);
        let doc = read(&root, DocumentConfig::new().with_compliant(false)).unwrap();

        assert_eq!(doc.module_definitions().count(), 0);
        assert_eq!(doc.component_definitions().count(), 3);
        let cd = doc.get_component_definition("http://example.org/device/1").unwrap();
        assert!(cd.types.contains(terms::DNA));
        let ranges: Vec<_> = cd
            .sequence_annotations
            .iter()
            .filter_map(|sa| sa.range())
            .map(|r| (r.start, r.end))
            .collect();
        assert_eq!(ranges, [(1, 10), (11, 20)]);
        assert_eq!(cd.sequence_constraints.len(), 1);
        let sc = &cd.sequence_constraints[0];
        assert_eq!(sc.restriction, RestrictionType::Precedes);
        assert_eq!(cd.get_component(&sc.subject).unwrap().definition, "http://example.org/promoter/1");
        assert_eq!(cd.get_component(&sc.object).unwrap().definition, "http://example.org/cds/1");
        assert!(cd.components.iter().all(|c| c.maps_tos.is_empty()));

        let seq = doc.get_sequence("http://example.org/device_seq/1").unwrap();
        assert_eq!(seq.elements, "acgtacgtacgtacgtacgt");
        let promoter = doc.get_component_definition("http://example.org/promoter/1").unwrap();
        assert!(promoter.roles.contains(terms::PROMOTER));
    }

    #[test]
    fn test_collections_take_precedence() {
        let mut doc = device();
        let col = doc.create_collection("lib", "1").unwrap();
        col.members.insert("http://example.org/cds/1".to_string());
        col.members.insert("http://example.org/circuit/1".to_string());

        let root = write(&doc, SchemaVersion::V1);
        assert_eq!(root.top_levels.len(), 1);
        let top = &root.top_levels[0];
        assert_eq!(top.rdf_type, sbol1::COLLECTION);
        assert_eq!(top.values_of(&sbol1::COMPONENT).count(), 1);
    }

    #[test]
    fn test_subcomponent_cycle_is_guarded() {
        use crate::model::{Component, GenericLocation};

        let mut doc = Document::with_config(DocumentConfig::new().with_compliant(false));
        let mut cd = ComponentDefinition::new(Identified::new("http://example.org/loop"), [terms::DNA.to_string()]);
        cd.add_component(Component::new(
            Identified::new("http://example.org/loop/self"),
            AccessType::Public,
            "http://example.org/loop",
        ))
        .unwrap();
        let mut sa = SequenceAnnotation::new(
            Identified::new("http://example.org/loop/sa"),
            GenericLocation::new(Identified::new("http://example.org/loop/sa/g")),
        );
        sa.component = Some("http://example.org/loop/self".to_string());
        cd.add_sequence_annotation(sa).unwrap();
        doc.add_component_definition(cd).unwrap();
        // a self-instantiating part is never a root, so reach it through a collection
        let mut col = Collection::new(Identified::new("http://example.org/lib"));
        col.members.insert("http://example.org/loop".to_string());
        doc.add_collection(col).unwrap();

        let root = write(&doc, SchemaVersion::V1);
        let part = root.top_levels[0]
            .first(&sbol1::COMPONENT)
            .and_then(|v| v.as_nested())
            .unwrap();
        let sa = part.first(&sbol1::ANNOTATION).and_then(|v| v.as_nested()).unwrap();
        let sub = sa.first(&sbol1::SUB_COMPONENT).unwrap();
        assert!(sub.as_nested().is_none());
        assert_eq!(sub.as_text().as_deref(), Some("http://example.org/loop"));
    }
}
