//! SBOL1 to SBOL2 bridging.
//!
//! A DnaComponent becomes a DNA ComponentDefinition, its DnaSequence a
//! Sequence, and each V1 annotation a SequenceAnnotation plus a Component
//! instance. An annotation without a subComponent gets an empty DNA part as
//! the Component's definition. `precedes` links between annotations become
//! PRECEDES constraints over the synthesized Components.
//!
//! When the document is compliant and has a default prefix, every bridged
//! entity, nested ones included, is re-minted under that prefix with version
//! `1.0` and remembers its V1 identity in `wasDerivedFrom`. Otherwise V1
//! identities are kept, and only entities with no V1 counterpart get new ones.

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::compliance;
use crate::document::Document;
use crate::error::ValidationError;
use crate::model::{
    AccessType, Collection, Component, ComponentDefinition, GenericLocation, Identifiable,
    Identified, Location, OrientationType, Range, RestrictionType, Sequence, SequenceAnnotation,
    SequenceConstraint, TopLevel, TopLevelKind, Uri,
};
use crate::tree::{DocumentRoot, IdentifiableDocument, NamedProperty, Value};
use crate::validate::Rule;
use crate::vocab::{self, SBOL1_NS, sbol1, terms};

use super::{annotate, describe, literal_text, missing, nested, position_value, uri_value, v2};

/// Version given to re-minted entities.
const V1_VERSION: &str = "1.0";

/// Bridges every top-level node of an SBOL1 tree into `doc`.
///
/// Each top-level node, together with everything bridged while reaching it,
/// is registered as one batch. A failed batch leaves no trace, and its
/// failure is appended to `errors`.
pub(super) fn read_all(root: &DocumentRoot, doc: &mut Document, errors: &mut Vec<ValidationError>) {
    let mut bridge = Bridge {
        remint: doc.config().compliant && doc.config().default_uri_prefix.is_some(),
        ..Bridge::default()
    };
    for node in &root.top_levels {
        let converted = match node.rdf_type.local_in(SBOL1_NS) {
            Some("DnaComponent") => bridge.component(doc, node).map(drop),
            Some("DnaSequence") => bridge.sequence(doc, node, None).map(drop),
            Some("Collection") => bridge.collection(doc, node),
            Some(other) => {
                warn!(class = other, identity = %node.identity, "skipping unknown SBOL1 class");
                continue;
            }
            None => v2::read_top_level(node).map(|top| bridge.batch.push(top)),
        };
        if let Err(e) = bridge.finish(doc, converted) {
            errors.push(e);
        }
    }
}

#[derive(Default)]
struct Bridge {
    remint: bool,
    /// V1 identity to bridged SBOL2 identity.
    bridged: FxHashMap<Uri, Uri>,
    /// Keys of `bridged` added by the current batch.
    pending: Vec<Uri>,
    batch: Vec<TopLevel>,
}

impl Bridge {
    /// Registers the current batch, forgetting its bridged identities when
    /// either the conversion or the registration failed.
    fn finish(&mut self, doc: &mut Document, converted: Result<(), ValidationError>) -> Result<(), ValidationError> {
        let batch = std::mem::take(&mut self.batch);
        let pending = std::mem::take(&mut self.pending);
        let result = converted.and_then(|()| doc.add_all(batch));
        if result.is_err() {
            for key in pending {
                self.bridged.remove(&key);
            }
        }
        result
    }

    fn remember(&mut self, original: &str, bridged: &str) {
        self.bridged.insert(original.to_string(), bridged.to_string());
        self.pending.push(original.to_string());
    }

    fn top_identity(
        &self,
        doc: &Document,
        kind: TopLevelKind,
        original: &str,
        display_id: Option<&str>,
    ) -> Result<Identified, ValidationError> {
        if self.remint {
            let display_id =
                display_id.ok_or_else(|| ValidationError::rule(Rule::DisplayIdGrammar, [original]))?;
            let mut identified = doc.mint(kind, display_id, V1_VERSION)?;
            identified.was_derived_from = Some(original.to_string());
            Ok(identified)
        } else {
            let mut identified = Identified::new(original);
            identified.display_id = display_id
                .filter(|d| compliance::is_valid_display_id(d))
                .map(str::to_string);
            Ok(identified)
        }
    }

    /// Identity of an entity synthesized under `parent` for the V1 node
    /// `original`.
    fn child_identity(
        &self,
        parent: &Identified,
        display_id: &str,
        original: &str,
    ) -> Result<Identified, ValidationError> {
        if self.remint {
            let mut identified = parent.child(display_id)?;
            identified.was_derived_from = Some(original.to_string());
            return Ok(identified);
        }
        let mut identified = Identified::new(format!("{}/{display_id}", parent.identity));
        identified.display_id = Some(display_id.to_string());
        Ok(identified)
    }

    /// Like [`child_identity`](Self::child_identity), but keeps the V1
    /// annotation's own identity when not re-minting. Blank nodes have none.
    fn annotation_identity(
        &self,
        parent: &Identified,
        display_id: &str,
        original: &str,
    ) -> Result<Identified, ValidationError> {
        if self.remint || original.starts_with("_:") {
            return self.child_identity(parent, display_id, original);
        }
        let mut identified = Identified::new(original);
        identified.display_id = compliance::extract_display_id(original)
            .filter(|d| compliance::is_valid_display_id(d))
            .map(str::to_string);
        Ok(identified)
    }

    /// An empty DNA part standing in for the definition of annotation `n`,
    /// which names no subComponent.
    fn placeholder(
        &mut self,
        doc: &Document,
        parent: &Identified,
        n: usize,
        original: &str,
    ) -> Result<Uri, ValidationError> {
        let display_id = parent.display_id.as_deref().map(|d| format!("{d}_component{n}"));
        let mut identified = if self.remint {
            let display_id =
                display_id.ok_or_else(|| ValidationError::rule(Rule::DisplayIdGrammar, [original]))?;
            doc.mint(TopLevelKind::ComponentDefinition, &display_id, V1_VERSION)?
        } else {
            let mut identified = Identified::new(format!("{}_component{n}", parent.identity));
            identified.display_id = display_id;
            identified
        };
        identified.was_derived_from = Some(original.to_string());

        let mut cd = ComponentDefinition::new(identified, [terms::DNA.to_string()]);
        cd.roles.insert(terms::ENGINEERED_REGION.to_string());
        let uri = cd.identity().to_string();
        debug!(annotation = original, part = %uri, "synthesized part for annotation without subComponent");
        self.batch.push(cd.into());
        Ok(uri)
    }

    /// Follows a reference to a node bridged earlier, or keeps it as is.
    fn reference(&self, node: &IdentifiableDocument, p: &NamedProperty) -> Result<Uri, ValidationError> {
        let uri = uri_value(node, p)?;
        Ok(self.bridged.get(&uri).cloned().unwrap_or(uri))
    }

    fn component(&mut self, doc: &Document, node: &IdentifiableDocument) -> Result<Uri, ValidationError> {
        if let Some(uri) = self.bridged.get(&node.identity) {
            return Ok(uri.clone());
        }
        let display_id = v1_display_id(node);
        let identified =
            self.top_identity(doc, TopLevelKind::ComponentDefinition, &node.identity, display_id.as_deref())?;
        let uri = identified.identity.clone();
        // registered before the children so that cycles resolve to this entity
        self.remember(&node.identity, &uri);

        let mut cd = ComponentDefinition::new(identified, [terms::DNA.to_string()]);
        let mut annotations = Vec::new();
        for p in &node.properties {
            if p.name == vocab::RDF_TYPE {
                cd.roles.insert(terms::so_from_v1(&uri_value(node, p)?));
                continue;
            }
            match p.name.local_in(SBOL1_NS) {
                Some("displayId") => {}
                Some("name") => cd.identified.name = Some(literal_text(node, p)?),
                Some("description") => cd.identified.description = Some(literal_text(node, p)?),
                Some("dnaSequence") => {
                    let sequence = match &p.value {
                        Value::Nested(seq) => self.sequence(doc, seq, Some(&cd.identified))?,
                        _ => self.reference(node, p)?,
                    };
                    cd.sequences.insert(sequence);
                }
                Some("annotation") => annotations.push(nested(node, p)?),
                _ => annotate(&mut cd.identified, p, SBOL1_NS),
            }
        }
        if cd.roles.is_empty() {
            cd.roles.insert(terms::ENGINEERED_REGION.to_string());
        }
        self.annotations(doc, &mut cd, &annotations)?;

        debug!(from = %node.identity, to = %uri, "bridged DnaComponent");
        self.batch.push(cd.into());
        Ok(uri)
    }

    fn annotations(
        &mut self,
        doc: &Document,
        cd: &mut ComponentDefinition,
        nodes: &[&IdentifiableDocument],
    ) -> Result<(), ValidationError> {
        // V1 annotation identity to the Component synthesized for it
        let mut instances: FxHashMap<&str, Uri> = FxHashMap::default();
        let mut precedes: Vec<(&str, Uri)> = Vec::new();

        for (i, node) in nodes.iter().enumerate() {
            let n = i + 1;
            let original = node.identity.as_str();
            let mut identified = self.annotation_identity(&cd.identified, &format!("annotation{n}"), original)?;
            let (mut start, mut end, mut strand) = (None, None, None);
            let mut sub_component = None;
            for p in &node.properties {
                match p.name.local_in(SBOL1_NS) {
                    Some("bioStart") => start = Some(position_value(node, p)?),
                    Some("bioEnd") => end = Some(position_value(node, p)?),
                    Some("strand") => {
                        strand = OrientationType::from_strand(&literal_text(node, p)?);
                        if strand.is_none() {
                            warn!(strand = %describe(&p.value), identity = %node.identity, "ignoring unknown strand");
                        }
                    }
                    Some("subComponent") => sub_component = Some(p),
                    Some("precedes") => precedes.push((original, uri_value(node, p)?)),
                    _ => annotate(&mut identified, p, SBOL1_NS),
                }
            }

            let location: Location = match (start, end) {
                (Some(start), Some(end)) => {
                    let mut range = Range::new(self.child_identity(&identified, "range", original)?, start, end)?;
                    range.orientation = strand;
                    range.into()
                }
                _ => {
                    let mut generic =
                        GenericLocation::new(self.child_identity(&identified, "genericLocation", original)?);
                    generic.orientation = strand;
                    generic.into()
                }
            };
            let mut annotation = SequenceAnnotation::new(identified, location);

            let definition = match sub_component {
                Some(p) => match &p.value {
                    Value::Nested(sub) => self.component(doc, sub)?,
                    _ => self.reference(node, p)?,
                },
                None => self.placeholder(doc, &cd.identified, n, original)?,
            };
            let instance = Component::new(
                self.child_identity(&cd.identified, &format!("component{n}"), original)?,
                AccessType::Public,
                definition,
            );
            annotation.component = Some(instance.identity().to_string());
            instances.insert(original, instance.identity().to_string());
            cd.components.push(instance);
            cd.sequence_annotations.push(annotation);
        }

        let mut count = 0;
        for (subject, object) in precedes {
            let (Some(s), Some(o)) = (instances.get(subject), instances.get(object.as_str())) else {
                warn!(subject, object = %object, "dropping precedes to an annotation of another part");
                continue;
            };
            count += 1;
            let identified = self.child_identity(&cd.identified, &format!("sequenceConstraint{count}"), subject)?;
            cd.sequence_constraints.push(SequenceConstraint::new(
                identified,
                RestrictionType::Precedes,
                s.clone(),
                o.clone(),
            ));
        }
        Ok(())
    }

    /// Bridges a DnaSequence. A sequence owned by a re-minted component is
    /// named after it.
    fn sequence(
        &mut self,
        doc: &Document,
        node: &IdentifiableDocument,
        owner: Option<&Identified>,
    ) -> Result<Uri, ValidationError> {
        if let Some(uri) = self.bridged.get(&node.identity) {
            return Ok(uri.clone());
        }
        let display_id = match owner.and_then(|o| o.display_id.as_deref()) {
            Some(owner_id) if self.remint => Some(format!("{owner_id}_seq")),
            _ => v1_display_id(node),
        };
        let mut identified =
            self.top_identity(doc, TopLevelKind::Sequence, &node.identity, display_id.as_deref())?;
        let mut elements = None;
        for p in &node.properties {
            match p.name.local_in(SBOL1_NS) {
                Some("nucleotides") => elements = Some(literal_text(node, p)?),
                _ => annotate(&mut identified, p, SBOL1_NS),
            }
        }
        let elements = elements.ok_or_else(|| missing(Rule::SequenceElements, node))?;
        let sequence = Sequence::new(identified, elements, terms::IUPAC_DNA);
        let uri = sequence.identity().to_string();
        self.remember(&node.identity, &uri);
        self.batch.push(sequence.into());
        Ok(uri)
    }

    fn collection(&mut self, doc: &Document, node: &IdentifiableDocument) -> Result<(), ValidationError> {
        let display_id = v1_display_id(node);
        let identified = self.top_identity(doc, TopLevelKind::Collection, &node.identity, display_id.as_deref())?;
        let mut collection = Collection::new(identified);
        for p in &node.properties {
            match p.name.local_in(SBOL1_NS) {
                Some("displayId") => {}
                Some("name") => collection.identified.name = Some(literal_text(node, p)?),
                Some("description") => collection.identified.description = Some(literal_text(node, p)?),
                Some("component") => {
                    let member = match &p.value {
                        Value::Nested(part) => self.component(doc, part)?,
                        _ => self.reference(node, p)?,
                    };
                    collection.members.insert(member);
                }
                _ => annotate(&mut collection.identified, p, SBOL1_NS),
            }
        }
        self.batch.push(collection.into());
        Ok(())
    }
}

/// The V1 `displayId`, falling back to the last segment of the identity.
fn v1_display_id(node: &IdentifiableDocument) -> Option<String> {
    node.first(&sbol1::DISPLAY_ID)
        .and_then(Value::as_text)
        .map(Cow::into_owned)
        .or_else(|| compliance::extract_display_id(&node.identity).map(str::to_string))
}
