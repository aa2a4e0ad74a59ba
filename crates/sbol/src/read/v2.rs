//! SBOL2 node parsers.

use crate::error::ValidationError;
use crate::model::{
    AccessType, Collection, Component, ComponentDefinition, Cut, DirectionType, FunctionalComponent,
    GenericLocation, GenericTopLevel, Identified, Interaction, Location, MapsTo, Model, Module,
    ModuleDefinition, MultiRange, OrientationType, Participation, Range, RefinementType,
    RestrictionType, Sequence, SequenceAnnotation, SequenceConstraint, TopLevel,
};
use crate::tree::{IdentifiableDocument, NamedProperty};
use crate::validate::Rule;
use crate::vocab::SBOL2_NS;

use super::{
    annotate, literal_text, missing, nested, position_value, take_identified, uri_value,
};

/// Converts one top-level node. Types outside the SBOL2 namespace become
/// GenericTopLevels.
pub(super) fn read_top_level(node: &IdentifiableDocument) -> Result<TopLevel, ValidationError> {
    match node.rdf_type.local_in(SBOL2_NS) {
        Some("ComponentDefinition") => read_component_definition(node).map(TopLevel::from),
        Some("ModuleDefinition") => read_module_definition(node).map(TopLevel::from),
        Some("Sequence") => read_sequence(node).map(TopLevel::from),
        Some("Model") => read_model(node).map(TopLevel::from),
        Some("Collection") => read_collection(node).map(TopLevel::from),
        Some(_) => Err(missing(Rule::GenericTopLevelType, node)),
        None => read_generic(node).map(TopLevel::from),
    }
}

/// Parses a URI-valued enum, raising `rule` when the URI is unknown.
fn enum_value<T>(
    node: &IdentifiableDocument,
    p: &NamedProperty,
    rule: Rule,
    from_uri: fn(&str) -> Option<T>,
) -> Result<T, ValidationError> {
    let uri = uri_value(node, p)?;
    from_uri(&uri).ok_or_else(|| ValidationError::rule(rule, [node.identity.clone(), uri]))
}

// =============================================================================
// Top levels
// =============================================================================

fn read_component_definition(node: &IdentifiableDocument) -> Result<ComponentDefinition, ValidationError> {
    let mut cd = ComponentDefinition::new(Identified::new(&node.identity), []);
    for p in &node.properties {
        if take_identified(&mut cd.identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("type") => {
                cd.types.insert(uri_value(node, p)?);
            }
            Some("role") => {
                cd.roles.insert(uri_value(node, p)?);
            }
            Some("sequence") => {
                cd.sequences.insert(uri_value(node, p)?);
            }
            Some("component") => cd.components.push(read_component(nested(node, p)?)?),
            Some("sequenceAnnotation") => cd
                .sequence_annotations
                .push(read_sequence_annotation(nested(node, p)?)?),
            Some("sequenceConstraint") => cd
                .sequence_constraints
                .push(read_sequence_constraint(nested(node, p)?)?),
            _ => annotate(&mut cd.identified, p, SBOL2_NS),
        }
    }
    Ok(cd)
}

fn read_module_definition(node: &IdentifiableDocument) -> Result<ModuleDefinition, ValidationError> {
    let mut md = ModuleDefinition::new(Identified::new(&node.identity));
    for p in &node.properties {
        if take_identified(&mut md.identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("role") => {
                md.roles.insert(uri_value(node, p)?);
            }
            Some("model") => {
                md.models.insert(uri_value(node, p)?);
            }
            Some("functionalComponent") => md
                .functional_components
                .push(read_functional_component(nested(node, p)?)?),
            Some("module") => md.modules.push(read_module(nested(node, p)?)?),
            Some("interaction") => md.interactions.push(read_interaction(nested(node, p)?)?),
            _ => annotate(&mut md.identified, p, SBOL2_NS),
        }
    }
    Ok(md)
}

fn read_sequence(node: &IdentifiableDocument) -> Result<Sequence, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let mut elements = None;
    let mut encoding = None;
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("elements") => elements = Some(literal_text(node, p)?),
            Some("encoding") => encoding = Some(uri_value(node, p)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    let elements = elements.ok_or_else(|| missing(Rule::SequenceElements, node))?;
    let encoding = encoding.ok_or_else(|| missing(Rule::SequenceEncoding, node))?;
    Ok(Sequence::new(identified, elements, encoding))
}

fn read_model(node: &IdentifiableDocument) -> Result<Model, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let (mut source, mut language, mut framework) = (None, None, None);
    let mut roles = std::collections::BTreeSet::new();
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("source") => source = Some(uri_value(node, p)?),
            Some("language") => language = Some(uri_value(node, p)?),
            Some("framework") => framework = Some(uri_value(node, p)?),
            Some("role") => {
                roles.insert(uri_value(node, p)?);
            }
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    let mut model = Model::new(
        identified,
        source.ok_or_else(|| missing(Rule::ModelSource, node))?,
        language.ok_or_else(|| missing(Rule::ModelLanguage, node))?,
        framework.ok_or_else(|| missing(Rule::ModelFramework, node))?,
    );
    model.roles = roles;
    Ok(model)
}

fn read_collection(node: &IdentifiableDocument) -> Result<Collection, ValidationError> {
    let mut col = Collection::new(Identified::new(&node.identity));
    for p in &node.properties {
        if take_identified(&mut col.identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("member") => {
                col.members.insert(uri_value(node, p)?);
            }
            _ => annotate(&mut col.identified, p, SBOL2_NS),
        }
    }
    Ok(col)
}

fn read_generic(node: &IdentifiableDocument) -> Result<GenericTopLevel, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    for p in &node.properties {
        if !take_identified(&mut identified, node, p)? {
            annotate(&mut identified, p, SBOL2_NS);
        }
    }
    Ok(GenericTopLevel::new(identified, node.rdf_type.clone()))
}

// =============================================================================
// Nested
// =============================================================================

fn read_component(node: &IdentifiableDocument) -> Result<Component, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let (mut access, mut definition) = (None, None);
    let mut maps_tos = Vec::new();
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("access") => access = Some(enum_value(node, p, Rule::InstanceAccess, AccessType::from_uri)?),
            Some("definition") => definition = Some(uri_value(node, p)?),
            Some("mapsTo") => maps_tos.push(read_maps_to(nested(node, p)?)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    let mut component = Component::new(
        identified,
        access.ok_or_else(|| missing(Rule::InstanceAccess, node))?,
        definition.ok_or_else(|| missing(Rule::InstanceDefinition, node))?,
    );
    component.maps_tos = maps_tos;
    Ok(component)
}

fn read_functional_component(node: &IdentifiableDocument) -> Result<FunctionalComponent, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let (mut access, mut direction, mut definition) = (None, None, None);
    let mut maps_tos = Vec::new();
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("access") => access = Some(enum_value(node, p, Rule::InstanceAccess, AccessType::from_uri)?),
            Some("direction") => {
                direction = Some(enum_value(
                    node,
                    p,
                    Rule::FunctionalComponentDirection,
                    DirectionType::from_uri,
                )?)
            }
            Some("definition") => definition = Some(uri_value(node, p)?),
            Some("mapsTo") => maps_tos.push(read_maps_to(nested(node, p)?)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    let mut fc = FunctionalComponent::new(
        identified,
        access.ok_or_else(|| missing(Rule::InstanceAccess, node))?,
        direction.ok_or_else(|| missing(Rule::FunctionalComponentDirection, node))?,
        definition.ok_or_else(|| missing(Rule::InstanceDefinition, node))?,
    );
    fc.maps_tos = maps_tos;
    Ok(fc)
}

fn read_module(node: &IdentifiableDocument) -> Result<Module, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let mut definition = None;
    let mut maps_tos = Vec::new();
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("definition") => definition = Some(uri_value(node, p)?),
            Some("mapsTo") => maps_tos.push(read_maps_to(nested(node, p)?)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    let mut module = Module::new(
        identified,
        definition.ok_or_else(|| missing(Rule::ModuleDefinitionReference, node))?,
    );
    module.maps_tos = maps_tos;
    Ok(module)
}

fn read_maps_to(node: &IdentifiableDocument) -> Result<MapsTo, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let (mut refinement, mut local, mut remote) = (None, None, None);
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("refinement") => {
                refinement = Some(enum_value(node, p, Rule::MapsToRefinement, RefinementType::from_uri)?)
            }
            Some("local") => local = Some(uri_value(node, p)?),
            Some("remote") => remote = Some(uri_value(node, p)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    Ok(MapsTo::new(
        identified,
        refinement.ok_or_else(|| missing(Rule::MapsToRefinement, node))?,
        local.ok_or_else(|| missing(Rule::MapsToLocal, node))?,
        remote.ok_or_else(|| missing(Rule::MapsToRemote, node))?,
    ))
}

fn read_interaction(node: &IdentifiableDocument) -> Result<Interaction, ValidationError> {
    let mut interaction = Interaction::new(Identified::new(&node.identity), []);
    for p in &node.properties {
        if take_identified(&mut interaction.identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("type") => {
                interaction.types.insert(uri_value(node, p)?);
            }
            Some("participation") => interaction
                .participations
                .push(read_participation(nested(node, p)?)?),
            _ => annotate(&mut interaction.identified, p, SBOL2_NS),
        }
    }
    Ok(interaction)
}

fn read_participation(node: &IdentifiableDocument) -> Result<Participation, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let mut participant = None;
    let mut roles = std::collections::BTreeSet::new();
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("role") => {
                roles.insert(uri_value(node, p)?);
            }
            Some("participant") => participant = Some(uri_value(node, p)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    let mut participation = Participation::new(
        identified,
        participant.ok_or_else(|| missing(Rule::ParticipationParticipant, node))?,
    );
    participation.roles = roles;
    Ok(participation)
}

fn read_sequence_annotation(node: &IdentifiableDocument) -> Result<SequenceAnnotation, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let mut component = None;
    let mut roles = std::collections::BTreeSet::new();
    let mut locations = Vec::new();
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("component") => component = Some(uri_value(node, p)?),
            Some("role") => {
                roles.insert(uri_value(node, p)?);
            }
            Some("location") => locations.push(read_location(nested(node, p)?)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    if locations.is_empty() {
        return Err(missing(Rule::AnnotationLocation, node));
    }
    Ok(SequenceAnnotation {
        identified,
        component,
        roles,
        locations,
    })
}

fn read_sequence_constraint(node: &IdentifiableDocument) -> Result<SequenceConstraint, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let (mut restriction, mut subject, mut object) = (None, None, None);
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("restriction") => {
                restriction = Some(enum_value(
                    node,
                    p,
                    Rule::ConstraintRestriction,
                    RestrictionType::from_uri,
                )?)
            }
            Some("subject") => subject = Some(uri_value(node, p)?),
            Some("object") => object = Some(uri_value(node, p)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    Ok(SequenceConstraint::new(
        identified,
        restriction.ok_or_else(|| missing(Rule::ConstraintRestriction, node))?,
        subject.ok_or_else(|| missing(Rule::ConstraintSubject, node))?,
        object.ok_or_else(|| missing(Rule::ConstraintObject, node))?,
    ))
}

// =============================================================================
// Locations
// =============================================================================

fn read_location(node: &IdentifiableDocument) -> Result<Location, ValidationError> {
    match node.rdf_type.local_in(SBOL2_NS) {
        Some("Range") => read_range(node).map(Location::from),
        Some("Cut") => read_cut(node).map(Location::from),
        Some("GenericLocation") => read_generic_location(node).map(Location::from),
        Some("MultiRange") => read_multi_range(node).map(Location::from),
        _ => Err(ValidationError::message(
            format!("unknown location type {}", node.rdf_type),
            [node.identity.as_str()],
        )),
    }
}

fn orientation(node: &IdentifiableDocument, p: &NamedProperty) -> Result<OrientationType, ValidationError> {
    enum_value(node, p, Rule::LocationOrientation, OrientationType::from_uri)
}

fn read_range(node: &IdentifiableDocument) -> Result<Range, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let (mut start, mut end, mut orient) = (None, None, None);
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("start") => start = Some(position_value(node, p)?),
            Some("end") => end = Some(position_value(node, p)?),
            Some("orientation") => orient = Some(orientation(node, p)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    let mut range = Range::new(
        identified,
        start.ok_or_else(|| missing(Rule::RangeStart, node))?,
        end.ok_or_else(|| missing(Rule::RangeEnd, node))?,
    )?;
    range.orientation = orient;
    Ok(range)
}

fn read_cut(node: &IdentifiableDocument) -> Result<Cut, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let (mut at, mut orient) = (None, None);
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("at") => at = Some(position_value(node, p)?),
            Some("orientation") => orient = Some(orientation(node, p)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    let mut cut = Cut::new(identified, at.ok_or_else(|| missing(Rule::CutAt, node))?);
    cut.orientation = orient;
    Ok(cut)
}

fn read_generic_location(node: &IdentifiableDocument) -> Result<GenericLocation, ValidationError> {
    let mut generic = GenericLocation::new(Identified::new(&node.identity));
    for p in &node.properties {
        if take_identified(&mut generic.identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("orientation") => generic.orientation = Some(orientation(node, p)?),
            _ => annotate(&mut generic.identified, p, SBOL2_NS),
        }
    }
    Ok(generic)
}

fn read_multi_range(node: &IdentifiableDocument) -> Result<MultiRange, ValidationError> {
    let mut identified = Identified::new(&node.identity);
    let mut ranges = Vec::new();
    for p in &node.properties {
        if take_identified(&mut identified, node, p)? {
            continue;
        }
        match p.name.local_in(SBOL2_NS) {
            Some("range") => ranges.push(read_range(nested(node, p)?)?),
            _ => annotate(&mut identified, p, SBOL2_NS),
        }
    }
    ranges.sort_by_key(|r| r.start);
    MultiRange::new(identified, ranges)
}
