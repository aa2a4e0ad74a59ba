//! ComponentDefinition and the entities it owns.

use std::collections::BTreeSet;

use crate::error::ValidationError;
use crate::model::{
    AccessType, Component, Cut, GenericLocation, Identifiable, Identified, Location, MapsToOwner,
    Range, RestrictionType, Uri, find, find_mut, first_duplicate, impl_identifiable, position,
    push_unique,
};
use crate::validate::Rule;

/// A region of a ComponentDefinition's sequence, optionally realized by one
/// of its Components.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceAnnotation {
    pub identified: Identified,
    pub component: Option<Uri>,
    pub roles: BTreeSet<Uri>,
    pub locations: Vec<Location>,
}

impl SequenceAnnotation {
    /// Creates an annotation with a single location.
    pub fn new(identified: Identified, location: impl Into<Location>) -> Self {
        Self {
            identified,
            component: None,
            roles: BTreeSet::new(),
            locations: vec![location.into()],
        }
    }

    pub fn get_location(&self, identity: &str) -> Option<&Location> {
        find(&self.locations, identity)
    }

    pub fn get_location_mut(&mut self, identity: &str) -> Option<&mut Location> {
        find_mut(&mut self.locations, identity)
    }

    pub fn add_location(&mut self, location: impl Into<Location>) -> Result<&mut Location, ValidationError> {
        let location = location.into();
        let taken = self.get_location(location.identity()).is_some();
        push_unique(&mut self.locations, location, taken)
    }

    pub fn create_range(
        &mut self,
        display_id: &str,
        start: u64,
        end: u64,
    ) -> Result<&mut Location, ValidationError> {
        let range = Range::new(self.identified.child(display_id)?, start, end)?;
        self.add_location(range)
    }

    pub fn create_cut(&mut self, display_id: &str, at: u64) -> Result<&mut Location, ValidationError> {
        let cut = Cut::new(self.identified.child(display_id)?, at);
        self.add_location(cut)
    }

    pub fn create_generic_location(&mut self, display_id: &str) -> Result<&mut Location, ValidationError> {
        let generic = GenericLocation::new(self.identified.child(display_id)?);
        self.add_location(generic)
    }

    /// Removes a location. The last location cannot be removed.
    pub fn remove_location(&mut self, identity: &str) -> Result<Location, ValidationError> {
        let Some(index) = position(&self.locations, identity) else {
            return Err(ValidationError::message("location not found", [identity]));
        };
        if self.locations.len() == 1 {
            return Err(ValidationError::rule(
                Rule::AnnotationLocation,
                [self.identity()],
            ));
        }
        Ok(self.locations.remove(index))
    }

    /// Returns the first Range location, if any.
    pub fn range(&self) -> Option<&Range> {
        self.locations.iter().find_map(|l| match l {
            Location::Range(r) => Some(r),
            _ => None,
        })
    }
}

/// A positional or orientation relation between two sibling Components.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceConstraint {
    pub identified: Identified,
    pub restriction: RestrictionType,
    pub subject: Uri,
    pub object: Uri,
}

impl SequenceConstraint {
    pub fn new(
        identified: Identified,
        restriction: RestrictionType,
        subject: impl Into<Uri>,
        object: impl Into<Uri>,
    ) -> Self {
        Self {
            identified,
            restriction,
            subject: subject.into(),
            object: object.into(),
        }
    }
}

/// A structural design element: DNA, RNA, protein, small molecule or complex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentDefinition {
    pub identified: Identified,
    pub types: BTreeSet<Uri>,
    pub roles: BTreeSet<Uri>,
    pub sequences: BTreeSet<Uri>,
    pub components: Vec<Component>,
    pub sequence_annotations: Vec<SequenceAnnotation>,
    pub sequence_constraints: Vec<SequenceConstraint>,
}

impl_identifiable!(SequenceAnnotation, SequenceConstraint, ComponentDefinition);

impl ComponentDefinition {
    pub fn new(identified: Identified, types: impl IntoIterator<Item = Uri>) -> Self {
        Self {
            identified,
            types: types.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Returns true if any owned child already uses this identity.
    fn child_taken(&self, identity: &str) -> bool {
        find(&self.components, identity).is_some()
            || find(&self.sequence_annotations, identity).is_some()
            || find(&self.sequence_constraints, identity).is_some()
    }

    fn has_component(&self, identity: &str) -> bool {
        find(&self.components, identity).is_some()
    }

    // -------------------------------------------------------------------------
    // Components
    // -------------------------------------------------------------------------

    pub fn get_component(&self, identity: &str) -> Option<&Component> {
        find(&self.components, identity)
    }

    pub fn get_component_mut(&mut self, identity: &str) -> Option<&mut Component> {
        find_mut(&mut self.components, identity)
    }

    /// Adds a pre-built Component.
    pub fn add_component(&mut self, component: Component) -> Result<&mut Component, ValidationError> {
        let taken = self.child_taken(component.identity());
        push_unique(&mut self.components, component, taken)
    }

    /// Creates a Component with a compliant child identity.
    pub fn create_component(
        &mut self,
        display_id: &str,
        access: AccessType,
        definition: impl Into<Uri>,
    ) -> Result<&mut Component, ValidationError> {
        let component = Component::new(self.identified.child(display_id)?, access, definition);
        self.add_component(component)
    }

    /// Error for the first sibling that still refers to a Component.
    fn component_referrers(&self, identity: &str) -> Option<ValidationError> {
        if let Some(sa) = self
            .sequence_annotations
            .iter()
            .find(|sa| sa.component.as_deref() == Some(identity))
        {
            return Some(ValidationError::rule(Rule::AnnotationComponent, [sa.identity(), identity]));
        }
        for sc in &self.sequence_constraints {
            if sc.subject == identity {
                return Some(ValidationError::rule(
                    Rule::ConstraintSubjectSibling,
                    [sc.identity(), identity],
                ));
            }
            if sc.object == identity {
                return Some(ValidationError::rule(
                    Rule::ConstraintObjectSibling,
                    [sc.identity(), identity],
                ));
            }
        }
        self.components
            .iter()
            .flat_map(|c| c.maps_tos.iter())
            .find(|m| m.local == identity)
            .map(|m| ValidationError::rule(Rule::MapsToLocal, [m.identity(), identity]))
    }

    /// Removes a Component that no sibling refers to.
    pub fn remove_component(&mut self, identity: &str) -> Result<Component, ValidationError> {
        let Some(index) = position(&self.components, identity) else {
            return Err(ValidationError::message("component not found", [identity]));
        };
        if let Some(err) = self.component_referrers(identity) {
            return Err(err);
        }
        Ok(self.components.remove(index))
    }

    /// Removes every Component, failing without change if any is referenced.
    pub fn clear_components(&mut self) -> Result<(), ValidationError> {
        for c in &self.components {
            if let Some(err) = self.component_referrers(c.identity()) {
                return Err(err);
            }
        }
        self.components.clear();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Sequence annotations
    // -------------------------------------------------------------------------

    pub fn get_sequence_annotation(&self, identity: &str) -> Option<&SequenceAnnotation> {
        find(&self.sequence_annotations, identity)
    }

    pub fn get_sequence_annotation_mut(&mut self, identity: &str) -> Option<&mut SequenceAnnotation> {
        find_mut(&mut self.sequence_annotations, identity)
    }

    pub fn add_sequence_annotation(
        &mut self,
        annotation: SequenceAnnotation,
    ) -> Result<&mut SequenceAnnotation, ValidationError> {
        if annotation.locations.is_empty() {
            return Err(ValidationError::rule(Rule::AnnotationLocation, [annotation.identity()]));
        }
        if let Some(component) = &annotation.component {
            if !self.has_component(component) {
                return Err(ValidationError::rule(
                    Rule::AnnotationComponent,
                    [annotation.identity(), component.as_str()],
                ));
            }
        }
        let taken = self.child_taken(annotation.identity());
        push_unique(&mut self.sequence_annotations, annotation, taken)
    }

    /// Creates an annotation located by a single Range.
    pub fn create_sequence_annotation(
        &mut self,
        display_id: &str,
        location_id: &str,
        start: u64,
        end: u64,
    ) -> Result<&mut SequenceAnnotation, ValidationError> {
        let identified = self.identified.child(display_id)?;
        let range = Range::new(identified.child(location_id)?, start, end)?;
        self.add_sequence_annotation(SequenceAnnotation::new(identified, range))
    }

    /// Creates an annotation located by a single Cut.
    pub fn create_cut_annotation(
        &mut self,
        display_id: &str,
        location_id: &str,
        at: u64,
    ) -> Result<&mut SequenceAnnotation, ValidationError> {
        let identified = self.identified.child(display_id)?;
        let cut = Cut::new(identified.child(location_id)?, at);
        self.add_sequence_annotation(SequenceAnnotation::new(identified, cut))
    }

    /// Creates an annotation located by a single GenericLocation.
    pub fn create_generic_annotation(
        &mut self,
        display_id: &str,
        location_id: &str,
    ) -> Result<&mut SequenceAnnotation, ValidationError> {
        let identified = self.identified.child(display_id)?;
        let generic = GenericLocation::new(identified.child(location_id)?);
        self.add_sequence_annotation(SequenceAnnotation::new(identified, generic))
    }

    /// Points an annotation at a sibling Component, or clears the link.
    pub fn set_annotation_component(
        &mut self,
        annotation: &str,
        component: Option<&str>,
    ) -> Result<(), ValidationError> {
        if let Some(c) = component {
            if !self.has_component(c) {
                return Err(ValidationError::rule(Rule::AnnotationComponent, [annotation, c]));
            }
        }
        let Some(sa) = self.get_sequence_annotation_mut(annotation) else {
            return Err(ValidationError::message("sequence annotation not found", [annotation]));
        };
        sa.component = component.map(str::to_string);
        Ok(())
    }

    pub fn remove_sequence_annotation(&mut self, identity: &str) -> Option<SequenceAnnotation> {
        let index = position(&self.sequence_annotations, identity)?;
        Some(self.sequence_annotations.remove(index))
    }

    pub fn clear_sequence_annotations(&mut self) {
        self.sequence_annotations.clear();
    }

    // -------------------------------------------------------------------------
    // Sequence constraints
    // -------------------------------------------------------------------------

    pub fn get_sequence_constraint(&self, identity: &str) -> Option<&SequenceConstraint> {
        find(&self.sequence_constraints, identity)
    }

    pub fn get_sequence_constraint_mut(&mut self, identity: &str) -> Option<&mut SequenceConstraint> {
        find_mut(&mut self.sequence_constraints, identity)
    }

    pub fn add_sequence_constraint(
        &mut self,
        constraint: SequenceConstraint,
    ) -> Result<&mut SequenceConstraint, ValidationError> {
        if !self.has_component(&constraint.subject) {
            return Err(ValidationError::rule(
                Rule::ConstraintSubjectSibling,
                [constraint.identity(), constraint.subject.as_str()],
            ));
        }
        if !self.has_component(&constraint.object) {
            return Err(ValidationError::rule(
                Rule::ConstraintObjectSibling,
                [constraint.identity(), constraint.object.as_str()],
            ));
        }
        let taken = self.child_taken(constraint.identity());
        push_unique(&mut self.sequence_constraints, constraint, taken)
    }

    pub fn create_sequence_constraint(
        &mut self,
        display_id: &str,
        restriction: RestrictionType,
        subject: &str,
        object: &str,
    ) -> Result<&mut SequenceConstraint, ValidationError> {
        let constraint =
            SequenceConstraint::new(self.identified.child(display_id)?, restriction, subject, object);
        self.add_sequence_constraint(constraint)
    }

    pub fn remove_sequence_constraint(&mut self, identity: &str) -> Option<SequenceConstraint> {
        let index = position(&self.sequence_constraints, identity)?;
        Some(self.sequence_constraints.remove(index))
    }

    pub fn clear_sequence_constraints(&mut self) {
        self.sequence_constraints.clear();
    }

    // -------------------------------------------------------------------------
    // Integrity
    // -------------------------------------------------------------------------

    /// Checks this definition and everything it owns, without looking outside
    /// of it.
    pub fn check(&self, compliant: bool) -> Result<(), ValidationError> {
        let me = &self.identified;
        me.check(compliant, None)?;
        if self.types.is_empty() {
            return Err(ValidationError::rule(Rule::ComponentDefinitionType, [self.identity()]));
        }

        let children = self
            .components
            .iter()
            .map(|c| c.identity())
            .chain(self.sequence_annotations.iter().map(|s| s.identity()))
            .chain(self.sequence_constraints.iter().map(|s| s.identity()));
        if let Some(dup) = first_duplicate(children) {
            return Err(ValidationError::rule(Rule::IdentityUnique, [dup]));
        }

        for c in &self.components {
            c.identified.check(compliant, Some(me))?;
            c.check_maps_tos(compliant)?;
            for m in &c.maps_tos {
                if !self.has_component(&m.local) {
                    return Err(ValidationError::rule(Rule::MapsToLocal, [m.identity(), m.local.as_str()]));
                }
            }
        }

        for sa in &self.sequence_annotations {
            sa.identified.check(compliant, Some(me))?;
            if sa.locations.is_empty() {
                return Err(ValidationError::rule(Rule::AnnotationLocation, [sa.identity()]));
            }
            for location in &sa.locations {
                location.check(compliant, &sa.identified)?;
            }
            if let Some(dup) = first_duplicate(sa.locations.iter().map(|l| l.identity())) {
                return Err(ValidationError::rule(Rule::IdentityUnique, [dup]));
            }
            if let Some(component) = &sa.component {
                if !self.has_component(component) {
                    return Err(ValidationError::rule(
                        Rule::AnnotationComponent,
                        [sa.identity(), component.as_str()],
                    ));
                }
            }
        }

        for sc in &self.sequence_constraints {
            sc.identified.check(compliant, Some(me))?;
            if !self.has_component(&sc.subject) {
                return Err(ValidationError::rule(
                    Rule::ConstraintSubjectSibling,
                    [sc.identity(), sc.subject.as_str()],
                ));
            }
            if !self.has_component(&sc.object) {
                return Err(ValidationError::rule(
                    Rule::ConstraintObjectSibling,
                    [sc.identity(), sc.object.as_str()],
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::create_compliant_uri;
    use crate::model::MapsTo;
    use crate::model::RefinementType;
    use crate::vocab::terms;

    fn cd(display_id: &str) -> ComponentDefinition {
        let uri = create_compliant_uri("http://example.org", Some("cd"), display_id, "1").unwrap();
        ComponentDefinition::new(
            Identified::compliant(uri, display_id, "1"),
            [terms::DNA.to_string()],
        )
    }

    #[test]
    fn test_create_children_have_compliant_identities() {
        let mut parent = cd("p");
        let c = parent
            .create_component("c1", AccessType::Public, "http://example.org/cd/a/1")
            .unwrap();
        assert_eq!(c.identity(), "http://example.org/cd/p/c1/1");

        let sa = parent.create_sequence_annotation("sa1", "r", 1, 10).unwrap();
        assert_eq!(sa.locations[0].identity(), "http://example.org/cd/p/sa1/r/1");
        assert!(parent.check(true).is_ok());
    }

    #[test]
    fn test_duplicate_child_identity_fails() {
        let mut parent = cd("p");
        parent
            .create_component("x", AccessType::Public, "http://example.org/cd/a/1")
            .unwrap();
        let err = parent.create_cut_annotation("x", "cut", 5).unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::IdentityUnique));
        assert!(parent.sequence_annotations.is_empty());
    }

    #[test]
    fn test_constraint_requires_sibling_components() {
        let mut parent = cd("p");
        let a = parent
            .create_component("a", AccessType::Public, "http://example.org/cd/a/1")
            .unwrap()
            .identity()
            .to_string();
        let err = parent
            .create_sequence_constraint("sc", RestrictionType::Precedes, &a, "http://example.org/nope")
            .unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::ConstraintObjectSibling));

        let b = parent
            .create_component("b", AccessType::Public, "http://example.org/cd/b/1")
            .unwrap()
            .identity()
            .to_string();
        parent
            .create_sequence_constraint("sc", RestrictionType::Precedes, &a, &b)
            .unwrap();
        assert_eq!(parent.sequence_constraints.len(), 1);
    }

    #[test]
    fn test_remove_referenced_component_fails() {
        let mut parent = cd("p");
        let a = parent
            .create_component("a", AccessType::Public, "http://example.org/cd/a/1")
            .unwrap()
            .identity()
            .to_string();
        let sa = parent
            .create_generic_annotation("sa", "loc")
            .unwrap()
            .identity()
            .to_string();
        parent.set_annotation_component(&sa, Some(&a)).unwrap();

        let err = parent.remove_component(&a).unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::AnnotationComponent));
        assert_eq!(parent.components.len(), 1);
        assert!(parent.clear_components().is_err());

        parent.set_annotation_component(&sa, None).unwrap();
        assert!(parent.remove_component(&a).is_ok());
    }

    #[test]
    fn test_remove_maps_to_local_component_fails() {
        let mut parent = cd("p");
        let a = parent
            .create_component("a", AccessType::Public, "http://example.org/cd/a/1")
            .unwrap()
            .identity()
            .to_string();
        let b = parent
            .create_component("b", AccessType::Public, "http://example.org/cd/b/1")
            .unwrap();
        let m = MapsTo::new(
            b.identified.child("m").unwrap(),
            RefinementType::UseRemote,
            a.clone(),
            "http://example.org/cd/b/x/1",
        );
        b.add_maps_to(m).unwrap();
        let err = parent.remove_component(&a).unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::MapsToLocal));
    }

    #[test]
    fn test_last_location_cannot_be_removed() {
        let mut parent = cd("p");
        let sa = parent.create_sequence_annotation("sa", "r1", 1, 5).unwrap();
        let only = sa.locations[0].identity().to_string();
        let err = sa.remove_location(&only).unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::AnnotationLocation));

        let second = sa.create_cut("c1", 3).unwrap().identity().to_string();
        assert!(sa.remove_location(&only).is_ok());
        assert_eq!(sa.locations[0].identity(), second);
    }

    #[test]
    fn test_check_requires_type() {
        let mut parent = cd("p");
        parent.types.clear();
        assert_eq!(
            parent.check(false).unwrap_err().rule_id(),
            Some(Rule::ComponentDefinitionType)
        );
    }
}
