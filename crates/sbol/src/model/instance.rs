//! Component instances and their MapsTo links.

use crate::error::ValidationError;
use crate::model::{
    AccessType, DirectionType, Identifiable, Identified, RefinementType, Uri, find, find_mut,
    impl_identifiable, position,
};
use crate::validate::Rule;

/// Links a local instance to a remote instance of the linked definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MapsTo {
    pub identified: Identified,
    pub refinement: RefinementType,
    pub local: Uri,
    pub remote: Uri,
}

impl MapsTo {
    pub fn new(
        identified: Identified,
        refinement: RefinementType,
        local: impl Into<Uri>,
        remote: impl Into<Uri>,
    ) -> Self {
        Self {
            identified,
            refinement,
            local: local.into(),
            remote: remote.into(),
        }
    }
}

/// Anything that owns MapsTo children through a definition link: Component,
/// FunctionalComponent and Module.
pub trait MapsToOwner: Identifiable {
    /// URI of the linked definition.
    fn definition(&self) -> &str;
    fn maps_tos(&self) -> &[MapsTo];
    fn maps_tos_mut(&mut self) -> &mut Vec<MapsTo>;

    fn get_maps_to(&self, identity: &str) -> Option<&MapsTo> {
        find(self.maps_tos(), identity)
    }

    fn get_maps_to_mut(&mut self, identity: &str) -> Option<&mut MapsTo> {
        find_mut(self.maps_tos_mut(), identity)
    }

    /// Adds a MapsTo without checking its local or remote link.
    ///
    /// Only identity uniqueness is enforced here. Use
    /// [`Document::create_maps_to`](crate::document::Document::create_maps_to)
    /// for a checked insert; links added through this method are reported by
    /// [`validate_document`](crate::validate::validate_document).
    fn add_maps_to(&mut self, maps_to: MapsTo) -> Result<&mut MapsTo, ValidationError> {
        let taken = self.get_maps_to(maps_to.identity()).is_some();
        super::push_unique(self.maps_tos_mut(), maps_to, taken)
    }

    fn remove_maps_to(&mut self, identity: &str) -> Option<MapsTo> {
        let index = position(self.maps_tos(), identity)?;
        Some(self.maps_tos_mut().remove(index))
    }

    fn clear_maps_tos(&mut self) {
        self.maps_tos_mut().clear();
    }

    /// Checks identities of the MapsTo children.
    fn check_maps_tos(&self, compliant: bool) -> Result<(), ValidationError> {
        for m in self.maps_tos() {
            m.identified.check(compliant, Some(self.identified()))?;
        }
        if let Some(dup) = super::first_duplicate(self.maps_tos().iter().map(|m| m.identity())) {
            return Err(ValidationError::rule(Rule::IdentityUnique, [dup]));
        }
        Ok(())
    }
}

/// Capability shared by [`Component`] and [`FunctionalComponent`].
pub trait ComponentInstance: MapsToOwner {
    fn access(&self) -> AccessType;
}

/// A structural use of a ComponentDefinition inside another.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub identified: Identified,
    pub access: AccessType,
    pub definition: Uri,
    pub maps_tos: Vec<MapsTo>,
}

impl Component {
    pub fn new(identified: Identified, access: AccessType, definition: impl Into<Uri>) -> Self {
        Self {
            identified,
            access,
            definition: definition.into(),
            maps_tos: Vec::new(),
        }
    }
}

/// A functional use of a ComponentDefinition inside a ModuleDefinition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionalComponent {
    pub identified: Identified,
    pub access: AccessType,
    pub direction: DirectionType,
    pub definition: Uri,
    pub maps_tos: Vec<MapsTo>,
}

impl FunctionalComponent {
    pub fn new(
        identified: Identified,
        access: AccessType,
        direction: DirectionType,
        definition: impl Into<Uri>,
    ) -> Self {
        Self {
            identified,
            access,
            direction,
            definition: definition.into(),
            maps_tos: Vec::new(),
        }
    }
}

impl_identifiable!(MapsTo, Component, FunctionalComponent);

macro_rules! impl_instance {
    ($($ty:ty),+) => {
        $(
            impl MapsToOwner for $ty {
                fn definition(&self) -> &str {
                    &self.definition
                }

                fn maps_tos(&self) -> &[MapsTo] {
                    &self.maps_tos
                }

                fn maps_tos_mut(&mut self) -> &mut Vec<MapsTo> {
                    &mut self.maps_tos
                }
            }

            impl ComponentInstance for $ty {
                fn access(&self) -> AccessType {
                    self.access
                }
            }
        )+
    };
}

impl_instance!(Component, FunctionalComponent);

/// A borrowed component instance of either kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentInstanceRef<'a> {
    Component(&'a Component),
    FunctionalComponent(&'a FunctionalComponent),
}

impl<'a> ComponentInstanceRef<'a> {
    pub fn identity(&self) -> &'a str {
        match self {
            ComponentInstanceRef::Component(c) => &c.identified.identity,
            ComponentInstanceRef::FunctionalComponent(f) => &f.identified.identity,
        }
    }

    pub fn access(&self) -> AccessType {
        match self {
            ComponentInstanceRef::Component(c) => c.access,
            ComponentInstanceRef::FunctionalComponent(f) => f.access,
        }
    }

    pub fn definition(&self) -> &'a str {
        match self {
            ComponentInstanceRef::Component(c) => &c.definition,
            ComponentInstanceRef::FunctionalComponent(f) => &f.definition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component() -> Component {
        Component::new(
            Identified::new("http://example.org/cd/p/c"),
            AccessType::Public,
            "http://example.org/cd/q",
        )
    }

    #[test]
    fn test_maps_to_add_remove() {
        let mut c = component();
        let m = MapsTo::new(
            Identified::new("http://example.org/cd/p/c/m"),
            RefinementType::UseRemote,
            "http://example.org/cd/p/local",
            "http://example.org/cd/q/remote",
        );
        c.add_maps_to(m.clone()).unwrap();
        let err = c.add_maps_to(m).unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::IdentityUnique));

        assert!(c.get_maps_to("http://example.org/cd/p/c/m").is_some());
        assert!(c.remove_maps_to("http://example.org/cd/p/c/m").is_some());
        assert!(c.maps_tos().is_empty());
    }

    #[test]
    fn test_instance_ref() {
        let c = component();
        let r = ComponentInstanceRef::Component(&c);
        assert_eq!(r.access(), AccessType::Public);
        assert_eq!(r.definition(), "http://example.org/cd/q");
        assert_eq!(r.identity(), "http://example.org/cd/p/c");
    }
}
