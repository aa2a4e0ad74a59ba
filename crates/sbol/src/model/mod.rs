//! Object model for SBOL documents.
//!
//! Every entity embeds an [`Identified`] block and implements
//! [`Identifiable`]. Top-level entities are listed in [`TopLevel`]; nested
//! entities are owned by exactly one parent and are reached through it.
//! References between entities are plain URIs resolved through the
//! [`Document`](crate::Document).

pub mod component;
pub mod enums;
pub mod instance;
pub mod location;
pub mod module;
pub mod top_level;

pub use component::{ComponentDefinition, SequenceAnnotation, SequenceConstraint};
pub use enums::{AccessType, DirectionType, OrientationType, RefinementType, RestrictionType};
pub use instance::{
    Component, ComponentInstance, ComponentInstanceRef, FunctionalComponent, MapsTo, MapsToOwner,
};
pub use location::{Cut, GenericLocation, Location, MultiRange, Range};
pub use module::{Interaction, Module, ModuleDefinition, Participation};
pub use top_level::{
    Collection, GenericTopLevel, Model, Sequence, TopLevel, TopLevelKind, TopLevelRef,
};

use crate::compliance::{self, CompliantUri};
use crate::error::ValidationError;
use crate::tree::{NamedProperty, QName, Value};
use crate::validate::Rule;

/// A URI reference.
pub type Uri = String;

/// A property the typed model does not recognize, kept for round trips.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: QName,
    pub value: Value,
}

impl Annotation {
    pub fn new(name: QName, value: Value) -> Self {
        Self { name, value }
    }
}

impl From<NamedProperty> for Annotation {
    fn from(p: NamedProperty) -> Self {
        Self {
            name: p.name,
            value: p.value,
        }
    }
}

impl From<Annotation> for NamedProperty {
    fn from(a: Annotation) -> Self {
        NamedProperty {
            name: a.name,
            value: a.value,
        }
    }
}

/// Fields shared by every entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Identified {
    pub identity: Uri,
    pub persistent_identity: Option<Uri>,
    pub display_id: Option<String>,
    pub version: Option<String>,
    pub was_derived_from: Option<Uri>,
    /// `dcterms:title`
    pub name: Option<String>,
    /// `dcterms:description`
    pub description: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl Identified {
    pub fn new(identity: impl Into<Uri>) -> Self {
        Self {
            identity: identity.into(),
            ..Default::default()
        }
    }

    /// Builds the identity block for a freshly derived compliant URI.
    pub fn compliant(uri: CompliantUri, display_id: &str, version: &str) -> Self {
        Self {
            identity: uri.identity,
            persistent_identity: Some(uri.persistent_identity),
            display_id: Some(display_id.to_string()),
            version: (!version.is_empty()).then(|| version.to_string()),
            ..Default::default()
        }
    }

    /// Base for deriving child URIs: the persistent identity, or the identity
    /// for objects that have none.
    pub fn child_base(&self) -> &str {
        self.persistent_identity.as_deref().unwrap_or(&self.identity)
    }

    /// Version string, empty when unset.
    pub fn version_or_empty(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }

    /// Derives the identity block of a child with the given display id.
    pub fn child(&self, display_id: &str) -> Result<Identified, ValidationError> {
        let uri = compliance::create_child_uri(self.child_base(), display_id, self.version_or_empty())?;
        Ok(Identified::compliant(uri, display_id, self.version_or_empty()))
    }

    /// Checks identity syntax, field grammars and, in compliant mode, the URI
    /// structure relative to the parent.
    pub fn check(&self, compliant: bool, parent: Option<&Identified>) -> Result<(), ValidationError> {
        if !compliance::is_valid_identity(&self.identity) {
            return Err(ValidationError::rule(Rule::IdentityRequired, [self.identity.as_str()]));
        }
        if let Some(display_id) = &self.display_id {
            if !compliance::is_valid_display_id(display_id) {
                return Err(ValidationError::rule(Rule::DisplayIdGrammar, [self.identity.as_str()]));
            }
        }
        if let Some(version) = &self.version {
            if !compliance::is_valid_version(version) {
                return Err(ValidationError::rule(Rule::VersionGrammar, [self.identity.as_str()]));
            }
        }
        if compliant {
            compliance::check_compliance(
                &self.identity,
                self.persistent_identity.as_deref(),
                self.display_id.as_deref(),
                self.version.as_deref(),
                parent.and_then(|p| p.persistent_identity.as_deref()),
            )?;
        }
        Ok(())
    }
}

/// Access to the shared identity fields.
pub trait Identifiable {
    fn identified(&self) -> &Identified;
    fn identified_mut(&mut self) -> &mut Identified;

    fn identity(&self) -> &str {
        &self.identified().identity
    }

    fn persistent_identity(&self) -> Option<&str> {
        self.identified().persistent_identity.as_deref()
    }

    fn display_id(&self) -> Option<&str> {
        self.identified().display_id.as_deref()
    }

    fn version(&self) -> Option<&str> {
        self.identified().version.as_deref()
    }

    fn was_derived_from(&self) -> Option<&str> {
        self.identified().was_derived_from.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.identified().name.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.identified().description.as_deref()
    }

    fn annotations(&self) -> &[Annotation] {
        &self.identified().annotations
    }
}

impl Identifiable for Identified {
    fn identified(&self) -> &Identified {
        self
    }

    fn identified_mut(&mut self) -> &mut Identified {
        self
    }
}

macro_rules! impl_identifiable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::model::Identifiable for $ty {
                fn identified(&self) -> &$crate::model::Identified {
                    &self.identified
                }

                fn identified_mut(&mut self) -> &mut $crate::model::Identified {
                    &mut self.identified
                }
            }
        )+
    };
}
pub(crate) use impl_identifiable;

// =============================================================================
// Child collections
// =============================================================================

pub(crate) fn find<'a, T: Identifiable>(items: &'a [T], identity: &str) -> Option<&'a T> {
    items.iter().find(|i| i.identity() == identity)
}

pub(crate) fn find_mut<'a, T: Identifiable>(items: &'a mut [T], identity: &str) -> Option<&'a mut T> {
    items.iter_mut().find(|i| i.identity() == identity)
}

pub(crate) fn position<T: Identifiable>(items: &[T], identity: &str) -> Option<usize> {
    items.iter().position(|i| i.identity() == identity)
}

/// Pushes a child after checking its identity against `taken`, returning a
/// handle to the stored child.
pub(crate) fn push_unique<'a, T: Identifiable>(
    items: &'a mut Vec<T>,
    item: T,
    taken: bool,
) -> Result<&'a mut T, ValidationError> {
    if taken {
        return Err(ValidationError::rule(Rule::IdentityUnique, [item.identity()]));
    }
    items.push(item);
    let last = items.len() - 1;
    Ok(&mut items[last])
}

/// Returns the first identity that occurs more than once.
pub(crate) fn first_duplicate<'a>(ids: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = rustc_hash::FxHashSet::default();
    ids.into_iter().find(|id| !seen.insert(*id))
}
