//! Top-level entities and the closed set of top-level kinds.

use std::collections::BTreeSet;

use crate::error::ValidationError;
use crate::model::{
    ComponentDefinition, Identifiable, Identified, ModuleDefinition, Uri, impl_identifiable,
};
use crate::tree::QName;
use crate::validate::Rule;
use crate::vocab::{self, SBOL2_NS};

/// A primary structure: residues plus the encoding that interprets them.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub identified: Identified,
    pub elements: String,
    pub encoding: Uri,
}

impl Sequence {
    pub fn new(identified: Identified, elements: impl Into<String>, encoding: impl Into<Uri>) -> Self {
        Self {
            identified,
            elements: elements.into(),
            encoding: encoding.into(),
        }
    }
}

/// A reference to an external computational model.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub identified: Identified,
    pub source: Uri,
    pub language: Uri,
    pub framework: Uri,
    pub roles: BTreeSet<Uri>,
}

impl Model {
    pub fn new(
        identified: Identified,
        source: impl Into<Uri>,
        language: impl Into<Uri>,
        framework: impl Into<Uri>,
    ) -> Self {
        Self {
            identified,
            source: source.into(),
            language: language.into(),
            framework: framework.into(),
            roles: BTreeSet::new(),
        }
    }
}

/// A named group of top-level references.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub identified: Identified,
    pub members: BTreeSet<Uri>,
}

impl Collection {
    pub fn new(identified: Identified) -> Self {
        Self {
            identified,
            members: BTreeSet::new(),
        }
    }
}

/// A top-level node of a type outside the SBOL2 vocabulary. Its content lives
/// in the annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericTopLevel {
    pub identified: Identified,
    pub rdf_type: QName,
}

impl GenericTopLevel {
    pub fn new(identified: Identified, rdf_type: QName) -> Self {
        Self { identified, rdf_type }
    }
}

impl_identifiable!(Sequence, Model, Collection, GenericTopLevel);

/// The six top-level kinds, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopLevelKind {
    Collection,
    ModuleDefinition,
    Model,
    ComponentDefinition,
    Sequence,
    GenericTopLevel,
}

impl TopLevelKind {
    pub const ALL: [TopLevelKind; 6] = [
        TopLevelKind::Collection,
        TopLevelKind::ModuleDefinition,
        TopLevelKind::Model,
        TopLevelKind::ComponentDefinition,
        TopLevelKind::Sequence,
        TopLevelKind::GenericTopLevel,
    ];

    /// Path segment inserted into compliant URIs when types-in-URIs is on.
    pub fn type_token(&self) -> &'static str {
        match self {
            TopLevelKind::Collection => "col",
            TopLevelKind::ModuleDefinition => "md",
            TopLevelKind::Model => "mod",
            TopLevelKind::ComponentDefinition => "cd",
            TopLevelKind::Sequence => "seq",
            TopLevelKind::GenericTopLevel => "gen",
        }
    }

    /// SBOL2 class name. GenericTopLevel has no fixed class.
    pub fn rdf_type(&self) -> Option<QName> {
        use vocab::sbol2;
        match self {
            TopLevelKind::Collection => Some(sbol2::COLLECTION),
            TopLevelKind::ModuleDefinition => Some(sbol2::MODULE_DEFINITION),
            TopLevelKind::Model => Some(sbol2::MODEL),
            TopLevelKind::ComponentDefinition => Some(sbol2::COMPONENT_DEFINITION),
            TopLevelKind::Sequence => Some(sbol2::SEQUENCE),
            TopLevelKind::GenericTopLevel => None,
        }
    }

    /// Maps an SBOL2 class name to its kind.
    pub fn from_rdf_type(name: &QName) -> Option<TopLevelKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.rdf_type().as_ref() == Some(name))
    }
}

/// An owned top-level entity of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    Collection(Collection),
    ModuleDefinition(ModuleDefinition),
    Model(Model),
    ComponentDefinition(ComponentDefinition),
    Sequence(Sequence),
    GenericTopLevel(GenericTopLevel),
}

/// A borrowed top-level entity of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TopLevelRef<'a> {
    Collection(&'a Collection),
    ModuleDefinition(&'a ModuleDefinition),
    Model(&'a Model),
    ComponentDefinition(&'a ComponentDefinition),
    Sequence(&'a Sequence),
    GenericTopLevel(&'a GenericTopLevel),
}

impl TopLevel {
    pub fn kind(&self) -> TopLevelKind {
        self.as_top_level_ref().kind()
    }

    pub fn as_top_level_ref(&self) -> TopLevelRef<'_> {
        match self {
            TopLevel::Collection(x) => TopLevelRef::Collection(x),
            TopLevel::ModuleDefinition(x) => TopLevelRef::ModuleDefinition(x),
            TopLevel::Model(x) => TopLevelRef::Model(x),
            TopLevel::ComponentDefinition(x) => TopLevelRef::ComponentDefinition(x),
            TopLevel::Sequence(x) => TopLevelRef::Sequence(x),
            TopLevel::GenericTopLevel(x) => TopLevelRef::GenericTopLevel(x),
        }
    }

    /// Checks the entity and everything it owns in isolation.
    pub fn check(&self, compliant: bool) -> Result<(), ValidationError> {
        self.as_top_level_ref().check(compliant)
    }
}

impl<'a> TopLevelRef<'a> {
    pub fn kind(&self) -> TopLevelKind {
        match self {
            TopLevelRef::Collection(_) => TopLevelKind::Collection,
            TopLevelRef::ModuleDefinition(_) => TopLevelKind::ModuleDefinition,
            TopLevelRef::Model(_) => TopLevelKind::Model,
            TopLevelRef::ComponentDefinition(_) => TopLevelKind::ComponentDefinition,
            TopLevelRef::Sequence(_) => TopLevelKind::Sequence,
            TopLevelRef::GenericTopLevel(_) => TopLevelKind::GenericTopLevel,
        }
    }

    pub fn identified(&self) -> &'a Identified {
        match self {
            TopLevelRef::Collection(x) => &x.identified,
            TopLevelRef::ModuleDefinition(x) => &x.identified,
            TopLevelRef::Model(x) => &x.identified,
            TopLevelRef::ComponentDefinition(x) => &x.identified,
            TopLevelRef::Sequence(x) => &x.identified,
            TopLevelRef::GenericTopLevel(x) => &x.identified,
        }
    }

    pub fn identity(&self) -> &'a str {
        &self.identified().identity
    }

    /// Clones the borrowed entity.
    pub fn to_top_level(&self) -> TopLevel {
        match *self {
            TopLevelRef::Collection(x) => TopLevel::Collection(x.clone()),
            TopLevelRef::ModuleDefinition(x) => TopLevel::ModuleDefinition(x.clone()),
            TopLevelRef::Model(x) => TopLevel::Model(x.clone()),
            TopLevelRef::ComponentDefinition(x) => TopLevel::ComponentDefinition(x.clone()),
            TopLevelRef::Sequence(x) => TopLevel::Sequence(x.clone()),
            TopLevelRef::GenericTopLevel(x) => TopLevel::GenericTopLevel(x.clone()),
        }
    }

    pub fn check(&self, compliant: bool) -> Result<(), ValidationError> {
        match self {
            TopLevelRef::ComponentDefinition(cd) => cd.check(compliant),
            TopLevelRef::ModuleDefinition(md) => md.check(compliant),
            TopLevelRef::GenericTopLevel(g) => {
                g.identified.check(compliant, None)?;
                if g.rdf_type.in_namespace(SBOL2_NS) {
                    return Err(ValidationError::rule(Rule::GenericTopLevelType, [g.identity()]));
                }
                Ok(())
            }
            other => other.identified().check(compliant, None),
        }
    }
}

impl Identifiable for TopLevel {
    fn identified(&self) -> &Identified {
        self.as_top_level_ref().identified()
    }

    fn identified_mut(&mut self) -> &mut Identified {
        match self {
            TopLevel::Collection(x) => &mut x.identified,
            TopLevel::ModuleDefinition(x) => &mut x.identified,
            TopLevel::Model(x) => &mut x.identified,
            TopLevel::ComponentDefinition(x) => &mut x.identified,
            TopLevel::Sequence(x) => &mut x.identified,
            TopLevel::GenericTopLevel(x) => &mut x.identified,
        }
    }
}

macro_rules! impl_from_top_level {
    ($($variant:ident),+) => {
        $(
            impl From<$variant> for TopLevel {
                fn from(x: $variant) -> Self {
                    TopLevel::$variant(x)
                }
            }
        )+
    };
}

impl_from_top_level!(
    Collection,
    ModuleDefinition,
    Model,
    ComponentDefinition,
    Sequence,
    GenericTopLevel
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tokens_and_types() {
        let tokens: Vec<_> = TopLevelKind::ALL.iter().map(|k| k.type_token()).collect();
        assert_eq!(tokens, ["col", "md", "mod", "cd", "seq", "gen"]);
        assert_eq!(
            TopLevelKind::from_rdf_type(&vocab::sbol2::SEQUENCE),
            Some(TopLevelKind::Sequence)
        );
        assert_eq!(TopLevelKind::from_rdf_type(&vocab::sbol2::COMPONENT), None);
    }

    #[test]
    fn test_generic_top_level_rejects_sbol2_type() {
        let g = GenericTopLevel::new(
            Identified::new("http://example.org/gen/x"),
            QName::new(SBOL2_NS, "Thing", "sbol"),
        );
        let err = TopLevel::from(g).check(false).unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::GenericTopLevelType));

        let g = GenericTopLevel::new(
            Identified::new("http://example.org/gen/x"),
            QName::new("http://myapp.org/", "Thing", "myapp"),
        );
        assert!(TopLevel::from(g).check(false).is_ok());
    }
}
