//! The aggregate root owning every top-level entity.
//!
//! Top-level entities live in one ordered store per kind, keyed by identity.
//! A side index maps every identity to its kind so that identities stay
//! unique across kinds and [`Document::get`] needs a single lookup. Nested
//! entities are reached through their top-level owner.

mod copy;
mod maps_to;

use std::collections::BTreeMap;

use oxiri::Iri;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::compliance;
use crate::error::ValidationError;
use crate::model::{
    Collection, ComponentDefinition, GenericTopLevel, Identifiable, Identified, Model,
    ModuleDefinition, Sequence, TopLevel, TopLevelKind, TopLevelRef, Uri,
};
use crate::tree::{NamespaceBinding, QName};
use crate::validate::{self, Rule};
use crate::vocab::{self, terms};

/// Document-wide behavior switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Prefix used by the `create_*` operations.
    pub default_uri_prefix: Option<String>,
    /// Derive compliant URIs and enforce the compliance invariants.
    ///
    /// When off, only identity uniqueness is enforced.
    pub compliant: bool,
    /// Insert the kind's type token (`cd`, `seq`, ...) into minted URIs.
    pub types_in_uris: bool,
    /// Require every reference to dereference within the document.
    pub complete: bool,
    /// Create missing definitions when building component instances and
    /// modules.
    pub create_defaults: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            default_uri_prefix: None,
            compliant: true,
            types_in_uris: false,
            complete: false,
            create_defaults: false,
        }
    }
}

impl DocumentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_uri_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_uri_prefix = Some(prefix.into());
        self
    }

    pub fn with_compliant(mut self, compliant: bool) -> Self {
        self.compliant = compliant;
        self
    }

    pub fn with_types_in_uris(mut self, types_in_uris: bool) -> Self {
        self.types_in_uris = types_in_uris;
        self
    }

    pub fn with_complete(mut self, complete: bool) -> Self {
        self.complete = complete;
        self
    }

    pub fn with_create_defaults(mut self, create_defaults: bool) -> Self {
        self.create_defaults = create_defaults;
        self
    }
}

/// An SBOL document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    config: DocumentConfig,
    namespaces: Vec<NamespaceBinding>,
    collections: BTreeMap<Uri, Collection>,
    module_definitions: BTreeMap<Uri, ModuleDefinition>,
    models: BTreeMap<Uri, Model>,
    component_definitions: BTreeMap<Uri, ComponentDefinition>,
    sequences: BTreeMap<Uri, Sequence>,
    generic_top_levels: BTreeMap<Uri, GenericTopLevel>,
    kinds: FxHashMap<Uri, TopLevelKind>,
    read_only: bool,
}

macro_rules! kind_accessors {
    ($(
        $kind:ident, $ty:ty, $field:ident,
        $get:ident, $get_mut:ident, $add:ident, $remove:ident, $clear:ident;
    )+) => {
        $(
            pub fn $field(&self) -> impl Iterator<Item = &$ty> {
                self.$field.values()
            }

            pub fn $get(&self, uri: &str) -> Option<&$ty> {
                self.$field.get(uri)
            }

            /// Mutable access for in-place edits.
            ///
            /// The document indexes entities by identity, so the identity
            /// must not be changed through this handle: the entity would stay
            /// filed under its old URI. To rename, remove the entity and add
            /// it back, or use `create_copy`.
            pub fn $get_mut(&mut self, uri: &str) -> Result<&mut $ty, ValidationError> {
                self.ensure_writable()?;
                self.$field
                    .get_mut(uri)
                    .ok_or_else(|| ValidationError::message(concat!(stringify!($ty), " not found"), [uri]))
            }

            /// Adds a pre-built entity after checking it and its identity.
            pub fn $add(&mut self, item: $ty) -> Result<&mut $ty, ValidationError> {
                let uri = item.identity().to_string();
                self.add(TopLevel::$kind(item))?;
                self.$field
                    .get_mut(&uri)
                    .ok_or_else(|| ValidationError::message("entity vanished after insert", [uri]))
            }

            /// Removes an entity. In complete mode the removal fails while
            /// another entity still refers to it.
            pub fn $remove(&mut self, uri: &str) -> Result<$ty, ValidationError> {
                self.ensure_writable()?;
                if !self.$field.contains_key(uri) {
                    return Err(ValidationError::message(concat!(stringify!($ty), " not found"), [uri]));
                }
                if self.config.complete {
                    if let Some(err) = self.referrer_error(uri, |_| true) {
                        return Err(err);
                    }
                }
                self.kinds.remove(uri);
                self.$field
                    .remove(uri)
                    .ok_or_else(|| ValidationError::message(concat!(stringify!($ty), " not found"), [uri]))
            }

            /// Removes every entity of this kind. In complete mode the call
            /// fails without change while an entity of another kind refers
            /// to one of them.
            pub fn $clear(&mut self) -> Result<(), ValidationError> {
                self.ensure_writable()?;
                if self.config.complete {
                    for uri in self.$field.keys() {
                        let outside = |kind: TopLevelKind| kind != TopLevelKind::$kind;
                        if let Some(err) = self.referrer_error(uri, outside) {
                            return Err(err);
                        }
                    }
                }
                for uri in self.$field.keys() {
                    self.kinds.remove(uri);
                }
                self.$field.clear();
                Ok(())
            }
        )+
    };
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Sets the prefix used for minting; the prefix must be an absolute IRI.
    pub fn set_default_uri_prefix(&mut self, prefix: &str) -> Result<(), ValidationError> {
        compliance::validate_prefix(prefix)?;
        self.config.default_uri_prefix = Some(prefix.to_string());
        Ok(())
    }

    pub fn set_compliant(&mut self, compliant: bool) {
        self.config.compliant = compliant;
    }

    pub fn set_types_in_uris(&mut self, types_in_uris: bool) {
        self.config.types_in_uris = types_in_uris;
    }

    pub fn set_complete(&mut self, complete: bool) {
        self.config.complete = complete;
    }

    pub fn set_create_defaults(&mut self, create_defaults: bool) {
        self.config.create_defaults = create_defaults;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// A read-only document rejects every mutation with
    /// [`ValidationError::ReadOnly`].
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub(crate) fn ensure_writable(&self) -> Result<(), ValidationError> {
        if self.read_only {
            Err(ValidationError::ReadOnly)
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Whole-document access
    // =========================================================================

    /// Number of top-level entities.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.kinds.contains_key(uri)
    }

    /// Looks up a top-level entity of any kind.
    pub fn get(&self, uri: &str) -> Option<TopLevelRef<'_>> {
        let kind = self.kinds.get(uri)?;
        match kind {
            TopLevelKind::Collection => self.collections.get(uri).map(TopLevelRef::Collection),
            TopLevelKind::ModuleDefinition => {
                self.module_definitions.get(uri).map(TopLevelRef::ModuleDefinition)
            }
            TopLevelKind::Model => self.models.get(uri).map(TopLevelRef::Model),
            TopLevelKind::ComponentDefinition => self
                .component_definitions
                .get(uri)
                .map(TopLevelRef::ComponentDefinition),
            TopLevelKind::Sequence => self.sequences.get(uri).map(TopLevelRef::Sequence),
            TopLevelKind::GenericTopLevel => {
                self.generic_top_levels.get(uri).map(TopLevelRef::GenericTopLevel)
            }
        }
    }

    /// Every top-level entity, grouped by kind in serialization order and by
    /// identity within a kind.
    pub fn top_levels(&self) -> impl Iterator<Item = TopLevelRef<'_>> {
        self.collections
            .values()
            .map(TopLevelRef::Collection)
            .chain(self.module_definitions.values().map(TopLevelRef::ModuleDefinition))
            .chain(self.models.values().map(TopLevelRef::Model))
            .chain(self.component_definitions.values().map(TopLevelRef::ComponentDefinition))
            .chain(self.sequences.values().map(TopLevelRef::Sequence))
            .chain(self.generic_top_levels.values().map(TopLevelRef::GenericTopLevel))
    }

    /// Removes every top-level entity and namespace binding.
    pub fn clear(&mut self) -> Result<(), ValidationError> {
        self.ensure_writable()?;
        self.collections.clear();
        self.module_definitions.clear();
        self.models.clear();
        self.component_definitions.clear();
        self.sequences.clear();
        self.generic_top_levels.clear();
        self.kinds.clear();
        self.namespaces.clear();
        Ok(())
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    fn check_new(&self, top: &TopLevel) -> Result<(), ValidationError> {
        if self.kinds.contains_key(top.identity()) {
            return Err(ValidationError::rule(Rule::IdentityUnique, [top.identity()]));
        }
        top.check(self.config.compliant)
    }

    fn insert(&mut self, top: TopLevel) {
        let uri = top.identity().to_string();
        self.kinds.insert(uri.clone(), top.kind());
        match top {
            TopLevel::Collection(x) => {
                self.collections.insert(uri, x);
            }
            TopLevel::ModuleDefinition(x) => {
                self.module_definitions.insert(uri, x);
            }
            TopLevel::Model(x) => {
                self.models.insert(uri, x);
            }
            TopLevel::ComponentDefinition(x) => {
                self.component_definitions.insert(uri, x);
            }
            TopLevel::Sequence(x) => {
                self.sequences.insert(uri, x);
            }
            TopLevel::GenericTopLevel(x) => {
                self.generic_top_levels.insert(uri, x);
            }
        }
    }

    /// Removes an entity without any referential check.
    fn take(&mut self, uri: &str) -> Option<TopLevel> {
        let kind = self.kinds.remove(uri)?;
        match kind {
            TopLevelKind::Collection => self.collections.remove(uri).map(TopLevel::from),
            TopLevelKind::ModuleDefinition => self.module_definitions.remove(uri).map(TopLevel::from),
            TopLevelKind::Model => self.models.remove(uri).map(TopLevel::from),
            TopLevelKind::ComponentDefinition => {
                self.component_definitions.remove(uri).map(TopLevel::from)
            }
            TopLevelKind::Sequence => self.sequences.remove(uri).map(TopLevel::from),
            TopLevelKind::GenericTopLevel => self.generic_top_levels.remove(uri).map(TopLevel::from),
        }
    }

    /// First reference from `top` that does not dereference.
    fn dangling_reference(&self, top: TopLevelRef<'_>) -> Option<ValidationError> {
        validate::references(top)
            .into_iter()
            .find(|r| !self.contains(r.uri))
            .map(|r| ValidationError::unresolved(r.uri, r.referrer))
    }

    /// Adds a pre-built top-level entity of any kind.
    ///
    /// Fails on a duplicate identity, on a structural violation and, in
    /// complete mode, on a reference that does not dereference. The document
    /// is unchanged on failure.
    pub fn add(&mut self, top: TopLevel) -> Result<(), ValidationError> {
        self.add_all(vec![top])
    }

    /// Adds a batch of top-level entities, all or nothing.
    ///
    /// In complete mode references may point at other members of the batch.
    pub fn add_all(&mut self, batch: Vec<TopLevel>) -> Result<(), ValidationError> {
        self.ensure_writable()?;
        let mut seen = rustc_hash::FxHashSet::default();
        for top in &batch {
            self.check_new(top)?;
            if !seen.insert(top.identity()) {
                return Err(ValidationError::rule(Rule::IdentityUnique, [top.identity()]));
            }
        }
        let uris: Vec<Uri> = batch.iter().map(|t| t.identity().to_string()).collect();
        for top in batch {
            self.insert(top);
        }
        if self.config.complete {
            let dangling = uris
                .iter()
                .filter_map(|uri| self.get(uri))
                .find_map(|top| self.dangling_reference(top));
            if let Some(err) = dangling {
                for uri in &uris {
                    self.take(uri);
                }
                return Err(err);
            }
        }
        debug!(count = uris.len(), "added top-level entities");
        Ok(())
    }

    // =========================================================================
    // Referential integrity
    // =========================================================================

    /// Error for the first entity whose kind passes `filter` and that refers
    /// to `uri`.
    fn referrer_error(&self, uri: &str, filter: impl Fn(TopLevelKind) -> bool) -> Option<ValidationError> {
        self.top_levels()
            .filter(|top| filter(top.kind()) && top.identity() != uri)
            .flat_map(validate::references)
            .find(|r| r.uri == uri)
            .map(|r| ValidationError::rule(r.rule, [r.referrer, uri]))
    }

    // =========================================================================
    // Minting
    // =========================================================================

    /// Builds the identity block of a new top-level entity from the default
    /// prefix.
    pub(crate) fn mint(
        &self,
        kind: TopLevelKind,
        display_id: &str,
        version: &str,
    ) -> Result<Identified, ValidationError> {
        let Some(prefix) = self.config.default_uri_prefix.as_deref() else {
            return Err(ValidationError::message(
                "a default URI prefix is required to create entities",
                [display_id],
            ));
        };
        let token = self.config.types_in_uris.then(|| kind.type_token());
        let uri = compliance::create_compliant_uri(prefix, token, display_id, version)?;
        Ok(Identified::compliant(uri, display_id, version))
    }

    pub fn create_component_definition(
        &mut self,
        display_id: &str,
        version: &str,
        types: impl IntoIterator<Item = Uri>,
    ) -> Result<&mut ComponentDefinition, ValidationError> {
        let identified = self.mint(TopLevelKind::ComponentDefinition, display_id, version)?;
        self.add_component_definition(ComponentDefinition::new(identified, types))
    }

    pub fn create_sequence(
        &mut self,
        display_id: &str,
        version: &str,
        elements: &str,
        encoding: &str,
    ) -> Result<&mut Sequence, ValidationError> {
        let identified = self.mint(TopLevelKind::Sequence, display_id, version)?;
        self.add_sequence(Sequence::new(identified, elements, encoding))
    }

    pub fn create_module_definition(
        &mut self,
        display_id: &str,
        version: &str,
    ) -> Result<&mut ModuleDefinition, ValidationError> {
        let identified = self.mint(TopLevelKind::ModuleDefinition, display_id, version)?;
        self.add_module_definition(ModuleDefinition::new(identified))
    }

    pub fn create_model(
        &mut self,
        display_id: &str,
        version: &str,
        source: &str,
        language: &str,
        framework: &str,
    ) -> Result<&mut Model, ValidationError> {
        let identified = self.mint(TopLevelKind::Model, display_id, version)?;
        self.add_model(Model::new(identified, source, language, framework))
    }

    pub fn create_collection(
        &mut self,
        display_id: &str,
        version: &str,
    ) -> Result<&mut Collection, ValidationError> {
        let identified = self.mint(TopLevelKind::Collection, display_id, version)?;
        self.add_collection(Collection::new(identified))
    }

    pub fn create_generic_top_level(
        &mut self,
        display_id: &str,
        version: &str,
        rdf_type: QName,
    ) -> Result<&mut GenericTopLevel, ValidationError> {
        let identified = self.mint(TopLevelKind::GenericTopLevel, display_id, version)?;
        self.add_generic_top_level(GenericTopLevel::new(identified, rdf_type))
    }

    kind_accessors! {
        Collection, Collection, collections,
            get_collection, get_collection_mut, add_collection, remove_collection, clear_collections;
        ModuleDefinition, ModuleDefinition, module_definitions,
            get_module_definition, get_module_definition_mut, add_module_definition,
            remove_module_definition, clear_module_definitions;
        Model, Model, models,
            get_model, get_model_mut, add_model, remove_model, clear_models;
        ComponentDefinition, ComponentDefinition, component_definitions,
            get_component_definition, get_component_definition_mut, add_component_definition,
            remove_component_definition, clear_component_definitions;
        Sequence, Sequence, sequences,
            get_sequence, get_sequence_mut, add_sequence, remove_sequence, clear_sequences;
        GenericTopLevel, GenericTopLevel, generic_top_levels,
            get_generic_top_level, get_generic_top_level_mut, add_generic_top_level,
            remove_generic_top_level, clear_generic_top_levels;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// ComponentDefinitions that no Component in the document instantiates.
    pub fn root_component_definitions(&self) -> Vec<&ComponentDefinition> {
        let used: rustc_hash::FxHashSet<&str> = self
            .component_definitions
            .values()
            .flat_map(|cd| cd.components.iter())
            .map(|c| c.definition.as_str())
            .collect();
        self.component_definitions
            .values()
            .filter(|cd| !used.contains(cd.identity()))
            .collect()
    }

    /// Top-level entities whose `wasDerivedFrom` is `uri`.
    pub fn get_by_was_derived_from(&self, uri: &str) -> Vec<TopLevelRef<'_>> {
        self.top_levels()
            .filter(|top| top.identified().was_derived_from.as_deref() == Some(uri))
            .collect()
    }

    /// Looks up a reference from `referrer`.
    ///
    /// A missing target is `Ok(None)`, or [`ValidationError::Unresolved`] in
    /// complete mode.
    pub fn resolve(&self, uri: &str, referrer: &str) -> Result<Option<TopLevelRef<'_>>, ValidationError> {
        match self.get(uri) {
            Some(top) => Ok(Some(top)),
            None if self.config.complete => Err(ValidationError::unresolved(uri, referrer)),
            None => Ok(None),
        }
    }

    /// The ComponentDefinition an instance points at.
    pub fn resolve_component_definition(
        &self,
        uri: &str,
        referrer: &str,
    ) -> Result<Option<&ComponentDefinition>, ValidationError> {
        Ok(match self.resolve(uri, referrer)? {
            Some(TopLevelRef::ComponentDefinition(cd)) => Some(cd),
            _ => None,
        })
    }

    /// The ModuleDefinition a Module points at.
    pub fn resolve_module_definition(
        &self,
        uri: &str,
        referrer: &str,
    ) -> Result<Option<&ModuleDefinition>, ValidationError> {
        Ok(match self.resolve(uri, referrer)? {
            Some(TopLevelRef::ModuleDefinition(md)) => Some(md),
            _ => None,
        })
    }

    /// The Sequences of a ComponentDefinition that dereference.
    pub fn resolve_sequences(&self, cd: &ComponentDefinition) -> Result<Vec<&Sequence>, ValidationError> {
        let mut out = Vec::new();
        for uri in &cd.sequences {
            if let Some(TopLevelRef::Sequence(seq)) = self.resolve(uri, cd.identity())? {
                out.push(seq);
            }
        }
        Ok(out)
    }

    /// The Models of a ModuleDefinition that dereference.
    pub fn resolve_models(&self, md: &ModuleDefinition) -> Result<Vec<&Model>, ValidationError> {
        let mut out = Vec::new();
        for uri in &md.models {
            if let Some(TopLevelRef::Model(model)) = self.resolve(uri, md.identity())? {
                out.push(model);
            }
        }
        Ok(out)
    }

    /// The members of a Collection that dereference.
    pub fn resolve_members(&self, collection: &Collection) -> Result<Vec<TopLevelRef<'_>>, ValidationError> {
        let mut out = Vec::new();
        for uri in &collection.members {
            if let Some(top) = self.resolve(uri, collection.identity())? {
                out.push(top);
            }
        }
        Ok(out)
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Creates a Component inside a ComponentDefinition.
    ///
    /// A missing definition is created as a DNA ComponentDefinition when
    /// create-defaults is on, and is an error in complete mode.
    pub fn create_component(
        &mut self,
        parent: &str,
        display_id: &str,
        access: crate::model::AccessType,
        definition: &str,
    ) -> Result<&mut crate::model::Component, ValidationError> {
        self.ensure_writable()?;
        self.ensure_definition(TopLevelKind::ComponentDefinition, definition, parent)?;
        self.get_component_definition_mut(parent)?
            .create_component(display_id, access, definition)
    }

    /// Creates a FunctionalComponent inside a ModuleDefinition, with the same
    /// default handling as [`Document::create_component`].
    pub fn create_functional_component(
        &mut self,
        parent: &str,
        display_id: &str,
        access: crate::model::AccessType,
        direction: crate::model::DirectionType,
        definition: &str,
    ) -> Result<&mut crate::model::FunctionalComponent, ValidationError> {
        self.ensure_writable()?;
        self.ensure_definition(TopLevelKind::ComponentDefinition, definition, parent)?;
        self.get_module_definition_mut(parent)?
            .create_functional_component(display_id, access, direction, definition)
    }

    /// Creates a Module inside a ModuleDefinition. A missing definition is
    /// created as an empty ModuleDefinition when create-defaults is on.
    pub fn create_module(
        &mut self,
        parent: &str,
        display_id: &str,
        definition: &str,
    ) -> Result<&mut crate::model::Module, ValidationError> {
        self.ensure_writable()?;
        self.ensure_definition(TopLevelKind::ModuleDefinition, definition, parent)?;
        self.get_module_definition_mut(parent)?
            .create_module(display_id, definition)
    }

    fn ensure_definition(
        &mut self,
        kind: TopLevelKind,
        definition: &str,
        referrer: &str,
    ) -> Result<(), ValidationError> {
        if self.contains(definition) {
            return Ok(());
        }
        if self.config.create_defaults {
            let identified = Identified::new(definition);
            let top = match kind {
                TopLevelKind::ModuleDefinition => TopLevel::from(ModuleDefinition::new(identified)),
                _ => TopLevel::from(ComponentDefinition::new(identified, [terms::DNA.to_string()])),
            };
            debug!(definition, "creating default definition");
            return self.add(top);
        }
        if self.config.complete {
            return Err(ValidationError::unresolved(definition, referrer));
        }
        Ok(())
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    pub fn namespaces(&self) -> &[NamespaceBinding] {
        &self.namespaces
    }

    pub fn get_namespace(&self, namespace: &str) -> Option<&NamespaceBinding> {
        self.namespaces.iter().find(|b| b.namespace == namespace)
    }

    /// Binds a prefix to a namespace, replacing an earlier binding of the
    /// same namespace.
    pub fn add_namespace(&mut self, namespace: &str, prefix: &str) -> Result<(), ValidationError> {
        self.ensure_writable()?;
        if Iri::parse(namespace).is_err() {
            return Err(ValidationError::message("namespace is not an absolute IRI", [namespace]));
        }
        match self.namespaces.iter_mut().find(|b| b.namespace == namespace) {
            Some(binding) => binding.prefix = prefix.to_string(),
            None => self.namespaces.push(NamespaceBinding::new(namespace, prefix)),
        }
        Ok(())
    }

    pub fn remove_namespace(&mut self, namespace: &str) -> Result<Option<NamespaceBinding>, ValidationError> {
        self.ensure_writable()?;
        let index = self.namespaces.iter().position(|b| b.namespace == namespace);
        Ok(index.map(|i| self.namespaces.remove(i)))
    }

    pub fn clear_namespaces(&mut self) -> Result<(), ValidationError> {
        self.ensure_writable()?;
        self.namespaces.clear();
        Ok(())
    }

    /// Namespaces the writer always binds; user bindings of these are not
    /// kept separately.
    pub(crate) fn is_builtin_namespace(namespace: &str) -> bool {
        matches!(
            namespace,
            vocab::SBOL2_NS | vocab::DCTERMS_NS | vocab::PROV_NS | vocab::RDF_NS
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccessType, DirectionType};

    fn doc() -> Document {
        Document::with_config(
            DocumentConfig::new()
                .with_default_uri_prefix("http://example.org")
                .with_types_in_uris(true),
        )
    }

    #[test]
    fn test_create_sequence_identity() {
        let mut d = doc();
        let seq = d.create_sequence("foo", "", "AGCT", terms::IUPAC_DNA).unwrap();
        assert_eq!(seq.identity(), "http://example.org/seq/foo");
        assert_eq!(seq.persistent_identity(), Some("http://example.org/seq/foo"));
        assert!(matches!(d.get("http://example.org/seq/foo"), Some(TopLevelRef::Sequence(_))));
    }

    #[test]
    fn test_identity_unique_across_kinds() {
        let mut d = Document::new();
        d.add_sequence(Sequence::new(Identified::new("http://example.org/x"), "A", terms::IUPAC_DNA))
            .unwrap();
        let before = d.clone();
        let err = d
            .add_collection(Collection::new(Identified::new("http://example.org/x")))
            .unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::IdentityUnique));
        assert_eq!(d, before);
    }

    #[test]
    fn test_rename_by_remove_and_add() {
        let mut d = Document::new();
        d.add_sequence(Sequence::new(Identified::new("http://example.org/old"), "A", terms::IUPAC_DNA))
            .unwrap();
        d.get_sequence_mut("http://example.org/old").unwrap().elements = "AC".into();

        let mut seq = d.remove_sequence("http://example.org/old").unwrap();
        seq.identified.identity = "http://example.org/new".into();
        d.add_sequence(seq).unwrap();

        assert!(!d.contains("http://example.org/old"));
        assert_eq!(d.get_sequence("http://example.org/new").unwrap().elements, "AC");
        // the old identity is free again
        d.add_collection(Collection::new(Identified::new("http://example.org/old")))
            .unwrap();
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn test_create_requires_prefix() {
        let mut d = Document::new();
        assert!(d.create_collection("c", "").is_err());
    }

    #[test]
    fn test_read_only_rejects_mutation() {
        let mut d = doc();
        d.create_collection("c", "1").unwrap();
        d.set_read_only(true);
        assert_eq!(d.create_collection("d", "1").unwrap_err(), ValidationError::ReadOnly);
        assert_eq!(
            d.remove_collection("http://example.org/col/c/1").unwrap_err(),
            ValidationError::ReadOnly
        );
        assert!(d.get_collection_mut("http://example.org/col/c/1").is_err());
        assert!(d.add_namespace("http://myapp.org/", "myapp").is_err());
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_complete_mode_rejects_dangling_reference() {
        let mut d = doc();
        d.set_complete(true);
        let cd = d.create_component_definition("a", "", [terms::DNA.to_string()]).unwrap();
        cd.sequences.insert("http://example.org/seq/missing".to_string());
        let cd = cd.clone();
        d.remove_component_definition(cd.identity()).unwrap();

        let err = d.add_component_definition(cd.clone()).unwrap_err();
        assert!(matches!(err, ValidationError::Unresolved { .. }));
        assert!(d.is_empty());

        let seq = Sequence::new(
            d.mint(TopLevelKind::Sequence, "missing", "").unwrap(),
            "AC",
            terms::IUPAC_DNA,
        );
        d.add_all(vec![TopLevel::from(cd), TopLevel::from(seq)]).unwrap();
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn test_complete_mode_remove_checks_referrers() {
        let mut d = doc();
        d.set_complete(true);
        d.create_sequence("s", "", "AC", terms::IUPAC_DNA).unwrap();
        let cd = d.create_component_definition("a", "", [terms::DNA.to_string()]).unwrap();
        cd.sequences.insert("http://example.org/seq/s".to_string());

        let err = d.remove_sequence("http://example.org/seq/s").unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::ComponentDefinitionSequence));
        assert!(d.clear_sequences().is_err());
        assert_eq!(d.len(), 2);

        d.set_complete(false);
        assert!(d.remove_sequence("http://example.org/seq/s").is_ok());
    }

    #[test]
    fn test_root_component_definitions() {
        let mut d = doc();
        d.create_component_definition("child", "", [terms::DNA.to_string()]).unwrap();
        d.create_component_definition("parent", "", [terms::DNA.to_string()]).unwrap();
        d.create_component(
            "http://example.org/cd/parent",
            "c",
            AccessType::Public,
            "http://example.org/cd/child",
        )
        .unwrap();
        let roots: Vec<_> = d.root_component_definitions().iter().map(|cd| cd.identity()).collect();
        assert_eq!(roots, ["http://example.org/cd/parent"]);
    }

    #[test]
    fn test_create_defaults() {
        let mut d = doc();
        d.set_create_defaults(true);
        d.create_module_definition("m", "").unwrap();
        d.create_functional_component(
            "http://example.org/md/m",
            "fc",
            AccessType::Public,
            DirectionType::InOut,
            "http://example.org/cd/auto",
        )
        .unwrap();
        d.create_module("http://example.org/md/m", "sub", "http://example.org/md/other")
            .unwrap();
        assert!(d.get_component_definition("http://example.org/cd/auto").is_some());
        assert!(d.get_module_definition("http://example.org/md/other").is_some());
    }

    #[test]
    fn test_was_derived_from_lookup() {
        let mut d = doc();
        let col = d.create_collection("c", "").unwrap();
        col.identified.was_derived_from = Some("urn:orig".to_string());
        let found = d.get_by_was_derived_from("urn:orig");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), TopLevelKind::Collection);
    }

    #[test]
    fn test_namespaces() {
        let mut d = Document::new();
        d.add_namespace("http://myapp.org/", "myapp").unwrap();
        d.add_namespace("http://myapp.org/", "app").unwrap();
        assert_eq!(d.namespaces().len(), 1);
        assert_eq!(d.get_namespace("http://myapp.org/").unwrap().prefix, "app");
        assert!(d.add_namespace("not an iri", "x").is_err());
        assert!(d.remove_namespace("http://myapp.org/").unwrap().is_some());
        assert!(d.namespaces().is_empty());
    }
}
