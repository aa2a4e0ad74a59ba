//! MapsTo creation and remote resolution.
//!
//! A MapsTo lives on a Component (inside a ComponentDefinition) or on a
//! FunctionalComponent or Module (inside a ModuleDefinition). Its `local`
//! names an instance of the same parent, and its `remote` names a public
//! instance of the definition the owner links to.

use crate::error::ValidationError;
use crate::model::{
    AccessType, ComponentInstanceRef, Identified, MapsTo, MapsToOwner,
    RefinementType, TopLevelRef,
};
use crate::validate::Rule;

use super::Document;

/// Where a MapsTo owner sits and what its definition link is.
struct OwnerInfo {
    identified: Identified,
    definition: String,
    /// Remote instances are FunctionalComponents of a ModuleDefinition.
    module: bool,
}

impl Document {
    fn owner_info(&self, parent: &str, owner: &str) -> Result<OwnerInfo, ValidationError> {
        let not_found = || ValidationError::message("MapsTo owner not found", [parent, owner]);
        match self.get(parent) {
            Some(TopLevelRef::ComponentDefinition(cd)) => {
                let c = cd.get_component(owner).ok_or_else(not_found)?;
                Ok(OwnerInfo {
                    identified: c.identified.clone(),
                    definition: c.definition.clone(),
                    module: false,
                })
            }
            Some(TopLevelRef::ModuleDefinition(md)) => {
                if let Some(fc) = md.get_functional_component(owner) {
                    return Ok(OwnerInfo {
                        identified: fc.identified.clone(),
                        definition: fc.definition.clone(),
                        module: false,
                    });
                }
                let m = md.get_module(owner).ok_or_else(not_found)?;
                Ok(OwnerInfo {
                    identified: m.identified.clone(),
                    definition: m.definition.clone(),
                    module: true,
                })
            }
            _ => Err(not_found()),
        }
    }

    /// Returns true if `local` is an instance owned by `parent` that a MapsTo
    /// may use as its local side.
    fn is_local_instance(&self, parent: &str, local: &str) -> bool {
        match self.get(parent) {
            Some(TopLevelRef::ComponentDefinition(cd)) => cd.get_component(local).is_some(),
            Some(TopLevelRef::ModuleDefinition(md)) => md.get_functional_component(local).is_some(),
            _ => false,
        }
    }

    /// Finds the instance named by `remote` inside the owner's definition.
    ///
    /// `Ok(None)` means the definition itself is absent and the document is
    /// not complete.
    fn remote_instance(
        &self,
        info: &OwnerInfo,
        remote: &str,
    ) -> Result<Option<ComponentInstanceRef<'_>>, ValidationError> {
        let referrer = info.identified.identity.as_str();
        let instance = if info.module {
            let Some(md) = self.resolve_module_definition(&info.definition, referrer)? else {
                return Ok(None);
            };
            md.get_functional_component(remote)
                .map(ComponentInstanceRef::FunctionalComponent)
        } else {
            let Some(cd) = self.resolve_component_definition(&info.definition, referrer)? else {
                return Ok(None);
            };
            cd.get_component(remote).map(ComponentInstanceRef::Component)
        };
        match instance {
            Some(i) => Ok(Some(i)),
            None => Err(ValidationError::rule(Rule::MapsToRemote, [referrer, remote])),
        }
    }

    fn check_remote(&self, info: &OwnerInfo, remote: &str) -> Result<(), ValidationError> {
        if let Some(instance) = self.remote_instance(info, remote)? {
            if instance.access() == AccessType::Private {
                return Err(ValidationError::rule(
                    Rule::MapsToRemotePrivate,
                    [info.identified.identity.as_str(), remote],
                ));
            }
        }
        Ok(())
    }

    fn owner_mut(&mut self, parent: &str, owner: &str) -> Result<&mut dyn MapsToOwner, ValidationError> {
        let not_found = || ValidationError::message("MapsTo owner not found", [parent, owner]);
        if self.get_component_definition(parent).is_some() {
            let cd = self.get_component_definition_mut(parent)?;
            return cd
                .get_component_mut(owner)
                .map(|c| c as &mut dyn MapsToOwner)
                .ok_or_else(not_found);
        }
        let md = self.get_module_definition_mut(parent)?;
        if md.get_functional_component(owner).is_some() {
            return md
                .get_functional_component_mut(owner)
                .map(|f| f as &mut dyn MapsToOwner)
                .ok_or_else(not_found);
        }
        md.get_module_mut(owner)
            .map(|m| m as &mut dyn MapsToOwner)
            .ok_or_else(not_found)
    }

    /// Creates a MapsTo on the instance or module `owner` of top-level
    /// `parent`.
    ///
    /// `local` must be an instance of `parent`. `remote` must be a public
    /// instance of the owner's definition; when that definition is not in
    /// the document the remote side is only checked in complete mode.
    pub fn create_maps_to(
        &mut self,
        parent: &str,
        owner: &str,
        display_id: &str,
        refinement: RefinementType,
        local: &str,
        remote: &str,
    ) -> Result<&mut MapsTo, ValidationError> {
        self.ensure_writable()?;
        let info = self.owner_info(parent, owner)?;
        if !self.is_local_instance(parent, local) {
            return Err(ValidationError::rule(Rule::MapsToLocal, [owner, local]));
        }
        self.check_remote(&info, remote)?;
        let maps_to = MapsTo::new(info.identified.child(display_id)?, refinement, local, remote);
        self.owner_mut(parent, owner)?.add_maps_to(maps_to)
    }

    /// Points an existing MapsTo at a different remote instance.
    pub fn set_maps_to_remote(
        &mut self,
        parent: &str,
        owner: &str,
        maps_to: &str,
        remote: &str,
    ) -> Result<(), ValidationError> {
        self.ensure_writable()?;
        let info = self.owner_info(parent, owner)?;
        self.check_remote(&info, remote)?;
        let target = self
            .owner_mut(parent, owner)?
            .get_maps_to_mut(maps_to)
            .ok_or_else(|| ValidationError::message("MapsTo not found", [maps_to]))?;
        target.remote = remote.to_string();
        Ok(())
    }

    /// Resolves the remote instance of a MapsTo through its owner's
    /// definition.
    pub fn maps_to_remote(
        &self,
        parent: &str,
        owner: &str,
        maps_to: &str,
    ) -> Result<Option<ComponentInstanceRef<'_>>, ValidationError> {
        let info = self.owner_info(parent, owner)?;
        let remote = self
            .get(parent)
            .and_then(|top| match top {
                TopLevelRef::ComponentDefinition(cd) => cd
                    .get_component(owner)
                    .and_then(|c| c.get_maps_to(maps_to)),
                TopLevelRef::ModuleDefinition(md) => md
                    .get_functional_component(owner)
                    .and_then(|f| f.get_maps_to(maps_to))
                    .or_else(|| md.get_module(owner).and_then(|m| m.get_maps_to(maps_to))),
                _ => None,
            })
            .map(|m| m.remote.clone())
            .ok_or_else(|| ValidationError::message("MapsTo not found", [maps_to]))?;
        self.remote_instance(&info, &remote)
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{Document, DocumentConfig};
    use crate::model::{AccessType, DirectionType, Identifiable, RefinementType};
    use crate::validate::Rule;
    use crate::vocab::terms;

    /// An outer module definition that instantiates `inner`, which owns one
    /// public and one private FunctionalComponent.
    fn fixture() -> Document {
        let mut d = Document::with_config(
            DocumentConfig::new()
                .with_default_uri_prefix("http://example.org")
                .with_types_in_uris(true),
        );
        d.create_component_definition("tetR", "", [terms::PROTEIN.to_string()])
            .unwrap();
        d.create_module_definition("inner", "").unwrap();
        d.create_module_definition("outer", "").unwrap();
        for (id, access) in [("pub_fc", AccessType::Public), ("priv_fc", AccessType::Private)] {
            d.create_functional_component(
                "http://example.org/md/inner",
                id,
                access,
                DirectionType::InOut,
                "http://example.org/cd/tetR",
            )
            .unwrap();
        }
        d.create_functional_component(
            "http://example.org/md/outer",
            "local_fc",
            AccessType::Public,
            DirectionType::None,
            "http://example.org/cd/tetR",
        )
        .unwrap();
        d.create_module("http://example.org/md/outer", "sub", "http://example.org/md/inner")
            .unwrap();
        d
    }

    #[test]
    fn test_maps_to_private_remote_fails() {
        let mut d = fixture();
        let err = d
            .create_maps_to(
                "http://example.org/md/outer",
                "http://example.org/md/outer/sub",
                "map",
                RefinementType::UseRemote,
                "http://example.org/md/outer/local_fc",
                "http://example.org/md/inner/priv_fc",
            )
            .unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::MapsToRemotePrivate));
    }

    #[test]
    fn test_maps_to_public_remote_resolves() {
        let mut d = fixture();
        let m = d
            .create_maps_to(
                "http://example.org/md/outer",
                "http://example.org/md/outer/sub",
                "map",
                RefinementType::UseRemote,
                "http://example.org/md/outer/local_fc",
                "http://example.org/md/inner/pub_fc",
            )
            .unwrap();
        assert_eq!(m.identity(), "http://example.org/md/outer/sub/map");

        let remote = d
            .maps_to_remote(
                "http://example.org/md/outer",
                "http://example.org/md/outer/sub",
                "http://example.org/md/outer/sub/map",
            )
            .unwrap()
            .unwrap();
        assert_eq!(remote.identity(), "http://example.org/md/inner/pub_fc");
        assert_eq!(remote.access(), AccessType::Public);
    }

    #[test]
    fn test_maps_to_unknown_remote_and_local() {
        let mut d = fixture();
        let err = d
            .create_maps_to(
                "http://example.org/md/outer",
                "http://example.org/md/outer/sub",
                "map",
                RefinementType::Merge,
                "http://example.org/md/outer/local_fc",
                "http://example.org/md/inner/nothing",
            )
            .unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::MapsToRemote));

        let err = d
            .create_maps_to(
                "http://example.org/md/outer",
                "http://example.org/md/outer/sub",
                "map",
                RefinementType::Merge,
                "http://example.org/md/outer/nothing",
                "http://example.org/md/inner/pub_fc",
            )
            .unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::MapsToLocal));
    }

    #[test]
    fn test_set_maps_to_remote_checks_access() {
        let mut d = fixture();
        d.create_maps_to(
            "http://example.org/md/outer",
            "http://example.org/md/outer/sub",
            "map",
            RefinementType::UseLocal,
            "http://example.org/md/outer/local_fc",
            "http://example.org/md/inner/pub_fc",
        )
        .unwrap();
        let err = d
            .set_maps_to_remote(
                "http://example.org/md/outer",
                "http://example.org/md/outer/sub",
                "http://example.org/md/outer/sub/map",
                "http://example.org/md/inner/priv_fc",
            )
            .unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::MapsToRemotePrivate));
    }
}
