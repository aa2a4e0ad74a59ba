//! Copying a top-level entity under a new identity.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::compliance;
use crate::error::ValidationError;
use crate::model::{Identifiable, Identified, Location, TopLevel, Uri};

use super::Document;

/// Re-derives nested identities under a new parent and remembers the
/// old-to-new mapping for internal references.
#[derive(Default)]
struct Rebaser {
    renames: FxHashMap<Uri, Uri>,
}

impl Rebaser {
    fn rebase(&mut self, child: &mut Identified, parent: &Identified) -> Result<(), ValidationError> {
        let display_id = child
            .display_id
            .clone()
            .or_else(|| compliance::extract_display_id(child.child_base()).map(str::to_string))
            .ok_or_else(|| {
                ValidationError::message("cannot derive a display id", [child.identity.as_str()])
            })?;
        let fresh = parent.child(&display_id)?;
        self.renames.insert(child.identity.clone(), fresh.identity.clone());
        child.identity = fresh.identity;
        child.persistent_identity = fresh.persistent_identity;
        child.display_id = fresh.display_id;
        child.version = fresh.version;
        Ok(())
    }

    fn rename(&self, uri: &mut Uri) {
        if let Some(new) = self.renames.get(uri.as_str()) {
            *uri = new.clone();
        }
    }

    fn rebase_location(&mut self, location: &mut Location, parent: &Identified) -> Result<(), ValidationError> {
        self.rebase(location.identified_mut(), parent)?;
        if let Location::MultiRange(multi) = location {
            for range in &mut multi.ranges {
                self.rebase(&mut range.identified, &multi.identified)?;
            }
        }
        Ok(())
    }

    /// Re-identifies everything `top` owns below its (already updated)
    /// identity, then rewrites sibling references.
    fn rebase_children(&mut self, top: &mut TopLevel) -> Result<(), ValidationError> {
        match top {
            TopLevel::ComponentDefinition(cd) => {
                for c in &mut cd.components {
                    self.rebase(&mut c.identified, &cd.identified)?;
                    for m in &mut c.maps_tos {
                        self.rebase(&mut m.identified, &c.identified)?;
                    }
                }
                for sa in &mut cd.sequence_annotations {
                    self.rebase(&mut sa.identified, &cd.identified)?;
                    for location in &mut sa.locations {
                        self.rebase_location(location, &sa.identified)?;
                    }
                }
                for sc in &mut cd.sequence_constraints {
                    self.rebase(&mut sc.identified, &cd.identified)?;
                }

                for c in &mut cd.components {
                    for m in &mut c.maps_tos {
                        self.rename(&mut m.local);
                    }
                }
                for sa in &mut cd.sequence_annotations {
                    if let Some(component) = &mut sa.component {
                        self.rename(component);
                    }
                }
                for sc in &mut cd.sequence_constraints {
                    self.rename(&mut sc.subject);
                    self.rename(&mut sc.object);
                }
            }
            TopLevel::ModuleDefinition(md) => {
                for fc in &mut md.functional_components {
                    self.rebase(&mut fc.identified, &md.identified)?;
                    for m in &mut fc.maps_tos {
                        self.rebase(&mut m.identified, &fc.identified)?;
                    }
                }
                for module in &mut md.modules {
                    self.rebase(&mut module.identified, &md.identified)?;
                    for m in &mut module.maps_tos {
                        self.rebase(&mut m.identified, &module.identified)?;
                    }
                }
                for interaction in &mut md.interactions {
                    self.rebase(&mut interaction.identified, &md.identified)?;
                    for p in &mut interaction.participations {
                        self.rebase(&mut p.identified, &interaction.identified)?;
                    }
                }

                let maps_tos = md
                    .functional_components
                    .iter_mut()
                    .flat_map(|f| f.maps_tos.iter_mut())
                    .chain(md.modules.iter_mut().flat_map(|m| m.maps_tos.iter_mut()));
                for m in maps_tos {
                    self.rename(&mut m.local);
                }
                for interaction in &mut md.interactions {
                    for p in &mut interaction.participations {
                        self.rename(&mut p.participant);
                    }
                }
            }
            TopLevel::Collection(_)
            | TopLevel::Model(_)
            | TopLevel::Sequence(_)
            | TopLevel::GenericTopLevel(_) => {}
        }
        Ok(())
    }
}

impl Document {
    /// Copies a top-level entity to a freshly minted compliant identity.
    ///
    /// Unset arguments fall back to the document's default prefix and the
    /// original's display id and version. Every nested entity is re-derived
    /// under the new identity, references between siblings follow the
    /// rename, and `wasDerivedFrom` of the copy names the original. Returns
    /// the new identity.
    pub fn create_copy(
        &mut self,
        uri: &str,
        prefix: Option<&str>,
        display_id: Option<&str>,
        version: Option<&str>,
    ) -> Result<Uri, ValidationError> {
        self.ensure_writable()?;
        let original = self
            .get(uri)
            .ok_or_else(|| ValidationError::message("entity to copy not found", [uri]))?;
        let source = original.identified();

        let display_id = display_id
            .or(source.display_id.as_deref())
            .or_else(|| compliance::extract_display_id(source.child_base()))
            .ok_or_else(|| ValidationError::message("cannot derive a display id", [uri]))?
            .to_string();
        let version = version.or(source.version.as_deref()).unwrap_or("").to_string();
        let prefix = prefix
            .or(self.config.default_uri_prefix.as_deref())
            .ok_or_else(|| ValidationError::message("a URI prefix is required to copy", [uri]))?;
        let token = self.config.types_in_uris.then(|| original.kind().type_token());
        let minted = compliance::create_compliant_uri(prefix, token, &display_id, &version)?;

        let mut top = original.to_top_level();
        {
            let identified = top.identified_mut();
            identified.identity = minted.identity;
            identified.persistent_identity = Some(minted.persistent_identity);
            identified.display_id = Some(display_id);
            identified.version = (!version.is_empty()).then_some(version);
            identified.was_derived_from = Some(uri.to_string());
        }
        Rebaser::default().rebase_children(&mut top)?;

        let new_uri = top.identity().to_string();
        debug!(from = uri, to = %new_uri, "copying top-level entity");
        self.add(top)?;
        Ok(new_uri)
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{Document, DocumentConfig};
    use crate::model::{AccessType, Identifiable, RestrictionType, TopLevelRef};
    use crate::vocab::terms;

    #[test]
    fn test_copy_rewrites_children_and_references() {
        let mut d = Document::with_config(
            DocumentConfig::new()
                .with_default_uri_prefix("http://example.org")
                .with_types_in_uris(true),
        );
        let cd = d
            .create_component_definition("gene", "1", [terms::DNA.to_string()])
            .unwrap();
        let a = cd
            .create_component("a", AccessType::Public, "http://example.org/cd/x/1")
            .unwrap()
            .identity()
            .to_string();
        let b = cd
            .create_component("b", AccessType::Public, "http://example.org/cd/y/1")
            .unwrap()
            .identity()
            .to_string();
        cd.create_sequence_constraint("sc", RestrictionType::Precedes, &a, &b)
            .unwrap();

        let copy = d
            .create_copy("http://example.org/cd/gene/1", None, Some("gene2"), Some("2"))
            .unwrap();
        assert_eq!(copy, "http://example.org/cd/gene2/2");

        let Some(TopLevelRef::ComponentDefinition(c)) = d.get(&copy) else {
            panic!("copy missing");
        };
        assert_eq!(c.was_derived_from(), Some("http://example.org/cd/gene/1"));
        let sc = &c.sequence_constraints[0];
        assert_eq!(sc.identity(), "http://example.org/cd/gene2/sc/2");
        assert_eq!(sc.subject, "http://example.org/cd/gene2/a/2");
        assert_eq!(sc.object, "http://example.org/cd/gene2/b/2");
        assert!(c.check(true).is_ok());

        // copying to the same identity collides
        assert!(d.create_copy("http://example.org/cd/gene/1", None, None, None).is_err());
        assert_eq!(d.len(), 2);
    }
}
