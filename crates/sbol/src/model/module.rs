//! ModuleDefinition and the entities it owns.

use std::collections::BTreeSet;

use crate::error::ValidationError;
use crate::model::{
    AccessType, DirectionType, FunctionalComponent, Identifiable, Identified, MapsTo, MapsToOwner,
    Uri, find, find_mut, first_duplicate, impl_identifiable, position, push_unique,
};
use crate::validate::Rule;

/// A use of another ModuleDefinition inside this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub identified: Identified,
    pub definition: Uri,
    pub maps_tos: Vec<MapsTo>,
}

impl Module {
    pub fn new(identified: Identified, definition: impl Into<Uri>) -> Self {
        Self {
            identified,
            definition: definition.into(),
            maps_tos: Vec::new(),
        }
    }
}

impl MapsToOwner for Module {
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

/// The role a FunctionalComponent plays in an Interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Participation {
    pub identified: Identified,
    pub roles: BTreeSet<Uri>,
    pub participant: Uri,
}

impl Participation {
    pub fn new(identified: Identified, participant: impl Into<Uri>) -> Self {
        Self {
            identified,
            roles: BTreeSet::new(),
            participant: participant.into(),
        }
    }
}

/// A biological process between FunctionalComponents.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub identified: Identified,
    pub types: BTreeSet<Uri>,
    pub participations: Vec<Participation>,
}

impl Interaction {
    pub fn new(identified: Identified, types: impl IntoIterator<Item = Uri>) -> Self {
        Self {
            identified,
            types: types.into_iter().collect(),
            participations: Vec::new(),
        }
    }

    pub fn get_participation(&self, identity: &str) -> Option<&Participation> {
        find(&self.participations, identity)
    }

    pub fn remove_participation(&mut self, identity: &str) -> Option<Participation> {
        let index = position(&self.participations, identity)?;
        Some(self.participations.remove(index))
    }

    pub fn clear_participations(&mut self) {
        self.participations.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModuleDefinition {
    pub identified: Identified,
    pub roles: BTreeSet<Uri>,
    pub functional_components: Vec<FunctionalComponent>,
    pub modules: Vec<Module>,
    pub interactions: Vec<Interaction>,
    pub models: BTreeSet<Uri>,
}

impl_identifiable!(Module, Participation, Interaction, ModuleDefinition);

impl ModuleDefinition {
    pub fn new(identified: Identified) -> Self {
        Self {
            identified,
            ..Default::default()
        }
    }

    fn child_taken(&self, identity: &str) -> bool {
        find(&self.functional_components, identity).is_some()
            || find(&self.modules, identity).is_some()
            || find(&self.interactions, identity).is_some()
    }

    fn has_functional_component(&self, identity: &str) -> bool {
        find(&self.functional_components, identity).is_some()
    }

    /// Every MapsTo owned by a FunctionalComponent or Module of this
    /// definition.
    pub fn maps_tos(&self) -> impl Iterator<Item = &MapsTo> {
        self.functional_components
            .iter()
            .flat_map(|f| f.maps_tos.iter())
            .chain(self.modules.iter().flat_map(|m| m.maps_tos.iter()))
    }

    // -------------------------------------------------------------------------
    // Functional components
    // -------------------------------------------------------------------------

    pub fn get_functional_component(&self, identity: &str) -> Option<&FunctionalComponent> {
        find(&self.functional_components, identity)
    }

    pub fn get_functional_component_mut(&mut self, identity: &str) -> Option<&mut FunctionalComponent> {
        find_mut(&mut self.functional_components, identity)
    }

    pub fn add_functional_component(
        &mut self,
        component: FunctionalComponent,
    ) -> Result<&mut FunctionalComponent, ValidationError> {
        let taken = self.child_taken(component.identity());
        push_unique(&mut self.functional_components, component, taken)
    }

    pub fn create_functional_component(
        &mut self,
        display_id: &str,
        access: AccessType,
        direction: DirectionType,
        definition: impl Into<Uri>,
    ) -> Result<&mut FunctionalComponent, ValidationError> {
        let fc = FunctionalComponent::new(
            self.identified.child(display_id)?,
            access,
            direction,
            definition,
        );
        self.add_functional_component(fc)
    }

    fn functional_component_referrers(&self, identity: &str) -> Option<ValidationError> {
        for interaction in &self.interactions {
            if let Some(p) = interaction
                .participations
                .iter()
                .find(|p| p.participant == identity)
            {
                return Some(ValidationError::rule(
                    Rule::ParticipationParticipant,
                    [p.identity(), identity],
                ));
            }
        }
        self.maps_tos()
            .find(|m| m.local == identity)
            .map(|m| ValidationError::rule(Rule::MapsToLocal, [m.identity(), identity]))
    }

    /// Removes a FunctionalComponent no Participation or MapsTo refers to.
    pub fn remove_functional_component(
        &mut self,
        identity: &str,
    ) -> Result<FunctionalComponent, ValidationError> {
        let Some(index) = position(&self.functional_components, identity) else {
            return Err(ValidationError::message("functional component not found", [identity]));
        };
        if let Some(err) = self.functional_component_referrers(identity) {
            return Err(err);
        }
        Ok(self.functional_components.remove(index))
    }

    pub fn clear_functional_components(&mut self) -> Result<(), ValidationError> {
        for fc in &self.functional_components {
            if let Some(err) = self.functional_component_referrers(fc.identity()) {
                return Err(err);
            }
        }
        self.functional_components.clear();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Modules
    // -------------------------------------------------------------------------

    pub fn get_module(&self, identity: &str) -> Option<&Module> {
        find(&self.modules, identity)
    }

    pub fn get_module_mut(&mut self, identity: &str) -> Option<&mut Module> {
        find_mut(&mut self.modules, identity)
    }

    pub fn add_module(&mut self, module: Module) -> Result<&mut Module, ValidationError> {
        if module.definition == self.identified.identity {
            return Err(ValidationError::rule(
                Rule::ModuleSelfReference,
                [module.identity(), self.identity()],
            ));
        }
        let taken = self.child_taken(module.identity());
        push_unique(&mut self.modules, module, taken)
    }

    pub fn create_module(
        &mut self,
        display_id: &str,
        definition: impl Into<Uri>,
    ) -> Result<&mut Module, ValidationError> {
        let module = Module::new(self.identified.child(display_id)?, definition);
        self.add_module(module)
    }

    pub fn remove_module(&mut self, identity: &str) -> Option<Module> {
        let index = position(&self.modules, identity)?;
        Some(self.modules.remove(index))
    }

    pub fn clear_modules(&mut self) {
        self.modules.clear();
    }

    // -------------------------------------------------------------------------
    // Interactions
    // -------------------------------------------------------------------------

    pub fn get_interaction(&self, identity: &str) -> Option<&Interaction> {
        find(&self.interactions, identity)
    }

    pub fn get_interaction_mut(&mut self, identity: &str) -> Option<&mut Interaction> {
        find_mut(&mut self.interactions, identity)
    }

    pub fn add_interaction(&mut self, interaction: Interaction) -> Result<&mut Interaction, ValidationError> {
        for p in &interaction.participations {
            if !self.has_functional_component(&p.participant) {
                return Err(ValidationError::rule(
                    Rule::ParticipationParticipant,
                    [p.identity(), p.participant.as_str()],
                ));
            }
        }
        let taken = self.child_taken(interaction.identity());
        push_unique(&mut self.interactions, interaction, taken)
    }

    pub fn create_interaction(
        &mut self,
        display_id: &str,
        types: impl IntoIterator<Item = Uri>,
    ) -> Result<&mut Interaction, ValidationError> {
        let interaction = Interaction::new(self.identified.child(display_id)?, types);
        self.add_interaction(interaction)
    }

    /// Adds a Participation to one of this definition's Interactions. The
    /// participant must be a FunctionalComponent of this definition.
    pub fn create_participation(
        &mut self,
        interaction: &str,
        display_id: &str,
        participant: &str,
    ) -> Result<&mut Participation, ValidationError> {
        if !self.has_functional_component(participant) {
            return Err(ValidationError::rule(
                Rule::ParticipationParticipant,
                [interaction, participant],
            ));
        }
        let Some(target) = self.get_interaction_mut(interaction) else {
            return Err(ValidationError::message("interaction not found", [interaction]));
        };
        let participation = Participation::new(target.identified.child(display_id)?, participant);
        let taken = target.get_participation(participation.identity()).is_some();
        push_unique(&mut target.participations, participation, taken)
    }

    pub fn remove_interaction(&mut self, identity: &str) -> Option<Interaction> {
        let index = position(&self.interactions, identity)?;
        Some(self.interactions.remove(index))
    }

    pub fn clear_interactions(&mut self) {
        self.interactions.clear();
    }

    // -------------------------------------------------------------------------
    // Integrity
    // -------------------------------------------------------------------------

    pub fn check(&self, compliant: bool) -> Result<(), ValidationError> {
        let me = &self.identified;
        me.check(compliant, None)?;

        let children = self
            .functional_components
            .iter()
            .map(|f| f.identity())
            .chain(self.modules.iter().map(|m| m.identity()))
            .chain(self.interactions.iter().map(|i| i.identity()));
        if let Some(dup) = first_duplicate(children) {
            return Err(ValidationError::rule(Rule::IdentityUnique, [dup]));
        }

        for fc in &self.functional_components {
            fc.identified.check(compliant, Some(me))?;
            fc.check_maps_tos(compliant)?;
        }
        for module in &self.modules {
            module.identified.check(compliant, Some(me))?;
            module.check_maps_tos(compliant)?;
            if module.definition == me.identity {
                return Err(ValidationError::rule(
                    Rule::ModuleSelfReference,
                    [module.identity(), me.identity.as_str()],
                ));
            }
        }
        for m in self.maps_tos() {
            if !self.has_functional_component(&m.local) {
                return Err(ValidationError::rule(Rule::MapsToLocal, [m.identity(), m.local.as_str()]));
            }
        }
        for interaction in &self.interactions {
            interaction.identified.check(compliant, Some(me))?;
            if let Some(dup) = first_duplicate(interaction.participations.iter().map(|p| p.identity())) {
                return Err(ValidationError::rule(Rule::IdentityUnique, [dup]));
            }
            for p in &interaction.participations {
                p.identified.check(compliant, Some(&interaction.identified))?;
                if !self.has_functional_component(&p.participant) {
                    return Err(ValidationError::rule(
                        Rule::ParticipationParticipant,
                        [p.identity(), p.participant.as_str()],
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::create_compliant_uri;
    use crate::model::RefinementType;

    fn md(display_id: &str) -> ModuleDefinition {
        let uri = create_compliant_uri("http://example.org", Some("md"), display_id, "").unwrap();
        ModuleDefinition::new(Identified::compliant(uri, display_id, ""))
    }

    #[test]
    fn test_participation_requires_functional_component() {
        let mut def = md("toggle");
        let i = def
            .create_interaction("inhibition", ["http://identifiers.org/biomodels.sbo/SBO:0000169".to_string()])
            .unwrap()
            .identity()
            .to_string();
        let err = def
            .create_participation(&i, "p1", "http://example.org/md/toggle/missing")
            .unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::ParticipationParticipant));

        let fc = def
            .create_functional_component("tetR", AccessType::Public, DirectionType::None, "http://example.org/cd/tetR")
            .unwrap()
            .identity()
            .to_string();
        let p = def.create_participation(&i, "p1", &fc).unwrap();
        assert_eq!(p.identity(), "http://example.org/md/toggle/inhibition/p1");
        assert!(def.check(true).is_ok());

        let err = def.remove_functional_component(&fc).unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::ParticipationParticipant));
    }

    #[test]
    fn test_module_cannot_instantiate_its_own_definition() {
        let mut def = md("m");
        let own = def.identity().to_string();
        let err = def.create_module("self_use", own).unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::ModuleSelfReference));
        assert!(def.create_module("sub", "http://example.org/md/other").is_ok());
    }

    #[test]
    fn test_maps_to_local_must_be_functional_component() {
        let mut def = md("m");
        let module = def.create_module("sub", "http://example.org/md/other").unwrap();
        let m = MapsTo::new(
            module.identified.child("map").unwrap(),
            RefinementType::UseLocal,
            "http://example.org/md/m/nothing",
            "http://example.org/md/other/fc",
        );
        module.add_maps_to(m).unwrap();
        assert_eq!(def.check(false).unwrap_err().rule_id(), Some(Rule::MapsToLocal));
    }
}
