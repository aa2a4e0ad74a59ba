//! Validation rule table.
//!
//! Rule descriptions are embedded from `rules/rules.txt` and parsed once into a
//! process-wide table. The file is line oriented:
//!
//! ```text
//! [Category]
//! id: sbol-10201
//! condition: strong
//! description: First line of the description,
//! continued on following lines
//! reference: Section 7.4
//! ```
//!
//! A `reference:` line closes the rule.

use lazy_static::lazy_static;
use regex::Regex;
use rustc_hash::FxHashMap;

const RULES_TXT: &str = include_str!("../../rules/rules.txt");

/// A parsed rule entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry {
    pub id: String,
    pub category: String,
    pub condition: String,
    pub description: String,
    pub reference: String,
}

lazy_static! {
    static ref RULE_BEGIN: Regex = Regex::new(r"^\[(\w+)\]\s*$").expect("static regex");
    static ref RULE_ID: Regex = Regex::new(r"^id:\s(sbol-\d+)\s*$").expect("static regex");
    static ref RULE_CONDITION: Regex =
        Regex::new(r"^condition:\s(\w+\s*\w*)\s*$").expect("static regex");
    static ref RULE_DESCRIPTION: Regex =
        Regex::new(r"^description:\s(.+?)\s*$").expect("static regex");
    static ref RULE_REFERENCE: Regex = Regex::new(r"^reference:\s(.+?)\s*$").expect("static regex");
    static ref RULES: FxHashMap<String, RuleEntry> = parse_rules(RULES_TXT);
}

/// Parses rule text into a table keyed by rule id.
///
/// Rules missing an id when their `reference:` line is reached are skipped.
pub fn parse_rules(text: &str) -> FxHashMap<String, RuleEntry> {
    let mut rules = FxHashMap::default();
    let mut current = RuleEntry {
        id: String::new(),
        category: String::new(),
        condition: String::new(),
        description: String::new(),
        reference: String::new(),
    };

    for line in text.lines() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        // Order matters: the description-continuation branch accepts any line
        // that is not a reference.
        if let Some(c) = RULE_BEGIN.captures(line) {
            current = RuleEntry {
                id: String::new(),
                category: c[1].to_string(),
                condition: String::new(),
                description: String::new(),
                reference: String::new(),
            };
        } else if let Some(c) = RULE_ID.captures(line) {
            current.id = c[1].to_string();
        } else if let Some(c) = RULE_CONDITION.captures(line) {
            current.condition = c[1].to_string();
        } else if let Some(c) = RULE_DESCRIPTION.captures(line) {
            current.description = c[1].to_string();
        } else if let Some(c) = RULE_REFERENCE.captures(line) {
            current.reference = c[1].to_string();
            if !current.id.is_empty() {
                rules.insert(current.id.clone(), current.clone());
            }
        } else {
            let body = line.trim();
            if !current.description.is_empty() {
                current.description.push(' ');
            }
            current.description.push_str(body);
        }
    }

    rules
}

/// Looks up a rule description by id (e.g. `"sbol-10201"`).
pub fn description(id: &str) -> Option<&'static str> {
    RULES.get(id.trim()).map(|r| r.description.as_str())
}

/// Looks up a full rule entry by id.
pub fn entry(id: &str) -> Option<&'static RuleEntry> {
    RULES.get(id.trim())
}

/// Validation rules raised by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    LiteralConversion,
    IdentityRequired,
    IdentityUnique,
    DisplayIdGrammar,
    VersionGrammar,
    PersistentIdentityDisplayId,
    IdentityVersion,
    ChildPersistentIdentity,
    UriPrefix,
    SequenceElements,
    SequenceEncoding,
    ComponentDefinitionType,
    ComponentDefinitionSequence,
    InstanceDefinition,
    InstanceDefinitionReference,
    InstanceAccess,
    FunctionalComponentDirection,
    MapsToLocal,
    MapsToRemote,
    MapsToRemotePrivate,
    MapsToRefinement,
    AnnotationLocation,
    AnnotationComponent,
    LocationOrientation,
    RangeStart,
    RangeEnd,
    RangeOrder,
    CutAt,
    MultiRangeRanges,
    MultiRangeOrder,
    ConstraintSubject,
    ConstraintSubjectSibling,
    ConstraintObject,
    ConstraintObjectSibling,
    ConstraintRestriction,
    ModelSource,
    ModelLanguage,
    ModelFramework,
    ModuleDefinitionModel,
    ModuleDefinitionReference,
    ModuleSelfReference,
    ParticipationParticipant,
    CollectionMembers,
    GenericTopLevelType,
}

impl Rule {
    /// Every rule, in id order.
    pub const ALL: [Rule; 44] = [
        Rule::LiteralConversion,
        Rule::IdentityRequired,
        Rule::IdentityUnique,
        Rule::DisplayIdGrammar,
        Rule::VersionGrammar,
        Rule::PersistentIdentityDisplayId,
        Rule::IdentityVersion,
        Rule::ChildPersistentIdentity,
        Rule::UriPrefix,
        Rule::SequenceElements,
        Rule::SequenceEncoding,
        Rule::ComponentDefinitionType,
        Rule::ComponentDefinitionSequence,
        Rule::InstanceDefinition,
        Rule::InstanceDefinitionReference,
        Rule::InstanceAccess,
        Rule::FunctionalComponentDirection,
        Rule::MapsToLocal,
        Rule::MapsToRemote,
        Rule::MapsToRemotePrivate,
        Rule::MapsToRefinement,
        Rule::AnnotationLocation,
        Rule::AnnotationComponent,
        Rule::LocationOrientation,
        Rule::RangeStart,
        Rule::RangeEnd,
        Rule::RangeOrder,
        Rule::CutAt,
        Rule::MultiRangeRanges,
        Rule::MultiRangeOrder,
        Rule::ConstraintSubject,
        Rule::ConstraintSubjectSibling,
        Rule::ConstraintObject,
        Rule::ConstraintObjectSibling,
        Rule::ConstraintRestriction,
        Rule::ModelSource,
        Rule::ModelLanguage,
        Rule::ModelFramework,
        Rule::ModuleDefinitionModel,
        Rule::ModuleDefinitionReference,
        Rule::ModuleSelfReference,
        Rule::ParticipationParticipant,
        Rule::CollectionMembers,
        Rule::GenericTopLevelType,
    ];

    /// Returns the rule id (e.g. "sbol-10201").
    pub fn id(&self) -> &'static str {
        match self {
            Rule::LiteralConversion => "sbol-10103",
            Rule::IdentityRequired => "sbol-10201",
            Rule::IdentityUnique => "sbol-10202",
            Rule::DisplayIdGrammar => "sbol-10204",
            Rule::VersionGrammar => "sbol-10206",
            Rule::PersistentIdentityDisplayId => "sbol-10215",
            Rule::IdentityVersion => "sbol-10216",
            Rule::ChildPersistentIdentity => "sbol-10219",
            Rule::UriPrefix => "sbol-10220",
            Rule::SequenceElements => "sbol-10402",
            Rule::SequenceEncoding => "sbol-10403",
            Rule::ComponentDefinitionType => "sbol-10502",
            Rule::ComponentDefinitionSequence => "sbol-10513",
            Rule::InstanceDefinition => "sbol-10602",
            Rule::InstanceDefinitionReference => "sbol-10604",
            Rule::InstanceAccess => "sbol-10607",
            Rule::FunctionalComponentDirection => "sbol-10609",
            Rule::MapsToLocal => "sbol-10802",
            Rule::MapsToRemote => "sbol-10805",
            Rule::MapsToRemotePrivate => "sbol-10808",
            Rule::MapsToRefinement => "sbol-10810",
            Rule::AnnotationLocation => "sbol-10902",
            Rule::AnnotationComponent => "sbol-10905",
            Rule::LocationOrientation => "sbol-11002",
            Rule::RangeStart => "sbol-11102",
            Rule::RangeEnd => "sbol-11103",
            Rule::RangeOrder => "sbol-11104",
            Rule::CutAt => "sbol-11202",
            Rule::MultiRangeRanges => "sbol-11302",
            Rule::MultiRangeOrder => "sbol-11303",
            Rule::ConstraintSubject => "sbol-11402",
            Rule::ConstraintSubjectSibling => "sbol-11403",
            Rule::ConstraintObject => "sbol-11404",
            Rule::ConstraintObjectSibling => "sbol-11405",
            Rule::ConstraintRestriction => "sbol-11407",
            Rule::ModelSource => "sbol-11502",
            Rule::ModelLanguage => "sbol-11504",
            Rule::ModelFramework => "sbol-11507",
            Rule::ModuleDefinitionModel => "sbol-11608",
            Rule::ModuleDefinitionReference => "sbol-11703",
            Rule::ModuleSelfReference => "sbol-11705",
            Rule::ParticipationParticipant => "sbol-12003",
            Rule::CollectionMembers => "sbol-12103",
            Rule::GenericTopLevelType => "sbol-12302",
        }
    }

    /// Looks a rule up by id.
    pub fn from_id(id: &str) -> Option<Rule> {
        let id = id.trim();
        Rule::ALL.iter().copied().find(|r| r.id() == id)
    }

    /// Returns the human-readable description from the rule table.
    pub fn description(&self) -> &'static str {
        description(self.id()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_rule_has_description() {
        for rule in Rule::ALL {
            assert!(
                entry(rule.id()).is_some(),
                "{} missing from rules.txt",
                rule.id()
            );
            assert!(!rule.description().is_empty());
        }
    }

    #[test]
    fn test_rule_ids_unique() {
        let mut ids: Vec<_> = Rule::ALL.iter().map(|r| r.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), Rule::ALL.len());
    }

    #[test]
    fn test_parse_multiline_description() {
        let text = "\
[Identified]
id: sbol-10201
condition: strong
description: The identity property is REQUIRED
and MUST contain a URI.
reference: Section 7.4
";
        let rules = parse_rules(text);
        let rule = rules.get("sbol-10201").unwrap();
        assert_eq!(rule.category, "Identified");
        assert_eq!(rule.condition, "strong");
        assert_eq!(
            rule.description,
            "The identity property is REQUIRED and MUST contain a URI."
        );
        assert_eq!(rule.reference, "Section 7.4");
    }

    #[test]
    fn test_parse_skips_rule_without_id() {
        let text = "[Identified]\ndescription: orphan\nreference: nowhere\n";
        assert!(parse_rules(text).is_empty());
    }

    #[test]
    fn test_from_id() {
        assert_eq!(Rule::from_id("sbol-10202"), Some(Rule::IdentityUnique));
        assert_eq!(Rule::from_id(" sbol-10202 "), Some(Rule::IdentityUnique));
        assert_eq!(Rule::from_id("sbol-99999"), None);
        assert!(description("sbol-99999").is_none());
    }
}
