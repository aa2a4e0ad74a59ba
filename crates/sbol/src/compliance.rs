//! Compliant URI derivation and checks.
//!
//! A compliant top-level URI has the shape
//!
//! ```text
//! persistentIdentity = prefix "/" [typeToken "/"] displayId
//! identity           = persistentIdentity ["/" version]
//! ```
//!
//! and a nested child extends its parent's persistent identity:
//! `parentPersistentIdentity "/" displayId ["/" version]`.
//!
//! Everything here is a pure function of its inputs.

use lazy_static::lazy_static;
use oxiri::Iri;
use regex::Regex;

use crate::error::ValidationError;
use crate::validate::Rule;

/// Separator between URI segments.
pub const DELIMITER: char = '/';

lazy_static! {
    static ref DISPLAY_ID: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex");
    static ref VERSION: Regex = Regex::new(r"^[0-9]+[A-Za-z0-9_.-]*$").expect("static regex");
}

/// A derived identity together with its version-free persistent identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompliantUri {
    pub persistent_identity: String,
    pub identity: String,
}

pub fn is_valid_display_id(display_id: &str) -> bool {
    DISPLAY_ID.is_match(display_id)
}

pub fn is_valid_version(version: &str) -> bool {
    VERSION.is_match(version)
}

/// Returns true for absolute IRIs and blank-node labels (`_:b0`).
pub fn is_valid_identity(identity: &str) -> bool {
    identity.starts_with("_:") || Iri::parse(identity).is_ok()
}

pub fn validate_display_id(display_id: &str) -> Result<(), ValidationError> {
    if is_valid_display_id(display_id) {
        Ok(())
    } else {
        Err(ValidationError::rule(Rule::DisplayIdGrammar, [display_id]))
    }
}

pub fn validate_version(version: &str) -> Result<(), ValidationError> {
    if is_valid_version(version) {
        Ok(())
    } else {
        Err(ValidationError::rule(Rule::VersionGrammar, [version]))
    }
}

/// Checks that a URI prefix is a syntactically valid absolute IRI.
pub fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    match Iri::parse(prefix) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::rule(Rule::UriPrefix, [prefix])),
    }
}

/// Appends `/` unless the prefix already ends in `/`, `:` or `#`.
pub fn normalize_prefix(prefix: &str) -> String {
    if prefix.ends_with('/') || prefix.ends_with(':') || prefix.ends_with('#') {
        prefix.to_string()
    } else {
        format!("{prefix}{DELIMITER}")
    }
}

/// Derives a compliant top-level URI.
///
/// An empty `version` produces an identity equal to the persistent identity.
pub fn create_compliant_uri(
    prefix: &str,
    type_token: Option<&str>,
    display_id: &str,
    version: &str,
) -> Result<CompliantUri, ValidationError> {
    validate_prefix(prefix)?;
    validate_display_id(display_id)?;
    let mut persistent_identity = normalize_prefix(prefix);
    if let Some(token) = type_token {
        persistent_identity.push_str(token);
        persistent_identity.push(DELIMITER);
    }
    persistent_identity.push_str(display_id);
    with_version(persistent_identity, version)
}

/// Derives a compliant URI for a child of the object with the given
/// persistent identity.
pub fn create_child_uri(
    parent_persistent_identity: &str,
    display_id: &str,
    version: &str,
) -> Result<CompliantUri, ValidationError> {
    validate_display_id(display_id)?;
    let persistent_identity = format!("{parent_persistent_identity}{DELIMITER}{display_id}");
    with_version(persistent_identity, version)
}

fn with_version(persistent_identity: String, version: &str) -> Result<CompliantUri, ValidationError> {
    let identity = if version.is_empty() {
        persistent_identity.clone()
    } else {
        validate_version(version)?;
        format!("{persistent_identity}{DELIMITER}{version}")
    };
    Ok(CompliantUri {
        persistent_identity,
        identity,
    })
}

/// Strips a trailing `/version` from an identity.
pub fn extract_persistent_identity<'a>(identity: &'a str, version: Option<&str>) -> &'a str {
    match version {
        Some(v) if !v.is_empty() => identity
            .strip_suffix(v)
            .and_then(|rest| rest.strip_suffix(DELIMITER))
            .unwrap_or(identity),
        _ => identity,
    }
}

/// Returns the last path segment of a persistent identity.
pub fn extract_display_id(persistent_identity: &str) -> Option<&str> {
    let segment = persistent_identity
        .rsplit(['/', '#', ':'])
        .next()
        .filter(|s| !s.is_empty())?;
    is_valid_display_id(segment).then_some(segment)
}

/// Returns the trailing version segment of an identity, if it has one that
/// parses as a version and is preceded by a valid display id segment.
pub fn extract_version(identity: &str) -> Option<&str> {
    let (rest, last) = identity.rsplit_once(DELIMITER)?;
    if !is_valid_version(last) {
        return None;
    }
    extract_display_id(rest).map(|_| last)
}

/// Returns true when the four fields satisfy the compliance invariants.
pub fn is_compliant(
    identity: &str,
    persistent_identity: &str,
    display_id: &str,
    version: &str,
) -> bool {
    let version = (!version.is_empty()).then_some(version);
    check_compliance(identity, Some(persistent_identity), Some(display_id), version, None).is_ok()
}

/// Checks the compliance invariants of one object.
///
/// - `identity == persistentIdentity + "/" + version` when both are set,
///   and `identity == persistentIdentity` when only the persistent identity is
/// - the persistent identity ends with `"/" + displayId` when both are set
/// - a child's persistent identity starts with its parent's
pub fn check_compliance(
    identity: &str,
    persistent_identity: Option<&str>,
    display_id: Option<&str>,
    version: Option<&str>,
    parent_persistent_identity: Option<&str>,
) -> Result<(), ValidationError> {
    let Some(pid) = persistent_identity else {
        return Ok(());
    };
    let expected_identity = match version {
        Some(v) if !v.is_empty() => format!("{pid}{DELIMITER}{v}"),
        _ => pid.to_string(),
    };
    if identity != expected_identity {
        return Err(ValidationError::rule(Rule::IdentityVersion, [identity]));
    }
    if let Some(display_id) = display_id {
        let ends_with_id = pid
            .strip_suffix(display_id)
            .is_some_and(|rest| rest.ends_with(['/', '#', ':']));
        if !ends_with_id {
            return Err(ValidationError::rule(Rule::PersistentIdentityDisplayId, [identity]));
        }
    }
    if let Some(parent) = parent_persistent_identity {
        let under_parent = pid
            .strip_prefix(parent)
            .is_some_and(|rest| rest.starts_with(DELIMITER));
        if !under_parent {
            return Err(ValidationError::rule(Rule::ChildPersistentIdentity, [identity]));
        }
    }
    Ok(())
}
