//! SBOL: a document model for the Synthetic Biology Open Language.
//!
//! This crate reads and writes SBOL documents in RDF/XML, Turtle and JSON,
//! materializes them into a typed, cross-referenced [`Document`], enforces the
//! compliant URI scheme and validates documents against the SBOL rule table.
//!
//! # Overview
//!
//! Data flows through a syntax-independent property tree:
//!
//! - bytes → [`codec`] → [`tree::DocumentRoot`] → [`read`] → [`Document`]
//! - [`Document`] → [`write`] → [`tree::DocumentRoot`] → [`codec`] → bytes
//!
//! SBOL1 input is bridged to SBOL2 on read. SBOL2 documents can be downgraded
//! to SBOL1 on write, keeping only the DNA subset.
//!
//! # Quick Start
//!
//! ```rust
//! use sbol::{Document, DocumentConfig, Syntax, read_bytes, write_bytes};
//! use sbol::vocab::terms;
//!
//! let config = DocumentConfig::new()
//!     .with_default_uri_prefix("http://example.org")
//!     .with_types_in_uris(true);
//! let mut doc = Document::with_config(config.clone());
//! doc.create_sequence("foo", "", "AGCT", terms::IUPAC_DNA).unwrap();
//! assert!(doc.get_sequence("http://example.org/seq/foo").is_some());
//!
//! let bytes = write_bytes(&doc, Syntax::RdfXml).unwrap();
//! let back = read_bytes(&bytes, Syntax::RdfXml, config).unwrap();
//! assert_eq!(back, doc);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Entity types (ComponentDefinition, ModuleDefinition, ...)
//! - [`document`]: The aggregate root and its configuration
//! - [`compliance`]: Compliant URI construction and checks
//! - [`read`] / [`write`]: Property tree conversion, with SBOL1 bridging
//! - [`codec`]: RDF/XML, Turtle and JSON syntaxes
//! - [`validate`]: Rule table and document-wide checks
//! - [`global`]: Optional process-wide default document

pub mod codec;
pub mod compliance;
pub mod document;
pub mod error;
pub mod global;
pub mod io;
pub mod model;
pub mod read;
pub mod tree;
pub mod validate;
pub mod vocab;
pub mod write;

pub use document::{Document, DocumentConfig};
pub use error::{CodecError, ReadError, SbolError, ValidationError};
pub use io::{Syntax, read_bytes, read_from, write_bytes, write_to};
pub use model::{
    AccessType, Annotation, Collection, ComponentDefinition, DirectionType, GenericTopLevel,
    Identifiable, Identified, Location, Model, ModuleDefinition, OrientationType, RefinementType,
    RestrictionType, Sequence, TopLevel, TopLevelKind, Uri,
};
pub use read::read;
pub use validate::{Rule, validate_document};
pub use write::{SchemaVersion, write};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// SBOL schema version written by default.
pub const SBOL_VERSION: &str = "2.0";
