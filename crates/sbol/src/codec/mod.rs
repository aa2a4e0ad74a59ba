//! Concrete syntaxes for the property tree.
//!
//! Every codec decodes bytes into a [`DocumentRoot`](crate::tree::DocumentRoot)
//! and encodes one back. RDF/XML and Turtle share the triple mapping in
//! `triples`; JSON serializes the tree directly.

pub mod json;
pub mod rdfxml;
pub mod turtle;
mod triples;

pub use json::{decode_json, encode_json};
pub use rdfxml::{decode_rdfxml, encode_rdfxml};
pub use turtle::{decode_turtle, encode_turtle};
