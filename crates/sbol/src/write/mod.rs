//! [`Document`] to property tree.
//!
//! Writing is pure: the document is only read. SBOL2 output keeps every field
//! and annotation; SBOL1 output is a lossy downgrade to the DNA subset.

mod v1;
mod v2;

use crate::document::Document;
use crate::tree::{DocumentRoot, Literal};
use crate::vocab::XSD_NS;

/// Schema generation to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaVersion {
    V1,
    #[default]
    V2,
}

/// Writes a document as a property tree of the given schema generation.
pub fn write(doc: &Document, version: SchemaVersion) -> DocumentRoot {
    match version {
        SchemaVersion::V2 => v2::write_all(doc),
        SchemaVersion::V1 => v1::downgrade(doc),
    }
}

/// An integer literal for a sequence position. Positions beyond `i64` keep
/// their lexical form.
fn position(n: u64) -> Literal {
    match i64::try_from(n) {
        Ok(i) => Literal::Integer(i),
        Err(_) => Literal::Typed {
            value: n.to_string(),
            datatype: format!("{XSD_NS}integer"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_literal() {
        assert_eq!(position(42), Literal::Integer(42));
        let Literal::Typed { value, datatype } = position(u64::MAX) else {
            panic!("expected a typed literal");
        };
        assert_eq!(value, u64::MAX.to_string());
        assert!(datatype.ends_with("#integer"));
    }
}
