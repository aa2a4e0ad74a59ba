//! A process-wide default [`Document`].
//!
//! Everything else in the crate takes an explicit document; this module only
//! exists for callers that want one shared instance.

use lazy_static::lazy_static;
use parking_lot::Mutex;

use crate::document::{Document, DocumentConfig};

lazy_static! {
    static ref DEFAULT: Mutex<Document> = Mutex::new(Document::new());
}

/// Runs `f` with shared access to the default document.
pub fn with_default<R>(f: impl FnOnce(&Document) -> R) -> R {
    f(&DEFAULT.lock())
}

/// Runs `f` with exclusive access to the default document.
pub fn with_default_mut<R>(f: impl FnOnce(&mut Document) -> R) -> R {
    f(&mut DEFAULT.lock())
}

/// Takes the default document, leaving an empty one with the same settings.
pub fn take_default() -> Document {
    let mut guard = DEFAULT.lock();
    let fresh = Document::with_config(guard.config().clone());
    std::mem::replace(&mut *guard, fresh)
}

/// Replaces the default document with an empty one.
pub fn reset_default(config: DocumentConfig) {
    *DEFAULT.lock() = Document::with_config(config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::terms;

    // Single test: the default document is shared by every test thread.
    #[test]
    fn test_default_document_lifecycle() {
        reset_default(DocumentConfig::new().with_default_uri_prefix("http://example.org"));
        with_default_mut(|doc| {
            doc.create_sequence("s", "1", "acgt", terms::IUPAC_DNA).map(|_| ())
        })
        .unwrap();
        assert_eq!(with_default(Document::len), 1);

        let taken = take_default();
        assert_eq!(taken.len(), 1);
        assert!(with_default(Document::is_empty));
        assert_eq!(
            with_default(|doc| doc.config().default_uri_prefix.clone()).as_deref(),
            Some("http://example.org")
        );

        reset_default(DocumentConfig::new());
        assert_eq!(with_default(|doc| doc.config().default_uri_prefix.clone()), None);
    }
}
