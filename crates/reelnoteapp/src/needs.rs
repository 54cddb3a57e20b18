//! What a note is missing.
//!
//! The three flags are independent and are always computed from the note as it
//! is now; nothing is remembered between runs.

use crate::document::{Document, KEY_RUNTIME};
use crate::model::is_genre_tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeedFlags {
    pub needs_cover: bool,
    pub needs_metadata: bool,
    pub needs_external_id: bool,
}

impl NeedFlags {
    pub fn detect(doc: &Document) -> Self {
        Self {
            needs_cover: doc.needs_cover(),
            needs_metadata: needs_metadata(doc),
            needs_external_id: needs_external_id(doc),
        }
    }

    pub fn any(&self) -> bool {
        self.needs_cover || self.needs_metadata || self.needs_external_id
    }
}

/// Runtime and genre tags come from the same lookup, so either one missing
/// means a refetch.
pub fn needs_metadata(doc: &Document) -> bool {
    !doc.header().contains_key(KEY_RUNTIME) || !doc.tags().iter().any(|t| is_genre_tag(t))
}

pub fn needs_external_id(doc: &Document) -> bool {
    doc.external_id().is_none() || doc.external_kind().is_none()
}
