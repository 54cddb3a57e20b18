use crate::error::Result;
use std::path::Path;

/// Abstract interface for raw note I/O.
///
/// The document model decides *what* a note looks like on disk; a backend only
/// knows *how* to get text to and from a path (filesystem vs memory).
pub trait NoteBackend {
    /// Read the full text of a note.
    fn read_note(&self, path: &Path) -> Result<String>;

    /// Replace the full text of a note.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write_note(&self, path: &Path, content: &str) -> Result<()>;
}

impl<B: NoteBackend + ?Sized> NoteBackend for &B {
    fn read_note(&self, path: &Path) -> Result<String> {
        (**self).read_note(path)
    }

    fn write_note(&self, path: &Path, content: &str) -> Result<()> {
        (**self).write_note(path, content)
    }
}
