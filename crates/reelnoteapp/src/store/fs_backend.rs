use super::backend::NoteBackend;
use crate::error::{ReelnoteError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem backend: notes are plain UTF-8 files, written via temp file +
/// rename in the note's own directory. A symlinked note is written through to
/// its target and the link itself is left in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }

    fn tmp_path_for(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("note");
        let tmp_name = format!(".{}-{}.tmp", name, Uuid::new_v4());
        match path.parent() {
            Some(parent) => parent.join(tmp_name),
            None => PathBuf::from(tmp_name),
        }
    }
}

impl NoteBackend for FsBackend {
    fn read_note(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(ReelnoteError::Io)
    }

    fn write_note(&self, path: &Path, content: &str) -> Result<()> {
        // a new note has nothing to resolve yet
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let tmp_path = Self::tmp_path_for(&target);
        fs::write(&tmp_path, content).map_err(ReelnoteError::Io)?;
        if let Err(err) = fs::rename(&tmp_path, &target) {
            let _ = fs::remove_file(&tmp_path);
            return Err(ReelnoteError::Io(err));
        }
        Ok(())
    }
}
