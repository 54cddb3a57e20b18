use super::backend::NoteBackend;
use crate::error::{ReelnoteError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// In-memory note backend for testing.
///
/// Uses `RefCell` for interior mutability since processing is single-threaded,
/// which keeps the `NoteBackend` trait on `&self`.
#[derive(Default)]
pub struct MemBackend {
    notes: RefCell<HashMap<PathBuf, String>>,
    writes: RefCell<usize>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_note(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.notes
            .borrow_mut()
            .insert(path.into(), content.to_string());
        self
    }

    pub fn note(&self, path: &Path) -> Option<String> {
        self.notes.borrow().get(path).cloned()
    }

    /// Number of successful writes, for asserting that skips don't touch notes.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }
}

impl NoteBackend for MemBackend {
    fn read_note(&self, path: &Path) -> Result<String> {
        self.notes.borrow().get(path).cloned().ok_or_else(|| {
            ReelnoteError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such note: {}", path.display()),
            ))
        })
    }

    fn write_note(&self, path: &Path, content: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(ReelnoteError::Io(io::Error::other("simulated write error")));
        }
        self.notes
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}
