//! # Command Layer
//!
//! The reconciliation logic lives here. Commands operate on [`Document`]s
//! through the [`Catalog`], [`Selector`], [`Renderer`] and [`NoteBackend`]
//! collaborators and return structured reports.
//!
//! ## What Commands Do NOT Do
//!
//! - **Terminal output**: progress is returned as [`CmdMessage`]s with a level;
//!   the UI decides how to show them.
//! - **Argument parsing or exit codes**: the CLI owns those.
//!
//! ## Per-Note Flow
//!
//! 1. Load the note, work out its title and [`NeedFlags`].
//! 2. Nothing needed and neither `force` nor content generation requested:
//!    skipped.
//! 3. Fetch: a stored id and type are used directly unless `force` is set;
//!    otherwise the title is searched and ambiguous results go to the
//!    selector.
//! 4. Apply the cover and metadata, then generate content if asked.
//! 5. The note counts as updated when the cover was stored, or the metadata
//!    was stored and no cover was needed, or content was generated.
//!
//! A failure only fails its own note. The batch stops early only when the
//! selector answers [`Selection::Stopped`] or the run is cancelled.
//!
//! ## Modules
//!
//! - [`reconcile`]: the per-note state machine
//! - [`generate`]: generated content sections
//! - [`process`]: file discovery and the batch loop
//!
//! [`Document`]: crate::document::Document
//! [`NeedFlags`]: crate::needs::NeedFlags
//! [`Selection::Stopped`]: crate::select::Selection::Stopped

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::content::{Renderer, Section};
use crate::select::Selector;
use crate::store::NoteBackend;

pub mod generate;
pub mod process;
pub mod reconcile;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const DEFAULT_ATTACHMENTS_DIR: &str = "attachments";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteOutcome {
    Updated,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteReport {
    pub path: PathBuf,
    pub title: Option<String>,
    pub outcome: NoteOutcome,
    pub messages: Vec<CmdMessage>,
}

impl NoteReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: None,
            outcome: NoteOutcome::Failed,
            messages: Vec::new(),
        }
    }

    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_outcome(mut self, outcome: NoteOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Totals for a run. `stopped` is set when the run ended before the last note.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchReport {
    pub notes: Vec<NoteReport>,
    pub messages: Vec<CmdMessage>,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub stopped: bool,
}

impl BatchReport {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn record(&mut self, note: NoteReport) {
        match note.outcome {
            NoteOutcome::Updated => self.processed += 1,
            NoteOutcome::Skipped => self.skipped += 1,
            NoteOutcome::Failed => self.failed += 1,
        }
        self.notes.push(note);
    }
}

/// Per-run options supplied by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub path: PathBuf,
    /// Ignore stored ids and search again.
    pub force: bool,
    pub generate_content: bool,
    /// Empty means the defaults for the note's media kind.
    pub sections: Vec<Section>,
}

impl RunOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_generate_content(mut self, generate: bool) -> Self {
        self.generate_content = generate;
        self
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }
}

/// Borrowed collaborators and limits shared by every command in a run.
pub struct Services<'a, C, S, R, B> {
    pub catalog: &'a C,
    pub selector: &'a S,
    pub renderer: &'a R,
    pub backend: &'a B,
    pub search_limit: usize,
    pub cover_max_width: u32,
}

impl<'a, C, S, R, B> Services<'a, C, S, R, B>
where
    C: Catalog,
    S: Selector,
    R: Renderer,
    B: NoteBackend,
{
    pub fn new(catalog: &'a C, selector: &'a S, renderer: &'a R, backend: &'a B) -> Self {
        Self {
            catalog,
            selector,
            renderer,
            backend,
            search_limit: DEFAULT_SEARCH_LIMIT,
            cover_max_width: crate::catalog::cover::DEFAULT_MAX_WIDTH,
        }
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn with_cover_max_width(mut self, width: u32) -> Self {
        self.cover_max_width = width;
        self
    }
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
