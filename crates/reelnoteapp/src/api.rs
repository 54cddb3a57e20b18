//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for every UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns the collaborators** of a run: catalog, selector, renderer, backend
//! - **Resolves paths** such as the attachments directory
//! - **Returns structured types** ([`BatchReport`], [`NoteReport`])
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Terminal output**: no stdout or stderr, only reports and messages
//!
//! ## Generic Over Collaborators
//!
//! `ReelnoteApi<C, S, R, B>` is generic over every seam:
//! - Production: `ReelnoteApi<TmdbClient, TerminalSelector, MarkdownRenderer, FsBackend>`
//! - Testing: a scripted catalog and selector over `MemBackend`
//!
//! The same batch can therefore run without a network or a terminal.

use std::path::{Path, PathBuf};

use crate::cancel::CancelFlag;
use crate::catalog::{cover, Catalog};
use crate::commands::process::Discovery;
use crate::commands::{
    self, BatchReport, NoteReport, RunOptions, Services, DEFAULT_ATTACHMENTS_DIR,
    DEFAULT_SEARCH_LIMIT,
};
use crate::config::AppConfig;
use crate::content::{Renderer, Section};
use crate::document::Document;
use crate::error::Result;
use crate::select::Selector;
use crate::store::NoteBackend;

pub struct ReelnoteApi<C, S, R, B> {
    catalog: C,
    selector: S,
    renderer: R,
    backend: B,
    search_limit: usize,
    cover_max_width: u32,
    attachments_dir: PathBuf,
    cancel: CancelFlag,
}

impl<C, S, R, B> ReelnoteApi<C, S, R, B>
where
    C: Catalog,
    S: Selector,
    R: Renderer,
    B: NoteBackend,
{
    pub fn new(catalog: C, selector: S, renderer: R, backend: B) -> Self {
        Self {
            catalog,
            selector,
            renderer,
            backend,
            search_limit: DEFAULT_SEARCH_LIMIT,
            cover_max_width: cover::DEFAULT_MAX_WIDTH,
            attachments_dir: PathBuf::from(DEFAULT_ATTACHMENTS_DIR),
            cancel: CancelFlag::new(),
        }
    }

    /// Zero keeps the current limit.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        if limit > 0 {
            self.search_limit = limit;
        }
        self
    }

    pub fn with_cover_max_width(mut self, width: u32) -> Self {
        if width > 0 {
            self.cover_max_width = width;
        }
        self
    }

    /// A relative directory is resolved against the processed directory, or
    /// the note's own directory for single notes.
    pub fn with_attachments_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.attachments_dir = dir.into();
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Applies the run-level settings from `config`. Catalog settings are
    /// applied when the catalog is built.
    pub fn with_config(self, config: &AppConfig) -> Self {
        self.with_search_limit(config.search_limit)
            .with_cover_max_width(config.cover_max_width)
            .with_attachments_dir(&config.attachments_dir)
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    fn services(&self) -> Services<'_, C, S, R, B> {
        Services::new(&self.catalog, &self.selector, &self.renderer, &self.backend)
            .with_search_limit(self.search_limit)
            .with_cover_max_width(self.cover_max_width)
    }

    /// Reconciles every note under `options.path` (a directory or a single
    /// markdown file). `on_report` is called after each note.
    pub fn process_path(
        &self,
        options: &RunOptions,
        on_report: impl FnMut(&NoteReport),
    ) -> Result<BatchReport> {
        commands::process::run(
            &self.services(),
            &self.attachments_dir,
            options,
            &self.cancel,
            on_report,
        )
    }

    /// Resolves a directory or markdown file to the notes a run would visit.
    pub fn discover(&self, path: &Path) -> Result<Discovery> {
        commands::process::discover(path)
    }

    /// Reconciles an explicit list of notes, all sharing `root` for the
    /// attachments directory. No discovery is done.
    pub fn process_notes(
        &self,
        root: &Path,
        files: &[PathBuf],
        options: &RunOptions,
        on_report: impl FnMut(&NoteReport),
    ) -> Result<BatchReport> {
        let attachments = root.join(&self.attachments_dir);
        std::fs::create_dir_all(&attachments)?;
        Ok(commands::process::run_batch(
            &self.services(),
            files,
            &attachments,
            options,
            &self.cancel,
            on_report,
        ))
    }

    /// Reconciles one note. Stopping and cancellation surface as `Err`.
    pub fn process_note(&self, path: &Path, options: &RunOptions) -> Result<NoteReport> {
        let attachments = self.attachments_for(path);
        commands::reconcile::run(&self.services(), path, &attachments, options)
    }

    /// Regenerates the content block of one note from its stored id.
    pub fn generate_content(&self, path: &Path, sections: &[Section]) -> Result<Vec<Section>> {
        let mut doc = Document::load(&self.backend, path)?;
        commands::generate::run(&self.services(), &mut doc, sections)
    }

    fn attachments_for(&self, note: &Path) -> PathBuf {
        let parent = note.parent().unwrap_or_else(|| Path::new("."));
        parent.join(&self.attachments_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NoteOutcome;
    use crate::content::MarkdownRenderer;
    use crate::model::{FetchedMetadata, MediaKind};
    use crate::store::MemBackend;
    use crate::test_utils::{movie, ScriptedCatalog, ScriptedSelector};
    use serde_json::json;

    fn api(catalog: ScriptedCatalog) -> ReelnoteApi<ScriptedCatalog, ScriptedSelector, MarkdownRenderer, MemBackend> {
        let backend = MemBackend::new().with_note("/vault/films/Heat.md", "---\ntitle: Heat\n---\n");
        ReelnoteApi::new(catalog, ScriptedSelector::new(), MarkdownRenderer, backend)
    }

    #[test]
    fn process_note_resolves_attachments_next_to_note() {
        let catalog = ScriptedCatalog::new()
            .with_search("Heat", vec![movie(949, "Heat", "1995")])
            .with_metadata(FetchedMetadata::new(949, MediaKind::Movie));
        let api = api(catalog).with_attachments_dir("covers");

        let report = api
            .process_note(Path::new("/vault/films/Heat.md"), &RunOptions::new("/vault/films"))
            .unwrap();

        assert_eq!(report.outcome, NoteOutcome::Updated);
        assert_eq!(
            api.catalog().downloads()[0].1,
            PathBuf::from("/vault/films/covers/Heat - cover.jpg")
        );
        let doc = Document::load(api.backend(), "/vault/films/Heat.md").unwrap();
        assert_eq!(doc.cover(), Some("covers/Heat - cover.jpg"));
    }

    #[test]
    fn search_limit_is_passed_to_catalog() {
        let candidates = (1..=5).map(|id| movie(id, "Heat", "1995")).collect();
        let catalog = ScriptedCatalog::new().with_search("Heat", candidates);
        let api = api(catalog).with_search_limit(2);

        api.process_note(Path::new("/vault/films/Heat.md"), &RunOptions::new("/vault"))
            .unwrap();

        assert_eq!(api.selector.asked(), vec![("Heat".to_string(), 2)]);
    }

    #[test]
    fn config_overrides_run_settings() {
        let config = AppConfig {
            search_limit: 3,
            cover_max_width: 500,
            attachments_dir: "media".to_string(),
            ..Default::default()
        };
        let api = api(ScriptedCatalog::new()).with_config(&config);
        assert_eq!(api.search_limit, 3);
        assert_eq!(api.cover_max_width, 500);
        assert_eq!(api.attachments_dir, PathBuf::from("media"));
    }

    #[test]
    fn zero_limits_are_ignored() {
        let api = api(ScriptedCatalog::new())
            .with_search_limit(0)
            .with_cover_max_width(0);
        assert_eq!(api.search_limit, DEFAULT_SEARCH_LIMIT);
        assert_eq!(api.cover_max_width, cover::DEFAULT_MAX_WIDTH);
    }

    #[test]
    fn generate_content_writes_block() {
        let details = match json!({"overview": "Crime saga."}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let catalog = ScriptedCatalog::new().with_details(949, MediaKind::Movie, details);
        let backend = MemBackend::new().with_note(
            "/vault/Heat.md",
            "---\ntmdb_id: 949\ntmdb_type: movie\n---\n",
        );
        let api = ReelnoteApi::new(catalog, ScriptedSelector::new(), MarkdownRenderer, backend);

        let used = api
            .generate_content(Path::new("/vault/Heat.md"), &[Section::Overview])
            .unwrap();

        assert_eq!(used, vec![Section::Overview]);
        let doc = Document::load(api.backend(), "/vault/Heat.md").unwrap();
        assert!(doc.body().contains("Crime saga."));
    }
}
