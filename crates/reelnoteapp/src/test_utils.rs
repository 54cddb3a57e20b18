//! Scripted collaborators for exercising the command layer without a network.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::catalog::{Candidate, Catalog, Details};
use crate::error::{ReelnoteError, Result};
use crate::model::{FetchedMetadata, MediaKind};
use crate::select::{Selection, Selector};

pub const IMAGE_BASE: &str = "https://img.test";

/// Catalog answering from fixed tables and recording every call.
///
/// Unknown ids fail with a 404 status, ids without a cover fail with
/// `NoPoster`, unknown queries return no candidates.
#[derive(Default)]
pub struct ScriptedCatalog {
    searches: HashMap<String, Vec<Candidate>>,
    metadata: HashMap<(i64, MediaKind), FetchedMetadata>,
    covers: HashMap<(i64, MediaKind), String>,
    details: HashMap<(i64, MediaKind), Details>,
    fail_downloads: bool,
    calls: RefCell<Vec<String>>,
    downloads: RefCell<Vec<(String, PathBuf)>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, candidates: Vec<Candidate>) -> Self {
        self.searches.insert(query.to_string(), candidates);
        self
    }

    pub fn with_metadata(mut self, metadata: FetchedMetadata) -> Self {
        self.metadata
            .insert((metadata.external_id, metadata.external_kind), metadata);
        self
    }

    pub fn with_cover(mut self, id: i64, kind: MediaKind, poster_path: &str) -> Self {
        self.covers.insert((id, kind), poster_path.to_string());
        self
    }

    pub fn with_details(mut self, id: i64, kind: MediaKind, details: Details) -> Self {
        self.details.insert((id, kind), details);
        self
    }

    pub fn with_failing_downloads(mut self) -> Self {
        self.fail_downloads = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// `(url, destination)` of every download attempt.
    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloads.borrow().clone()
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn not_found() -> ReelnoteError {
        ReelnoteError::HttpStatus {
            status: 404,
            body: "not found".to_string(),
        }
    }
}

impl Catalog for ScriptedCatalog {
    fn search_multi(&self, query: &str, limit: usize) -> Result<Vec<Candidate>> {
        self.log(format!("search:{query}"));
        Ok(self
            .searches
            .get(query)
            .map(|found| found.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn metadata_by_id(&self, id: i64, kind: MediaKind) -> Result<FetchedMetadata> {
        self.log(format!("metadata:{id}:{kind}"));
        self.metadata
            .get(&(id, kind))
            .cloned()
            .ok_or_else(Self::not_found)
    }

    fn cover_url_by_id(&self, id: i64, kind: MediaKind) -> Result<String> {
        self.log(format!("cover:{id}:{kind}"));
        self.covers
            .get(&(id, kind))
            .map(|poster| self.image_url(poster))
            .ok_or(ReelnoteError::NoPoster)
    }

    fn full_details(&self, id: i64, kind: MediaKind) -> Result<Details> {
        self.log(format!("details:{id}:{kind}"));
        self.details
            .get(&(id, kind))
            .cloned()
            .ok_or_else(Self::not_found)
    }

    fn image_url(&self, poster_path: &str) -> String {
        format!("{IMAGE_BASE}{poster_path}")
    }

    fn download_image(&self, url: &str, dest: &Path, _max_width: u32) -> Result<()> {
        self.log(format!("download:{url}"));
        self.downloads
            .borrow_mut()
            .push((url.to_string(), dest.to_path_buf()));
        if self.fail_downloads {
            return Err(ReelnoteError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Selector replaying queued answers; answers `Skipped` once the queue is
/// empty.
#[derive(Default)]
pub struct ScriptedSelector {
    answers: RefCell<VecDeque<Selection>>,
    asked: RefCell<Vec<(String, usize)>>,
}

impl ScriptedSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(answers: impl IntoIterator<Item = Selection>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// `(title, candidate count)` for every prompt.
    pub fn asked(&self) -> Vec<(String, usize)> {
        self.asked.borrow().clone()
    }
}

impl Selector for ScriptedSelector {
    fn select(&self, title: &str, candidates: &[Candidate]) -> Selection {
        self.asked
            .borrow_mut()
            .push((title.to_string(), candidates.len()));
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or(Selection::Skipped)
    }
}

pub fn movie(id: i64, title: &str, year: &str) -> Candidate {
    Candidate::new(id, MediaKind::Movie, title)
        .with_poster(format!("/{id}.jpg"))
        .with_release_date(format!("{year}-01-01"))
}

pub fn show(id: i64, title: &str, year: &str) -> Candidate {
    Candidate::new(id, MediaKind::Tv, title)
        .with_poster(format!("/{id}.jpg"))
        .with_first_air_date(format!("{year}-01-01"))
}
