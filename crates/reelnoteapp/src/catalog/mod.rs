//! # Catalog
//!
//! Everything that talks to the remote movie/TV catalog sits behind the
//! [`Catalog`] trait, so the reconciliation code never sees HTTP. The real
//! implementation is [`TmdbClient`]; tests use the scripted catalog from
//! `test_utils`.
//!
//! ## Operations
//!
//! | Operation          | Purpose                                            |
//! |--------------------|----------------------------------------------------|
//! | `search_multi`     | title search, movies and TV only, posters required |
//! | `metadata_by_id`   | runtime, episode count and genre tags              |
//! | `cover_url_by_id`  | poster URL, or `NoPoster`                          |
//! | `full_details`     | raw detail map for content rendering               |
//! | `download_image`   | fetch, shrink and store a cover as JPEG            |
//!
//! Network calls are bounded by a timeout and retried per [`retry`].

pub mod cover;
pub mod retry;
pub mod tmdb;

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::Result;
use crate::model::{FetchedMetadata, MediaKind};

pub use tmdb::TmdbClient;

pub type Details = Map<String, Value>;

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: i64,
    pub kind: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
    pub overview: String,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: f64,
}

impl Candidate {
    pub fn new(id: i64, kind: MediaKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            poster_path: None,
            overview: String::new(),
            release_date: None,
            first_air_date: None,
            vote_average: 0.0,
        }
    }

    pub fn with_poster(mut self, poster_path: impl Into<String>) -> Self {
        self.poster_path = Some(poster_path.into());
        self
    }

    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = Some(date.into());
        self
    }

    pub fn with_first_air_date(mut self, date: impl Into<String>) -> Self {
        self.first_air_date = Some(date.into());
        self
    }

    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = overview.into();
        self
    }

    pub fn with_vote_average(mut self, vote: f64) -> Self {
        self.vote_average = vote;
        self
    }

    pub fn poster(&self) -> Option<&str> {
        self.poster_path.as_deref().filter(|p| !p.is_empty())
    }

    /// First four characters of the release date (movies) or first air date
    /// (TV), or `"Unknown"`.
    pub fn display_year(&self) -> String {
        let date = match self.kind {
            MediaKind::Movie => self.release_date.as_deref(),
            MediaKind::Tv => self.first_air_date.as_deref(),
        };
        match date {
            Some(date) if !date.is_empty() => date.chars().take(4).collect(),
            _ => "Unknown".to_string(),
        }
    }
}

pub trait Catalog {
    fn search_multi(&self, query: &str, limit: usize) -> Result<Vec<Candidate>>;

    fn metadata_by_id(&self, id: i64, kind: MediaKind) -> Result<FetchedMetadata>;

    /// Fails with `NoPoster` when the title has no poster.
    fn cover_url_by_id(&self, id: i64, kind: MediaKind) -> Result<String>;

    fn full_details(&self, id: i64, kind: MediaKind) -> Result<Details>;

    fn image_url(&self, poster_path: &str) -> String;

    /// Stores the image at `url` as a JPEG at `dest`, shrunk to `max_width`
    /// when wider. Never upscales.
    fn download_image(&self, url: &str, dest: &Path, max_width: u32) -> Result<()>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn search_multi(&self, query: &str, limit: usize) -> Result<Vec<Candidate>> {
        (**self).search_multi(query, limit)
    }

    fn metadata_by_id(&self, id: i64, kind: MediaKind) -> Result<FetchedMetadata> {
        (**self).metadata_by_id(id, kind)
    }

    fn cover_url_by_id(&self, id: i64, kind: MediaKind) -> Result<String> {
        (**self).cover_url_by_id(id, kind)
    }

    fn full_details(&self, id: i64, kind: MediaKind) -> Result<Details> {
        (**self).full_details(id, kind)
    }

    fn image_url(&self, poster_path: &str) -> String {
        (**self).image_url(poster_path)
    }

    fn download_image(&self, url: &str, dest: &Path, max_width: u32) -> Result<()> {
        (**self).download_image(url, dest, max_width)
    }
}
