//! # Domain Model
//!
//! Small value types shared by every layer: the catalog's [`MediaKind`], the
//! [`FetchedMetadata`] a lookup produces, and the genre tag format notes use.
//!
//! ## Genre Tags
//!
//! Genres are stored in the note's `tags` list as `"<kind>/<Name>"`, for example
//! `movie/Science-Fiction` or `tv/Sci-Fi-and-Fantasy`. Catalog genre names are not
//! tag-safe, so they go through [`sanitize_genre_name`]:
//!
//! 1. Trim surrounding whitespace
//! 2. `&` becomes `and`
//! 3. `#` is removed
//! 4. `/` and spaces become `-`
//! 5. Leading and trailing `-` are trimmed
//!
//! A note counts as having genre metadata as soon as one tag carries a
//! `movie/` or `tv/` prefix (see [`is_genre_tag`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReelnoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Human label used in progress messages.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "TV show",
        }
    }

    /// Strict parse: only the exact strings `movie` and `tv` are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Tv),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = ReelnoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaKind::parse(s).ok_or_else(|| ReelnoteError::InvalidMediaKind(s.to_string()))
    }
}

/// Result of a catalog lookup, ready to be merged into a note header.
///
/// Only fields that are present overwrite the header; `None` and an empty
/// `genre_tags` leave the existing values alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMetadata {
    pub runtime: Option<i64>,
    pub total_episodes: Option<i64>,
    pub genre_tags: Vec<String>,
    pub external_id: i64,
    pub external_kind: MediaKind,
}

impl FetchedMetadata {
    pub fn new(external_id: i64, external_kind: MediaKind) -> Self {
        Self {
            runtime: None,
            total_episodes: None,
            genre_tags: Vec::new(),
            external_id,
            external_kind,
        }
    }

    pub fn with_runtime(mut self, runtime: i64) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_total_episodes(mut self, episodes: i64) -> Self {
        self.total_episodes = Some(episodes);
        self
    }

    pub fn with_genre_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.genre_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

pub fn sanitize_genre_name(name: &str) -> String {
    name.trim()
        .replace('&', "and")
        .replace('#', "")
        .replace(['/', ' '], "-")
        .trim_matches('-')
        .to_string()
}

pub fn genre_tag(kind: MediaKind, name: &str) -> String {
    format!("{}/{}", kind.as_str(), sanitize_genre_name(name))
}

pub fn is_genre_tag(tag: &str) -> bool {
    tag.starts_with("movie/") || tag.starts_with("tv/")
}
