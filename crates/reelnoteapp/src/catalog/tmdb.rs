//! TMDB client backed by a blocking `ureq` agent.
//!
//! Genre names are not inlined reliably in detail responses, so each media
//! kind's genre table is fetched once on first use and cached for the life of
//! the client. The cache sits behind a read-mostly lock.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::cover;
use super::retry::{run_with_retry, AttemptFailure};
use super::{Candidate, Catalog, Details};
use crate::cancel::CancelFlag;
use crate::error::{ReelnoteError, Result};
use crate::model::{genre_tag, FetchedMetadata, MediaKind};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/original";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

const MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;

type GenreTable = Arc<HashMap<i64, String>>;

pub struct TmdbClient {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
    image_base_url: String,
    retry_attempts: u32,
    cancel: CancelFlag,
    genres: RwLock<HashMap<MediaKind, GenreTable>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    results: Vec<SearchItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchItem {
    id: i64,
    media_type: Option<String>,
    title: Option<String>,
    name: Option<String>,
    poster_path: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f64>,
}

impl SearchItem {
    fn into_candidate(self) -> Option<Candidate> {
        let kind = MediaKind::parse(self.media_type.as_deref()?)?;
        let poster = self.poster_path.filter(|p| !p.is_empty())?;
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .or(self.name)
            .unwrap_or_default();

        let mut candidate = Candidate::new(self.id, kind, title)
            .with_poster(poster)
            .with_overview(self.overview.unwrap_or_default())
            .with_vote_average(self.vote_average.unwrap_or_default());
        candidate.release_date = self.release_date;
        candidate.first_air_date = self.first_air_date;
        Some(candidate)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MediaDetails {
    runtime: Option<i64>,
    episode_run_time: Option<Vec<i64>>,
    number_of_episodes: Option<i64>,
    poster_path: Option<String>,
    genres: Option<Vec<GenreRef>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenreRef {
    id: i64,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenreList {
    genres: Vec<GenreRef>,
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            agent: build_agent(DEFAULT_TIMEOUT),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            cancel: CancelFlag::new(),
            genres: RwLock::new(HashMap::new()),
        }
    }

    /// Empty values keep the default.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        if !base_url.is_empty() {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_image_base_url(mut self, image_base_url: &str) -> Self {
        if !image_base_url.is_empty() {
            self.image_base_url = image_base_url.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    /// Zero keeps the default.
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        if attempts > 0 {
            self.retry_attempts = attempts;
        }
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", path);
        run_with_retry(self.retry_attempts, &self.cancel, path, || {
            let mut request = self.agent.get(&url).query("api_key", &self.api_key);
            for (key, value) in params {
                request = request.query(key, value);
            }
            let response = request.call().map_err(AttemptFailure::from_ureq)?;
            let body = response.into_string().map_err(AttemptFailure::from_io)?;
            serde_json::from_str(&body).map_err(AttemptFailure::fatal)
        })
    }

    fn details<T: DeserializeOwned>(
        &self,
        id: i64,
        kind: MediaKind,
        append_to_response: Option<&str>,
    ) -> Result<T> {
        let path = format!("/{}/{}", kind.as_str(), id);
        match append_to_response {
            Some(append) => self.get_json(&path, &[("append_to_response", append)]),
            None => self.get_json(&path, &[]),
        }
    }

    fn genre_table(&self, kind: MediaKind) -> Result<GenreTable> {
        if let Some(table) = self.genres.read().get(&kind) {
            return Ok(Arc::clone(table));
        }

        let list: GenreList = self.get_json(&format!("/genre/{}/list", kind.as_str()), &[])?;
        let table: GenreTable = Arc::new(
            list.genres
                .into_iter()
                .filter_map(|g| g.name.map(|name| (g.id, name)))
                .collect(),
        );
        debug!("cached {} {} genres", table.len(), kind);

        let mut cache = self.genres.write();
        Ok(Arc::clone(cache.entry(kind).or_insert(table)))
    }

    fn genre_tags(&self, kind: MediaKind, genres: &[GenreRef]) -> Vec<String> {
        if genres.is_empty() {
            return Vec::new();
        }
        let table = match self.genre_table(kind) {
            Ok(table) => table,
            Err(err) => {
                warn!("could not load {} genre list: {}", kind, err);
                return Vec::new();
            }
        };
        genres
            .iter()
            .filter_map(|g| table.get(&g.id).cloned().or_else(|| g.name.clone()))
            .filter(|name| !name.trim().is_empty())
            .map(|name| genre_tag(kind, &name))
            .collect()
    }

    fn fetch_image_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET image {}", url);
        run_with_retry(self.retry_attempts, &self.cancel, "image download", || {
            let response = self.agent.get(url).call().map_err(AttemptFailure::from_ureq)?;
            let mut bytes = Vec::new();
            response
                .into_reader()
                .take(MAX_IMAGE_BYTES)
                .read_to_end(&mut bytes)
                .map_err(AttemptFailure::from_io)?;
            Ok(bytes)
        })
    }
}

impl Catalog for TmdbClient {
    fn search_multi(&self, query: &str, limit: usize) -> Result<Vec<Candidate>> {
        let limit = limit.max(1);
        let response: SearchResponse = self.get_json(
            "/search/multi",
            &[("query", query), ("include_adult", "false")],
        )?;
        Ok(response
            .results
            .into_iter()
            .filter_map(SearchItem::into_candidate)
            .take(limit)
            .collect())
    }

    fn metadata_by_id(&self, id: i64, kind: MediaKind) -> Result<FetchedMetadata> {
        let details: MediaDetails = self.details(id, kind, None)?;

        let mut metadata = FetchedMetadata::new(id, kind);
        match kind {
            MediaKind::Movie => {
                metadata.runtime = details.runtime;
            }
            MediaKind::Tv => {
                metadata.runtime = details
                    .episode_run_time
                    .as_ref()
                    .and_then(|times| times.first().copied());
                metadata.total_episodes = details.number_of_episodes;
            }
        }
        metadata.genre_tags = self.genre_tags(kind, details.genres.as_deref().unwrap_or_default());
        Ok(metadata)
    }

    fn cover_url_by_id(&self, id: i64, kind: MediaKind) -> Result<String> {
        let details: MediaDetails = self.details(id, kind, None)?;
        match details.poster_path.filter(|p| !p.is_empty()) {
            Some(poster) => Ok(self.image_url(&poster)),
            None => Err(ReelnoteError::NoPoster),
        }
    }

    fn full_details(&self, id: i64, kind: MediaKind) -> Result<Details> {
        let append = match kind {
            MediaKind::Movie => "external_ids,keywords",
            MediaKind::Tv => "external_ids,keywords,content_ratings",
        };
        match self.details::<Value>(id, kind, Some(append))? {
            Value::Object(map) => Ok(map),
            _ => Ok(Details::new()),
        }
    }

    fn image_url(&self, poster_path: &str) -> String {
        format!("{}{}", self.image_base_url, poster_path)
    }

    fn download_image(&self, url: &str, dest: &Path, max_width: u32) -> Result<()> {
        let max_width = if max_width == 0 {
            cover::DEFAULT_MAX_WIDTH
        } else {
            max_width
        };
        let bytes = self.fetch_image_bytes(url)?;
        cover::store_cover(&bytes, dest, max_width)
    }
}
