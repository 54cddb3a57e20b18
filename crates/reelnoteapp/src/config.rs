//! # Configuration
//!
//! Settings are declared once on [`AppConfig`] with [`confique`], which layers
//! environment variables over an optional TOML file over compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `TMDB_API_KEY`, `REELNOTE_BASE_URL`, ...
//! 2. **Config file**: the path given on the command line, otherwise
//!    `reelnote.toml` in the OS config directory (via `directories`) when it
//!    exists.
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | `api_key` | `TMDB_API_KEY` | none, required to run |
//! | `base_url` | `REELNOTE_BASE_URL` | `https://api.themoviedb.org/3` |
//! | `image_base_url` | `REELNOTE_IMAGE_BASE_URL` | `https://image.tmdb.org/t/p/original` |
//! | `timeout_secs` | `REELNOTE_TIMEOUT_SECS` | `10` |
//! | `retry_attempts` | `REELNOTE_RETRY_ATTEMPTS` | `3` |
//! | `search_limit` | `REELNOTE_SEARCH_LIMIT` | `10` |
//! | `cover_max_width` | `REELNOTE_COVER_MAX_WIDTH` | `1000` |
//! | `attachments_dir` | `REELNOTE_ATTACHMENTS_DIR` | `attachments` |

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cancel::CancelFlag;
use crate::catalog::tmdb::{DEFAULT_BASE_URL, DEFAULT_IMAGE_BASE_URL};
use crate::catalog::TmdbClient;
use crate::error::{ReelnoteError, Result};

pub const CONFIG_FILE_NAME: &str = "reelnote.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB v3 API key.
    #[config(env = "TMDB_API_KEY")]
    pub api_key: Option<String>,

    #[config(env = "REELNOTE_BASE_URL", default = "https://api.themoviedb.org/3")]
    pub base_url: String,

    #[config(
        env = "REELNOTE_IMAGE_BASE_URL",
        default = "https://image.tmdb.org/t/p/original"
    )]
    pub image_base_url: String,

    /// Per-request timeout.
    #[config(env = "REELNOTE_TIMEOUT_SECS", default = 10)]
    pub timeout_secs: u64,

    /// Attempts per request, counting the first one.
    #[config(env = "REELNOTE_RETRY_ATTEMPTS", default = 3)]
    pub retry_attempts: u32,

    /// Candidates shown when a title search is ambiguous.
    #[config(env = "REELNOTE_SEARCH_LIMIT", default = 10)]
    pub search_limit: usize,

    /// Covers wider than this are scaled down.
    #[config(env = "REELNOTE_COVER_MAX_WIDTH", default = 1000)]
    pub cover_max_width: u32,

    /// Relative to the processed directory.
    #[config(env = "REELNOTE_ATTACHMENTS_DIR", default = "attachments")]
    pub attachments_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            timeout_secs: 10,
            retry_attempts: 3,
            search_limit: crate::commands::DEFAULT_SEARCH_LIMIT,
            cover_max_width: crate::catalog::cover::DEFAULT_MAX_WIDTH,
            attachments_dir: crate::commands::DEFAULT_ATTACHMENTS_DIR.to_string(),
        }
    }
}

/// `reelnote.toml` inside the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "reelnote", "reelnote")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl AppConfig {
    /// Loads the layered configuration. An `explicit` file must exist; the
    /// default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) if !path.is_file() => {
                return Err(ReelnoteError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let mut builder = AppConfig::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        Ok(builder.load()?)
    }

    /// The API key, trimmed. Blank counts as missing.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Builds the TMDB client these settings describe.
    pub fn tmdb_client(&self, cancel: CancelFlag) -> Result<TmdbClient> {
        let key = self.api_key().ok_or_else(|| {
            ReelnoteError::Config(
                "TMDB API key is required. Set TMDB_API_KEY or api_key in reelnote.toml"
                    .to_string(),
            )
        })?;
        Ok(TmdbClient::new(key)
            .with_base_url(&self.base_url)
            .with_image_base_url(&self.image_base_url)
            .with_timeout(self.timeout())
            .with_retry_attempts(self.retry_attempts)
            .with_cancel_flag(cancel))
    }
}
