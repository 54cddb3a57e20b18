//! # Reelnote Architecture
//!
//! Reelnote keeps a folder of movie and TV notes in sync with TMDB: it fills
//! in the cover image, runtime, episode count, genre tags and TMDB id in each
//! note's YAML frontmatter, and can maintain a generated block of overview and
//! info sections in the note body.
//!
//! Like any tool that edits user files, it is a library first. The CLI is a
//! thin client.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (reelnote crate)                                       │
//! │  - Arguments, logging setup, prompts, terminal output       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the collaborators, resolves paths                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Per-note reconciliation, content generation, batching    │
//! └─────────────────────────────────────────────────────────────┘
//!          │                   │                      │
//!          ▼                   ▼                      ▼
//!    document.rs         catalog/ (TMDB)          store/
//! ```
//!
//! ## Key Principle: No Terminal in Core
//!
//! Nothing in this crate writes to stdout or stderr or exits the process.
//! Progress comes back as [`commands::CmdMessage`]s inside reports, and
//! diagnostics go through `log`. Interactive choices are delegated to a
//! [`select::Selector`].
//!
//! ## Module Overview
//!
//! - [`api`]: the facade every UI talks to
//! - [`commands`]: reconcile, generate, batch processing
//! - [`document`]: a note as header plus body, load and save
//! - [`header`]: typed frontmatter values
//! - [`block`]: the generated content block inside the body
//! - [`needs`]: what a note is missing
//! - [`catalog`]: the TMDB client, retry policy and cover pipeline
//! - [`content`]: markdown rendering of TMDB details
//! - [`select`]: choosing between ambiguous search results
//! - [`store`]: raw note I/O
//! - [`config`]: layered configuration
//! - [`cancel`]: cooperative cancellation
//! - [`paths`]: filename and relative path helpers
//! - [`model`]: media kinds, fetched metadata, genre tags
//! - [`error`]: error types

pub mod api;
pub mod block;
pub mod cancel;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod header;
pub mod model;
pub mod needs;
pub mod paths;
pub mod select;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use api::ReelnoteApi;
pub use error::{ReelnoteError, Result};
