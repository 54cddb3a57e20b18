//! # CLI Behavior
//!
//! `reelnote [OPTIONS] <PATH>` reconciles one markdown note or every note under
//! a directory.
//!
//! - Notes that already have a cover, runtime, genre tags and a TMDB id are
//!   skipped without touching the network.
//! - `--force` ignores stored ids and searches by title again.
//! - `--generate-content` also writes the generated block, limited to
//!   `--content-sections` when given.
//! - Ambiguous searches open a numbered prompt: a number selects, `s` skips
//!   the note, `q` stops the whole run.
//!
//! The API key comes from `TMDB_API_KEY` or `api_key` in `reelnote.toml`.
//!
//! ## Module Structure
//!
//! - `commands`: wiring and the run itself
//! - `print`: progress lines and the summary
//! - `select`: the terminal selector
//! - `setup`: argument parsing via clap
//! - `styles`: terminal styles

mod commands;
mod print;
mod select;
pub mod setup;
mod styles;

pub use commands::run;
