//! # Reelnote CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/reelnoteapp/`: the library with all reconciliation logic
//! - `crates/reelnote/`: this CLI, a client of the library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/reelnote/src/cli/)                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - logging, config and API wiring (commands.rs)             │
//! │  - interactive result selection (select.rs)                 │
//! │  - progress and summary output (print.rs, styles.rs)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/reelnoteapp/src/api.rs)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from the API inward returns reports instead of printing. The CLI
//! owns every user-facing concern: arguments, prompts, colours, exit codes.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
