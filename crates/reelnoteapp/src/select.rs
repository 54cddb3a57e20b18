//! Choosing between ambiguous search results.
//!
//! When a title search returns more than one candidate the batch asks a
//! [`Selector`]. The answer is a plain value, and stopping the whole batch is
//! one of the answers rather than an error.

use crate::catalog::Candidate;

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Selected(Candidate),
    /// Leave this note alone and continue with the next one.
    Skipped,
    /// Abort the batch.
    Stopped,
}

pub trait Selector {
    fn select(&self, title: &str, candidates: &[Candidate]) -> Selection;
}

impl<S: Selector + ?Sized> Selector for &S {
    fn select(&self, title: &str, candidates: &[Candidate]) -> Selection {
        (**self).select(title, candidates)
    }
}
