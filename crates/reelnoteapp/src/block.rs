//! # Generated Content Block
//!
//! Generated sections live inside the note body between two sentinel lines:
//!
//! ```text
//! My own notes about the film.
//!
//! <!-- TMDB_DATA_START -->
//! ## Overview
//! ...
//! <!-- TMDB_DATA_END -->
//! ```
//!
//! Everything outside the sentinels belongs to the user and is preserved.
//!
//! ## Merge Rules
//!
//! - **Valid block** (a start marker with an end marker after it): the block is
//!   replaced. Text before and after loses its surrounding blank lines and
//!   trailing whitespace, and is separated from the block by one blank line; an
//!   empty side is omitted.
//! - **No valid block** (no markers, one marker alone, end before start): a new
//!   block is appended after the body, trimmed the same way, with a blank line
//!   in between when the body is non-empty. Sharing the trim with the replace
//!   path means the second merge sees exactly what the first one wrote.
//!
//! Indentation on the first non-blank line is user text and is kept, so an
//! indented code block at the top of a note survives.
//!
//! Replacing twice with the same content yields the same body, so re-running a
//! batch never duplicates markers or accumulates blank lines.
//!
//! A stray marker without its pair is left where it is; the append path does not
//! strip it. This mirrors long-standing behaviour and is a known rough edge.

use crate::error::{ReelnoteError, Result};

pub const START_MARKER: &str = "<!-- TMDB_DATA_START -->";
pub const END_MARKER: &str = "<!-- TMDB_DATA_END -->";

/// Returns the `(start, end)` byte offsets of a well-formed block, where `end`
/// points just past the end marker.
///
/// The block is the last start marker that is followed by an end marker, paired
/// with the first end marker after it. An orphaned start marker earlier in the
/// body therefore never captures a block appended after it.
pub fn find_block(body: &str) -> Option<(usize, usize)> {
    body.rmatch_indices(START_MARKER).find_map(|(start, _)| {
        let search_from = start + START_MARKER.len();
        body[search_from..]
            .find(END_MARKER)
            .map(|offset| (start, search_from + offset + END_MARKER.len()))
    })
}

pub fn has_block(body: &str) -> bool {
    find_block(body).is_some()
}

pub fn merge_block(body: &str, content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ReelnoteError::EmptyContent);
    }

    match find_block(body) {
        Some((start, end)) => Ok(replace_block(body, start, end, content)),
        None => Ok(append_block(body, content)),
    }
}

fn replace_block(body: &str, start: usize, end: usize, content: &str) -> String {
    let before = trim_blank_lines(&body[..start]);
    let after = trim_blank_lines(&body[end..]);

    let mut out = String::new();
    if !before.is_empty() {
        out.push_str(before);
        out.push_str("\n\n");
    }
    push_block(&mut out, content);
    if !after.is_empty() {
        out.push_str("\n\n");
        out.push_str(after);
    }
    out.push('\n');
    out
}

fn append_block(body: &str, content: &str) -> String {
    let existing = trim_blank_lines(body);
    let mut out = String::new();
    if !existing.is_empty() {
        out.push_str(existing);
        out.push_str("\n\n");
    }
    push_block(&mut out, content);
    out.push('\n');
    out
}

/// Drops leading blank lines and trailing whitespace.
fn trim_blank_lines(text: &str) -> &str {
    let text = text.trim_end();
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }
    &text[start..]
}

fn push_block(out: &mut String, content: &str) {
    out.push_str(START_MARKER);
    out.push('\n');
    out.push_str(content);
    out.push('\n');
    out.push_str(END_MARKER);
}
