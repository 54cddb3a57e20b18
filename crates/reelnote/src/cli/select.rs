//! Numbered terminal prompt for ambiguous search results.
//!
//! The list and prompt go to stderr so stdout stays a clean progress log.
//! Reading input fails on a closed stdin; that ends the run rather than
//! guessing.

use console::Term;
use log::debug;
use reelnoteapp::catalog::Candidate;
use reelnoteapp::select::{Selection, Selector};

use super::styles::STYLES;

const OVERVIEW_WIDTH: usize = 80;
const MAX_INVALID_ANSWERS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Pick(usize),
    Skip,
    Stop,
}

/// Interprets one line of input against `count` candidates. Numbers are
/// 1-based.
pub fn parse_choice(input: &str, count: usize) -> Option<Choice> {
    match input.trim().to_ascii_lowercase().as_str() {
        "s" | "skip" => Some(Choice::Skip),
        "q" | "quit" | "stop" => Some(Choice::Stop),
        other => other
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=count).contains(n))
            .map(|n| Choice::Pick(n - 1)),
    }
}

fn truncate(text: &str, width: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

pub fn format_candidate(index: usize, candidate: &Candidate) -> String {
    let mut line = format!(
        "{} {} ({}) {}",
        STYLES.index.apply_to(format!("{:>2})", index + 1)),
        STYLES.title.apply_to(&candidate.title),
        candidate.display_year(),
        STYLES.muted.apply_to(format!("[{}]", candidate.kind.label())),
    );
    if candidate.vote_average > 0.0 {
        line.push_str(&format!(" ⭐ {:.1}", candidate.vote_average));
    }
    if !candidate.overview.trim().is_empty() {
        line.push_str(&format!(
            "\n    {}",
            STYLES.muted.apply_to(truncate(&candidate.overview, OVERVIEW_WIDTH))
        ));
    }
    line
}

#[derive(Debug)]
pub struct TerminalSelector {
    term: Term,
}

impl Default for TerminalSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSelector {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn ask(&self, title: &str, candidates: &[Candidate]) -> std::io::Result<Choice> {
        self.term.write_line("")?;
        self.term.write_line(&format!(
            "{}",
            STYLES
                .heading
                .apply_to(format!("Select a match for \"{title}\":"))
        ))?;
        for (index, candidate) in candidates.iter().enumerate() {
            self.term.write_line(&format_candidate(index, candidate))?;
        }

        for _ in 0..MAX_INVALID_ANSWERS {
            self.term.write_str(&format!(
                "Choose 1-{}, s to skip, q to stop: ",
                candidates.len()
            ))?;
            let line = self.term.read_line()?;
            if let Some(choice) = parse_choice(&line, candidates.len()) {
                return Ok(choice);
            }
            self.term
                .write_line(&STYLES.warning.apply_to("Invalid choice").to_string())?;
        }
        Ok(Choice::Skip)
    }
}

impl Selector for TerminalSelector {
    fn select(&self, title: &str, candidates: &[Candidate]) -> Selection {
        match self.ask(title, candidates) {
            Ok(Choice::Pick(index)) => candidates
                .get(index)
                .cloned()
                .map_or(Selection::Skipped, Selection::Selected),
            Ok(Choice::Skip) => Selection::Skipped,
            Ok(Choice::Stop) => Selection::Stopped,
            Err(err) => {
                debug!("selection prompt failed: {err}");
                Selection::Stopped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelnoteapp::model::MediaKind;

    #[test]
    fn parses_numbers_within_range() {
        assert_eq!(parse_choice("1", 3), Some(Choice::Pick(0)));
        assert_eq!(parse_choice(" 3\n", 3), Some(Choice::Pick(2)));
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("abc", 3), None);
    }

    #[test]
    fn parses_skip_and_stop() {
        assert_eq!(parse_choice("s", 2), Some(Choice::Skip));
        assert_eq!(parse_choice("S", 2), Some(Choice::Skip));
        assert_eq!(parse_choice("q", 2), Some(Choice::Stop));
        assert_eq!(parse_choice("stop", 2), Some(Choice::Stop));
    }

    #[test]
    fn candidate_line_shows_year_and_kind() {
        console::set_colors_enabled(false);
        let candidate = Candidate::new(949, MediaKind::Movie, "Heat")
            .with_release_date("1995-12-15")
            .with_vote_average(7.9)
            .with_overview("A group of high-end professional thieves.");
        assert_eq!(
            format_candidate(0, &candidate),
            " 1) Heat (1995) [movie] ⭐ 7.9\n    A group of high-end professional thieves."
        );
    }

    #[test]
    fn long_overviews_are_truncated() {
        let text = "word ".repeat(40);
        let short = truncate(&text, 20);
        assert!(short.ends_with("..."));
        assert!(short.chars().count() <= 20);
    }
}
