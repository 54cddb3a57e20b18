use reelnoteapp::commands::{BatchReport, CmdMessage, MessageLevel, NoteReport};
use std::path::Path;

use super::styles::STYLES;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn format_message(message: &CmdMessage) -> String {
    match message.level {
        MessageLevel::Info => format!("  {}", message.content),
        MessageLevel::Success => STYLES
            .success
            .apply_to(format!("  ✓ {}", message.content))
            .to_string(),
        MessageLevel::Warning => STYLES
            .warning
            .apply_to(format!("  ⚠ {}", message.content))
            .to_string(),
        MessageLevel::Error => STYLES
            .error
            .apply_to(format!("  ✗ {}", message.content))
            .to_string(),
    }
}

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        println!("{}", format_message(message));
    }
}

/// Prints one note as soon as it has been reconciled.
pub fn print_note(report: &NoteReport) {
    println!();
    println!(
        "{}",
        STYLES
            .heading
            .apply_to(format!("Processing: {}", file_name(&report.path)))
    );
    print_messages(&report.messages);
}

pub fn render_summary(batch: &BatchReport) -> String {
    format!(
        "=== Summary ===\nProcessed: {}\nSkipped: {}\nFailed: {}",
        batch.processed, batch.skipped, batch.failed
    )
}

pub fn print_summary(batch: &BatchReport) {
    if !batch.messages.is_empty() {
        println!();
        print_messages(&batch.messages);
    }
    println!();
    println!("{}", render_summary(batch));
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelnoteapp::commands::NoteOutcome;

    #[test]
    fn summary_lists_counts() {
        let mut batch = BatchReport::default();
        batch.record(NoteReport::new("a.md").with_outcome(NoteOutcome::Updated));
        batch.record(NoteReport::new("b.md").with_outcome(NoteOutcome::Skipped));
        batch.record(NoteReport::new("c.md").with_outcome(NoteOutcome::Skipped));
        assert_eq!(
            render_summary(&batch),
            "=== Summary ===\nProcessed: 1\nSkipped: 2\nFailed: 0"
        );
    }

    #[test]
    fn messages_are_marked_by_level() {
        console::set_colors_enabled(false);
        assert_eq!(format_message(&CmdMessage::info("Title: Heat")), "  Title: Heat");
        assert_eq!(
            format_message(&CmdMessage::success("Added runtime: 170 minutes")),
            "  ✓ Added runtime: 170 minutes"
        );
        assert_eq!(
            format_message(&CmdMessage::error("No cover image found")),
            "  ✗ No cover image found"
        );
        assert_eq!(
            format_message(&CmdMessage::warning("No results found")),
            "  ⚠ No results found"
        );
    }
}
