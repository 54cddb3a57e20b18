use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use super::{file_label, reconcile, BatchReport, CmdMessage, NoteReport, RunOptions, Services};
use crate::cancel::CancelFlag;
use crate::catalog::Catalog;
use crate::content::Renderer;
use crate::error::{ReelnoteError, Result};
use crate::select::Selector;
use crate::store::NoteBackend;

/// The notes a run will visit and the directory relative paths start from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub single_file: bool,
}

impl Discovery {
    /// The message announcing what a run is about to visit.
    pub fn intro(&self) -> CmdMessage {
        if self.single_file {
            CmdMessage::info("Processing single file")
        } else {
            CmdMessage::info(format!("Found {} markdown files", self.files.len()))
        }
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

/// Resolves `path` to the markdown files to process.
///
/// A directory is walked recursively and the result is sorted; a file must
/// itself be markdown.
pub fn discover(path: &Path) -> Result<Discovery> {
    let path = fs::canonicalize(path)?;

    if path.is_dir() {
        let mut files = Vec::new();
        for entry in WalkDir::new(&path).follow_links(true) {
            let entry = entry.map_err(|err| ReelnoteError::Input(err.to_string()))?;
            if entry.file_type().is_file() && is_markdown(entry.path()) {
                files.push(entry.into_path());
            }
        }
        if files.is_empty() {
            return Err(ReelnoteError::Input(
                "no markdown files found in the directory".to_string(),
            ));
        }
        files.sort();
        return Ok(Discovery {
            root: path,
            files,
            single_file: false,
        });
    }

    if !is_markdown(&path) {
        return Err(ReelnoteError::Input(format!(
            "file must be a markdown file (.md): {}",
            path.display()
        )));
    }
    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Discovery {
        root,
        files: vec![path],
        single_file: true,
    })
}

/// Reconciles `files` in order. `on_report` sees each note as soon as it is
/// done, which lets the UI stream progress.
pub fn run_batch<C, S, R, B>(
    services: &Services<'_, C, S, R, B>,
    files: &[PathBuf],
    attachments_dir: &Path,
    options: &RunOptions,
    cancel: &CancelFlag,
    mut on_report: impl FnMut(&NoteReport),
) -> BatchReport
where
    C: Catalog,
    S: Selector,
    R: Renderer,
    B: NoteBackend,
{
    let mut batch = BatchReport::default();

    for (index, path) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            halt(&mut batch, &ReelnoteError::Cancelled);
            break;
        }

        debug!("[{}/{}] {}", index + 1, files.len(), file_label(path));
        match reconcile::run(services, path, attachments_dir, options) {
            Ok(report) => {
                on_report(&report);
                batch.record(report);
            }
            Err(err) => {
                halt(&mut batch, &err);
                break;
            }
        }
    }

    info!(
        "batch done: {} processed, {} skipped, {} failed",
        batch.processed, batch.skipped, batch.failed
    );
    batch
}

fn halt(batch: &mut BatchReport, err: &ReelnoteError) {
    warn!("stopping batch: {err}");
    batch.stopped = true;
    let text = match err {
        ReelnoteError::StopRequested => "Processing stopped by user".to_string(),
        ReelnoteError::Cancelled => "Processing cancelled".to_string(),
        other => format!("Processing stopped: {other}"),
    };
    batch.add_message(CmdMessage::warning(text));
}

/// Discovers the notes under `options.path` and reconciles them.
///
/// A relative `attachments_dir` is resolved against the discovery root.
pub fn run<C, S, R, B>(
    services: &Services<'_, C, S, R, B>,
    attachments_dir: &Path,
    options: &RunOptions,
    cancel: &CancelFlag,
    on_report: impl FnMut(&NoteReport),
) -> Result<BatchReport>
where
    C: Catalog,
    S: Selector,
    R: Renderer,
    B: NoteBackend,
{
    let discovery = discover(&options.path)?;
    let attachments = discovery.root.join(attachments_dir);
    fs::create_dir_all(&attachments)?;

    let intro = discovery.intro();

    let mut batch = run_batch(
        services,
        &discovery.files,
        &attachments,
        options,
        cancel,
        on_report,
    );
    batch.messages.insert(0, intro);
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NoteOutcome;
    use crate::content::MarkdownRenderer;
    use crate::document::Document;
    use crate::model::{FetchedMetadata, MediaKind};
    use crate::select::Selection;
    use crate::store::FsBackend;
    use crate::test_utils::{movie, ScriptedCatalog, ScriptedSelector};
    use tempfile::TempDir;

    const COMPLETE: &str = "---\ncover: attachments/c.jpg\nruntime: 90\ntags: [movie/Drama]\ntmdb_id: 1\ntmdb_type: movie\n---\n";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn discovers_markdown_recursively_and_sorted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.md", "");
        write(dir.path(), "a.MD", "");
        write(dir.path(), "nested/c.md", "");
        write(dir.path(), "notes.txt", "");

        let found = discover(dir.path()).unwrap();
        let names: Vec<String> = found
            .files
            .iter()
            .map(|p| {
                p.strip_prefix(&found.root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.MD", "b.md", "nested/c.md"]);
        assert!(!found.single_file);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "readme.txt", "");
        let err = discover(dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "no markdown files found in the directory");
    }

    #[test]
    fn single_file_uses_parent_as_root() {
        let dir = TempDir::new().unwrap();
        let note = write(dir.path(), "Heat.md", "");
        let found = discover(&note).unwrap();
        assert!(found.single_file);
        assert_eq!(found.root, fs::canonicalize(dir.path()).unwrap());
        assert_eq!(found.files.len(), 1);
    }

    #[test]
    fn non_markdown_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let note = write(dir.path(), "Heat.txt", "");
        let err = discover(&note).unwrap_err();
        assert!(err.to_string().contains("must be a markdown file"));
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            discover(&dir.path().join("nope")),
            Err(ReelnoteError::Io(_))
        ));
    }

    #[test]
    fn batch_counts_and_streams_reports() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a-complete.md", COMPLETE);
        write(dir.path(), "b-heat.md", "---\ntitle: Heat\n---\n");
        write(dir.path(), "c-unknown.md", "---\ntitle: Nothing\n---\n");

        let catalog = ScriptedCatalog::new()
            .with_search("Heat", vec![movie(949, "Heat", "1995")])
            .with_metadata(FetchedMetadata::new(949, MediaKind::Movie).with_runtime(170));
        let selector = ScriptedSelector::new();
        let backend = FsBackend::new();
        let services = Services::new(&catalog, &selector, &MarkdownRenderer, &backend);

        let mut seen = Vec::new();
        let batch = run(
            &services,
            Path::new("attachments"),
            &RunOptions::new(dir.path()),
            &CancelFlag::new(),
            |report| seen.push(report.outcome),
        )
        .unwrap();

        assert_eq!(
            seen,
            vec![NoteOutcome::Skipped, NoteOutcome::Updated, NoteOutcome::Failed]
        );
        assert_eq!((batch.processed, batch.skipped, batch.failed), (1, 1, 1));
        assert!(!batch.stopped);
        assert_eq!(batch.messages[0].content, "Found 3 markdown files");
        assert!(dir.path().join("attachments").is_dir());

        let root = fs::canonicalize(dir.path()).unwrap();
        let heat = Document::load(&backend, root.join("b-heat.md")).unwrap();
        assert_eq!(heat.cover(), Some("attachments/Heat - cover.jpg"));
        assert_eq!(
            catalog.downloads()[0].1,
            root.join("attachments").join("Heat - cover.jpg")
        );
    }

    #[test]
    fn stop_answer_ends_batch() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.md", "---\ntitle: Heat\n---\n");
        write(dir.path(), "b.md", "---\ntitle: Heat\n---\n");

        let catalog = ScriptedCatalog::new().with_search(
            "Heat",
            vec![movie(949, "Heat", "1995"), movie(1, "Heat", "1986")],
        );
        let selector = ScriptedSelector::answering([Selection::Stopped]);
        let backend = FsBackend::new();
        let services = Services::new(&catalog, &selector, &MarkdownRenderer, &backend);

        let batch = run(
            &services,
            Path::new("attachments"),
            &RunOptions::new(dir.path()),
            &CancelFlag::new(),
            |_| {},
        )
        .unwrap();

        assert!(batch.stopped);
        assert!(batch.notes.is_empty());
        assert_eq!(selector.asked().len(), 1);
        assert_eq!(
            batch.messages.last().map(|m| m.content.as_str()),
            Some("Processing stopped by user")
        );
    }

    #[test]
    fn cancelled_flag_prevents_work() {
        let dir = TempDir::new().unwrap();
        let note = write(dir.path(), "a.md", "---\ntitle: Heat\n---\n");

        let catalog = ScriptedCatalog::new();
        let selector = ScriptedSelector::new();
        let backend = FsBackend::new();
        let services = Services::new(&catalog, &selector, &MarkdownRenderer, &backend);
        let cancel = CancelFlag::new();
        cancel.cancel();

        let batch = run_batch(
            &services,
            &[note],
            Path::new("attachments"),
            &RunOptions::new(dir.path()),
            &cancel,
            |_| {},
        );

        assert!(batch.stopped);
        assert!(catalog.calls().is_empty());
    }

    #[test]
    fn single_file_run() {
        let dir = TempDir::new().unwrap();
        let note = write(dir.path(), "Heat.md", COMPLETE);

        let catalog = ScriptedCatalog::new();
        let selector = ScriptedSelector::new();
        let backend = FsBackend::new();
        let services = Services::new(&catalog, &selector, &MarkdownRenderer, &backend);

        let batch = run(
            &services,
            Path::new("attachments"),
            &RunOptions::new(&note),
            &CancelFlag::new(),
            |_| {},
        )
        .unwrap();

        assert_eq!(batch.messages[0].content, "Processing single file");
        assert_eq!(batch.skipped, 1);
    }
}
