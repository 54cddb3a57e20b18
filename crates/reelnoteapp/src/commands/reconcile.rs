use std::path::Path;

use log::debug;

use super::{file_label, generate, CmdMessage, NoteOutcome, NoteReport, RunOptions, Services};
use crate::catalog::{Candidate, Catalog};
use crate::content::Renderer;
use crate::document::Document;
use crate::error::{ReelnoteError, Result};
use crate::model::{FetchedMetadata, MediaKind};
use crate::needs::NeedFlags;
use crate::select::{Selection, Selector};
use crate::store::NoteBackend;

/// What the catalog gave us for one note.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Fetched {
    pub cover_url: Option<String>,
    pub metadata: Option<FetchedMetadata>,
}

/// Errors that end the whole batch rather than just the current note.
pub fn is_halting(err: &ReelnoteError) -> bool {
    matches!(err, ReelnoteError::StopRequested | ReelnoteError::Cancelled)
}

/// Reconciles one note. Per-note failures are reported in the returned
/// [`NoteReport`]; `Err` is reserved for halting errors.
pub fn run<C, S, R, B>(
    services: &Services<'_, C, S, R, B>,
    path: &Path,
    attachments_dir: &Path,
    options: &RunOptions,
) -> Result<NoteReport>
where
    C: Catalog,
    S: Selector,
    R: Renderer,
    B: NoteBackend,
{
    let mut report = NoteReport::new(path);

    let mut doc = match Document::load(services.backend, path) {
        Ok(doc) => doc,
        Err(err) => {
            report.add_message(CmdMessage::error(format!("Failed to read note: {err}")));
            return Ok(report.with_outcome(NoteOutcome::Failed));
        }
    };

    let title = doc.title();
    report.title = Some(title.clone());
    report.add_message(CmdMessage::info(format!("Title: {title}")));

    let flags = NeedFlags::detect(&doc);
    debug!("{}: {:?}", file_label(path), flags);

    if !flags.any() && !options.force && !options.generate_content {
        report.add_message(CmdMessage::info(
            "Already has cover, metadata, and TMDB ID, skipping",
        ));
        return Ok(report.with_outcome(NoteOutcome::Skipped));
    }

    let fetched = match fetch_required(services, &doc, &title, flags, options.force, &mut report) {
        Ok(fetched) => fetched,
        Err(err) if is_halting(&err) => return Err(err),
        Err(err) => {
            report.add_message(CmdMessage::error(format!(
                "Error fetching TMDB data: {err}"
            )));
            return Ok(report.with_outcome(NoteOutcome::Failed));
        }
    };

    let mut success = false;

    match &fetched.cover_url {
        Some(url) => match store_cover(services, &mut doc, url, attachments_dir) {
            Ok(relative) => {
                report.add_message(CmdMessage::success(format!(
                    "Downloaded and updated cover: {relative}"
                )));
                success = true;
            }
            Err(err) if is_halting(&err) => return Err(err),
            Err(err) => report.add_message(CmdMessage::error(err.to_string())),
        },
        None if flags.needs_cover => {
            report.add_message(CmdMessage::error("No cover image found"));
        }
        None => {}
    }

    match &fetched.metadata {
        Some(metadata) => match doc.update_metadata(services.backend, metadata) {
            Ok(()) => {
                describe_metadata(&mut report, metadata);
                if !flags.needs_cover {
                    success = true;
                }
            }
            Err(err) => report.add_message(CmdMessage::error(format!(
                "Failed to update metadata: {err}"
            ))),
        },
        None if flags.needs_metadata => {
            report.add_message(CmdMessage::error("No metadata found"));
        }
        None => {}
    }

    if options.generate_content {
        match generate::run(services, &mut doc, &options.sections) {
            Ok(sections) => {
                let names: Vec<&str> = sections.iter().map(|s| s.as_str()).collect();
                report.add_message(CmdMessage::success(format!(
                    "Generated content sections: {}",
                    names.join(", ")
                )));
                success = true;
            }
            Err(err) if is_halting(&err) => return Err(err),
            Err(err) => report.add_message(CmdMessage::error(format!(
                "Failed to generate content: {err}"
            ))),
        }
    }

    let outcome = if success {
        NoteOutcome::Updated
    } else {
        NoteOutcome::Failed
    };
    Ok(report.with_outcome(outcome))
}

/// Decides between a direct lookup by stored id and a fresh search, and
/// fetches only what the note needs.
pub fn fetch_required<C, S, R, B>(
    services: &Services<'_, C, S, R, B>,
    doc: &Document,
    title: &str,
    flags: NeedFlags,
    force: bool,
    report: &mut NoteReport,
) -> Result<Fetched>
where
    C: Catalog,
    S: Selector,
{
    let catalog = services.catalog;
    let stored = doc.external_id().zip(doc.external_kind());

    if let Some((id, kind)) = stored {
        if !force {
            report.add_message(CmdMessage::info(format!(
                "Using stored TMDB ID: {id} ({kind})"
            )));
            return fetch_by_id(catalog, doc, id, kind, flags, report);
        }
        report.add_message(CmdMessage::info(format!(
            "Force mode: ignoring stored TMDB ID {id} ({kind})"
        )));
    }

    let Some(chosen) = search_and_select(services, title, report)? else {
        return Ok(Fetched::default());
    };

    let metadata = catalog.metadata_by_id(chosen.id, chosen.kind)?;
    let wants_cover = flags.needs_cover || force;

    let Some(poster) = chosen.poster() else {
        report.add_message(CmdMessage::warning("Selected result has no poster"));
        return Ok(Fetched {
            cover_url: None,
            metadata: Some(metadata),
        });
    };

    let cover_url = if !wants_cover {
        None
    } else if let Some(existing) = doc.external_cover_url().filter(|_| flags.needs_cover) {
        report.add_message(CmdMessage::info(
            "Found external cover URL, will download locally",
        ));
        Some(existing.to_string())
    } else {
        Some(catalog.image_url(poster))
    };

    Ok(Fetched {
        cover_url,
        metadata: Some(metadata),
    })
}

fn fetch_by_id<C: Catalog>(
    catalog: &C,
    doc: &Document,
    id: i64,
    kind: MediaKind,
    flags: NeedFlags,
    report: &mut NoteReport,
) -> Result<Fetched> {
    if !flags.any() {
        return Ok(Fetched::default());
    }

    if !flags.needs_cover {
        return Ok(Fetched {
            cover_url: None,
            metadata: Some(catalog.metadata_by_id(id, kind)?),
        });
    }

    if let Some(existing) = doc.external_cover_url() {
        report.add_message(CmdMessage::info(
            "Found external cover URL, will download locally",
        ));
        return Ok(Fetched {
            cover_url: Some(existing.to_string()),
            metadata: Some(catalog.metadata_by_id(id, kind)?),
        });
    }

    let cover_url = match catalog.cover_url_by_id(id, kind) {
        Ok(url) => Some(url),
        Err(ReelnoteError::NoPoster) => {
            report.add_message(CmdMessage::warning("No poster available on TMDB"));
            None
        }
        Err(err) => return Err(err),
    };
    Ok(Fetched {
        cover_url,
        metadata: Some(catalog.metadata_by_id(id, kind)?),
    })
}

fn search_and_select<C, S, R, B>(
    services: &Services<'_, C, S, R, B>,
    title: &str,
    report: &mut NoteReport,
) -> Result<Option<Candidate>>
where
    C: Catalog,
    S: Selector,
{
    let mut candidates = services
        .catalog
        .search_multi(title, services.search_limit)?;

    match candidates.len() {
        0 => {
            report.add_message(CmdMessage::warning("No results found"));
            Ok(None)
        }
        1 => {
            let chosen = candidates.remove(0);
            report.add_message(CmdMessage::info(format!(
                "Found {}: {}",
                chosen.kind.label(),
                chosen.title
            )));
            Ok(Some(chosen))
        }
        count => {
            report.add_message(CmdMessage::info(format!(
                "Found {count} results, asking for a choice"
            )));
            match services.selector.select(title, &candidates) {
                Selection::Selected(chosen) => {
                    report.add_message(CmdMessage::info(format!(
                        "Selected {}: {}",
                        chosen.kind.label(),
                        chosen.title
                    )));
                    Ok(Some(chosen))
                }
                Selection::Skipped => {
                    report.add_message(CmdMessage::info("Selection skipped by user"));
                    Ok(None)
                }
                Selection::Stopped => Err(ReelnoteError::StopRequested),
            }
        }
    }
}

fn store_cover<C, S, R, B>(
    services: &Services<'_, C, S, R, B>,
    doc: &mut Document,
    url: &str,
    attachments_dir: &Path,
) -> Result<String>
where
    C: Catalog,
    B: NoteBackend,
{
    let local = doc.local_cover_path(attachments_dir);
    services
        .catalog
        .download_image(url, &local, services.cover_max_width)
        .map_err(|err| match err {
            err if is_halting(&err) => err,
            err => ReelnoteError::Input(format!("Failed to download image: {err}")),
        })?;
    let relative = doc.relative_cover_path(&local)?;
    doc.update_cover(services.backend, &relative)
        .map_err(|err| ReelnoteError::Input(format!("Failed to update cover: {err}")))?;
    Ok(relative)
}

fn describe_metadata(report: &mut NoteReport, metadata: &FetchedMetadata) {
    if let Some(runtime) = metadata.runtime {
        report.add_message(CmdMessage::success(format!(
            "Added runtime: {runtime} minutes"
        )));
    }
    if let Some(episodes) = metadata.total_episodes {
        report.add_message(CmdMessage::success(format!(
            "Added total episodes: {episodes}"
        )));
    }
    if !metadata.genre_tags.is_empty() {
        report.add_message(CmdMessage::success(format!(
            "Added genres: {}",
            metadata.genre_tags.join(", ")
        )));
    }
    report.add_message(CmdMessage::success(format!(
        "Stored TMDB ID: {} ({})",
        metadata.external_id, metadata.external_kind
    )));
}
