use log::debug;

use super::Services;
use crate::catalog::Catalog;
use crate::content::{Renderer, Section};
use crate::document::Document;
use crate::error::{ReelnoteError, Result};
use crate::store::NoteBackend;

/// Regenerates the content block of `doc` from its stored id and type.
///
/// Returns the sections that were requested, with an empty request resolved
/// to the defaults for the note's media kind.
pub fn run<C, S, R, B>(
    services: &Services<'_, C, S, R, B>,
    doc: &mut Document,
    sections: &[Section],
) -> Result<Vec<Section>>
where
    C: Catalog,
    R: Renderer,
    B: NoteBackend,
{
    let id = doc.external_id().ok_or(ReelnoteError::MissingExternalId)?;
    let kind = doc
        .external_kind()
        .ok_or(ReelnoteError::MissingExternalType)?;

    let details = services.catalog.full_details(id, kind)?;
    if details.is_empty() {
        return Err(ReelnoteError::EmptyDetails);
    }

    let sections = if sections.is_empty() {
        Section::defaults_for(kind)
    } else {
        sections.to_vec()
    };

    let content = services.renderer.render(&details, kind, &sections);
    if content.trim().is_empty() {
        return Err(ReelnoteError::NoContentGenerated);
    }
    debug!("rendered {} bytes for {kind} {id}", content.len());

    doc.update_body_content(services.backend, &content)?;
    Ok(sections)
}
