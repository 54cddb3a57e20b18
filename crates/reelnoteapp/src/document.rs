//! # Note Documents
//!
//! A note is a markdown file with optional YAML frontmatter:
//!
//! ```text
//! ---
//! title: Heat
//! cover: ../attachments/Heat - cover.jpg
//! tmdb_id: 949
//! tmdb_type: movie
//! ---
//! # Heat
//!
//! Body text.
//! ```
//!
//! ## Parsing
//!
//! The header is recognised only when the first line is exactly `---`, and it
//! ends at the next line that is exactly `---`. A missing closing line, invalid
//! YAML, or YAML that is not a mapping all fall back to an empty header with
//! the whole text as body. Parsing never fails.
//!
//! ## Persisting
//!
//! Saving always writes both delimiter lines, the YAML only when the header has
//! keys, then the body with leading blank lines stripped and exactly one
//! trailing newline. After the atomic write the note is loaded again so the
//! in-memory state is whatever a later run would see.
//!
//! Every `update_*` method persists. The `set_*`/`apply_*` counterparts only
//! change the in-memory document, which lets callers batch several changes into
//! one write.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::block;
use crate::error::{ReelnoteError, Result};
use crate::header::{header_to_mapping, mapping_to_header, Header, HeaderValue};
use crate::model::{FetchedMetadata, MediaKind};
use crate::paths::{relative_path, sanitize_filename, to_slash};
use crate::store::NoteBackend;

pub const DELIMITER: &str = "---";

pub const KEY_TITLE: &str = "title";
pub const KEY_COVER: &str = "cover";
pub const KEY_RUNTIME: &str = "runtime";
pub const KEY_TOTAL_EPISODES: &str = "total_episodes";
pub const KEY_TAGS: &str = "tags";
pub const KEY_TMDB_ID: &str = "tmdb_id";
pub const KEY_TMDB_TYPE: &str = "tmdb_type";

const COVER_SUFFIX: &str = " - cover.jpg";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    path: PathBuf,
    header: Header,
    body: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, header: Header, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            header,
            body: body.into(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Self {
        let path = path.into();
        let parsed = split_frontmatter(text)
            .and_then(|(yaml, body)| parse_header(yaml).map(|header| (header, body)));

        match parsed {
            Some((header, body)) => Self::new(path, header, body),
            None => Self::new(path, Header::new(), text),
        }
    }

    pub fn load<B: NoteBackend>(backend: &B, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = backend.read_note(&path)?;
        Ok(Self::parse(path, &text))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn serialize(&self) -> Result<String> {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        if !self.header.is_empty() {
            let yaml = serde_yaml::to_string(&header_to_mapping(&self.header))?;
            out.push_str(&yaml);
            if !yaml.ends_with('\n') {
                out.push('\n');
            }
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(self.body.trim_start_matches(['\n', '\r']));
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }

    /// Writes the note and reloads it from the backend.
    pub fn save<B: NoteBackend>(&mut self, backend: &B) -> Result<()> {
        let text = self.serialize()?;
        backend.write_note(&self.path, &text)?;
        self.reload(backend)
    }

    fn reload<B: NoteBackend>(&mut self, backend: &B) -> Result<()> {
        let fresh = Self::load(backend, self.path.clone())?;
        self.header = fresh.header;
        self.body = fresh.body;
        Ok(())
    }

    /// Subject used for catalog searches and cover filenames.
    pub fn title(&self) -> String {
        if let Some(title) = self
            .header
            .get(KEY_TITLE)
            .and_then(HeaderValue::to_scalar_string)
        {
            let title = title.trim();
            if !title.is_empty() {
                return title.to_string();
            }
        }

        for line in self.body.lines() {
            if let Some(heading) = line.trim().strip_prefix("# ") {
                let heading = heading.trim();
                if !heading.is_empty() {
                    return heading.to_string();
                }
            }
        }

        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn cover(&self) -> Option<&str> {
        self.header
            .get(KEY_COVER)
            .and_then(HeaderValue::as_str)
            .filter(|cover| !cover.is_empty())
    }

    /// True when there is no usable local cover: absent, a colour placeholder
    /// such as `#1A2B3C`, or a remote URL.
    pub fn needs_cover(&self) -> bool {
        match self.cover() {
            None => true,
            Some(cover) => is_color_code(cover) || cover.starts_with("http"),
        }
    }

    pub fn has_external_cover_url(&self) -> bool {
        self.external_cover_url().is_some()
    }

    pub fn external_cover_url(&self) -> Option<&str> {
        self.cover()
            .filter(|cover| !is_color_code(cover) && cover.starts_with("http"))
    }

    pub fn external_id(&self) -> Option<i64> {
        self.header
            .get(KEY_TMDB_ID)
            .and_then(HeaderValue::as_integral)
    }

    pub fn external_kind(&self) -> Option<MediaKind> {
        self.header
            .get(KEY_TMDB_TYPE)
            .and_then(HeaderValue::as_str)
            .and_then(|kind| MediaKind::parse(kind.trim()))
    }

    /// Existing tags. A lone string is treated as a one-element list and
    /// numeric items are kept as text so merging never drops user tags.
    pub fn tags(&self) -> Vec<String> {
        match self.header.get(KEY_TAGS) {
            Some(HeaderValue::List(items)) => items
                .iter()
                .filter_map(HeaderValue::to_scalar_string)
                .filter(|tag| !tag.is_empty())
                .collect(),
            Some(HeaderValue::String(tag)) if !tag.is_empty() => vec![tag.clone()],
            _ => Vec::new(),
        }
    }

    pub fn set_cover(&mut self, cover: &str) {
        self.header
            .insert(KEY_COVER.to_string(), HeaderValue::from(cover));
    }

    /// Overwrites present fields, merges genre tags. Absent fields are left
    /// alone.
    pub fn apply_metadata(&mut self, metadata: &FetchedMetadata) {
        if let Some(runtime) = metadata.runtime {
            self.header
                .insert(KEY_RUNTIME.to_string(), HeaderValue::Int(runtime));
        }
        if let Some(episodes) = metadata.total_episodes {
            self.header
                .insert(KEY_TOTAL_EPISODES.to_string(), HeaderValue::Int(episodes));
        }
        if !metadata.genre_tags.is_empty() {
            let merged: BTreeSet<String> = self
                .tags()
                .into_iter()
                .chain(metadata.genre_tags.iter().cloned())
                .collect();
            self.header.insert(
                KEY_TAGS.to_string(),
                HeaderValue::from(merged.into_iter().collect::<Vec<_>>()),
            );
        }
        self.header.insert(
            KEY_TMDB_ID.to_string(),
            HeaderValue::Int(metadata.external_id),
        );
        self.header.insert(
            KEY_TMDB_TYPE.to_string(),
            HeaderValue::from(metadata.external_kind.as_str()),
        );
    }

    pub fn update_cover<B: NoteBackend>(&mut self, backend: &B, cover: &str) -> Result<()> {
        self.save_or_restore(backend, |doc| doc.set_cover(cover))
    }

    pub fn update_metadata<B: NoteBackend>(
        &mut self,
        backend: &B,
        metadata: &FetchedMetadata,
    ) -> Result<()> {
        self.save_or_restore(backend, |doc| doc.apply_metadata(metadata))
    }

    pub fn update_body_content<B: NoteBackend>(&mut self, backend: &B, content: &str) -> Result<()> {
        let body = block::merge_block(&self.body, content)?;
        self.save_or_restore(backend, |doc| doc.body = body)
    }

    /// Applies `change` and saves. If the note cannot be written, header and
    /// body go back to what they were, so memory keeps matching the file.
    fn save_or_restore<B, F>(&mut self, backend: &B, change: F) -> Result<()>
    where
        B: NoteBackend,
        F: FnOnce(&mut Self),
    {
        let header = self.header.clone();
        let body = self.body.clone();
        change(self);
        let written = self
            .serialize()
            .and_then(|text| backend.write_note(&self.path, &text));
        if let Err(err) = written {
            self.header = header;
            self.body = body;
            return Err(err);
        }
        self.reload(backend)
    }

    /// Where this note's cover image lives inside `attachments_dir`.
    pub fn local_cover_path(&self, attachments_dir: &Path) -> PathBuf {
        let file_name = sanitize_filename(&format!("{}{}", self.title(), COVER_SUFFIX));
        attachments_dir.join(file_name)
    }

    /// `local` expressed relative to the note's directory, with `/` separators.
    pub fn relative_cover_path(&self, local: &Path) -> Result<String> {
        let note_dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        relative_path(note_dir, local)
            .map(|rel| to_slash(&rel))
            .ok_or_else(|| {
                ReelnoteError::Input(format!(
                    "cannot express {} relative to {}",
                    local.display(),
                    note_dir.display()
                ))
            })
    }
}

/// Splits `text` into `(yaml, body)` when it opens with a delimiter line and a
/// closing delimiter line follows.
fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let first_end = text.find('\n')?;
    if text[..first_end].trim_end_matches('\r') != DELIMITER {
        return None;
    }
    let rest = &text[first_end + 1..];

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn parse_header(yaml: &str) -> Option<Header> {
    if yaml.trim().is_empty() {
        return Some(Header::new());
    }
    match serde_yaml::from_str::<serde_yaml::Value>(yaml) {
        Ok(serde_yaml::Value::Mapping(map)) => Some(mapping_to_header(map)),
        Ok(serde_yaml::Value::Null) => Some(Header::new()),
        Ok(_) | Err(_) => None,
    }
}

fn is_color_code(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit)
}
