//! Filename and relative-path helpers for cover images.

use std::path::{Component, Path, PathBuf};

const INVALID_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const MAX_FILENAME_BYTES: usize = 200;

/// Replaces characters that are invalid in filenames on common platforms with
/// `_`, trims dots and spaces from both ends and caps the length.
pub fn sanitize_filename(name: &str) -> String {
    let replaced = name.replace(INVALID_FILENAME_CHARS, "_");
    let trimmed = replaced.trim_matches(|c| c == '.' || c == ' ');
    truncate_at_char_boundary(trimmed, MAX_FILENAME_BYTES).to_string()
}

fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Path from `base` (a directory) to `target`, or `None` when one cannot be
/// expressed (mixed absolute/relative inputs, or `..` in the unmatched part of
/// `base`).
pub fn relative_path(base: &Path, target: &Path) -> Option<PathBuf> {
    let base: Vec<Component> = base
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let target: Vec<Component> = target
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if is_rooted(&base) != is_rooted(&target) {
        return None;
    }

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if base[common..]
        .iter()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in &target[common..] {
        out.push(component.as_os_str());
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    Some(out)
}

fn is_rooted(components: &[Component]) -> bool {
    matches!(
        components.first(),
        Some(Component::RootDir) | Some(Component::Prefix(_))
    )
}

/// Joins path components with `/` regardless of platform, the form notes store.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_reserved_characters() {
        assert_eq!(
            sanitize_filename("Mission: Impossible - cover.jpg"),
            "Mission_ Impossible - cover.jpg"
        );
        assert_eq!(sanitize_filename("AC/DC? * - cover.jpg"), "AC_DC_ _ - cover.jpg");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_filename(" ..Se7en.. "), "Se7en");
    }

    #[test]
    fn caps_length_on_char_boundary() {
        let long = "é".repeat(150);
        let out = sanitize_filename(&long);
        assert!(out.len() <= 200);
        assert_eq!(out.chars().count(), 100);
    }

    #[test]
    fn relative_path_into_sibling_dir() {
        let rel = relative_path(
            Path::new("/vault/movies"),
            Path::new("/vault/attachments/Heat - cover.jpg"),
        )
        .unwrap();
        assert_eq!(to_slash(&rel), "../attachments/Heat - cover.jpg");
    }

    #[test]
    fn relative_path_into_child_dir() {
        let rel = relative_path(
            Path::new("/vault"),
            Path::new("/vault/attachments/Heat - cover.jpg"),
        )
        .unwrap();
        assert_eq!(to_slash(&rel), "attachments/Heat - cover.jpg");
    }

    #[test]
    fn relative_path_ignores_cur_dir() {
        let rel = relative_path(Path::new("./notes"), Path::new("notes/attachments/x.jpg")).unwrap();
        assert_eq!(to_slash(&rel), "attachments/x.jpg");
    }

    #[test]
    fn relative_path_rejects_mixed_roots() {
        assert!(relative_path(Path::new("notes"), Path::new("/abs/x.jpg")).is_none());
    }
}
