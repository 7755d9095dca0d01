//! Helpers for the absolute, slash separated paths used throughout the adapter.

pub const ROOT: &str = "/";

pub fn is_root(path: &str) -> bool {
    path.trim_end_matches('/').is_empty()
}

/// Parent directory of `path`; the root is its own parent.
pub fn parent_of(path: &str) -> &str {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some(("", _)) | None => ROOT,
        Some((parent, _)) => parent,
    }
}

/// Final segment of `path`, empty for the root.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit_once('/').map_or(trimmed, |(_, name)| name)
}

pub fn join(parent: &str, name: &str) -> String {
    if is_root(parent) {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}
