//! Shared path and mimetype helpers for filesystem operations.

/// Fallback when nothing better can be guessed.
pub(crate) const DEFAULT_MIMETYPE: &str = "application/octet-stream";

/// Normalize a path (remove trailing slashes, handle //).
pub(crate) fn normalize_path(path: &str) -> String {
    let mut result = path.to_string();
    while result.contains("//") {
        result = result.replace("//", "/");
    }
    while result.ends_with('/') && result.len() > 1 {
        result.pop();
    }
    if !result.starts_with('/') {
        result = format!("/{}", result);
    }
    result
}

/// Parent of a normalized path; the root is its own parent.
pub(crate) fn parent_path(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Last component of a normalized path.
pub(crate) fn base_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    let trimmed = parent.trim_end_matches('/');
    if trimmed.is_empty() {
        format!("/{}", name)
    } else {
        format!("{}/{}", trimmed, name)
    }
}

/// Guess a mimetype from a filename's extension.
pub(crate) fn guess_mimetype(filename: &str) -> Option<String> {
    mime_guess::from_path(filename)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
