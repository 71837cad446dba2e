//! URI ↔ filesystem path conversion and normalization.
//!
//! The engine keys documents and project scopes by URI string throughout,
//! but needs filesystem paths whenever it walks a project root or reads a
//! file from disk. This crate is the single place that conversion happens,
//! so drive-letter casing and percent-encoding are normalized consistently
//! everywhere.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

use std::path::{Path, PathBuf};
use url::Url;

/// Converts a `file://` URI to a filesystem path. Returns `None` for any
/// other scheme (e.g. a virtual jar-entry URI opened read-only by the
/// editor).
pub fn uri_to_fs_path(uri: &str) -> Option<PathBuf> {
    let url = Url::parse(uri).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

/// Converts a filesystem path to a `file://` URI, making it absolute
/// against the current directory first if necessary.
pub fn fs_path_to_uri<P: AsRef<Path>>(path: P) -> Result<String, String> {
    let path = path.as_ref();
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| format!("failed to resolve current directory: {e}"))?
            .join(path)
    };
    Url::from_file_path(&abs).map(|u| u.to_string()).map_err(|_| format!("not a valid path: {}", abs.display()))
}

/// True if `uri` uses the `file` scheme.
pub fn is_file_uri(uri: &str) -> bool {
    Url::parse(uri).map(|u| u.scheme() == "file").unwrap_or(false)
}

/// True if `uri` uses a scheme other than `file` and `untitled` — e.g. a
/// jar-entry or zip-entry URI exposed by the editor for library sources,
/// which the compilation-unit factory must skip rather than try to read.
pub fn is_special_scheme(uri: &str) -> bool {
    match Url::parse(uri) {
        Ok(u) => !matches!(u.scheme(), "file" | "untitled"),
        Err(_) => false,
    }
}

/// A normalized key for a URI, suitable for use as a `HashMap` key. Lowercases
/// a Windows drive letter so `file:///C:/x` and `file:///c:/x` collide, and
/// re-serializes through the URL parser so equivalent percent-encodings
/// compare equal.
pub fn uri_key(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(url) => normalize_drive_letter(url.as_str()),
        Err(_) => normalize_drive_letter(uri),
    }
}

fn normalize_drive_letter(s: &str) -> String {
    // `file:///C:/...` -> `file:///c:/...`
    if let Some(rest) = s.strip_prefix("file:///") {
        let bytes = rest.as_bytes();
        if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
            let mut out = String::with_capacity(s.len());
            out.push_str("file:///");
            out.push(bytes[0].to_ascii_lowercase() as char);
            out.push_str(&rest[1..]);
            return out;
        }
    }
    s.to_string()
}

/// The file extension of a URI's path component, if any (without the dot).
pub fn uri_extension(uri: &str) -> Option<String> {
    let path = Url::parse(uri).ok()?;
    Path::new(path.path()).extension().and_then(|e| e.to_str()).map(str::to_owned)
}
