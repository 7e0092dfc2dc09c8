//! Turns a raw `$ref` string into a target document and pointer path.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::ReferenceError;
use crate::pointer;
use crate::types::{DocumentId, PointerSegment};

/// `scheme://...` per RFC 3986 scheme syntax.
static URI_SCHEME: LazyLock<Option<Regex>> =
    LazyLock::new(|| return Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").ok());

/// `C:\` or `C:/`, recognized on every host OS.
static WINDOWS_DRIVE: LazyLock<Option<Regex>> =
    LazyLock::new(|| return Regex::new(r"^[A-Za-z]:[\\/]").ok());

/// Where a reference points. A location is a candidate only: the target
/// file may not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Text before the `#`, trimmed, empty for the current document.
    pub file_part: String,
    /// Decoded pointer path.
    pub pointer: Vec<PointerSegment>,
    /// `#` plus the pointer part, or empty when there is no pointer part.
    pub pointer_display: String,
    /// Text after the `#`, as written.
    pub pointer_part: String,
    /// Document the reference designates.
    pub target: DocumentId,
}

/// Resolve a raw reference against the document it appears in.
///
/// An empty file part means `base`. A `file://` URI or an absolute path is
/// taken as-is; anything else is relative to `base`'s directory.
///
/// # Errors
///
/// Returns `ReferenceError::UnsupportedScheme` for non-`file` URIs and
/// `ReferenceError::MalformedReference` when a URI cannot be parsed or
/// does not denote a local path.
pub fn locate(base: &DocumentId, raw: &str) -> Result<Location, ReferenceError> {
    let trimmed = raw.trim();
    let (file_part, pointer_part) = trimmed.split_once('#').unwrap_or((trimmed, ""));

    let target = if file_part.is_empty() {
        base.clone()
    } else if is_windows_absolute(file_part) {
        DocumentId::new(file_part)
    } else if has_uri_scheme(file_part) {
        DocumentId::new(file_uri_to_path(file_part)?)
    } else {
        // Absolute POSIX paths replace the base directory when joined.
        DocumentId::new(base.directory().join(file_part))
    };

    let pointer_display = if pointer_part.is_empty() {
        String::new()
    } else {
        format!("#{pointer_part}")
    };

    return Ok(Location {
        file_part: file_part.to_string(),
        pointer: pointer::decode(pointer_part),
        pointer_display,
        pointer_part: pointer_part.to_string(),
        target,
    });
}

/// Parse a `file://` URI into a local path.
///
/// # Errors
///
/// Returns `ReferenceError::MalformedReference` if the URI does not parse or has
/// no local path, `ReferenceError::UnsupportedScheme` for any other scheme.
fn file_uri_to_path(file_part: &str) -> Result<PathBuf, ReferenceError> {
    let url = Url::parse(file_part).map_err(|e| {
        return ReferenceError::MalformedReference {
            reason: e.to_string(),
            reference: file_part.to_string(),
        };
    })?;
    if url.scheme() != "file" {
        return Err(ReferenceError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
        });
    }
    return url.to_file_path().map_err(|()| {
        return ReferenceError::MalformedReference {
            reason: "URI does not name a local file".to_string(),
            reference: file_part.to_string(),
        };
    });
}

/// Whether the text starts like `scheme://`.
fn has_uri_scheme(file_part: &str) -> bool {
    return URI_SCHEME.as_ref().is_some_and(|re| return re.is_match(file_part));
}

/// Whether the text is a drive-letter path such as `C:\schemas\a.json`.
fn is_windows_absolute(file_part: &str) -> bool {
    return WINDOWS_DRIVE.as_ref().is_some_and(|re| return re.is_match(file_part));
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn base() -> DocumentId {
        DocumentId::new("/work/a.json")
    }

    fn key(s: &str) -> PointerSegment {
        PointerSegment::Key(s.to_string())
    }

    #[test]
    fn relative_file_with_pointer() {
        let loc = locate(&base(), "b.json#/x").unwrap();
        assert_eq!(loc.target, DocumentId::new("/work/b.json"));
        assert_eq!(loc.pointer, vec![key("x")]);
        assert_eq!(loc.pointer_display, "#/x");
        assert_eq!(loc.file_part, "b.json");
    }

    #[test]
    fn dot_segments_are_normalized() {
        let loc = locate(&base(), "./sub/../common/c.json").unwrap();
        assert_eq!(loc.target, DocumentId::new("/work/common/c.json"));
        assert!(loc.pointer.is_empty());
        assert_eq!(loc.pointer_display, "");
    }

    #[test]
    fn fragment_only_targets_base() {
        let loc = locate(&base(), "#/x").unwrap();
        assert_eq!(loc.target, base());
        assert_eq!(loc.pointer, vec![key("x")]);
        assert_eq!(loc.file_part, "");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let loc = locate(&base(), "  #/defs/Foo \n").unwrap();
        assert_eq!(loc.pointer_display, "#/defs/Foo");
    }

    #[test]
    fn bare_hash_is_document_root() {
        let loc = locate(&base(), "other.json#").unwrap();
        assert!(loc.pointer.is_empty());
        assert_eq!(loc.pointer_display, "");
    }

    #[test]
    fn only_first_hash_splits() {
        let loc = locate(&base(), "#/a#b").unwrap();
        assert_eq!(loc.pointer, vec![key("a#b")]);
    }

    #[test]
    fn http_is_unsupported() {
        let err = locate(&base(), "http://example.com/s.json").unwrap_err();
        assert_eq!(
            err,
            ReferenceError::UnsupportedScheme {
                scheme: "http".to_string()
            }
        );
    }

    #[test]
    fn file_uri_is_accepted() {
        let loc = locate(&base(), "file:///schemas/s.json#/definitions/A").unwrap();
        assert_eq!(loc.target.path(), Path::new("/schemas/s.json"));
        assert_eq!(loc.pointer, vec![key("definitions"), key("A")]);
    }

    #[test]
    fn file_uri_with_remote_host_is_malformed() {
        let err = locate(&base(), "file://server/share/s.json").unwrap_err();
        assert!(matches!(err, ReferenceError::MalformedReference { .. }));
    }

    #[test]
    fn absolute_posix_path() {
        let loc = locate(&base(), "/etc/schemas/s.json").unwrap();
        assert_eq!(loc.target.path(), Path::new("/etc/schemas/s.json"));
    }

    #[test]
    fn windows_drive_paths_are_absolute_everywhere() {
        assert!(is_windows_absolute(r"C:\schemas\s.json"));
        assert!(is_windows_absolute("d:/schemas/s.json"));
        assert!(!is_windows_absolute("schemas/s.json"));

        let loc = locate(&base(), r"C:\schemas\s.json").unwrap();
        assert_eq!(loc.target, DocumentId::new(r"C:\schemas\s.json"));
    }
}
