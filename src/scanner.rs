use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, ReferenceError};
use crate::loader::DocumentLoader;
use crate::position;
use crate::resolver;
use crate::syntax;
use crate::types::{Document, DocumentId, Finding, normalize_path};

/// Scan every JSON document under `paths` and check its references.
/// Applies the config's include/exclude filters (relative to `root`) and
/// extra extensions. Returns findings keyed by document, including documents
/// with no findings, so callers can replace earlier results wholesale.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if one of `paths` does not exist.
pub fn scan(
    root: &Path,
    paths: &[PathBuf],
    config: &Config,
    loader: &dyn DocumentLoader,
) -> Result<BTreeMap<DocumentId, Vec<Finding>>, Error> {
    let mut results = BTreeMap::new();

    for path in discover_json_documents(root, paths, config)? {
        let Ok(text) = std::fs::read_to_string(&path) else {
            tracing::warn!(path = %path.display(), "skipping unreadable document");
            continue;
        };
        let document = Document::new(DocumentId::new(&path), text);
        let findings = scan_document(&document, loader);
        tracing::debug!(path = %document.id, findings = findings.len(), "scanned document");
        results.insert(document.id, findings);
    }

    return Ok(results);
}

/// Check every `$ref` in one document, in pre-order. Unparsable text yields
/// no findings.
pub fn scan_document(document: &Document, loader: &dyn DocumentLoader) -> Vec<Finding> {
    let Some(tree) = syntax::parse(&document.text) else {
        return Vec::new();
    };

    let mut findings = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        if let Some((value, raw)) = tree.ref_value(node)
            && let Some(message) = check_reference(document, raw, loader)
            && let Some(span) = tree.span(value)
        {
            let position = position::position_of(&document.text, span.start);
            findings.push(Finding::error(span, position, message));
        }
        stack.extend(tree.children(node).into_iter().rev());
    }

    return findings;
}

/// Resolve one reference and describe what is wrong with it, if anything.
fn check_reference(document: &Document, raw: &str, loader: &dyn DocumentLoader) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    return match resolver::resolve(document, trimmed, loader) {
        Ok(_) => None,
        Err(e) => finding_message(trimmed, &e),
    };
}

/// Walk `paths` and collect JSON documents that pass the config filters.
/// Paths are returned in walk order, which is sorted by file name.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if a path does not exist.
fn discover_json_documents(
    root: &Path,
    paths: &[PathBuf],
    config: &Config,
) -> Result<Vec<PathBuf>, Error> {
    let mut documents = Vec::new();

    for path in paths {
        let start = normalize_path(&root.join(path));
        if !start.exists() {
            return Err(Error::FileNotFound { path: path.clone() });
        }
        for entry in WalkDir::new(&start)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| return e.file_type().is_file())
        {
            let file = entry.path();
            let relative = file.strip_prefix(root).unwrap_or(file);
            if config.is_json_document(relative) && config.should_scan(&relative.to_string_lossy()) {
                documents.push(file.to_path_buf());
            }
        }
    }

    return Ok(documents);
}

/// Finding text for a resolution failure. Unparsable targets only matter
/// when a pointer has to be walked inside them.
fn finding_message(raw: &str, error: &ReferenceError) -> Option<String> {
    return match error {
        ReferenceError::FileNotFound { file_part, .. } => {
            let name = if file_part.is_empty() { "current file" } else { file_part.as_str() };
            Some(format!("File not found: `{name}`"))
        },
        ReferenceError::FileTooLarge { path, .. } => {
            Some(format!("File too large: `{}`", path.display()))
        },
        ReferenceError::MalformedReference { .. } | ReferenceError::UnsupportedScheme { .. } => {
            Some(format!("Cannot resolve reference: `{raw}`"))
        },
        ReferenceError::PointerNotFound { pointer } => Some(format!("Invalid JSON pointer: `#{pointer}`")),
        ReferenceError::UnparsableDocument { pointer, .. } => {
            (!pointer.is_empty()).then(|| return format!("Invalid JSON pointer: `#{pointer}`"))
        },
    };
}
