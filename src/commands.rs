//! Core CLI commands for schemaref: check and lookup.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::OutputFormat;
use crate::config::Config;
use crate::diagnostics::{self, FindingStore};
use crate::error::Error;
use crate::hover;
use crate::loader::FsLoader;
use crate::lookup;
use crate::position;
use crate::scanner;
use crate::types::{Document, DocumentId, Position};

/// Outcome of one full rescan.
pub struct Refresh {
    /// Documents whose findings changed, including documents that disappeared.
    pub changed: Vec<DocumentId>,
    /// Number of documents scanned.
    pub documents: usize,
}

/// Scan all JSON documents under `paths` and report broken references.
/// Exit code 0 when every reference resolves, 2 when any is broken.
///
/// # Errors
///
/// Returns errors from config loading, path discovery, or JSON rendering.
pub fn check(paths: &[PathBuf], format: OutputFormat) -> Result<ExitCode, Error> {
    let root = std::env::current_dir()?;
    let config = Config::load(&root)?;
    let mut store = FindingStore::default();

    let refresh = refresh(&root, paths, &config, &mut store)?;
    print_findings(&store, &root, format)?;

    let total = store.total();
    let documents = refresh.documents;
    if total > 0 {
        eprintln!("{total} broken references in {documents} documents");
        return Ok(ExitCode::from(2));
    }
    eprintln!("All references valid in {documents} documents");
    return Ok(ExitCode::SUCCESS);
}

/// Resolve the `$ref` at a position in `file` and print its target.
/// Exit code 0 when resolved, 1 when there is no resolvable reference there.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if `file` cannot be read, `Error::InvalidPosition`
/// if the position is malformed or outside the file, or `Error::JsonSer`.
pub fn lookup(file: &Path, position: &str, format: OutputFormat) -> Result<ExitCode, Error> {
    let root = std::env::current_dir()?;
    let path = root.join(file);
    let text = std::fs::read_to_string(&path)
        .map_err(|_err| return Error::FileNotFound { path: file.to_path_buf() })?;
    let offset = parse_position(position, &text)?;
    let document = Document::new(DocumentId::new(&path), text);

    let Some(target) = lookup::lookup_at(&document, offset, &FsLoader::new()) else {
        eprintln!("No resolvable reference at {}:{position}", file.display());
        return Ok(ExitCode::from(1));
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&target)?),
        OutputFormat::Text => print!("{}", hover::render(&target, &root)),
    }
    return Ok(ExitCode::SUCCESS);
}

/// Parse a byte offset or a 1-based `line:column` into a byte offset.
///
/// # Errors
///
/// Returns `Error::InvalidPosition` if the input is not numeric or lies outside `text`.
fn parse_position(input: &str, text: &str) -> Result<usize, Error> {
    let invalid = |reason: &str| {
        return Error::InvalidPosition {
            input: input.to_string(),
            reason: reason.to_string(),
        };
    };

    let Some((line, column)) = input.split_once(':') else {
        let offset: usize = input.trim().parse().map_err(|_err| return invalid("not a byte offset"))?;
        if offset > text.len() {
            return Err(invalid("offset is past the end of the file"));
        }
        return Ok(offset);
    };

    let line = line.trim().parse().map_err(|_err| return invalid("line is not a number"))?;
    let column = column.trim().parse().map_err(|_err| return invalid("column is not a number"))?;
    return position::offset_of(text, Position { column, line })
        .ok_or_else(|| return invalid("position is outside the file"));
}

/// Print every stored finding in the requested format.
///
/// # Errors
///
/// Returns `Error::JsonSer` if JSON rendering fails.
pub fn print_findings(store: &FindingStore, root: &Path, format: OutputFormat) -> Result<(), Error> {
    match format {
        OutputFormat::Json => println!("{}", diagnostics::render_findings_json(store.iter(), root)?),
        OutputFormat::Text => print!("{}", diagnostics::render_findings_text(store.iter(), root)),
    }
    return Ok(());
}

/// Rescan everything and replace each document's findings in `store`.
/// Documents that are no longer found are cleared.
///
/// # Errors
///
/// Returns errors from path discovery.
pub fn refresh(
    root: &Path,
    paths: &[PathBuf],
    config: &Config,
    store: &mut FindingStore,
) -> Result<Refresh, Error> {
    let results = scanner::scan(root, paths, config, &FsLoader::new())?;
    let tracked: BTreeSet<DocumentId> = results.keys().cloned().collect();

    let mut changed = store.retain_tracked(&tracked);
    for (id, findings) in results {
        if store.replace(id.clone(), findings) {
            changed.push(id);
        }
    }
    changed.sort();

    return Ok(Refresh {
        changed,
        documents: tracked.len(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_offset_position() {
        assert_eq!(parse_position("3", "{\"a\": 1}").unwrap(), 3);
        assert_eq!(parse_position(" 8 ", "{\"a\": 1}").unwrap(), 8);
    }

    #[test]
    fn line_column_position() {
        let text = "{\n  \"$ref\": \"#/a\"\n}";
        assert_eq!(parse_position("2:3", text).unwrap(), 4);
    }

    #[test]
    fn rejects_bad_positions() {
        assert!(matches!(parse_position("x", "{}"), Err(Error::InvalidPosition { .. })));
        assert!(matches!(parse_position("9", "{}"), Err(Error::InvalidPosition { .. })));
        assert!(matches!(parse_position("5:1", "{}"), Err(Error::InvalidPosition { .. })));
        assert!(matches!(parse_position("1:z", "{}"), Err(Error::InvalidPosition { .. })));
    }

    #[test]
    fn refresh_replaces_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let a = root.join("a.json");
        std::fs::write(&a, r##"{"$ref": "#/nope"}"##).unwrap();
        let paths = vec![PathBuf::from(".")];
        let config = Config::default();
        let mut store = FindingStore::default();

        let first = refresh(root, &paths, &config, &mut store).unwrap();
        assert_eq!(first.documents, 1);
        assert_eq!(first.changed, vec![DocumentId::new(&a)]);
        assert_eq!(store.total(), 1);

        let again = refresh(root, &paths, &config, &mut store).unwrap();
        assert!(again.changed.is_empty());

        std::fs::write(&a, r##"{"nope": {}, "$ref": "#/nope"}"##).unwrap();
        let fixed = refresh(root, &paths, &config, &mut store).unwrap();
        assert_eq!(fixed.changed, vec![DocumentId::new(&a)]);
        assert_eq!(store.total(), 0);

        std::fs::write(&a, r#"{"$ref": "gone.json"}"#).unwrap();
        refresh(root, &paths, &config, &mut store).unwrap();
        assert_eq!(store.total(), 1);
        std::fs::remove_file(&a).unwrap();
        let removed = refresh(root, &paths, &config, &mut store).unwrap();
        assert_eq!(removed.documents, 0);
        assert_eq!(removed.changed, vec![DocumentId::new(&a)]);
        assert_eq!(store.total(), 0);
    }
}
