use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::types::{DocumentId, Finding};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Latest findings per document. Writing a document's findings replaces
/// whatever was stored for it; there is no merging.
#[derive(Debug, Default)]
pub struct FindingStore {
    /// Non-empty finding lists keyed by document.
    by_document: BTreeMap<DocumentId, Vec<Finding>>,
}

impl FindingStore {
    /// Forget a document. Returns true if it had findings.
    pub fn clear(&mut self, id: &DocumentId) -> bool {
        return self.by_document.remove(id).is_some();
    }

    /// Current findings for a document, empty if none.
    pub fn findings(&self, id: &DocumentId) -> &[Finding] {
        return self.by_document.get(id).map(Vec::as_slice).unwrap_or_default();
    }

    /// Documents with findings, in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&DocumentId, &[Finding])> {
        return self.by_document.iter().map(|(id, f)| return (id, f.as_slice()));
    }

    /// Replace a document's findings. Returns true if they differ from before.
    pub fn replace(&mut self, id: DocumentId, findings: Vec<Finding>) -> bool {
        if findings.is_empty() {
            return self.clear(&id);
        }
        let changed = self.findings(&id) != findings.as_slice();
        self.by_document.insert(id, findings);
        return changed;
    }

    /// Drop every document not in `tracked`. Returns the dropped identities.
    pub fn retain_tracked(&mut self, tracked: &BTreeSet<DocumentId>) -> Vec<DocumentId> {
        let dropped: Vec<DocumentId> = self
            .by_document
            .keys()
            .filter(|id| return !tracked.contains(*id))
            .cloned()
            .collect();
        for id in &dropped {
            self.by_document.remove(id);
        }
        return dropped;
    }

    /// Number of findings across all documents.
    pub fn total(&self) -> usize {
        return self.by_document.values().map(Vec::len).sum();
    }
}

/// One finding as emitted by `--format json`.
#[derive(Serialize)]
struct FindingJson<'a> {
    /// One-based column of the `$ref` value.
    column: usize,
    /// Byte offset one past the end of the `$ref` value.
    end: usize,
    /// One-based line of the `$ref` value.
    line: usize,
    /// Finding text.
    message: &'a str,
    /// Document path, relative to the working directory when possible.
    path: String,
    /// Severity name.
    severity: String,
    /// Byte offset of the `$ref` value.
    start: usize,
}

/// Path of a document for display: relative to `root` when it lives below it.
pub fn display_path(id: &DocumentId, root: &Path) -> String {
    let path = id.path();
    return path.strip_prefix(root).unwrap_or(path).display().to_string();
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render a document's findings as JSON objects.
///
/// # Errors
///
/// Returns `Error::JsonSer` if serialization fails.
pub fn render_findings_json<'a>(
    documents: impl IntoIterator<Item = (&'a DocumentId, &'a [Finding])>,
    root: &Path,
) -> Result<String, Error> {
    let mut out = Vec::new();
    for (id, findings) in documents {
        let path = display_path(id, root);
        for finding in findings {
            out.push(FindingJson {
                column: finding.position.column,
                end: finding.span.end,
                line: finding.position.line,
                message: &finding.message,
                path: path.clone(),
                severity: finding.severity.to_string(),
                start: finding.span.start,
            });
        }
    }
    return Ok(serde_json::to_string_pretty(&out)?);
}

/// Render findings as `path:line:column: severity: message` lines.
pub fn render_findings_text<'a>(
    documents: impl IntoIterator<Item = (&'a DocumentId, &'a [Finding])>,
    root: &Path,
) -> String {
    let mut out = String::new();
    for (id, findings) in documents {
        let path = display_path(id, root);
        for finding in findings {
            let _ = writeln!(
                out,
                "{path}:{}:{}: {}: {}",
                finding.position.line, finding.position.column, finding.severity, finding.message
            );
        }
    }
    return out;
}

/// Render an error as a structured markdown diagnostic: what happened and how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::FileNotFound { path } => format!(
            "\
# Error: File Not Found

`{}` does not exist.
",
            path.display()
        ),
        Error::InvalidPosition { input, reason } => format!(
            "\
# Error: Invalid Position

`{input}`: {reason}

## Fix

Pass a byte offset such as `120`, or a 1-based `line:column` such as `4:17`.
"
        ),
        Error::Io(e) => format!(
            "\
# Error: I/O

{e}
"
        ),
        Error::JsonSer(e) => format!(
            "\
# Error: JSON Serialization

{e}
"
        ),
        Error::TomlDe(e) => format!(
            "\
# Error: Invalid Config

{e}

## Fix

Check `{CONFIG_FILE}`. Supported keys are `include`, `exclude`, and `extensions`.
"
        ),
        Error::WatcherFailed { reason } => format!(
            "\
# Error: Watch Failed

{reason}
"
        ),
    };
}
