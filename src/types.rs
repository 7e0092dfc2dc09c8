/// Core domain types for schemaref documents, pointers, and findings.
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// An open document: its identity plus the text currently held for it.
/// The text may differ from what is on disk (the "current file").
#[derive(Debug, Clone)]
pub struct Document {
    /// Canonical location of the document.
    pub id: DocumentId,
    /// Full source text.
    pub text: String,
}

impl Document {
    /// Pair an identity with its text.
    pub const fn new(id: DocumentId, text: String) -> Self {
        return Self { id, text };
    }
}

/// Identity of a text resource. Two identities are equal iff they name
/// the same normalized path. Newtype prevents mixing with arbitrary paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentId(
    /// Normalized path of the resource.
    PathBuf,
);

impl DocumentId {
    /// Directory containing this document, used as the base for relative references.
    pub fn directory(&self) -> &Path {
        return self.0.parent().unwrap_or_else(|| return Path::new(""));
    }

    /// Build an identity from any path, collapsing `.` and `..` components.
    pub fn new(path: impl AsRef<Path>) -> Self {
        return Self(normalize_path(path.as_ref()));
    }

    /// The underlying path.
    pub fn path(&self) -> &Path {
        return &self.0;
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}", self.0.display());
    }
}

/// One problem about a single reference within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Human-readable description of the problem.
    pub message: String,
    /// Start of the offending `$ref` value.
    pub position: Position,
    /// How serious the problem is. Always `Error` today.
    pub severity: Severity,
    /// Byte range of the offending `$ref` value in the source text.
    pub span: Range<usize>,
}

impl Finding {
    /// An error-severity finding over `span`, which starts at `position`.
    pub const fn error(span: Range<usize>, position: Position, message: String) -> Self {
        return Self {
            message,
            position,
            severity: Severity::Error,
            span,
        };
    }
}

/// One step of a JSON pointer: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointerSegment {
    /// Canonical decimal segment such as `0` or `12`.
    Index(usize),
    /// Any other segment, already unescaped.
    Key(String),
}

impl fmt::Display for PointerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            PointerSegment::Index(index) => write!(f, "{index}"),
            PointerSegment::Key(key) => write!(f, "{key}"),
        };
    }
}

/// A 1-based line and column in a document. Columns count characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// One-based column.
    pub column: usize,
    /// One-based line.
    pub line: usize,
}

/// A fully resolved `$ref` target. Built fresh per lookup, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    /// Descriptive fields read from the target node.
    pub metadata: SchemaMetadata,
    /// The decoded pointer path, re-encoded in canonical RFC 6901 form.
    pub pointer: String,
    /// The pointer part as written, with its leading `#`, or empty.
    pub pointer_display: String,
    /// Start of the target node in its document.
    pub position: Position,
    /// Byte range of the target node in its document.
    pub span: Range<usize>,
    /// Document holding the target node.
    pub target: DocumentId,
}

/// Title, description, and type of a schema node, when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaMetadata {
    /// Value of a string `description` property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value of a string `title` property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// A string `type`, or the string members of a `type` array joined by ` | `.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl SchemaMetadata {
    /// True when no field was found.
    pub const fn is_empty(&self) -> bool {
        return self.description.is_none() && self.title.is_none() && self.type_name.is_none();
    }
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The reference is broken.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Severity::Error => write!(f, "error"),
        };
    }
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<std::path::Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Handle a single path component during normalization.
/// Pops the last component for `..` when possible, preserves it otherwise.
fn push_normalized_component<'a>(
    components: &mut Vec<std::path::Component<'a>>,
    component: std::path::Component<'a>,
) {
    match component {
        std::path::Component::CurDir => {},
        std::path::Component::ParentDir => {
            let can_pop = matches!(
                components.last(),
                Some(c) if !matches!(c, std::path::Component::ParentDir | std::path::Component::RootDir)
            );
            if can_pop {
                components.pop();
            } else if !matches!(components.last(), Some(std::path::Component::RootDir)) {
                components.push(component);
            }
        },
        other => components.push(other),
    }
}
