/// Crate-level error types for schemaref diagnostics.
use std::path::PathBuf;

/// Runtime errors of the tool itself. Each variant names the file or reason
/// for failure so it can be rendered without a debugger.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file named on the command line does not exist or cannot be read.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A command-line position is neither a byte offset nor `line:column`.
    #[error("invalid position `{input}`: {reason}")]
    InvalidPosition {
        /// Raw position argument.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON output could not be produced.
    #[error("json serialize: {0}")]
    JsonSer(
        /// The wrapped serialization error.
        #[from]
        serde_json::Error,
    ),

    /// TOML deserialization of `.schemaref.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The file watcher could not be created.
    #[error("watcher setup failed: {reason}")]
    WatcherFailed {
        /// Description of the failure.
        reason: String,
    },
}

/// Why a single `$ref` could not be resolved. Never fatal: the scanner turns
/// these into findings and the lookup service turns them into "no result".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    /// The target document could not be loaded.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// File part of the reference as written, empty for the current file.
        file_part: String,
        /// Candidate location that failed to load.
        path: PathBuf,
    },

    /// The target document exceeds the loader's size limit.
    #[error("file too large ({size_bytes} bytes, max {max_bytes}): {}", path.display())]
    FileTooLarge {
        /// Maximum allowed file size in bytes.
        max_bytes: u64,
        /// File that exceeded the size limit.
        path: PathBuf,
        /// Actual file size in bytes.
        size_bytes: u64,
    },

    /// The file part looks like a URI but cannot be turned into a file location.
    #[error("malformed reference `{reference}`: {reason}")]
    MalformedReference {
        /// Description of the parse failure.
        reason: String,
        /// The raw file part.
        reference: String,
    },

    /// The pointer does not designate any node of the target document.
    #[error("pointer not found: #{pointer}")]
    PointerNotFound {
        /// Pointer part as written, without the `#`.
        pointer: String,
    },

    /// The target text is not valid JSON.
    #[error("unparsable document: {}", path.display())]
    UnparsableDocument {
        /// Document that failed to parse.
        path: PathBuf,
        /// Pointer part of the reference, without the `#`.
        pointer: String,
    },

    /// The file part uses a URI scheme other than `file`.
    #[error("unsupported scheme: `{scheme}`")]
    UnsupportedScheme {
        /// The rejected scheme.
        scheme: String,
    },
}
