use std::path::Path;

use crate::error::Error;
use crate::grammar;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".schemaref.toml";

/// Project configuration loaded from `.schemaref.toml`.
/// Include/exclude patterns are path prefixes applied to JSON documents.
#[derive(Debug, Default)]
pub struct Config {
    /// Path prefixes to skip.
    exclude: Vec<String>,
    /// Extra file extensions treated as JSON, without leading dots.
    extensions: Vec<String>,
    /// Path prefixes to scan. Empty means everything.
    include: Vec<String>,
}

/// Raw TOML structure for `.schemaref.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemarefTomlConfig {
    /// Path prefixes to skip.
    #[serde(default)]
    exclude: Vec<String>,
    /// Extra file extensions treated as JSON.
    #[serde(default)]
    extensions: Vec<String>,
    /// Path prefixes to scan.
    #[serde(default)]
    include: Vec<String>,
}

impl Config {
    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let raw: SchemarefTomlConfig = toml::from_str(content)?;
        return Ok(Self {
            exclude: raw.exclude.iter().map(|p| return normalize_prefix(p)).collect(),
            extensions: raw.extensions,
            include: raw.include.iter().map(|p| return normalize_prefix(p)).collect(),
        });
    }

    /// Whether a file is a JSON document by extension, including configured extras.
    pub fn is_json_document(&self, path: &Path) -> bool {
        return grammar::is_json_document(path, &self.extensions);
    }

    /// Load config from `.schemaref.toml` in the given root directory.
    /// Returns a default that scans everything if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no {CONFIG_FILE}, scanning everything");
                return Ok(Self::default());
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::from_toml(&content);
    }

    /// Check whether a document path (relative to the root) should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let relative_path = normalize_prefix(relative_path);
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

/// Drop a leading `./` and use forward slashes so prefixes compare the same on every OS.
fn normalize_prefix(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    return slashed.strip_prefix("./").unwrap_or(&slashed).to_string();
}
