/// Tree-sitter grammar resolution for JSON documents.
use std::path::Path;

use tree_sitter::Language;

/// Extensions always treated as JSON documents during discovery.
const JSON_EXTENSIONS: &[&str] = &["json", "jsonc"];

/// Whether a file should be scanned as a JSON document.
/// `extra` holds additional extensions from the config, without leading dots.
pub fn is_json_document(path: &Path, extra: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| return e.to_str()) else {
        return false;
    };
    return JSON_EXTENSIONS.contains(&ext) || extra.iter().any(|e| return e.trim_start_matches('.') == ext);
}

/// The tree-sitter JSON grammar. It accepts comments, so it also covers JSONC.
/// `$ref` targets are parsed with it regardless of their extension.
pub fn json() -> Language {
    return tree_sitter_json::LANGUAGE.into();
}
