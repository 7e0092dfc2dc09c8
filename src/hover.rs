//! Markdown rendering of a resolved `$ref` target.

use std::fmt::Write as _;
use std::path::Path;

use crate::diagnostics::display_path;
use crate::types::ResolvedTarget;

/// Longest text value shown before truncation, in characters.
const MAX_TEXT_CHARS: usize = 280;

/// Render a resolved target as a markdown hover.
pub fn render(target: &ResolvedTarget, root: &Path) -> String {
    let mut out = String::new();
    let metadata = &target.metadata;

    if !metadata.is_empty() {
        if let Some(title) = &metadata.title {
            let _ = writeln!(out, "**{}**\n", truncate(title));
        }
        if let Some(type_name) = metadata.type_name.as_deref().filter(|t| return !t.is_empty()) {
            let _ = writeln!(out, "Type: `{}`\n", truncate(type_name));
        }
        if let Some(description) = &metadata.description {
            let _ = writeln!(out, "{}\n", truncate(description));
        }
    }

    let _ = writeln!(
        out,
        "Defined in `{}{}` at {}:{}",
        display_path(&target.target, root),
        target.pointer_display,
        target.position.line,
        target.position.column
    );
    return out;
}

/// Cut text longer than `MAX_TEXT_CHARS` and mark the cut with an ellipsis.
fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_TEXT_CHARS).collect();
    cut.push('…');
    return cut;
}
