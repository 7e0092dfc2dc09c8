/// Conversion between byte offsets and 1-based line/column positions.
use crate::types::Position;

/// Byte offset of a 1-based line and column. A column one past the end of
/// the line addresses the line break. `None` when the position is outside the text.
pub fn offset_of(text: &str, position: Position) -> Option<usize> {
    let line_index = position.line.checked_sub(1)?;
    let column_index = position.column.checked_sub(1)?;

    let mut line_start = 0_usize;
    for (index, line) in text.split_inclusive('\n').enumerate() {
        if index == line_index {
            let content = line.strip_suffix('\n').unwrap_or(line);
            let content = content.strip_suffix('\r').unwrap_or(content);
            let within = content
                .char_indices()
                .map(|(i, _)| return i)
                .chain(std::iter::once(content.len()))
                .nth(column_index)?;
            return line_start.checked_add(within);
        }
        line_start = line_start.checked_add(line.len())?;
    }
    // Empty text or a position on the empty line after a trailing newline.
    let lines = text.split_inclusive('\n').count();
    if line_index == lines && column_index == 0 && (text.is_empty() || text.ends_with('\n')) {
        return Some(text.len());
    }
    return None;
}

/// 1-based line and column of a byte offset. Offsets past the end clamp to
/// the end; offsets inside a multi-byte character count as that character.
pub fn position_of(text: &str, offset: usize) -> Position {
    let offset = offset.min(text.len());
    let before = text.get(..offset).unwrap_or_else(|| {
        let boundary = (0..offset).rev().find(|i| return text.is_char_boundary(*i)).unwrap_or(0);
        return text.get(..boundary).unwrap_or("");
    });
    let line = before.matches('\n').count().saturating_add(1);
    let line_start = before.rfind('\n').map_or(0, |i| return i.saturating_add(1));
    let column = before
        .get(line_start..)
        .map_or(0, |rest| return rest.chars().count())
        .saturating_add(1);
    return Position { column, line };
}
