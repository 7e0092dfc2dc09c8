//! JSON Pointer (RFC 6901) text codec.

use crate::types::PointerSegment;

/// Decode a pointer string into segments.
///
/// One leading `/` is stripped; blank input yields the empty path. Each
/// segment is unescaped `~1` first, then `~0`, so `~01` becomes `~1`.
/// Canonical decimal segments (`0`, or digits without a leading zero)
/// become indices; everything else stays a key.
pub fn decode(pointer: &str) -> Vec<PointerSegment> {
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    if body.trim().is_empty() {
        return Vec::new();
    }
    return body.split('/').map(decode_segment).collect();
}

/// Decode one raw segment.
fn decode_segment(raw: &str) -> PointerSegment {
    let unescaped = raw.replace("~1", "/").replace("~0", "~");
    return match parse_canonical_index(&unescaped) {
        Some(index) => PointerSegment::Index(index),
        None => PointerSegment::Key(unescaped),
    };
}

/// Encode segments as a pointer string: `~` → `~0`, then `/` → `~1`,
/// each segment prefixed with `/`. The empty path encodes as `""`.
pub fn encode(path: &[PointerSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        out.push('/');
        match segment {
            PointerSegment::Index(index) => out.push_str(&index.to_string()),
            PointerSegment::Key(key) => out.push_str(&key.replace('~', "~0").replace('/', "~1")),
        }
    }
    return out;
}

/// Parse a segment as an array index if it is written canonically.
/// `"00"` and `"01"` stay keys so they survive a round trip unchanged.
fn parse_canonical_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| return b.is_ascii_digit()) {
        return None;
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    return segment.parse().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PointerSegment {
        PointerSegment::Key(s.to_string())
    }

    #[test]
    fn empty_pointer() {
        assert!(decode("").is_empty());
        assert!(decode("   ").is_empty());
        assert!(decode("/").is_empty());
    }

    #[test]
    fn plain_keys() {
        assert_eq!(decode("/a/b"), vec![key("a"), key("b")]);
    }

    #[test]
    fn missing_leading_slash_is_tolerated() {
        assert_eq!(decode("definitions/Foo"), vec![key("definitions"), key("Foo")]);
    }

    #[test]
    fn digit_segments_become_indices() {
        assert_eq!(
            decode("/0/1"),
            vec![PointerSegment::Index(0), PointerSegment::Index(1)]
        );
    }

    #[test]
    fn leading_zero_stays_key() {
        assert_eq!(decode("/007"), vec![key("007")]);
    }

    #[test]
    fn overflowing_index_stays_key() {
        let huge = "99999999999999999999999999";
        assert_eq!(decode(&format!("/{huge}")), vec![key(huge)]);
    }

    #[test]
    fn escapes() {
        assert_eq!(decode("/a~1b/c~0d"), vec![key("a/b"), key("c~d")]);
    }

    #[test]
    fn tilde_zero_one_is_not_double_unescaped() {
        assert_eq!(decode("/~01"), vec![key("~1")]);
    }

    #[test]
    fn empty_segments_inside_path() {
        assert_eq!(decode("/a//b"), vec![key("a"), key(""), key("b")]);
    }

    #[test]
    fn encode_escapes_tilde_before_slash() {
        assert_eq!(encode(&[key("~1"), key("a/b")]), "/~01/a~1b");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn round_trip_mixed_path() {
        let path = vec![
            key("definitions"),
            key("a/b~c"),
            PointerSegment::Index(3),
            key("~0~1"),
            key("x y"),
        ];
        assert_eq!(decode(&encode(&path)), path);
    }
}
