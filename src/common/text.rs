//! Deferred-edit application over source text.
//!
//! Instead of mutating the source as edits are discovered, passes record
//! `{start, end, replacement}` segments and apply them all at once. The
//! single pass copies untouched stretches verbatim, so positions recorded
//! against the original text stay valid for the whole scan.

/// One planned substitution over the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceSegment {
    /// Byte offset where the replaced range starts.
    pub start_idx: usize,
    /// Byte offset just past the replaced range.
    pub end_idx: usize,
    /// Text spliced in place of the range (empty deletes it).
    pub replace: String,
}

impl ReplaceSegment {
    pub fn new(start_idx: usize, end_idx: usize, replace: String) -> Self {
        Self { start_idx, end_idx, replace }
    }
}

/// Apply `segments` over `source` in one left-to-right pass.
///
/// Segments must be sorted by `start_idx` and non-overlapping; no
/// validation is performed. The preprocessor guarantees this by
/// construction since segments are recorded in scan order.
pub fn replace_segments(source: &str, segments: &[ReplaceSegment]) -> String {
    if segments.is_empty() {
        return source.to_string();
    }
    let mut result = String::with_capacity(source.len());
    let mut last_end = 0usize;
    for seg in segments {
        result.push_str(&source[last_end..seg.start_idx]);
        result.push_str(&seg.replace);
        last_end = seg.end_idx;
    }
    result.push_str(&source[last_end..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_segments_returns_source() {
        assert_eq!(replace_segments("vec3 color;", &[]), "vec3 color;");
    }

    #[test]
    fn test_single_replacement() {
        let segments = [ReplaceSegment::new(5, 8, "1+2".to_string())];
        assert_eq!(replace_segments("x = (FOO);", &segments), "x = (1+2);");
    }

    #[test]
    fn test_deletion_and_replacement() {
        // Delete the first line, substitute on the second.
        let source = "#define FOO 1\nx = FOO;\n";
        let segments = [
            ReplaceSegment::new(0, 14, String::new()),
            ReplaceSegment::new(18, 21, "1".to_string()),
        ];
        assert_eq!(replace_segments(source, &segments), "x = 1;\n");
    }

    #[test]
    fn test_tail_preserved() {
        let segments = [ReplaceSegment::new(0, 1, "A".to_string())];
        assert_eq!(replace_segments("x + rest", &segments), "A + rest");
    }
}
