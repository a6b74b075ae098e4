//! Character-boundary safe text helpers

/// Truncate `text` to at most `max_chars` characters
///
/// Slicing happens on a char boundary, so multi-byte input never panics.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Short single-line preview for log fields
pub fn preview(text: &str, max_chars: usize) -> String {
    truncate_chars(text, max_chars).replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_shorter_than_limit() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_truncate_exact_and_longer() {
        assert_eq!(truncate_chars("abcdef", 6), "abcdef");
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
        assert_eq!(truncate_chars("abcdef", 0), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        // "ç" and "ã" are two bytes each
        assert_eq!(truncate_chars("Finanças", 6), "Finanç");
        assert_eq!(truncate_chars("ações", 2), "aç");
    }

    #[test]
    fn test_preview_flattens_newlines() {
        assert_eq!(preview("line one\nline two", 12), "line one lin");
    }
}
