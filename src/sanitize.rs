/// Turns free text into a token safe to embed in a file name.
///
/// Surrounding whitespace is dropped, each inner whitespace run becomes a
/// single `_`, and anything outside `[A-Za-z0-9_-]` is removed. The result
/// may be empty.
pub fn sanitize(raw: &str) -> String {
    raw.split(is_space)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Whitespace as browsers define it for `\s` and `trim`: Unicode White_Space
/// without U+0085, plus the byte order mark.
fn is_space(c: char) -> bool {
    (c.is_whitespace() && c != '\u{0085}') || c == '\u{FEFF}'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_inner_whitespace() {
        assert_eq!(sanitize("  John   Doe  "), "John_Doe");
        assert_eq!(sanitize("a\t\n b"), "a_b");
    }

    #[test]
    fn strips_unsafe_chars() {
        assert_eq!(sanitize("!!!"), "");
        assert_eq!(sanitize("../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize("Müller-Lüdenscheidt"), "Mller-Ldenscheidt");
    }

    #[test]
    fn punctuation_between_words_keeps_separator() {
        assert_eq!(sanitize("Zone . A"), "Zone__A");
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \t "), "");
    }

    #[test]
    fn unicode_whitespace_counts_as_whitespace() {
        assert_eq!(sanitize("Jane\u{00A0}Doe"), "Jane_Doe");
        assert_eq!(sanitize("\u{3000}Jane\u{2029}Doe"), "Jane_Doe");
    }

    #[test]
    fn byte_order_mark_separates_and_next_line_does_not() {
        assert_eq!(sanitize("a\u{FEFF}b"), "a_b");
        assert_eq!(sanitize("\u{FEFF}a b\u{FEFF}"), "a_b");
        assert_eq!(sanitize("a\u{0085}b"), "ab");
    }
}
