//! Helper functions for text processing and rendering.

/// Truncate text to at most `max_chars` characters.
///
/// Counts `char`s rather than bytes so multi-byte text never splits inside a
/// code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Rough token estimate (~4 characters per token).
pub fn estimate_tokens(char_count: usize) -> usize {
    char_count / 4
}

/// Format an integer with comma thousands separators (`12345` -> `12,345`).
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Normalize an ISO 8601 creation time to `YYYY-MM-DD HH:MM:SS`.
///
/// Keeps the first 19 characters and replaces the date/time separator.
/// Returns `None` for missing or blank input.
pub fn normalize_timestamp(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(truncate_chars(raw, 19).replace('T', " "))
}

/// Keep the date part (`YYYY-MM-DD`) of an ISO 8601 value.
pub fn clip_date(raw: Option<&str>) -> String {
    raw.map(|s| truncate_chars(s, 10).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("✶✶✶", 1), "✶");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(9000), "9,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(
            normalize_timestamp(Some("2024-05-01T12:34:56.789Z")),
            Some("2024-05-01 12:34:56".to_string())
        );
        assert_eq!(normalize_timestamp(Some("")), None);
        assert_eq!(normalize_timestamp(None), None);
    }

    #[test]
    fn test_clip_date() {
        assert_eq!(clip_date(Some("2024-05-01T12:34:56Z")), "2024-05-01");
        assert_eq!(clip_date(None), "");
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(0), 0);
        assert_eq!(estimate_tokens(4001), 1000);
    }
}
