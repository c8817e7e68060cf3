//! Case-insensitive text helpers.
//!
//! Lowercasing can change byte length (`İ` becomes `i̇`), so offsets found in
//! a lowercased copy cannot be used to slice the original. These helpers walk
//! the original text instead.

/// Strip `prefix` (already lowercase) from the start of `text`, ignoring case.
pub fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut lowered = String::with_capacity(prefix.len());
    for (idx, ch) in text.char_indices() {
        if lowered == prefix {
            return Some(&text[idx..]);
        }
        lowered.extend(ch.to_lowercase());
        if !prefix.starts_with(lowered.as_str()) {
            return None;
        }
    }
    (lowered == prefix).then_some("")
}

/// The part of `text` before the first case-insensitive occurrence of `needle`.
pub fn before_ci<'a>(text: &'a str, needle: &str) -> Option<&'a str> {
    text.char_indices()
        .find(|(idx, _)| strip_prefix_ci(&text[*idx..], needle).is_some())
        .map(|(idx, _)| &text[..idx])
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix_ci() {
        assert_eq!(strip_prefix_ci("NOT Ekle: süt", "not ekle:"), Some(" süt"));
        assert_eq!(strip_prefix_ci("not ekle:", "not ekle:"), Some(""));
        assert_eq!(strip_prefix_ci("not", "not ekle:"), None);
        assert_eq!(strip_prefix_ci("nota ekle: x", "not ekle:"), None);
    }

    #[test]
    fn test_strip_prefix_ci_with_length_changing_lowercase() {
        // "İ" lowercases to two chars; the prefix does not match, and slicing stays valid.
        assert_eq!(strip_prefix_ci("İstanbul", "is"), None);
        assert_eq!(strip_prefix_ci("NOT OLUŞTUR: İzmir", "not oluştur:"), Some(" İzmir"));
    }

    #[test]
    fn test_before_ci() {
        assert_eq!(
            before_ci("Kediler Hakkında bir yazı yaz", "hakkında"),
            Some("Kediler ")
        );
        assert_eq!(before_ci("kediler", "hakkında"), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("çğıöşü", 3), "çğı");
        assert_eq!(truncate_chars("kısa", 10), "kısa");
    }
}
