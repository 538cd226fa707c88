// File: ./src/model/window.rs
//! Bounded substrings of a document around a byte offset.
//!
//! Offsets come from regex matches and are therefore byte offsets. Window
//! edges are snapped to the nearest char boundary so the result is always a
//! valid `&str`, even for multi-byte text.

/// Returns `text[position - size/2 .. position + size/2]`, clamped to the
/// document. Never panics, whatever the position.
pub fn window(text: &str, position: usize, size: usize) -> &str {
    let (start, end) = window_bounds(text, position, size);
    &text[start..end]
}

/// Byte range covered by [`window`].
pub fn window_bounds(text: &str, position: usize, size: usize) -> (usize, usize) {
    let half = size / 2;
    let start = floor_boundary(text, position.saturating_sub(half));
    let end = ceil_boundary(text, position.saturating_add(half).min(text.len()));
    (start, end.max(start))
}

pub(crate) fn floor_boundary(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

pub(crate) fn ceil_boundary(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// First `max_chars` characters of `s`, trimmed, with `...` appended when
/// anything was cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head.trim())
    } else {
        s.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_centered() {
        let text = "0123456789";
        assert_eq!(window(text, 5, 4), "3456");
    }

    #[test]
    fn test_window_clamps_at_edges() {
        let text = "abcdefghij";
        assert_eq!(window(text, 0, 6), "abc");
        assert_eq!(window(text, text.len() - 1, 6), "ghij");
        assert_eq!(window(text, 500, 6), "");
        assert_eq!(window("", 0, 400), "");
    }

    #[test]
    fn test_window_respects_char_boundaries() {
        let text = "éééééé";
        // Byte 3 sits inside the second 'é'.
        let w = window(text, 3, 2);
        assert!(w.chars().all(|c| c == 'é'));
        assert!(!w.is_empty());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("  short ", 50), "short");
        assert_eq!(truncate_chars("abcdefgh", 4), "abcd...");
        assert_eq!(truncate_chars("ab  cdef", 4), "ab...");
    }
}
