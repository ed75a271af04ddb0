//! Usage: Small shared string helpers.

/// First `max_chars` characters of `text` (never splits a UTF-8 sequence).
pub(crate) fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
