// Output formatting — terminal display helpers for verdicts.

pub mod terminal;

/// Truncate to at most `max_chars` characters, appending "..." when cut.
/// Operates on character boundaries so accented text never splits a
/// multi-byte sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
