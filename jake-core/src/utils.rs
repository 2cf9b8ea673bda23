// ABOUTME: Character-based string slicing and fenced code block detection.
// ABOUTME: Lengths are counted in chars so cuts never land inside a code point.

/// Marker that closes a fenced code block
pub const FENCE: &str = "```";

/// Number of chars in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the `n`th char, or the end of the string
pub fn byte_index(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// The first `n` chars of `text`
pub fn take_chars(text: &str, n: usize) -> &str {
    &text[..byte_index(text, n)]
}

/// Everything after the first `n` chars of `text`
pub fn skip_chars(text: &str, n: usize) -> &str {
    &text[byte_index(text, n)..]
}

/// Split `text` after its first `n` chars
pub fn split_chars(text: &str, n: usize) -> (&str, &str) {
    text.split_at(byte_index(text, n))
}

/// If `text` leaves a fenced code block open, return the line that opened it
/// (e.g. "```json").
///
/// Every line whose trimmed form starts with ``` toggles the fence state.
pub fn unclosed_fence(text: &str) -> Option<&str> {
    let mut open = None;
    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with(FENCE) {
            open = match open {
                None => Some(trimmed),
                Some(_) => None,
            };
        }
    }
    open
}
