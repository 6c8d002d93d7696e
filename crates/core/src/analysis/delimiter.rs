/// Locate the last top-level balanced `open`/`close` pair in `text`.
///
/// Returns the byte offsets of the opening and closing delimiter (both
/// inclusive). The scan starts at the rightmost `close` and walks left,
/// tracking nesting depth until it drops back to zero on an `open`.
///
/// Returns `None` when `text` has no `close`, or when that `close` is never
/// matched.
pub fn last_balanced_pair(text: &str, open: char, close: char) -> Option<(usize, usize)> {
    let end = text.rfind(close)?;

    let mut depth = 0usize;
    for (idx, ch) in text[..=end].char_indices().rev() {
        if ch == close {
            depth += 1;
        } else if ch == open {
            depth -= 1;
            if depth == 0 {
                return Some((idx, end));
            }
        }
    }

    None
}
