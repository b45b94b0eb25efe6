/// First `max_chars` characters of `text`, with `...` appended when cut.
/// Newlines are flattened to spaces so excerpts stay on one line.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.trim().replace('\n', " ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
