//! UTF-8–safe text helpers used when logging and splicing model-facing content.

/// Truncate `s` to at most `max_bytes` bytes without splitting a character,
/// appending `"..."` when anything was cut.
///
/// Used for log previews of model output, never for content sent to the model.
pub fn preview(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_owned();
    }
    let mut end = max_bytes.saturating_sub(3);
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Return the part of `s` that precedes the first occurrence of `marker`,
/// with trailing whitespace removed. Returns `s` trimmed if the marker is absent.
pub fn before_marker<'a>(s: &'a str, marker: &str) -> &'a str {
    match s.find(marker) {
        Some(idx) => s[..idx].trim_end(),
        None => s.trim_end(),
    }
}

/// Insert `block` immediately before the first occurrence of `marker` in `s`,
/// or append it (separated by a blank line) if the marker is absent.
pub fn splice_before_marker(s: &str, marker: &str, block: &str) -> String {
    match s.find(marker) {
        Some(idx) => {
            let head = s[..idx].trim_end();
            let tail = &s[idx..];
            if head.is_empty() {
                format!("{block}\n\n{tail}")
            } else {
                format!("{head}\n\n{block}\n\n{tail}")
            }
        }
        None if s.trim().is_empty() => block.to_owned(),
        None => format!("{}\n\n{block}", s.trim_end()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
