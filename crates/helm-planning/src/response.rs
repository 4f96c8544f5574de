//! Permissive JSON extraction from model replies.
//!
//! Models wrap JSON in prose, code fences, or both. Extraction is an ordered
//! chain of total strategies; each returns `Option` and the first hit wins:
//!
//! 1. the whole reply parses as JSON
//! 2. the body of the first code fence parses (after brace matching)
//! 3. the first balanced `{...}` object parses
//! 4. the substring between the first `{` and the last `}` parses
//! 5. the substring between the first `[` and the last `]` parses
//!
//! Nothing here panics or returns an error; "no JSON" is `None`.

use serde_json::Value;

use helm_llm::ModelOutput;

/// JSON carried by a model output, if any.
///
/// Structured output is taken as-is; text goes through [`extract_json`].
pub fn output_json(output: &ModelOutput) -> Option<Value> {
    match output {
        ModelOutput::Structured(value) => Some(value.clone()),
        ModelOutput::Text(text) => extract_json(text),
    }
}

/// Extract the first JSON value the strategy chain can find in `text`.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_direct(trimmed)
        .or_else(|| parse_fenced(trimmed))
        .or_else(|| balanced_object(trimmed).and_then(parse_direct))
        .or_else(|| between(trimmed, '{', '}').and_then(parse_direct))
        .or_else(|| between(trimmed, '[', ']').and_then(parse_direct))
}

fn parse_direct(s: &str) -> Option<Value> {
    serde_json::from_str(s.trim()).ok()
}

fn parse_fenced(s: &str) -> Option<Value> {
    let body = fence_body(s)?;
    parse_direct(body).or_else(|| balanced_object(body).and_then(parse_direct))
}

/// Content of the first ```` ``` ```` fence, with an optional language tag.
fn fence_body(s: &str) -> Option<&str> {
    let open = s.find("```")?;
    let after = &s[open + 3..];
    // skip the language tag line
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// First complete `{...}` object, honoring string literals and escapes.
fn balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in s[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn between(s: &str, open: char, close: char) -> Option<&str> {
    let start = s.find(open)?;
    let end = s.rfind(close)?;
    (end > start).then(|| &s[start..=end])
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
