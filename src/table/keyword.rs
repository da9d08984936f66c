//! Display-only narrowing of the fetched page. Never touches the fetched rows.

use crate::table::Record;
use serde_json::Value;

/// A run of text, either inside or outside a keyword match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

/// Plain text form of a value, as a user would type it (strings unquoted).
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn matches(record: &Record, keyword: &str) -> bool {
    let needle = lowered(keyword);
    if needle.is_empty() {
        return true;
    }
    record
        .values()
        .any(|v| find_from(&stringify(v), 0, &needle).is_some())
}

/// Rows containing `keyword` in any field, case-insensitively. Empty keyword keeps all.
pub fn filter_rows<'a>(rows: &'a [Record], keyword: &str) -> Vec<&'a Record> {
    let keyword = keyword.trim();
    rows.iter().filter(|r| matches(r, keyword)).collect()
}

/// Splits `text` into matched and unmatched runs for highlighting.
pub fn highlight(text: &str, keyword: &str) -> Vec<Segment> {
    let needle = lowered(keyword.trim());
    let mut segments = Vec::new();
    if needle.is_empty() {
        if !text.is_empty() {
            segments.push(Segment {
                text: text.to_string(),
                matched: false,
            });
        }
        return segments;
    }

    let mut pos = 0;
    while let Some((start, end)) = find_from(text, pos, &needle) {
        if start > pos {
            segments.push(Segment {
                text: text[pos..start].to_string(),
                matched: false,
            });
        }
        segments.push(Segment {
            text: text[start..end].to_string(),
            matched: true,
        });
        pos = end;
    }
    if pos < text.len() {
        segments.push(Segment {
            text: text[pos..].to_string(),
            matched: false,
        });
    }
    segments
}

fn lowered(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

// Byte range of the first case-insensitive match at or after `from`.
fn find_from(text: &str, from: usize, needle: &[char]) -> Option<(usize, usize)> {
    text[from..]
        .char_indices()
        .find_map(|(i, _)| {
            let start = from + i;
            match_at(text, start, needle).map(|end| (start, end))
        })
}

fn match_at(text: &str, start: usize, needle: &[char]) -> Option<usize> {
    let mut want = needle.iter();
    for (offset, c) in text[start..].char_indices() {
        for lc in c.to_lowercase() {
            match want.next() {
                Some(w) if *w == lc => {}
                _ => return None,
            }
        }
        if want.len() == 0 {
            return Some(start + offset + c.len_utf8());
        }
    }
    None
}
