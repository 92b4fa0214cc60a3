//! Lenient coercions applied while aggregating: numbers out of loosely typed cells, category
//! keys out of arbitrary values, and the multi-membership split for exploded dimensions.

use crate::types::Value;

/// Numeric value of a cell; anything unparseable contributes 0.
///
/// Text is trimmed and stripped of comma thousands separators, then the longest leading decimal
/// number is taken (`"1,234.5 kg"` → `1234.5`). Booleans and non-finite results are 0.
pub fn parse_lenient_number(value: &Value) -> f64 {
    match value {
        Value::Int64(v) => *v as f64,
        Value::Float64(v) if v.is_finite() => *v,
        Value::Utf8(s) => parse_lenient_str(s),
        _ => 0.0,
    }
}

/// Text form of [`parse_lenient_number`].
///
/// ```rust
/// use chart_pivot::processing::parse_lenient_str;
///
/// assert_eq!(parse_lenient_str(" 1,250 "), 1250.0);
/// assert_eq!(parse_lenient_str("12.5%"), 12.5);
/// assert_eq!(parse_lenient_str("n/a"), 0.0);
/// ```
pub fn parse_lenient_str(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let prefix = numeric_prefix(&cleaned);
    match prefix.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Longest prefix of the form `[+-]digits[.digits][(e|E)[+-]digits]`.
fn numeric_prefix(s: &str) -> &str {
    let b = s.as_bytes();
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < b.len() && b[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return "";
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    &s[..i]
}

/// Category (or stack) key of a cell: its text, or `missing_label` for null/empty cells.
pub fn category_key(value: &Value, missing_label: &str) -> String {
    key_or_missing(&value.to_text(), missing_label).to_string()
}

/// Borrowing form of [`category_key`] for text already rendered from a cell.
pub fn key_or_missing<'a>(text: &'a str, missing_label: &'a str) -> &'a str {
    if text.is_empty() { missing_label } else { text }
}

/// True when a dimension text looks like a multi-membership field.
pub fn is_multi_valued(text: &str) -> bool {
    text.starts_with('[') || text.contains(',')
}

/// Splits a multi-membership dimension text into its members.
///
/// `[..]` texts are read as a JSON array when they parse, each element stringified; otherwise
/// the brackets are dropped and the inside is split on commas. Members are trimmed and blanks
/// dropped; a text that yields no members stays a single member.
pub fn explode_multi_valued(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        if let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(trimmed) {
            let members: Vec<String> = items
                .iter()
                .map(|item| Value::from(item).to_text().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            return non_empty_or_self(members, text);
        }
    }

    let inner = trimmed
        .strip_prefix('[')
        .map(|s| s.strip_suffix(']').unwrap_or(s))
        .unwrap_or(trimmed);
    let members: Vec<String> = inner
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    non_empty_or_self(members, text)
}

fn non_empty_or_self(members: Vec<String>, text: &str) -> Vec<String> {
    if members.is_empty() {
        vec![text.to_string()]
    } else {
        members
    }
}
