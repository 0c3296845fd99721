//! Semi-structured field normalization.
//!
//! Contact attributes such as experiences, skills, education and keywords are
//! stored inconsistently: NULL, JSON arrays of strings, JSON arrays of
//! objects, single JSON objects, Postgres array literals, or plain
//! comma-separated text. This module turns any of those into two stable
//! strings:
//!
//! - **display**: human-readable, list items joined with `" | "`
//! - **canonical**: compact JSON of the parsed structure, or the raw text when
//!   the value is not JSON
//!
//! Every function here is total. Parse failures fall through to the next
//! decoding step and finally to the literal value; nothing panics or errors.
//!
//! ## Decoding chain
//!
//! | Input | display | canonical |
//! |-------|---------|-----------|
//! | NULL / blank | `""` | `""` |
//! | JSON array | element labels joined by `" \| "` | compact JSON |
//! | JSON object | `"<title> at <name>"`, name, or JSON | compact JSON |
//! | JSON scalar | its text (`null` → `""`) | its text |
//! | not JSON | raw value | raw value |
//!
//! Ingestion artifacts (labels that are blank or the literal text `null`) are
//! dropped from JSON-decoded lists. The non-JSON fallback is literal and does
//! not filter tokens.

use serde_json::{Map, Value};

/// Separator between list items in the display form.
pub const LIST_SEPARATOR: &str = " | ";

/// Marker appended to truncated text.
pub const TRUNCATION_MARKER: &str = "...";

/// Keys read as an item's title, in priority order.
const TITLE_KEYS: &[&str] = &["title", "position", "degree"];

/// Keys read as an item's name (person, company or school), in priority order.
const NAME_KEYS: &[&str] = &["name", "company", "company_name", "school"];

/// Keys read as a skill label.
const SKILL_KEYS: &[&str] = &["skill"];

/// The two renderings of a semi-structured value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Human-readable form for tables and markdown.
    pub display: String,
    /// Round-trippable form for CSV and re-storage.
    pub canonical: String,
}

impl Normalized {
    fn both(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            display: text.clone(),
            canonical: text,
        }
    }
}

/// Normalize a raw column value into its display and canonical forms.
pub fn normalize(raw: Option<&str>) -> Normalized {
    let Some(raw) = raw else {
        return Normalized::default();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Normalized::default();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => {
            let display = items
                .iter()
                .filter_map(element_label)
                .filter(|label| !is_artifact(label))
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR);
            Normalized {
                display,
                canonical: compact(&Value::Array(items)),
            }
        }
        Ok(Value::Object(map)) => Normalized {
            display: object_display(&map),
            canonical: compact(&Value::Object(map)),
        },
        Ok(Value::String(s)) if is_artifact(&s) => Normalized::default(),
        Ok(Value::String(s)) => Normalized::both(s.trim()),
        Ok(Value::Null) => Normalized::default(),
        Ok(scalar) => Normalized::both(scalar.to_string()),
        Err(_) => Normalized::both(raw),
    }
}

/// Explode a list-like value into individual labels.
///
/// Used for keyword statistics. Unlike [`normalize`], the non-JSON fallback is
/// tokenized: Postgres array literals (`{a,"b c"}`) are unpacked and plain
/// text is split on commas. Blank and `null` tokens are always dropped.
pub fn tokens(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let labels = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => items.iter().filter_map(element_label).collect(),
        Ok(Value::Object(map)) => vec![object_display(&map)],
        Ok(Value::String(s)) => split_delimited(&s),
        Ok(Value::Null) => Vec::new(),
        Ok(scalar) => vec![scalar.to_string()],
        Err(_) if trimmed.starts_with('{') && trimmed.ends_with('}') => {
            parse_pg_array(&trimmed[1..trimmed.len() - 1])
        }
        Err(_) => split_delimited(trimmed),
    };

    labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !is_artifact(label))
        .collect()
}

/// Decode a value for embedding in a JSON payload.
///
/// JSON arrays and objects are embedded as structured values; everything else
/// is kept as the raw string.
pub fn structured(raw: Option<&str>) -> Value {
    let Some(raw) = raw else {
        return Value::Null;
    };
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value @ (Value::Array(_) | Value::Object(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

/// Cut `text` to at most `max_chars` characters, appending
/// [`TRUNCATION_MARKER`] when anything was removed.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}{}", kept.trim_end(), TRUNCATION_MARKER)
}

/// Whether a token is an ingestion artifact rather than data.
fn is_artifact(token: &str) -> bool {
    let token = token.trim();
    token.is_empty() || token.eq_ignore_ascii_case("null")
}

/// Label for one element of a JSON list.
fn element_label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Object(map) => Some(object_label(map)),
        Value::Array(_) => Some(compact(value)),
        other => Some(other.to_string()),
    }
}

/// Label for an object inside a list: "title at name", else title, name or
/// skill, else the object's JSON.
fn object_label(map: &Map<String, Value>) -> String {
    let title = first_field(map, TITLE_KEYS);
    let name = first_field(map, NAME_KEYS);
    match (title, name) {
        (Some(title), Some(name)) => format!("{} at {}", title, name),
        (Some(title), None) => title,
        (None, Some(name)) => name,
        (None, None) => first_field(map, SKILL_KEYS)
            .unwrap_or_else(|| compact(&Value::Object(map.clone()))),
    }
}

/// Display for a standalone object: "title at name", else name, else JSON.
fn object_display(map: &Map<String, Value>) -> String {
    let title = first_field(map, TITLE_KEYS);
    let name = first_field(map, NAME_KEYS);
    match (title, name) {
        (Some(title), Some(name)) => format!("{} at {}", title, name),
        (None, Some(name)) => name,
        _ => compact(&Value::Object(map.clone())),
    }
}

/// First non-artifact string or number under any of `keys`.
fn first_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key) {
        Some(Value::String(s)) if !is_artifact(s) => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn split_delimited(text: &str) -> Vec<String> {
    text.split(',')
        .map(|token| token.trim().to_string())
        .filter(|token| !is_artifact(token))
        .collect()
}

/// Unpack the body of a Postgres array literal, honoring double quotes and
/// backslash escapes.
fn parse_pg_array(body: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if quoted => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => quoted = !quoted,
            ',' if !quoted => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}
