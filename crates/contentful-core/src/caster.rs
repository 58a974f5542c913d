//! Value casting helpers shared by mappers and generated models.
//!
//! Every function here is total: malformed or missing input degrades to an
//! empty/`None` value instead of an error, so callers decide what "unusable"
//! means for their column.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pulldown_cmark::{html, Event, Options, Parser};
use serde_json::Value;

use crate::models::Location;

const NUMERIC_PADDING: [char; 6] = [' ', '\t', '\n', '\r', '\x0B', '\x0C'];

/// Cast a value to a string (`null` becomes `""`).
pub fn string(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(_) | Value::Object(_) => to_json(value),
    }
}

/// Whether a value counts as empty (`null`, `false`, `0`, `""`, `"0"`, `[]`, `{}`).
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Encode a value as JSON; empty values encode to `""`, never `"null"`.
pub fn to_json(value: &Value) -> String {
    if is_empty(value) {
        return String::new();
    }
    serde_json::to_string(value).unwrap_or_default()
}

/// Decode a JSON string; empty, invalid, or `null` input yields `None`.
pub fn from_json(json: &str) -> Option<Value> {
    if json.is_empty() || json == "0" {
        return None;
    }
    serde_json::from_str::<Value>(json)
        .ok()
        .filter(|value| !value.is_null())
}

/// Render markdown to HTML, turning soft line breaks into `<br />`.
pub fn markdown(md: &str) -> String {
    if md.is_empty() || md == "0" {
        return String::new();
    }

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(md, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut rendered = String::with_capacity(md.len() * 3 / 2);
    html::push_html(&mut rendered, parser);
    rendered.trim_end().to_string()
}

/// Cast a numeric value to an integer, truncating decimals.
///
/// Non-numeric input (including `""` and booleans) yields `None`, not zero.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| number.as_f64().map(truncate)),
        Value::String(text) => {
            let trimmed = trim_numeric(text)?;
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| parse_numeric(trimmed).map(truncate))
        }
        _ => None,
    }
}

/// Cast a numeric value to a float.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => trim_numeric(text).and_then(parse_numeric),
        _ => None,
    }
}

/// Cast a value to a boolean (`null` and unknown strings are `false`).
pub fn boolean(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(_) => !is_empty(value),
        Value::String(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        _ => false,
    }
}

/// Parse a Contentful date field (`2024-05-01`, `2024-05-01T10:00`, or RFC 3339).
pub fn datetime(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
}

/// Read a `{ lat, lon }` location from an object or its JSON encoding.
pub fn location(value: &Value) -> Option<Location> {
    match value {
        Value::String(json) => from_json(json).and_then(|decoded| location(&decoded)),
        Value::Object(map) => Some(Location {
            lat: number(map.get("lat")?)?,
            lon: number(map.get("lon")?)?,
        }),
        _ => None,
    }
}

/// Read a list of strings from an array or its JSON encoding.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(json) => from_json(json)
            .map(|decoded| string_list(&decoded))
            .unwrap_or_default(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Return the entry id of a `Link` object (`sys.id`), if present.
pub fn entry_id(link: &Value) -> Option<String> {
    link.get("sys")?
        .get("id")?
        .as_str()
        .map(std::string::ToString::to_string)
}

/// Return the entry ids of a single link or an array of links, skipping broken links.
pub fn entry_ids(value: &Value) -> Vec<String> {
    match value {
        Value::Array(links) => links.iter().filter_map(entry_id).collect(),
        Value::Object(_) => entry_id(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn trim_numeric(text: &str) -> Option<&str> {
    let trimmed = text.trim_matches(NUMERIC_PADDING.as_slice());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_numeric(text: &str) -> Option<f64> {
    // Rust's float parser also accepts "inf" and "NaN", which are not numbers here.
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i64 {
    value as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn string_casts_scalars() {
        assert_eq!(string(&Value::Null), "");
        assert_eq!(string(&json!("Hello")), "Hello");
        assert_eq!(string(&json!(42)), "42");
        assert_eq!(string(&json!(true)), "1");
        assert_eq!(string(&json!(false)), "");
    }

    #[test]
    fn to_json_of_empty_input_is_empty_string() {
        assert_eq!(to_json(&Value::Null), "");
        assert_eq!(to_json(&json!([])), "");
        assert_eq!(to_json(&json!({})), "");
        assert_eq!(to_json(&json!("")), "");
    }

    #[test]
    fn json_round_trip_preserves_structure() {
        let values = [
            json!({"lat": 52.1, "lon": 4.3}),
            json!(["a", "b"]),
            json!({"nodeType": "document", "content": [{"nodeType": "paragraph"}]}),
            json!("text"),
            json!(12),
        ];
        for value in values {
            let encoded = to_json(&value);
            assert!(!encoded.is_empty());
            assert_eq!(from_json(&encoded), Some(value));
        }
    }

    #[test]
    fn from_json_never_fails() {
        assert_eq!(from_json(""), None);
        assert_eq!(from_json("{not json"), None);
        assert_eq!(from_json("null"), None);
        assert_eq!(from_json("[1,2"), None);
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(integer(&json!("42")), Some(42));
        assert_eq!(integer(&json!("abc")), None);
        assert_eq!(integer(&json!("")), None);
        assert_eq!(integer(&json!(" 7")), Some(7));
        assert_eq!(integer(&json!("4.9")), Some(4));
        assert_eq!(integer(&json!(-3)), Some(-3));
        assert_eq!(integer(&json!(2.5)), Some(2));
        assert_eq!(integer(&json!("inf")), None);
        assert_eq!(integer(&json!(true)), None);
        assert_eq!(integer(&Value::Null), None);
    }

    #[test]
    fn number_and_boolean() {
        assert_eq!(number(&json!("1.5")), Some(1.5));
        assert_eq!(number(&json!("NaN")), None);
        assert!(boolean(&json!(true)));
        assert!(boolean(&json!("yes")));
        assert!(!boolean(&json!(0)));
        assert!(!boolean(&Value::Null));
    }

    #[test]
    fn markdown_treats_soft_breaks_as_br() {
        let html = markdown("Hello\nworld");
        assert_eq!(html, "<p>Hello<br />\nworld</p>");
        assert_eq!(markdown(""), "");
        assert!(markdown("# Title").starts_with("<h1>Title</h1>"));
    }

    #[test]
    fn entry_id_reads_nested_sys_id() {
        let link = json!({"sys": {"type": "Link", "linkType": "Entry", "id": "abc123"}});
        assert_eq!(entry_id(&link), Some("abc123".to_string()));
        assert_eq!(entry_id(&json!({"sys": {"type": "Link"}})), None);
        assert_eq!(entry_id(&json!({"sys": {"id": 5}})), None);
        assert_eq!(entry_id(&json!({})), None);
        assert_eq!(entry_id(&json!("abc")), None);
    }

    #[test]
    fn entry_ids_skip_broken_links() {
        let links = json!([
            {"sys": {"id": "one"}},
            {"sys": {}},
            {"sys": {"id": "two"}}
        ]);
        assert_eq!(entry_ids(&links), vec!["one", "two"]);
        assert_eq!(entry_ids(&json!({"sys": {"id": "solo"}})), vec!["solo"]);
        assert!(entry_ids(&Value::Null).is_empty());
    }

    #[test]
    fn datetime_accepts_contentful_formats() {
        let full = datetime(&json!("2024-05-01T10:30:00Z")).unwrap();
        assert_eq!(full.to_rfc3339(), "2024-05-01T10:30:00+00:00");
        let minutes = datetime(&json!("2024-05-01T10:30")).unwrap();
        assert_eq!(minutes, full);
        let day = datetime(&json!("2024-05-01")).unwrap();
        assert_eq!(day.to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert_eq!(datetime(&json!("yesterday")), None);
    }

    #[test]
    fn location_from_object_or_json() {
        let expected = Location { lat: 52.37, lon: 4.89 };
        assert_eq!(location(&json!({"lat": 52.37, "lon": 4.89})), Some(expected));
        assert_eq!(location(&json!(r#"{"lat":52.37,"lon":4.89}"#)), Some(expected));
        assert_eq!(location(&json!({"lat": 1.0})), None);
    }

    #[test]
    fn string_list_from_array_or_json() {
        assert_eq!(string_list(&json!(["a", "b"])), vec!["a", "b"]);
        assert_eq!(string_list(&json!(r#"["x"]"#)), vec!["x"]);
        assert!(string_list(&json!("")).is_empty());
    }
}
