//! Lenient parsing of model-produced parameter records.
//!
//! Models tend to echo the single-quoted schema templates back, wrap replies
//! in code fences, or add a sentence of preamble. The parser strips all of
//! that before handing the text to serde_json.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ExtractError;
use crate::types::ParameterSet;

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*(.*?)\s*```").expect("Invalid code fence regex")
    })
}

/// Parse `raw` into one parameter set per record.
///
/// Accepts an array of records or a single record. Every record must carry
/// all of `required`. Null values are dropped, other scalars are kept in
/// their JSON text form.
pub fn parse_parameter_sets(
    raw: &str,
    required: &[&str],
) -> Result<Vec<ParameterSet>, ExtractError> {
    let body = strip_code_fence(raw);
    let structure = locate_structure(body).ok_or(ExtractError::NoStructure)?;
    let json = normalize_quotes(structure);
    let value: Value =
        serde_json::from_str(&json).map_err(|e| ExtractError::Json(e.to_string()))?;

    let records = match value {
        Value::Array(items) => items,
        record @ Value::Object(_) => vec![record],
        other => return Err(ExtractError::UnexpectedShape(kind(&other).to_string())),
    };
    if records.is_empty() {
        return Err(ExtractError::Empty);
    }

    records
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => to_parameter_set(index, map, required),
            _ => Err(ExtractError::NotARecord(index)),
        })
        .collect()
}

fn to_parameter_set(
    index: usize,
    map: Map<String, Value>,
    required: &[&str],
) -> Result<ParameterSet, ExtractError> {
    let mut set = ParameterSet::new();
    for (field, value) in map {
        match value {
            Value::Null => {}
            Value::String(s) => set.insert(field, s),
            other => set.insert(field, other.to_string()),
        }
    }

    if let Some(field) = required.iter().find(|f| !set.contains(f)) {
        return Err(ExtractError::MissingField {
            index,
            field: field.to_string(),
        });
    }
    Ok(set)
}

fn strip_code_fence(raw: &str) -> &str {
    code_fence()
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
}

/// Slice from the first opening bracket to the last matching closer.
fn locate_structure(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let closer = if text[start..].starts_with('[') { ']' } else { '}' };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Rewrite single-quoted strings as JSON double-quoted strings.
///
/// A single quote inside a single-quoted string only closes it when the next
/// non-blank character is a JSON delimiter, so apostrophes such as "it's"
/// survive. Raw line breaks and tabs inside strings are escaped.
pub fn normalize_quotes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut state = Quote::None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match state {
            Quote::None => match c {
                '"' => {
                    out.push('"');
                    state = Quote::Double;
                }
                '\'' => {
                    out.push('"');
                    state = Quote::Single;
                }
                _ => out.push(c),
            },
            Quote::Double => match c {
                '\\' => {
                    out.push('\\');
                    if let Some(&next) = chars.get(i + 1) {
                        out.push(next);
                        i += 1;
                    }
                }
                '"' => {
                    out.push('"');
                    state = Quote::None;
                }
                _ => push_string_char(&mut out, c),
            },
            Quote::Single => match c {
                '\\' => match chars.get(i + 1) {
                    Some('\'') => {
                        out.push('\'');
                        i += 1;
                    }
                    Some(&next) => {
                        out.push('\\');
                        out.push(next);
                        i += 1;
                    }
                    None => out.push_str("\\\\"),
                },
                '"' => out.push_str("\\\""),
                '\'' if closes_string(&chars[i + 1..]) => {
                    out.push('"');
                    state = Quote::None;
                }
                _ => push_string_char(&mut out, c),
            },
        }
        i += 1;
    }
    out
}

fn push_string_char(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        _ => out.push(c),
    }
}

fn closes_string(rest: &[char]) -> bool {
    match rest.iter().find(|c| !c.is_whitespace()) {
        None => true,
        Some(c) => matches!(c, ',' | ':' | '}' | ']'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASK_FIELDS: &[&str] = &["title", "description"];

    fn titles(sets: &[ParameterSet]) -> Vec<&str> {
        sets.iter().filter_map(|s| s.get("title")).collect()
    }

    // =========================================================================
    // Record parsing
    // =========================================================================

    #[test]
    fn test_parse_double_quoted_array() {
        let sets =
            parse_parameter_sets(r#"[{"title":"A","description":"B"}]"#, TASK_FIELDS).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].get("title"), Some("A"));
        assert_eq!(sets[0].get("description"), Some("B"));
    }

    #[test]
    fn test_parse_single_quoted_template_echo() {
        let raw = "[{ 'title': 'Design schema', 'description': 'Tables for users' },\n \
                   { 'title': 'Build API', 'description': 'CRUD endpoints' }]";
        let sets = parse_parameter_sets(raw, TASK_FIELDS).unwrap();
        assert_eq!(titles(&sets), vec!["Design schema", "Build API"]);
    }

    #[test]
    fn test_parse_single_object() {
        let raw = "{ 'subject': 'Outage', 'message': 'The API is down' }";
        let sets = parse_parameter_sets(raw, &[]).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].get("subject"), Some("Outage"));
    }

    #[test]
    fn test_parse_code_fenced_with_preamble() {
        let raw = "Here are your tasks:\n```json\n[{\"title\":\"A\",\"description\":\"B\"}]\n```\nLet me know!";
        let sets = parse_parameter_sets(raw, TASK_FIELDS).unwrap();
        assert_eq!(titles(&sets), vec!["A"]);
    }

    #[test]
    fn test_parse_preamble_without_fence() {
        let raw = "Sure. [{'title':'A','description':'B'}] Anything else?";
        let sets = parse_parameter_sets(raw, TASK_FIELDS).unwrap();
        assert_eq!(titles(&sets), vec!["A"]);
    }

    #[test]
    fn test_parse_keeps_apostrophes() {
        let raw = "[{'title':'Fix the user's login','description':'It's broken'}]";
        let sets = parse_parameter_sets(raw, TASK_FIELDS).unwrap();
        assert_eq!(sets[0].get("title"), Some("Fix the user's login"));
        assert_eq!(sets[0].get("description"), Some("It's broken"));
    }

    #[test]
    fn test_parse_apostrophe_in_double_quotes() {
        let raw = r#"[{"title":"Don't panic","description":"Towel's ready"}]"#;
        let sets = parse_parameter_sets(raw, TASK_FIELDS).unwrap();
        assert_eq!(sets[0].get("title"), Some("Don't panic"));
    }

    #[test]
    fn test_parse_non_string_values() {
        let raw = r#"{"subject":"Report","priority":2,"urgent":true,"cc":null}"#;
        let sets = parse_parameter_sets(raw, &[]).unwrap();
        assert_eq!(sets[0].get("priority"), Some("2"));
        assert_eq!(sets[0].get("urgent"), Some("true"));
        assert!(!sets[0].contains("cc"));
    }

    // =========================================================================
    // Rejections
    // =========================================================================

    #[test]
    fn test_reject_prose() {
        assert_eq!(
            parse_parameter_sets("I could not work out any tasks.", TASK_FIELDS),
            Err(ExtractError::NoStructure)
        );
    }

    #[test]
    fn test_reject_empty_array() {
        assert_eq!(parse_parameter_sets("[]", TASK_FIELDS), Err(ExtractError::Empty));
    }

    #[test]
    fn test_reject_missing_required_field() {
        let raw = "[{'title':'A','description':'B'},{'title':'C'}]";
        assert_eq!(
            parse_parameter_sets(raw, TASK_FIELDS),
            Err(ExtractError::MissingField {
                index: 1,
                field: "description".to_string()
            })
        );
    }

    #[test]
    fn test_reject_null_required_field() {
        let raw = r#"[{"title":null,"description":"B"}]"#;
        assert!(matches!(
            parse_parameter_sets(raw, TASK_FIELDS),
            Err(ExtractError::MissingField { index: 0, .. })
        ));
    }

    #[test]
    fn test_reject_non_record_item() {
        assert_eq!(
            parse_parameter_sets(r#"["just a string"]"#, &[]),
            Err(ExtractError::NotARecord(0))
        );
    }

    #[test]
    fn test_reject_malformed_json() {
        assert!(matches!(
            parse_parameter_sets("[{'title': 'A' 'description': 'B'}]", TASK_FIELDS),
            Err(ExtractError::Json(_))
        ));
    }

    // =========================================================================
    // Quote normalisation
    // =========================================================================

    #[test]
    fn test_normalize_quotes() {
        assert_eq!(normalize_quotes("{'a': 'b'}"), r#"{"a": "b"}"#);
        assert_eq!(
            normalize_quotes(r#"{'quote': 'she said "hi"'}"#),
            r#"{"quote": "she said \"hi\""}"#
        );
        assert_eq!(normalize_quotes(r#"{"a": "b"}"#), r#"{"a": "b"}"#);
        assert_eq!(normalize_quotes("{'a': 'line1\nline2'}"), r#"{"a": "line1\nline2"}"#);
    }

    #[test]
    fn test_locate_structure() {
        assert_eq!(locate_structure("x [1] y"), Some("[1]"));
        assert_eq!(locate_structure("a {b} c}"), Some("{b} c}"));
        assert_eq!(locate_structure("] nothing ["), None);
        assert_eq!(locate_structure("plain"), None);
    }
}
