//! Tests for the flattening module

use super::*;
use crate::model::{Properties, PropertyValue};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

fn cell(raw: Value, empty_cell: EmptyCell) -> String {
    PropertyFlattener::new(FlattenOptions::new(empty_cell)).flatten_value(&PropertyValue::from(raw))
}

fn props(entries: Vec<(&str, Value)>) -> Properties {
    entries
        .into_iter()
        .map(|(name, raw)| (name.to_string(), PropertyValue::from(raw)))
        .collect()
}

// ============================================================================
// Non-empty Rendering
// ============================================================================

#[test_case(json!({"type": "email", "email": " ann@example.com "}), "ann@example.com" ; "email trimmed")]
#[test_case(json!({"type": "phone_number", "phone_number": "+1 555"}), "+1 555" ; "phone")]
#[test_case(json!({"type": "url", "url": "https://x.y"}), "https://x.y" ; "url")]
#[test_case(json!({"type": "title", "title": [{"plain_text": " Ann "}]}), "Ann" ; "title trimmed")]
#[test_case(json!({"type": "rich_text", "rich_text": [{"plain_text": "a "}, {"plain_text": " b"}]}), "a;b" ; "rich text joined")]
#[test_case(json!({"type": "people", "people": [
    {"name": "Ann", "person": {"email": "ann@x.y"}},
    {"name": "Bot", "bot": {}}
]}), "Ann | ann@x.y;Bot | " ; "people with missing address")]
#[test_case(json!({"type": "relation", "relation": [{"id": "p1"}, {"id": "p2"}]}), "p1;p2" ; "relation")]
#[test_case(json!({"type": "select", "select": {"name": "Hot"}}), "Hot" ; "select")]
#[test_case(json!({"type": "status", "status": {"name": "In progress"}}), "In progress" ; "status")]
#[test_case(json!({"type": "multi_select", "multi_select": [{"name": "a"}, {"name": "b"}]}), "a;b" ; "multi select")]
#[test_case(json!({"type": "number", "number": 42}), "42" ; "other number")]
#[test_case(json!({"type": "checkbox", "checkbox": true}), "true" ; "other bool")]
#[test_case(json!({"type": "created_time", "created_time": " 2024-01-01T00:00:00.000Z "}), "2024-01-01T00:00:00.000Z" ; "other string trimmed")]
#[test_case(json!({"type": "date", "date": {"start": "2024-01-01", "end": null}}), r#"{"start":"2024-01-01","end":null}"# ; "other object compact json")]
fn test_flatten_non_empty(raw: Value, expected: &str) {
    assert_eq!(cell(raw.clone(), EmptyCell::Blank), expected);
    assert_eq!(cell(raw, EmptyCell::Quoted), expected);
}

#[test]
fn test_flatten_rollup_groups() {
    let raw = json!({
        "type": "rollup",
        "rollup": {
            "type": "array",
            "array": [
                {"type": "rich_text", "rich_text": [{"plain_text": " x "}, {"plain_text": "y"}]},
                {"type": "title", "title": [{"plain_text": "z"}]},
                {"type": "number", "number": 3}
            ]
        }
    });

    assert_eq!(cell(raw, EmptyCell::Blank), "x;y;z;3");
}

#[test]
fn test_flatten_rollup_scalar_falls_back_to_json() {
    let raw = json!({
        "type": "rollup",
        "rollup": {"type": "number", "number": 7, "function": "sum"}
    });

    assert_eq!(
        cell(raw, EmptyCell::Blank),
        r#"{"type":"number","number":7,"function":"sum"}"#
    );
}

// ============================================================================
// Empty Rendering
// ============================================================================

#[test_case(json!({"type": "email", "email": ""}) ; "empty email")]
#[test_case(json!({"type": "email", "email": null}) ; "null email")]
#[test_case(json!({"type": "url"}) ; "absent url")]
#[test_case(json!({"type": "title", "title": []}) ; "no title spans")]
#[test_case(json!({"type": "rich_text", "rich_text": []}) ; "no rich text spans")]
#[test_case(json!({"type": "people", "people": []}) ; "no people")]
#[test_case(json!({"type": "relation", "relation": []}) ; "no relations")]
#[test_case(json!({"type": "select", "select": null}) ; "null select")]
#[test_case(json!({"type": "multi_select", "multi_select": []}) ; "no labels")]
#[test_case(json!({"type": "rollup", "rollup": {"type": "array", "array": []}}) ; "no rollup groups")]
#[test_case(json!({"type": "rollup", "rollup": {"type": "array", "array": [{"type": "rich_text", "rich_text": []}]}}) ; "rollup groups without text")]
#[test_case(json!({"type": "number", "number": null}) ; "null other")]
#[test_case(json!({"type": "formula"}) ; "absent other")]
#[test_case(json!({"type": "files", "files": []}) ; "no files")]
#[test_case(json!({"type": "formula_text", "formula_text": ""}) ; "empty other string")]
#[test_case(json!({"type": "verification", "verification": {}}) ; "empty other object")]
#[test_case(json!({"type": "rollup", "rollup": {"type": "array", "array": [{"type": "number", "number": null}]}}) ; "rollup group with null value")]
fn test_flatten_empty_uses_sentinel(raw: Value) {
    assert_eq!(cell(raw.clone(), EmptyCell::Blank), "");
    assert_eq!(cell(raw, EmptyCell::Quoted), "\"\"");
}

#[test]
fn test_blank_text_is_not_empty() {
    // Populated with whitespace only: rendered as blank text, not as the sentinel
    let raw = json!({"type": "title", "title": [{"plain_text": "   "}]});
    assert_eq!(cell(raw, EmptyCell::Quoted), "");
}

// ============================================================================
// Escaping
// ============================================================================

#[test]
fn test_flatten_escapes_field_and_row_delimiters() {
    let raw = json!({"type": "rich_text", "rich_text": [
        {"plain_text": "line one\nline two"},
        {"plain_text": "col\tumn\r"}
    ]});

    let flattened = cell(raw, EmptyCell::Blank);

    assert_eq!(flattened, "line one\\nline two;col\\tumn");
    assert!(!flattened.contains(['\t', '\n', '\r']));
}

#[test]
fn test_flatten_escapes_backslash_before_delimiters() {
    // A literal backslash-t must stay distinguishable from an escaped tab
    let literal = json!({"type": "email", "email": "a\\tb"});
    let tab = json!({"type": "email", "email": "a\tb"});

    assert_eq!(cell(literal, EmptyCell::Blank), "a\\\\tb");
    assert_eq!(cell(tab, EmptyCell::Blank), "a\\tb");
}

#[test]
fn test_flatten_other_and_rollup_values_escaped_once() {
    let other = json!({"type": "formula_text", "formula_text": "x\ty"});
    let rollup = json!({
        "type": "rollup",
        "rollup": {"type": "array", "array": [{"type": "formula_text", "formula_text": "x\ty"}]}
    });

    assert_eq!(cell(other, EmptyCell::Blank), "x\\ty");
    assert_eq!(cell(rollup, EmptyCell::Blank), "x\\ty");
}

#[test]
fn test_flatten_escapes_select_label() {
    let raw = json!({"type": "select", "select": {"name": "a\tb"}});
    assert_eq!(cell(raw, EmptyCell::Blank), "a\\tb");
}

// ============================================================================
// Mapping Flattening
// ============================================================================

#[test]
fn test_flatten_preserves_order() {
    let properties = props(vec![
        ("Name", json!({"type": "title", "title": [{"plain_text": " Ann "}]})),
        ("Email", json!({"type": "email", "email": ""})),
        ("Tags", json!({"type": "multi_select", "multi_select": [{"name": "vip"}]})),
    ]);

    let flattener = PropertyFlattener::default();
    assert_eq!(flattener.flatten(&properties), vec!["Ann", "", "vip"]);
}

#[test]
fn test_flatten_is_deterministic() {
    let properties = props(vec![
        ("People", json!({"type": "people", "people": [{"name": "A", "person": {"email": "a@b"}}]})),
        ("Date", json!({"type": "date", "date": {"start": "2024-01-01", "end": null, "time_zone": null}})),
        ("Select", json!({"type": "select", "select": null})),
    ]);

    let flattener = PropertyFlattener::new(FlattenOptions::new(EmptyCell::Quoted));
    let first = flattener.flatten(&properties);
    let second = flattener.flatten(&properties);

    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            "A | a@b".to_string(),
            r#"{"start":"2024-01-01","end":null,"time_zone":null}"#.to_string(),
            "\"\"".to_string(),
        ]
    );
}

#[test]
fn test_empty_cell_display_and_str() {
    assert_eq!(EmptyCell::default(), EmptyCell::Blank);
    assert_eq!(EmptyCell::Blank.as_str(), "");
    assert_eq!(EmptyCell::Quoted.as_str(), "\"\"");
    assert_eq!(EmptyCell::Quoted.to_string(), "quoted");
    assert_ne!(JOIN_SEPARATOR, "\t");
}
