//! Response schema sent with every analysis request, and the structural
//! check applied to replies before they are deserialized.
//!
//! The schema uses the generative API's OpenAPI subset (`OBJECT`, `ARRAY`,
//! `STRING` nodes with `properties`, `items`, `enum` and `required`), so the
//! same value can be transmitted as-is and walked locally by [`check`].

use serde_json::{Value, json};

use crate::error::{Result, StudyError};
use crate::models::Language;

/// Top-level keys every reply must carry, in wire order.
pub const REQUIRED_FIELDS: [&str; 12] = [
    "reference",
    "scriptureText",
    "verseAnalysis",
    "keyTerms",
    "misconceptions",
    "culturalContext",
    "originalMeaning",
    "theologicalTruth",
    "crossReferences",
    "complexTerms",
    "application",
    "prayerPoint",
];

fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn object(properties: Value) -> Value {
    let required: Vec<String> = properties
        .as_object()
        .map(|p| p.keys().cloned().collect())
        .unwrap_or_default();
    json!({ "type": "OBJECT", "properties": properties, "required": required })
}

fn array(description: &str, items: Value) -> Value {
    json!({ "type": "ARRAY", "description": description, "items": items })
}

/// Builds the study record schema.
pub fn study_schema() -> Value {
    let languages: Vec<&str> = Language::ALL.iter().map(Language::as_str).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "reference": string("The scripture reference (e.g., 'Romans 12:1-2')."),
            "scriptureText": string("The full text of the passage being analyzed (ESV or NASB preferred)."),
            "verseAnalysis": array(
                "Line-by-line or phrase-by-phrase breakdown of the text offering immediate insight.",
                object(json!({
                    "segment": string("The specific phrase or verse part."),
                    "insight": string("Observation and insight on this specific segment.")
                })),
            ),
            "keyTerms": array(
                "Deep dive into 2-4 key words with original language significance.",
                object(json!({
                    "word": string("The English word."),
                    "originalWord": string("The Greek or Hebrew word transliterated."),
                    "language": { "type": "STRING", "enum": languages },
                    "definition": string("The literal definition."),
                    "significance": string("Why this word choice matters/nuance.")
                })),
            ),
            "misconceptions": string("Clarify any words/phrases commonly misinterpreted or where modern language differs from the author's meaning."),
            "culturalContext": string("Historical setting, customs, or geography that informs the text."),
            "originalMeaning": string("What was the author explicitly saying to the original audience? (The 'Them')."),
            "theologicalTruth": string("What does this reveal about God's nature, character, or plan?"),
            "crossReferences": array(
                "2-3 scriptural connections that add weight or clarity.",
                object(json!({
                    "reference": { "type": "STRING" },
                    "connection": string("How it connects to the main text.")
                })),
            ),
            "complexTerms": array(
                "Definitions for any complex theological terms used in the analysis or difficult words found in the scripture.",
                object(json!({
                    "term": string("The word (e.g., Eschatology, Propitiation)."),
                    "definition": string("Simple, clear definition.")
                })),
            ),
            "application": string("Practical, personal application for the modern reader (The 'Us')."),
            "prayerPoint": string("A prayer response to the text.")
        },
        "required": REQUIRED_FIELDS
    })
}

/// Walks `value` against `schema` and returns the first violation found.
pub fn check(value: &Value, schema: &Value) -> Result<()> {
    check_node(value, schema, "$")
}

fn check_node(value: &Value, schema: &Value, path: &str) -> Result<()> {
    match schema.get("type").and_then(Value::as_str) {
        Some("OBJECT") => {
            let fields = value
                .as_object()
                .ok_or_else(|| mismatch(path, "an object", value))?;

            if let Some(required) = schema.get("required").and_then(Value::as_array) {
                for key in required.iter().filter_map(Value::as_str) {
                    if !fields.contains_key(key) {
                        return Err(StudyError::schema_violation(
                            format!("{path}.{key}"),
                            "required field is missing",
                        ));
                    }
                }
            }

            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (key, sub_schema) in properties {
                    if let Some(sub_value) = fields.get(key) {
                        check_node(sub_value, sub_schema, &format!("{path}.{key}"))?;
                    }
                }
            }
        }
        Some("ARRAY") => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch(path, "an array", value))?;
            if let Some(item_schema) = schema.get("items") {
                for (i, item) in items.iter().enumerate() {
                    check_node(item, item_schema, &format!("{path}[{i}]"))?;
                }
            }
        }
        Some("STRING") => {
            let text = value
                .as_str()
                .ok_or_else(|| mismatch(path, "a string", value))?;
            if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
                if !allowed.iter().any(|a| a.as_str() == Some(text)) {
                    return Err(StudyError::schema_violation(
                        path,
                        format!("'{text}' is not one of {}", Value::Array(allowed.clone())),
                    ));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn mismatch(path: &str, expected: &str, found: &Value) -> StudyError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    StudyError::schema_violation(path, format!("expected {expected}, found {found}"))
}
