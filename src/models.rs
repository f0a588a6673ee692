use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudyError};

/// A phrase of the passage with an observation about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerseInsight {
    pub segment: String,
    pub insight: String,
}

/// Original language of a key term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Language {
    Greek,
    Hebrew,
    Aramaic,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Greek, Language::Hebrew, Language::Aramaic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Greek => "Greek",
            Language::Hebrew => "Hebrew",
            Language::Aramaic => "Aramaic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyTerm {
    pub word: String,
    /// Transliterated Greek, Hebrew or Aramaic word
    pub original_word: String,
    pub language: Language,
    pub definition: String,
    pub significance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CrossReference {
    pub reference: String,
    pub connection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TermDefinition {
    pub term: String,
    pub definition: String,
}

/// Structured result of one inductive analysis.
///
/// Field order follows the study method: observation (`verse_analysis`),
/// interpretation (`key_terms` through `theological_truth`), clarity
/// (`complex_terms`) and application. An empty `complex_terms` means no
/// jargon was found; the key itself is always present on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyRecord {
    pub reference: String,
    pub scripture_text: String,

    pub verse_analysis: Vec<VerseInsight>,

    pub key_terms: Vec<KeyTerm>,
    pub misconceptions: String,
    pub cultural_context: String,
    pub original_meaning: String,
    pub theological_truth: String,
    pub cross_references: Vec<CrossReference>,

    pub complex_terms: Vec<TermDefinition>,

    pub application: String,
    pub prayer_point: String,
}

impl StudyRecord {
    /// Checks the non-empty constraints that the wire schema cannot express.
    pub fn ensure_complete(&self) -> Result<()> {
        require_text("$.reference", &self.reference)?;
        require_text("$.scriptureText", &self.scripture_text)?;

        for (i, term) in self.key_terms.iter().enumerate() {
            for (field, value) in [
                ("word", &term.word),
                ("originalWord", &term.original_word),
                ("definition", &term.definition),
                ("significance", &term.significance),
            ] {
                require_text(&format!("$.keyTerms[{i}].{field}"), value)?;
            }
        }
        Ok(())
    }
}

fn require_text(path: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StudyError::schema_violation(path, "must not be empty"));
    }
    Ok(())
}

// Gemini generateContent request format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Model name, part of the endpoint path rather than the body
    #[serde(skip)]
    pub model: String,
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

// Gemini generateContent response format
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated. `None` when blank.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Convenience constructor for a single-candidate reply.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part::text(text)],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
        }
    }
}
