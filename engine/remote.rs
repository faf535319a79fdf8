use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

use crate::levels::{CefrLevel, LevelEntry, LevelSource};

/// Band definitions embedded in every classification prompt.
pub const CEFR_DEFINITIONS: &str = "\
CEFR Levels:
A1: Beginner - Basic everyday words
A2: Elementary - Simple common words
B1: Intermediate - Common words in many contexts
B2: Upper-Intermediate - More specific vocabulary
C1: Advanced - Specialized academic/professional words
C2: Proficiency - Rare and nuanced words";

/// One remote classification request: an ordered batch of distinct unknown
/// words plus the fully rendered prompt.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    /// Request identifier for logs.
    pub id: Uuid,
    /// Words to classify, at most the batch size.
    pub words: Vec<String>,
    /// Free-text prompt sent to the capability.
    pub prompt: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ClassificationRequest {
    /// Builds a request, rendering the prompt from the band definitions and
    /// per-band example words.
    #[must_use]
    pub fn new(
        words: Vec<String>,
        definitions: &str,
        examples: &HashMap<CefrLevel, Vec<String>>,
    ) -> Self {
        let prompt = build_prompt(&words, definitions, examples);
        Self {
            id: Uuid::new_v4(),
            words,
            prompt,
            created_at: Utc::now(),
        }
    }
}

fn build_prompt(
    words: &[String],
    definitions: &str,
    examples: &HashMap<CefrLevel, Vec<String>>,
) -> String {
    let mut example_lines = Vec::with_capacity(CefrLevel::BANDS.len());
    for level in CefrLevel::BANDS {
        let sample = examples
            .get(&level)
            .map(|words| words.join(", "))
            .unwrap_or_default();
        example_lines.push(format!("{} examples: {sample}", level.code()));
    }

    format!(
        "{definitions}\n\n{examples}\n\nFor each of the following words, determine the most \
         appropriate CEFR level (A1, A2, B1, B2, C1, or C2) based on:\n\
         1. Word frequency in everyday language\n\
         2. Complexity of the word\n\
         3. When students typically learn this word\n\n\
         Words to classify:\n{words}\n\n\
         For each word, provide the level and a brief explanation in this JSON format:\n\
         {{\n  \"word1\": {{\"level\": \"A1\", \"explanation\": \"Basic everyday word\"}},\n  \
         \"word2\": {{\"level\": \"C2\", \"explanation\": \"Advanced academic vocabulary\"}}\n}}",
        examples = example_lines.join("\n"),
        words = words.join(", "),
    )
}

/// Errors emitted while calling the remote classification capability.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network failure reaching the provider.
    #[error("transport error: {0}")]
    Transport(String),
    /// Provider rejected the request (auth, rate limit, model error).
    #[error("provider error: {0}")]
    Provider(String),
}

/// Abstract text-generation capability that classifies word batches. The
/// response is free text expected to contain one JSON object mapping each
/// requested word to its level and explanation.
#[async_trait]
pub trait RemoteClassifier: Send + Sync {
    /// Executes the request, returning the raw response text.
    async fn classify(&self, request: &ClassificationRequest) -> Result<String, RemoteError>;
}

/// Loopback client for tests and offline runs: answers every requested word
/// with a fixed band.
#[derive(Debug, Clone, Copy)]
pub struct LoopbackClassifier {
    level: CefrLevel,
}

impl LoopbackClassifier {
    /// Creates a loopback client answering with the given band.
    #[must_use]
    pub const fn new(level: CefrLevel) -> Self {
        Self { level }
    }
}

impl Default for LoopbackClassifier {
    fn default() -> Self {
        Self::new(CefrLevel::B1)
    }
}

#[async_trait]
impl RemoteClassifier for LoopbackClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<String, RemoteError> {
        sleep(Duration::from_millis(10)).await;
        let mut body = serde_json::Map::new();
        for word in &request.words {
            body.insert(
                word.to_lowercase(),
                serde_json::json!({
                    "level": self.level.code(),
                    "explanation": "loopback classification",
                }),
            );
        }
        Ok(Value::Object(body).to_string())
    }
}

/// Extracts the first balanced `{...}` block from free text, honoring JSON
/// string and escape boundaries. Returns `None` when no block closes.
#[must_use]
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses a remote response against the requested batch. `None` means the
/// whole response is unusable (no JSON block, or the block is not an
/// object); the caller then defaults the entire batch. Within a parsed
/// response, degradation is per word: an unrecognized level or a word the
/// response skipped becomes the conservative C1 default. Response keys
/// match case-insensitively and words outside the batch are ignored.
#[must_use]
pub fn parse_response(words: &[String], response: &str) -> Option<HashMap<String, LevelEntry>> {
    let block = extract_json_block(response)?;
    let parsed: Value = serde_json::from_str(block).ok()?;
    let object = parsed.as_object()?;

    let by_word: HashMap<String, &Value> = object
        .iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect();

    let mut entries = HashMap::with_capacity(words.len());
    for word in words {
        let key = word.to_lowercase();
        let entry = match by_word.get(&key) {
            Some(value) => classified_entry(&key, value),
            None => LevelEntry::default_for(&key).with_explanation("missing from response"),
        };
        entries.insert(key, entry);
    }
    Some(entries)
}

fn classified_entry(word: &str, value: &Value) -> LevelEntry {
    let level = value
        .get("level")
        .and_then(Value::as_str)
        .and_then(CefrLevel::parse);
    let Some(level) = level else {
        return LevelEntry::default_for(word).with_explanation("level not recognized");
    };
    let mut entry = LevelEntry::new(word, level, LevelSource::Llm);
    if let Some(explanation) = value.get("explanation").and_then(Value::as_str) {
        if !explanation.is_empty() {
            entry = entry.with_explanation(explanation);
        }
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(words: &[&str]) -> ClassificationRequest {
        ClassificationRequest::new(
            words.iter().map(ToString::to_string).collect(),
            CEFR_DEFINITIONS,
            &HashMap::new(),
        )
    }

    #[test]
    fn prompt_embeds_definitions_examples_and_words() {
        let mut examples = HashMap::new();
        examples.insert(
            CefrLevel::A1,
            vec!["hello".to_string(), "water".to_string()],
        );
        let request = ClassificationRequest::new(
            vec!["xylophone".into(), "quark".into()],
            CEFR_DEFINITIONS,
            &examples,
        );
        assert!(request.prompt.contains("CEFR Levels:"));
        assert!(request.prompt.contains("A1 examples: hello, water"));
        assert!(request.prompt.contains("xylophone, quark"));
    }

    #[test]
    fn extract_json_block_finds_first_balanced_object() {
        let text = "Sure! Here you go:\n{\"a\": {\"level\": \"B1\"}} trailing {\"b\": 1}";
        assert_eq!(extract_json_block(text), Some("{\"a\": {\"level\": \"B1\"}}"));
    }

    #[test]
    fn extract_json_block_honors_string_braces() {
        let text = r#"{"a": {"explanation": "uses { and } freely"}}"#;
        assert_eq!(extract_json_block(text), Some(text));
        assert_eq!(extract_json_block("no json here"), None);
        assert_eq!(extract_json_block("{ never closes"), None);
    }

    #[test]
    fn parse_response_matches_case_insensitively() {
        let words = vec!["Xylophone".to_string()];
        let response = r#"{"XYLOPHONE": {"level": "b2", "explanation": "instrument"}}"#;
        let entries = parse_response(&words, response).unwrap();
        let entry = &entries["xylophone"];
        assert_eq!(entry.level, CefrLevel::B2);
        assert_eq!(entry.source, LevelSource::Llm);
        assert_eq!(entry.explanation.as_deref(), Some("instrument"));
    }

    #[test]
    fn parse_response_defaults_unrecognized_levels_per_word() {
        let words = vec!["quark".to_string(), "gluon".to_string()];
        let response = r#"{
            "quark": {"level": "Z9", "explanation": "?"},
            "gluon": {"level": "C2", "explanation": "physics"},
            "extra": {"level": "A1", "explanation": "ignored"}
        }"#;
        let entries = parse_response(&words, response).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["quark"].level, CefrLevel::C1);
        assert_eq!(entries["quark"].source, LevelSource::Default);
        assert_eq!(
            entries["quark"].explanation.as_deref(),
            Some("level not recognized")
        );
        assert_eq!(entries["gluon"].level, CefrLevel::C2);
    }

    #[test]
    fn parse_response_defaults_words_the_response_skipped() {
        let words = vec!["quark".to_string(), "gluon".to_string()];
        let response = r#"{"quark": {"level": "C1", "explanation": "physics"}}"#;
        let entries = parse_response(&words, response).unwrap();
        assert_eq!(entries["gluon"].level, CefrLevel::C1);
        assert_eq!(entries["gluon"].source, LevelSource::Default);
    }

    #[test]
    fn parse_response_rejects_blockless_text() {
        let words = vec!["quark".to_string()];
        assert!(parse_response(&words, "I cannot classify these words.").is_none());
        assert!(parse_response(&words, "[1, 2, 3]").is_none());
    }

    #[tokio::test]
    async fn loopback_answers_every_word() {
        let client = LoopbackClassifier::default();
        let request = request(&["quark", "gluon"]);
        let response = client.classify(&request).await.unwrap();
        let entries = parse_response(&request.words, &response).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.values().all(|entry| entry.level == CefrLevel::B1));
    }
}
