use std::fmt;

use serde::{Deserialize, Serialize};

/// CEFR proficiency band assigned to a word.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum CefrLevel {
    /// Beginner vocabulary.
    A1,
    /// Elementary vocabulary.
    A2,
    /// Intermediate vocabulary.
    B1,
    /// Upper-intermediate vocabulary.
    B2,
    /// Advanced vocabulary.
    C1,
    /// Mastery vocabulary.
    C2,
    /// No band could be resolved.
    Unknown,
}

impl CefrLevel {
    /// The six recognized bands in ascending order.
    pub const BANDS: [Self; 6] = [Self::A1, Self::A2, Self::B1, Self::B2, Self::C1, Self::C2];

    /// Parses a band code case-insensitively. Only the six recognized codes
    /// succeed; `Unknown` is a resolution outcome, never an input.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "a1" => Some(Self::A1),
            "a2" => Some(Self::A2),
            "b1" => Some(Self::B1),
            "b2" => Some(Self::B2),
            "c1" => Some(Self::C1),
            "c2" => Some(Self::C2),
            _ => None,
        }
    }

    /// Uppercase code used in prompts and rendered output.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Lowercase key used by the per-band bucket sets and JSON reports.
    #[must_use]
    pub const fn bucket(self) -> &'static str {
        match self {
            Self::A1 => "a1",
            Self::A2 => "a2",
            Self::B1 => "b1",
            Self::B2 => "b2",
            Self::C1 => "c1",
            Self::C2 => "c2",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Provenance of a level entry, ranked for merge precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelSource {
    /// Large curated static list.
    Primary,
    /// Supplementary frequency-derived list.
    Secondary,
    /// Learned entries persisted by earlier runs.
    User,
    /// Freshly classified by the remote capability.
    Llm,
    /// Conservative fallback applied when remote classification fails.
    Default,
}

impl LevelSource {
    /// Merge priority. A key written by a higher-priority source is never
    /// overwritten by a lower-priority one.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Primary => 3,
            Self::Secondary => 2,
            Self::User | Self::Llm => 1,
            Self::Default => 0,
        }
    }
}

/// Classified vocabulary entry. Immutable once created; re-classification
/// replaces the record wholesale rather than merging fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    /// Base word the entry describes.
    pub word: String,
    /// Assigned band.
    pub level: CefrLevel,
    /// Provenance of the assignment.
    pub source: LevelSource,
    /// Optional rationale supplied by the remote classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl LevelEntry {
    /// Creates an entry without an explanation.
    #[must_use]
    pub fn new(word: impl Into<String>, level: CefrLevel, source: LevelSource) -> Self {
        Self {
            word: word.into(),
            level,
            source,
            explanation: None,
        }
    }

    /// Attaches an explanation.
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Conservative fallback entry for a word the remote path could not
    /// classify. Unclassifiable vocabulary is treated as advanced rather
    /// than dropped.
    #[must_use]
    pub fn default_for(word: impl Into<String>) -> Self {
        Self::new(word, CefrLevel::C1, LevelSource::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(CefrLevel::parse("b2"), Some(CefrLevel::B2));
        assert_eq!(CefrLevel::parse(" C1 "), Some(CefrLevel::C1));
        assert_eq!(CefrLevel::parse("unknown"), None);
        assert_eq!(CefrLevel::parse("d1"), None);
    }

    #[test]
    fn priority_orders_sources() {
        assert!(LevelSource::Primary.priority() > LevelSource::Secondary.priority());
        assert!(LevelSource::Secondary.priority() > LevelSource::Llm.priority());
        assert_eq!(LevelSource::User.priority(), LevelSource::Llm.priority());
        assert!(LevelSource::Llm.priority() > LevelSource::Default.priority());
    }

    #[test]
    fn entry_serializes_with_wire_field_names() {
        let entry = LevelEntry::new("paradigm", CefrLevel::C2, LevelSource::Llm)
            .with_explanation("rare academic word");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["word"], "paradigm");
        assert_eq!(json["level"], "C2");
        assert_eq!(json["source"], "llm");
        assert_eq!(json["explanation"], "rare academic word");

        let plain = LevelEntry::new("hello", CefrLevel::A1, LevelSource::Primary);
        let json = serde_json::to_string(&plain).unwrap();
        assert!(!json.contains("explanation"));
    }
}
