use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::levels::{CefrLevel, LevelEntry, LevelSource};

/// Raw word/level pair supplied by a vocabulary source before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    /// Surface word as listed by the source.
    pub word: String,
    /// Level code as listed; validated during merge.
    pub level: String,
    /// Optional rationale carried by learned entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Errors produced while reading a vocabulary source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Optional source file absent; the store logs and continues.
    #[error("source file {0:?} not found")]
    Missing(PathBuf),
    /// Malformed payload; treated as empty by the store.
    #[error("corrupt source {path:?}: {reason}")]
    Corrupt {
        /// Offending file.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },
    /// Filesystem failure other than absence.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability supplying raw word lists to the vocabulary store.
pub trait VocabularySource: Send + Sync {
    /// Label used in logs.
    fn label(&self) -> &str;
    /// Provenance stamped on entries merged from this source.
    fn origin(&self) -> LevelSource;
    /// Loads the raw entries.
    fn load(&self) -> Result<Vec<RawEntry>, SourceError>;
}

fn read_source_file(path: &Path) -> Result<String, SourceError> {
    if !path.exists() {
        return Err(SourceError::Missing(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// JSON word list. Accepts flat `{word, level}` objects and the nested
/// `{value: {word, level}}` shape; anything else is skipped.
#[derive(Debug, Clone)]
pub struct JsonWordList {
    path: PathBuf,
    origin: LevelSource,
}

impl JsonWordList {
    /// Creates a JSON source with the given provenance.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, origin: LevelSource) -> Self {
        Self {
            path: path.into(),
            origin,
        }
    }
}

impl VocabularySource for JsonWordList {
    fn label(&self) -> &str {
        self.path.to_str().unwrap_or("json word list")
    }

    fn origin(&self) -> LevelSource {
        self.origin
    }

    fn load(&self) -> Result<Vec<RawEntry>, SourceError> {
        let data = read_source_file(&self.path)?;
        let values: Vec<serde_json::Value> =
            serde_json::from_str(&data).map_err(|err| SourceError::Corrupt {
                path: self.path.clone(),
                reason: err.to_string(),
            })?;

        let mut entries = Vec::with_capacity(values.len());
        for value in values {
            let record = value.get("value").unwrap_or(&value);
            let word = record.get("word").and_then(serde_json::Value::as_str);
            let level = record.get("level").and_then(serde_json::Value::as_str);
            if let (Some(word), Some(level)) = (word, level) {
                if word.is_empty() {
                    continue;
                }
                entries.push(RawEntry {
                    word: word.to_string(),
                    level: level.to_string(),
                    explanation: None,
                });
            }
        }
        Ok(entries)
    }
}

/// Headerless two-column CSV word list: `word,level` per row. Rows with
/// fewer than two columns are skipped.
#[derive(Debug, Clone)]
pub struct CsvWordList {
    path: PathBuf,
    origin: LevelSource,
}

impl CsvWordList {
    /// Creates a CSV source with the given provenance.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, origin: LevelSource) -> Self {
        Self {
            path: path.into(),
            origin,
        }
    }
}

impl VocabularySource for CsvWordList {
    fn label(&self) -> &str {
        self.path.to_str().unwrap_or("csv word list")
    }

    fn origin(&self) -> LevelSource {
        self.origin
    }

    fn load(&self) -> Result<Vec<RawEntry>, SourceError> {
        let data = read_source_file(&self.path)?;
        let mut entries = Vec::new();
        for line in data.lines() {
            let mut columns = line.split(',');
            let word = columns.next().map(str::trim).unwrap_or_default();
            let Some(level) = columns.next().map(str::trim) else {
                continue;
            };
            if word.is_empty() || level.is_empty() {
                continue;
            }
            entries.push(RawEntry {
                word: word.to_string(),
                level: level.to_string(),
                explanation: None,
            });
        }
        Ok(entries)
    }
}

/// Learned-words list persisted by earlier runs: a JSON array of
/// [`LevelEntry`] records, merged at the lowest static priority.
#[derive(Debug, Clone)]
pub struct LearnedWordList {
    path: PathBuf,
}

impl LearnedWordList {
    /// Creates a learned-words source.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the persisted records, tolerating absence. Used by both the
    /// merge path and the save path's read-modify-write cycle.
    pub fn read_entries(&self) -> Result<Vec<LevelEntry>, SourceError> {
        let data = match read_source_file(&self.path) {
            Ok(data) => data,
            Err(SourceError::Missing(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        serde_json::from_str(&data).map_err(|err| SourceError::Corrupt {
            path: self.path.clone(),
            reason: err.to_string(),
        })
    }

    /// Path the list persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VocabularySource for LearnedWordList {
    fn label(&self) -> &str {
        self.path.to_str().unwrap_or("learned word list")
    }

    fn origin(&self) -> LevelSource {
        LevelSource::User
    }

    fn load(&self) -> Result<Vec<RawEntry>, SourceError> {
        let entries = self.read_entries()?;
        Ok(entries
            .into_iter()
            .map(|entry| RawEntry {
                word: entry.word,
                level: entry.level.code().to_string(),
                explanation: entry.explanation,
            })
            .collect())
    }
}

/// Minimal built-in vocabulary spanning all six bands, used when every real
/// source fails so classification stays usable in a degraded mode.
#[must_use]
pub fn fallback_entries() -> Vec<(&'static str, CefrLevel)> {
    vec![
        ("hello", CefrLevel::A1),
        ("world", CefrLevel::A1),
        ("simple", CefrLevel::A2),
        ("basic", CefrLevel::A2),
        ("intermediate", CefrLevel::B1),
        ("progress", CefrLevel::B1),
        ("advanced", CefrLevel::B2),
        ("complex", CefrLevel::B2),
        ("proficient", CefrLevel::C1),
        ("master", CefrLevel::C1),
        ("expert", CefrLevel::C2),
        ("fluent", CefrLevel::C2),
    ]
}

/// Hard-coded example words per band, used when the live vocabulary has
/// fewer than the requested number of prompt examples.
#[must_use]
pub fn fallback_examples(level: CefrLevel) -> &'static [&'static str] {
    match level {
        CefrLevel::A1 => &["hello", "water", "book", "house", "car"],
        CefrLevel::A2 => &["weather", "hobby", "family", "shopping", "weekend"],
        CefrLevel::B1 => &["advantage", "culture", "solution", "experience", "celebrate"],
        CefrLevel::B2 => &[
            "consideration",
            "assumption",
            "perspective",
            "controversy",
            "volume",
        ],
        CefrLevel::C1 => &[
            "implementation",
            "phenomenon",
            "subsequent",
            "unprecedented",
            "innovative",
        ],
        CefrLevel::C2 => &[
            "paradigm",
            "juxtaposition",
            "nuance",
            "ambivalence",
            "meticulous",
        ],
        CefrLevel::Unknown => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn json_source_accepts_flat_and_nested_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("primary.json");
        fs::write(
            &path,
            r#"[
                {"word": "hello", "level": "A1"},
                {"value": {"word": "paradigm", "level": "C2"}},
                {"unrelated": true},
                {"value": {"word": "", "level": "A1"}}
            ]"#,
        )
        .unwrap();

        let source = JsonWordList::new(&path, LevelSource::Primary);
        let entries = source.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].word, "hello");
        assert_eq!(entries[1].word, "paradigm");
        assert_eq!(entries[1].level, "C2");
    }

    #[test]
    fn json_source_reports_missing_and_corrupt_files() {
        let dir = tempdir().unwrap();
        let missing = JsonWordList::new(dir.path().join("absent.json"), LevelSource::Primary);
        assert!(matches!(missing.load(), Err(SourceError::Missing(_))));

        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();
        let corrupt = JsonWordList::new(&path, LevelSource::Primary);
        assert!(matches!(corrupt.load(), Err(SourceError::Corrupt { .. })));
    }

    #[test]
    fn csv_source_skips_short_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secondary.csv");
        fs::write(&path, "abandon,B2\nmalformed\nweekend,A2\n,B1\n").unwrap();

        let source = CsvWordList::new(&path, LevelSource::Secondary);
        let entries = source.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].word, "abandon");
        assert_eq!(entries[0].level, "B2");
        assert_eq!(entries[1].word, "weekend");
    }

    #[test]
    fn learned_source_round_trips_level_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("learned.json");
        let records = vec![
            LevelEntry::new("xylophone", CefrLevel::B2, LevelSource::Llm)
                .with_explanation("musical instrument"),
        ];
        fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

        let source = LearnedWordList::new(&path);
        let entries = source.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "xylophone");
        assert_eq!(entries[0].level, "B2");
        assert_eq!(entries[0].explanation.as_deref(), Some("musical instrument"));
    }

    #[test]
    fn learned_source_tolerates_absence() {
        let dir = tempdir().unwrap();
        let source = LearnedWordList::new(dir.path().join("absent.json"));
        assert!(source.load().unwrap().is_empty());
    }

    #[test]
    fn fallback_vocabulary_spans_all_bands() {
        let entries = fallback_entries();
        assert_eq!(entries.len(), 12);
        for level in CefrLevel::BANDS {
            assert!(entries.iter().any(|(_, l)| *l == level));
            assert_eq!(fallback_examples(level).len(), 5);
        }
    }
}
