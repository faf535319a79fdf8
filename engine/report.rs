use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::levels::{CefrLevel, LevelEntry};

/// Grouped difficulty rollups: A1+A2, B1+B2, C1+C2, and unresolved words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedCounts {
    /// A1 and A2 words.
    pub elementary: usize,
    /// B1 and B2 words.
    pub intermediate: usize,
    /// C1 and C2 words.
    pub advanced: usize,
    /// Words without a resolved band.
    pub unknown: usize,
}

/// Grouped rollups as percentages of the total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedPercentages {
    /// A1 and A2 share.
    pub elementary: f64,
    /// B1 and B2 share.
    pub intermediate: f64,
    /// C1 and C2 share.
    pub advanced: f64,
    /// Unresolved share.
    pub unknown: f64,
}

/// Aggregate per-band counts and percentages for a classified word list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelStatistics {
    /// Words counted per band, keyed by lowercase band code plus "unknown".
    pub counts: IndexMap<String, usize>,
    /// Percentage of the total per band.
    pub percentages: IndexMap<String, f64>,
    /// Total words counted.
    pub total_words: usize,
    /// Difficulty rollups.
    pub grouped_counts: GroupedCounts,
    /// Difficulty rollups as percentages.
    pub grouped_percentages: GroupedPercentages,
}

impl LevelStatistics {
    /// Computes statistics over the band of every classified word.
    #[must_use]
    pub fn from_levels(levels: impl IntoIterator<Item = CefrLevel>) -> Self {
        let mut counts: IndexMap<String, usize> = CefrLevel::BANDS
            .iter()
            .map(|level| (level.bucket().to_string(), 0))
            .chain(std::iter::once(("unknown".to_string(), 0)))
            .collect();

        let mut total = 0usize;
        for level in levels {
            total += 1;
            *counts.entry(level.bucket().to_string()).or_insert(0) += 1;
        }

        let percent = |count: usize| {
            if total == 0 {
                0.0
            } else {
                (count as f64 / total as f64) * 100.0
            }
        };
        let percentages = counts
            .iter()
            .map(|(bucket, count)| (bucket.clone(), percent(*count)))
            .collect();

        let band = |level: CefrLevel| counts[level.bucket()];
        let grouped_counts = GroupedCounts {
            elementary: band(CefrLevel::A1) + band(CefrLevel::A2),
            intermediate: band(CefrLevel::B1) + band(CefrLevel::B2),
            advanced: band(CefrLevel::C1) + band(CefrLevel::C2),
            unknown: counts["unknown"],
        };
        let grouped_percentages = GroupedPercentages {
            elementary: percent(grouped_counts.elementary),
            intermediate: percent(grouped_counts.intermediate),
            advanced: percent(grouped_counts.advanced),
            unknown: percent(grouped_counts.unknown),
        };

        Self {
            counts,
            percentages,
            total_words: total,
            grouped_counts,
            grouped_percentages,
        }
    }
}

/// Rendering style for annotated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationFormat {
    /// `word [B1]` markers after each recognized word.
    Inline,
    /// Color-coded `<span>` wrapping per recognized word.
    Html,
}

const fn level_color(level: CefrLevel) -> &'static str {
    match level {
        CefrLevel::A1 => "#28a745",
        CefrLevel::A2 => "#5cb85c",
        CefrLevel::B1 => "#ffc107",
        CefrLevel::B2 => "#fd7e14",
        CefrLevel::C1 => "#dc3545",
        CefrLevel::C2 => "#9c27b0",
        CefrLevel::Unknown => "#6c757d",
    }
}

/// Annotates source text with each recognized word's band.
///
/// Replacement matches whole words only and processes longer words before
/// shorter ones (a single alternation pass ordered longest-first, relying
/// on the regex crate's leftmost-first alternation), so a short word never
/// matches inside a longer one.
#[derive(Debug, Clone, Copy)]
pub struct TextAnnotator {
    format: AnnotationFormat,
}

impl TextAnnotator {
    /// Creates an annotator with the given rendering style.
    #[must_use]
    pub const fn new(format: AnnotationFormat) -> Self {
        Self { format }
    }

    /// Renders the text with every classified word wrapped per its band.
    /// Words whose entry is unresolved are left untouched.
    #[must_use]
    pub fn annotate(&self, text: &str, entries: &IndexMap<String, LevelEntry>) -> String {
        let mut words: Vec<&str> = entries
            .iter()
            .filter(|(_, entry)| entry.level != CefrLevel::Unknown)
            .map(|(word, _)| word.as_str())
            .collect();
        if words.is_empty() {
            return text.to_string();
        }
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let alternation = words
            .iter()
            .map(|word| regex::escape(word))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"\b(?i:{alternation})\b")).unwrap();

        pattern
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let token = &caps[0];
                match entries.get(&token.to_lowercase()) {
                    Some(entry) => self.wrap(token, entry.level),
                    None => token.to_string(),
                }
            })
            .into_owned()
    }

    fn wrap(&self, token: &str, level: CefrLevel) -> String {
        match self.format {
            AnnotationFormat::Inline => format!("{token} [{}]", level.code()),
            AnnotationFormat::Html => {
                let weight = if matches!(level, CefrLevel::C1 | CefrLevel::C2) {
                    "500"
                } else {
                    "normal"
                };
                format!(
                    "<span title=\"{}\" style=\"color: {}; font-weight: {weight}\">{token}</span>",
                    level.code(),
                    level_color(level),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::LevelSource;

    fn entries(pairs: &[(&str, CefrLevel)]) -> IndexMap<String, LevelEntry> {
        pairs
            .iter()
            .map(|(word, level)| {
                (
                    (*word).to_string(),
                    LevelEntry::new(*word, *level, LevelSource::Primary),
                )
            })
            .collect()
    }

    #[test]
    fn statistics_count_and_group_bands() {
        let stats = LevelStatistics::from_levels([
            CefrLevel::A1,
            CefrLevel::A1,
            CefrLevel::B2,
            CefrLevel::Unknown,
        ]);
        assert_eq!(stats.total_words, 4);
        assert_eq!(stats.counts["a1"], 2);
        assert_eq!(stats.counts["b2"], 1);
        assert_eq!(stats.counts["unknown"], 1);
        assert!((stats.percentages["a1"] - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.grouped_counts.elementary, 2);
        assert_eq!(stats.grouped_counts.intermediate, 1);
        assert_eq!(stats.grouped_counts.advanced, 0);
        assert!((stats.grouped_percentages.unknown - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn statistics_handle_empty_input() {
        let stats = LevelStatistics::from_levels(Vec::<CefrLevel>::new());
        assert_eq!(stats.total_words, 0);
        assert!((stats.percentages["c2"]).abs() < f64::EPSILON);
    }

    #[test]
    fn inline_annotation_preserves_casing() {
        let annotator = TextAnnotator::new(AnnotationFormat::Inline);
        let rendered = annotator.annotate(
            "Hello world",
            &entries(&[("hello", CefrLevel::A1), ("world", CefrLevel::A1)]),
        );
        assert_eq!(rendered, "Hello [A1] world [A1]");
    }

    #[test]
    fn annotation_matches_whole_words_longest_first() {
        let annotator = TextAnnotator::new(AnnotationFormat::Inline);
        let rendered = annotator.annotate(
            "art by an artist",
            &entries(&[("art", CefrLevel::A1), ("artist", CefrLevel::B2)]),
        );
        assert_eq!(rendered, "art [A1] by an artist [B2]");
    }

    #[test]
    fn unresolved_words_stay_unwrapped() {
        let annotator = TextAnnotator::new(AnnotationFormat::Inline);
        let rendered = annotator.annotate(
            "strange zyzzyva here",
            &entries(&[("zyzzyva", CefrLevel::Unknown), ("here", CefrLevel::A1)]),
        );
        assert_eq!(rendered, "strange zyzzyva here [A1]");
    }

    #[test]
    fn html_annotation_uses_band_colors() {
        let annotator = TextAnnotator::new(AnnotationFormat::Html);
        let rendered = annotator.annotate("paradigm", &entries(&[("paradigm", CefrLevel::C2)]));
        assert_eq!(
            rendered,
            "<span title=\"C2\" style=\"color: #9c27b0; font-weight: 500\">paradigm</span>"
        );
    }
}
