//! High-level orchestration for word-level text analysis.

use std::{path::PathBuf, sync::Arc, time::Duration};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::json;

use crate::{
    classifier::WordClassifier,
    levels::{CefrLevel, LevelEntry, LevelSource},
    normalizer::Normalizer,
    remote::RemoteClassifier,
    report::{AnnotationFormat, LevelStatistics, TextAnnotator},
    sources::{CsvWordList, JsonWordList, LearnedWordList},
    store::VocabularyStore,
    telemetry::{AnalyzerTelemetry, LogLevel},
};

/// Configuration for bootstrapping the analyzer runtime.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Directory holding the vocabulary files.
    pub data_dir: PathBuf,
    /// Primary JSON word list file name.
    pub primary_file: String,
    /// Secondary CSV word list file name.
    pub secondary_file: String,
    /// Learned-words file name.
    pub learned_file: String,
    /// Bound on concurrently in-flight remote batches.
    pub concurrency: usize,
    /// Optional deadline applied to the remote work of one classification
    /// call.
    pub remote_deadline: Option<Duration>,
    /// Rendering style for annotated text.
    pub annotation: AnnotationFormat,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            primary_file: "oxford-5000.json".into(),
            secondary_file: "epv-deduped.csv".into(),
            learned_file: "learned-words.json".into(),
            concurrency: 3,
            remote_deadline: None,
            annotation: AnnotationFormat::Inline,
        }
    }
}

/// Per-token classification outcome, keeping the surface token.
#[derive(Debug, Clone, Serialize)]
pub struct WordLevel {
    /// Token as it appears in the text.
    pub word: String,
    /// Resolved band.
    pub level: CefrLevel,
    /// Provenance of the resolution.
    pub source: LevelSource,
    /// Optional rationale from the remote classifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Full analysis of a text: per-token outcomes, aggregate statistics, and
/// the annotated rendering.
#[derive(Debug, Clone, Serialize)]
pub struct TextAnalysis {
    /// One outcome per word token, in text order.
    pub words: Vec<WordLevel>,
    /// Aggregate counts and percentages.
    pub statistics: LevelStatistics,
    /// Source text with recognized words wrapped per band.
    pub annotated: String,
}

/// Runtime wiring normalizer, store, classifier, and annotator together.
#[derive(Clone)]
pub struct AnalyzerRuntime {
    normalizer: Arc<Normalizer>,
    store: VocabularyStore,
    remote: Arc<dyn RemoteClassifier>,
    classifier: Arc<WordClassifier>,
    annotator: TextAnnotator,
    config: AnalyzerConfig,
    telemetry: Option<AnalyzerTelemetry>,
}

impl std::fmt::Debug for AnalyzerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerRuntime")
            .field("config", &self.config)
            .finish()
    }
}

impl AnalyzerRuntime {
    /// Bootstraps the runtime: one shared normalizer, the prioritized
    /// vocabulary sources from the configured data directory, and a
    /// classifier over the supplied remote capability.
    #[must_use]
    pub fn bootstrap(config: AnalyzerConfig, remote: Arc<dyn RemoteClassifier>) -> Self {
        let normalizer = Arc::new(Normalizer::new());
        let store = VocabularyStore::new(normalizer.clone())
            .with_source(Arc::new(JsonWordList::new(
                config.data_dir.join(&config.primary_file),
                LevelSource::Primary,
            )))
            .with_source(Arc::new(CsvWordList::new(
                config.data_dir.join(&config.secondary_file),
                LevelSource::Secondary,
            )))
            .with_learned(LearnedWordList::new(
                config.data_dir.join(&config.learned_file),
            ));
        let classifier = Arc::new(
            WordClassifier::new(normalizer.clone(), store.clone(), remote.clone())
                .with_concurrency(config.concurrency),
        );

        Self {
            normalizer,
            store,
            remote,
            classifier,
            annotator: TextAnnotator::new(config.annotation),
            config,
            telemetry: None,
        }
    }

    /// Attaches telemetry to the runtime and its components. Call before
    /// the first classification so source loading is logged too.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: AnalyzerTelemetry) -> Self {
        self.store = self.store.with_telemetry(telemetry.clone());
        self.classifier = Arc::new(
            WordClassifier::new(
                self.normalizer.clone(),
                self.store.clone(),
                self.remote.clone(),
            )
            .with_concurrency(self.config.concurrency)
            .with_telemetry(telemetry.clone()),
        );
        self.telemetry = Some(telemetry);
        self
    }

    /// Analyzes a text: extracts word tokens, classifies each, and returns
    /// per-token outcomes, statistics, and the annotated rendering.
    pub async fn analyze(&self, text: &str) -> TextAnalysis {
        self.log(
            LogLevel::Info,
            "analyzer.analyze.start",
            json!({ "chars": text.len() }),
        );

        let tokens = self.normalizer.extract_words(text);
        let entries = self
            .classifier
            .classify_batch_within(&tokens, self.config.remote_deadline)
            .await;

        let words: Vec<WordLevel> = tokens
            .iter()
            .map(|token| match entries.get(&token.to_lowercase()) {
                Some(entry) => WordLevel {
                    word: token.clone(),
                    level: entry.level,
                    source: entry.source,
                    explanation: entry.explanation.clone(),
                },
                None => WordLevel {
                    word: token.clone(),
                    level: CefrLevel::Unknown,
                    source: LevelSource::Default,
                    explanation: None,
                },
            })
            .collect();

        let statistics = LevelStatistics::from_levels(words.iter().map(|word| word.level));
        let annotated = self.annotator.annotate(text, &entries);

        self.log(
            LogLevel::Info,
            "analyzer.analyze.complete",
            json!({
                "words": statistics.total_words,
                "unknown": statistics.grouped_counts.unknown,
            }),
        );

        TextAnalysis {
            words,
            statistics,
            annotated,
        }
    }

    /// Classifies a plain word list, honoring the configured deadline.
    pub async fn classify_words(&self, words: &[String]) -> IndexMap<String, LevelEntry> {
        self.classifier
            .classify_batch_within(words, self.config.remote_deadline)
            .await
    }

    /// Classifies one word through the full fallback chain.
    pub async fn classify_word(&self, word: &str) -> LevelEntry {
        self.classifier.classify(word).await
    }

    /// Shared vocabulary store handle.
    #[must_use]
    pub fn store(&self) -> VocabularyStore {
        self.store.clone()
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.log(level, message, metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::LoopbackClassifier;
    use std::fs;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path) -> AnalyzerConfig {
        AnalyzerConfig {
            data_dir: dir.to_path_buf(),
            ..AnalyzerConfig::default()
        }
    }

    #[tokio::test]
    async fn runtime_analyzes_text_end_to_end() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("oxford-5000.json"),
            r#"[{"word": "hello", "level": "A1"}, {"word": "culture", "level": "B1"}]"#,
        )
        .unwrap();

        let runtime = AnalyzerRuntime::bootstrap(
            config(dir.path()),
            Arc::new(LoopbackClassifier::default()),
        );
        let analysis = runtime.analyze("Hello culture xylophone").await;

        assert_eq!(analysis.words.len(), 3);
        assert_eq!(analysis.words[0].word, "Hello");
        assert_eq!(analysis.words[0].level, CefrLevel::A1);
        assert_eq!(analysis.words[2].level, CefrLevel::B1);
        assert_eq!(analysis.words[2].source, LevelSource::Llm);
        assert_eq!(analysis.statistics.total_words, 3);
        assert!(analysis.annotated.contains("Hello [A1]"));

        // The loopback classification was persisted for later runs.
        let learned = fs::read_to_string(dir.path().join("learned-words.json")).unwrap();
        assert!(learned.contains("xylophone"));
    }

    #[tokio::test]
    async fn runtime_classifies_word_lists() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("epv-deduped.csv"),
            "weekend,A2\nparadigm,C2\n",
        )
        .unwrap();

        let runtime = AnalyzerRuntime::bootstrap(
            config(dir.path()),
            Arc::new(LoopbackClassifier::default()),
        );
        let results = runtime
            .classify_words(&["Weekend".to_string(), "paradigm".to_string()])
            .await;
        assert_eq!(results["weekend"].level, CefrLevel::A2);
        assert_eq!(results["paradigm"].level, CefrLevel::C2);
    }

    #[tokio::test]
    async fn runtime_logs_through_telemetry() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("analyzer.log");
        let runtime = AnalyzerRuntime::bootstrap(
            config(dir.path()),
            Arc::new(LoopbackClassifier::default()),
        )
        .with_telemetry(AnalyzerTelemetry::to_file("analyzer", &log_path).unwrap());

        runtime.analyze("hello world").await;

        let log = fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("analyzer.analyze.start"));
        assert!(log.contains("analyzer.analyze.complete"));
    }
}
