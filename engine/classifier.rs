use std::{collections::HashMap, sync::Arc, time::Duration};

use futures::{stream, StreamExt};
use indexmap::{IndexMap, IndexSet};
use serde_json::json;
use tokio::time::{timeout_at, Instant};

use crate::{
    levels::{CefrLevel, LevelEntry, LevelSource},
    normalizer::Normalizer,
    remote::{self, ClassificationRequest, RemoteClassifier, CEFR_DEFINITIONS},
    store::{PersistError, VocabularyStore},
    telemetry::{AnalyzerTelemetry, LogLevel},
};

/// Number of words submitted per remote request.
pub const BATCH_SIZE: usize = 10;

/// Outcome of a local vocabulary lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The word resolved against the loaded vocabulary.
    Found(LevelEntry),
    /// No form of the word is known; remote classification is required.
    NotFound,
}

/// Resolves words through the vocabulary store and batches the misses to
/// the remote capability, folding results back into the store.
pub struct WordClassifier {
    normalizer: Arc<Normalizer>,
    store: VocabularyStore,
    remote: Arc<dyn RemoteClassifier>,
    concurrency: usize,
    examples_per_level: usize,
    telemetry: Option<AnalyzerTelemetry>,
}

impl std::fmt::Debug for WordClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordClassifier")
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl WordClassifier {
    /// Creates a classifier over the shared normalizer and store.
    #[must_use]
    pub fn new(
        normalizer: Arc<Normalizer>,
        store: VocabularyStore,
        remote: Arc<dyn RemoteClassifier>,
    ) -> Self {
        Self {
            normalizer,
            store,
            remote,
            concurrency: 3,
            examples_per_level: 5,
            telemetry: None,
        }
    }

    /// Bounds the number of concurrently in-flight remote batches.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Attaches telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: AnalyzerTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Resolves a word against the local vocabulary only. Lookup order:
    /// normalized form, then lemma, stem, and token forms; first hit wins.
    pub async fn resolve(&self, word: &str) -> Resolution {
        let keys = self.normalizer.word_forms(word).keys();
        match self.store.resolve(&keys).await {
            Some(entry) => Resolution::Found(entry),
            None => Resolution::NotFound,
        }
    }

    /// Classifies a single word through the full fallback chain.
    pub async fn classify(&self, word: &str) -> LevelEntry {
        let key = word.trim().to_lowercase();
        let input = vec![word.to_string()];
        let mut results = self.classify_batch_within(&input, None).await;
        results
            .shift_remove(&key)
            .unwrap_or_else(|| LevelEntry::new(key, CefrLevel::Unknown, LevelSource::Default))
    }

    /// Classifies a list of words without a deadline.
    pub async fn classify_batch(&self, words: &[String]) -> IndexMap<String, LevelEntry> {
        self.classify_batch_within(words, None).await
    }

    /// Classifies a list of words, bounding all remote work by `deadline`.
    /// Batches still pending when the deadline expires fall back to the
    /// conservative default level instead of blocking.
    ///
    /// Input is deduplicated case-insensitively preserving first
    /// occurrence; the returned map covers every distinct input word,
    /// keyed by its lowercase form.
    pub async fn classify_batch_within(
        &self,
        words: &[String],
        deadline: Option<Duration>,
    ) -> IndexMap<String, LevelEntry> {
        self.store.load().await;

        let mut order: IndexSet<String> = IndexSet::new();
        for word in words {
            let key = word.trim().to_lowercase();
            if !key.is_empty() {
                order.insert(key);
            }
        }

        let mut resolved: HashMap<String, LevelEntry> = HashMap::new();
        let mut unknown: Vec<String> = Vec::new();
        for word in &order {
            match self.resolve(word).await {
                Resolution::Found(entry) => {
                    resolved.insert(word.clone(), entry);
                }
                Resolution::NotFound => unknown.push(word.clone()),
            }
        }

        if !unknown.is_empty() {
            self.log(
                LogLevel::Info,
                "classifier.remote.start",
                json!({ "unknown": unknown.len() }),
            );
            let learned = self.classify_unknown(&unknown, deadline).await;
            self.store.learn(learned.values());
            match self.store.save_learned(&learned) {
                Ok(()) | Err(PersistError::NoTarget) => {}
                Err(err) => {
                    // Persistence is best-effort; the classification result
                    // is still returned.
                    self.log(
                        LogLevel::Warn,
                        "classifier.persist.failed",
                        json!({ "error": err.to_string() }),
                    );
                }
            }
            resolved.extend(learned);
        }

        let mut results = IndexMap::with_capacity(order.len());
        for word in order {
            if let Some(entry) = resolved.remove(&word) {
                results.insert(word, entry);
            }
        }
        results
    }

    /// Partitions unknown words into fixed-size batches and dispatches them
    /// with bounded parallelism. Batches partition the unknown set, so the
    /// unordered merge is conflict-free.
    async fn classify_unknown(
        &self,
        unknown: &[String],
        deadline: Option<Duration>,
    ) -> IndexMap<String, LevelEntry> {
        let examples = self.store.level_examples(self.examples_per_level).await;
        let expires = deadline.map(|limit| Instant::now() + limit);

        let outcomes: Vec<HashMap<String, LevelEntry>> =
            stream::iter(unknown.chunks(BATCH_SIZE).map(|batch| {
                let request =
                    ClassificationRequest::new(batch.to_vec(), CEFR_DEFINITIONS, &examples);
                async move { self.dispatch(request, expires).await }
            }))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut collected: HashMap<String, LevelEntry> =
            outcomes.into_iter().flatten().collect();
        let mut learned = IndexMap::with_capacity(unknown.len());
        for word in unknown {
            if let Some(entry) = collected.remove(word) {
                learned.insert(word.clone(), entry);
            }
        }
        learned
    }

    async fn dispatch(
        &self,
        request: ClassificationRequest,
        expires: Option<Instant>,
    ) -> HashMap<String, LevelEntry> {
        let call = self.remote.classify(&request);
        let response = match expires {
            Some(at) => match timeout_at(at, call).await {
                Ok(response) => response,
                Err(_) => {
                    self.log(
                        LogLevel::Warn,
                        "classifier.batch.deadline",
                        json!({ "request": request.id, "words": request.words.len() }),
                    );
                    return default_batch(&request.words);
                }
            },
            None => call.await,
        };

        match response {
            Ok(text) => match remote::parse_response(&request.words, &text) {
                Some(entries) => {
                    self.log(
                        LogLevel::Info,
                        "classifier.batch.classified",
                        json!({ "request": request.id, "words": entries.len() }),
                    );
                    entries
                }
                None => {
                    self.log(
                        LogLevel::Warn,
                        "classifier.batch.malformed",
                        json!({ "request": request.id }),
                    );
                    default_batch(&request.words)
                }
            },
            Err(err) => {
                self.log(
                    LogLevel::Warn,
                    "classifier.batch.failed",
                    json!({ "request": request.id, "error": err.to_string() }),
                );
                default_batch(&request.words)
            }
        }
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.log(level, message, metadata);
        }
    }
}

/// Conservative fallback for a whole batch the remote path could not
/// classify.
fn default_batch(words: &[String]) -> HashMap<String, LevelEntry> {
    words
        .iter()
        .map(|word| {
            let key = word.to_lowercase();
            (key.clone(), LevelEntry::default_for(key))
        })
        .collect()
}
