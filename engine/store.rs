use std::{
    collections::{BTreeSet, HashMap},
    fmt, fs,
    path::Path,
    sync::Arc,
};

use indexmap::IndexMap;
use parking_lot::RwLock;
use rand::{rngs::SmallRng, seq::IteratorRandom, SeedableRng};
use serde_json::json;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::{
    levels::{CefrLevel, LevelEntry, LevelSource},
    normalizer::Normalizer,
    sources::{fallback_entries, LearnedWordList, RawEntry, VocabularySource},
    telemetry::{AnalyzerTelemetry, LogLevel},
};

/// Lookup index keyed by canonical word form. Keys are not unique words:
/// one entry may be reachable through its surface, normalized, lemma, stem,
/// and token forms. Per-band buckets of lowercase base words are derived
/// alongside for example sampling; they are not authoritative.
#[derive(Debug, Clone, Default)]
pub struct VocabularyIndex {
    entries: IndexMap<String, LevelEntry>,
    buckets: HashMap<CefrLevel, BTreeSet<String>>,
}

impl VocabularyIndex {
    /// Looks up a single canonical form.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&LevelEntry> {
        self.entries.get(key)
    }

    /// First hit across the given forms, in order.
    #[must_use]
    pub fn resolve(&self, keys: &[String]) -> Option<&LevelEntry> {
        keys.iter().find_map(|key| self.entries.get(key))
    }

    /// Highest source priority already registered among the given forms.
    #[must_use]
    pub fn best_priority(&self, keys: &[String]) -> Option<u8> {
        keys.iter()
            .filter_map(|key| self.entries.get(key))
            .map(|entry| entry.source.priority())
            .max()
    }

    /// Number of registered keys (not distinct words).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no key is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted base words currently assigned to the band.
    #[must_use]
    pub fn band_words(&self, level: CefrLevel) -> Vec<String> {
        self.buckets
            .get(&level)
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Registers an entry under the given keys with merge precedence:
    /// keys already held at equal or higher priority are left untouched.
    pub fn register(&mut self, keys: &[String], entry: &LevelEntry) {
        self.write(keys, entry, false);
    }

    /// Writes a re-classification wholesale: equal-priority keys are
    /// replaced, higher-priority keys still win.
    pub fn replace(&mut self, keys: &[String], entry: &LevelEntry) {
        self.write(keys, entry, true);
    }

    fn write(&mut self, keys: &[String], entry: &LevelEntry, replace_equal: bool) {
        let mut wrote = false;
        for key in keys {
            let writable = match self.entries.get(key) {
                None => true,
                Some(existing) => {
                    let (held, incoming) = (existing.source.priority(), entry.source.priority());
                    incoming > held || (replace_equal && incoming == held)
                }
            };
            if !writable {
                continue;
            }
            if let Some(previous) = self.entries.insert(key.clone(), entry.clone()) {
                if previous.word == entry.word && previous.level != entry.level {
                    if let Some(bucket) = self.buckets.get_mut(&previous.level) {
                        bucket.remove(&previous.word.to_lowercase());
                    }
                }
            }
            wrote = true;
        }
        if wrote {
            self.buckets
                .entry(entry.level)
                .or_default()
                .insert(entry.word.to_lowercase());
        }
    }
}

/// Errors raised while persisting learned words.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The store was built without a learned-words list.
    #[error("no learned-words list configured")]
    NoTarget,
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Owns the vocabulary index: builds it lazily from prioritized sources,
/// serves lookups, and persists incremental learning.
///
/// Cloning shares the underlying index, so one store handle can be passed
/// to every consumer. The first `load` wins even under concurrency; late
/// callers wait on the same one-time initializer instead of racing a
/// duplicate build.
#[derive(Clone)]
pub struct VocabularyStore {
    normalizer: Arc<Normalizer>,
    sources: Vec<Arc<dyn VocabularySource>>,
    learned: Option<LearnedWordList>,
    index: Arc<RwLock<VocabularyIndex>>,
    loaded: Arc<OnceCell<()>>,
    telemetry: Option<AnalyzerTelemetry>,
}

impl fmt::Debug for VocabularyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VocabularyStore")
            .field("sources", &self.sources.len())
            .field("loaded", &self.loaded.initialized())
            .finish()
    }
}

impl VocabularyStore {
    /// Creates an empty store over the shared normalizer.
    #[must_use]
    pub fn new(normalizer: Arc<Normalizer>) -> Self {
        Self {
            normalizer,
            sources: Vec::new(),
            learned: None,
            index: Arc::new(RwLock::new(VocabularyIndex::default())),
            loaded: Arc::new(OnceCell::new()),
            telemetry: None,
        }
    }

    /// Adds a vocabulary source. Sources merge in priority order; equal
    /// priorities merge in registration order.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn VocabularySource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Attaches the learned-words list, both as the lowest-priority source
    /// and as the persistence target for `save_learned`.
    #[must_use]
    pub fn with_learned(mut self, learned: LearnedWordList) -> Self {
        self.sources.push(Arc::new(learned.clone()));
        self.learned = Some(learned);
        self
    }

    /// Attaches telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: AnalyzerTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Builds the index from the configured sources exactly once. Safe to
    /// call from concurrent tasks; subsequent calls return immediately.
    pub async fn load(&self) {
        self.loaded
            .get_or_init(|| async {
                self.build();
            })
            .await;
    }

    fn build(&self) {
        let mut index = VocabularyIndex::default();

        let mut ordered = self.sources.clone();
        ordered.sort_by(|a, b| b.origin().priority().cmp(&a.origin().priority()));

        for source in ordered {
            match source.load() {
                Ok(entries) => {
                    let merged = self.merge_entries(&mut index, source.origin(), entries);
                    self.log(
                        LogLevel::Info,
                        "vocabulary.source.merged",
                        json!({ "source": source.label(), "words": merged }),
                    );
                }
                Err(err) => {
                    self.log(
                        LogLevel::Warn,
                        "vocabulary.source.failed",
                        json!({ "source": source.label(), "error": err.to_string() }),
                    );
                }
            }
        }

        if index.is_empty() {
            for (word, level) in fallback_entries() {
                let keys = self.normalizer.lookup_keys(word);
                index.register(&keys, &LevelEntry::new(word, level, LevelSource::Primary));
            }
            self.log(
                LogLevel::Warn,
                "vocabulary.fallback.loaded",
                json!({ "words": index.len() }),
            );
        }

        *self.index.write() = index;
    }

    fn merge_entries(
        &self,
        index: &mut VocabularyIndex,
        origin: LevelSource,
        entries: Vec<RawEntry>,
    ) -> usize {
        let mut merged = 0;
        for raw in entries {
            let Some(level) = CefrLevel::parse(&raw.level) else {
                continue;
            };
            let keys = self.normalizer.lookup_keys(&raw.word);
            if keys.is_empty() {
                continue;
            }
            let already_held = index
                .best_priority(&keys)
                .is_some_and(|held| held >= origin.priority());
            if already_held {
                continue;
            }
            let mut entry = LevelEntry::new(raw.word.to_lowercase(), level, origin);
            if let Some(explanation) = raw.explanation {
                entry = entry.with_explanation(explanation);
            }
            index.register(&keys, &entry);
            merged += 1;
        }
        merged
    }

    /// Resolves the first hit across the given forms.
    pub async fn resolve(&self, keys: &[String]) -> Option<LevelEntry> {
        self.load().await;
        self.index.read().resolve(keys).cloned()
    }

    /// Looks up one canonical form.
    pub async fn lookup(&self, key: &str) -> Option<LevelEntry> {
        self.load().await;
        self.index.read().get(key).cloned()
    }

    /// Number of registered keys.
    pub async fn key_count(&self) -> usize {
        self.load().await;
        self.index.read().len()
    }

    /// Clone of the current index. Readers needing many lookups can work
    /// against the snapshot without holding the lock.
    pub async fn snapshot(&self) -> VocabularyIndex {
        self.load().await;
        self.index.read().clone()
    }

    /// Folds freshly classified entries into the index under every distinct
    /// form. Single-writer discipline: one write lock spans the whole merge.
    pub fn learn<'a>(&self, entries: impl IntoIterator<Item = &'a LevelEntry>) {
        let mut index = self.index.write();
        for entry in entries {
            let keys = self.normalizer.lookup_keys(&entry.word);
            index.replace(&keys, entry);
        }
    }

    /// Persists learned entries: existing records are read back (absence
    /// and corruption start from empty), overwritten per lowercase word,
    /// and the merged set is written through a temp file renamed into
    /// place so concurrent writers cannot corrupt the list.
    pub fn save_learned(
        &self,
        entries: &IndexMap<String, LevelEntry>,
    ) -> Result<(), PersistError> {
        let learned = self.learned.as_ref().ok_or(PersistError::NoTarget)?;

        let mut merged: IndexMap<String, LevelEntry> = IndexMap::new();
        for entry in learned.read_entries().unwrap_or_default() {
            merged.insert(entry.word.to_lowercase(), entry);
        }
        for (word, entry) in entries {
            merged.insert(word.to_lowercase(), entry.clone());
        }

        let parent = learned
            .path()
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let temp = NamedTempFile::new_in(parent)?;
        let records: Vec<&LevelEntry> = merged.values().collect();
        serde_json::to_writer_pretty(&temp, &records)?;
        temp.persist(learned.path())
            .map_err(|err| PersistError::Io(err.error))?;
        Ok(())
    }

    /// Up to `per_level` sampled base words per band, topped up from the
    /// hard-coded examples when the live vocabulary runs short.
    pub async fn level_examples(&self, per_level: usize) -> HashMap<CefrLevel, Vec<String>> {
        self.load().await;
        let index = self.index.read();
        let mut rng = SmallRng::from_entropy();
        let mut examples = HashMap::new();
        for level in CefrLevel::BANDS {
            let words = index.band_words(level);
            let mut sample = if words.len() > per_level {
                words.into_iter().choose_multiple(&mut rng, per_level)
            } else {
                words
            };
            for fallback in crate::sources::fallback_examples(level) {
                if sample.len() >= per_level {
                    break;
                }
                if !sample.iter().any(|word| word == fallback) {
                    sample.push((*fallback).to_string());
                }
            }
            examples.insert(level, sample);
        }
        examples
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
    use crate::sources::{CsvWordList, JsonWordList};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingSource {
        loads: Arc<AtomicUsize>,
    }

    impl VocabularySource for CountingSource {
        fn label(&self) -> &str {
            "counting"
        }

        fn origin(&self) -> LevelSource {
            LevelSource::Primary
        }

        fn load(&self) -> Result<Vec<RawEntry>, crate::sources::SourceError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![RawEntry {
                word: "hello".into(),
                level: "A1".into(),
                explanation: None,
            }])
        }
    }

    fn store_with(sources: Vec<Arc<dyn VocabularySource>>) -> VocabularyStore {
        let mut store = VocabularyStore::new(Arc::new(Normalizer::new()));
        for source in sources {
            store = store.with_source(source);
        }
        store
    }

    #[tokio::test]
    async fn concurrent_first_loads_build_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let store = store_with(vec![Arc::new(CountingSource {
            loads: loads.clone(),
        })]);

        tokio::join!(store.load(), store.load(), store.load());
        store.load().await;
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(store.lookup("hello").await.unwrap().level, CefrLevel::A1);
    }

    #[tokio::test]
    async fn secondary_source_never_overrides_primary() {
        let dir = tempdir().unwrap();
        let primary = dir.path().join("primary.json");
        let secondary = dir.path().join("secondary.csv");
        fs::write(&primary, r#"[{"word": "culture", "level": "B1"}]"#).unwrap();
        fs::write(&secondary, "culture,C2\nweekend,A2\nbroken\nodd,Z9\n").unwrap();

        let store = store_with(vec![
            Arc::new(JsonWordList::new(&primary, LevelSource::Primary)),
            Arc::new(CsvWordList::new(&secondary, LevelSource::Secondary)),
        ]);
        store.load().await;

        let culture = store.lookup("culture").await.unwrap();
        assert_eq!(culture.level, CefrLevel::B1);
        assert_eq!(culture.source, LevelSource::Primary);

        let weekend = store.lookup("weekend").await.unwrap();
        assert_eq!(weekend.level, CefrLevel::A2);
        assert_eq!(weekend.source, LevelSource::Secondary);

        // Unrecognized level codes never enter the index.
        assert!(store.lookup("odd").await.is_none());
    }

    #[tokio::test]
    async fn secondary_skips_words_present_in_any_form() {
        let dir = tempdir().unwrap();
        let primary = dir.path().join("primary.json");
        let secondary = dir.path().join("secondary.csv");
        fs::write(&primary, r#"[{"word": "run", "level": "A1"}]"#).unwrap();
        // "running" normalizes to "run", which the primary list already
        // holds, so the secondary row must be skipped entirely.
        fs::write(&secondary, "running,C1\n").unwrap();

        let store = store_with(vec![
            Arc::new(JsonWordList::new(&primary, LevelSource::Primary)),
            Arc::new(CsvWordList::new(&secondary, LevelSource::Secondary)),
        ]);
        store.load().await;

        let resolved = store.lookup("run").await.unwrap();
        assert_eq!(resolved.level, CefrLevel::A1);
        assert!(store.lookup("running").await.is_none());
    }

    #[tokio::test]
    async fn inflected_source_words_register_all_forms() {
        let dir = tempdir().unwrap();
        let primary = dir.path().join("primary.json");
        fs::write(&primary, r#"[{"word": "children", "level": "A1"}]"#).unwrap();

        let store = store_with(vec![Arc::new(JsonWordList::new(
            &primary,
            LevelSource::Primary,
        ))]);
        store.load().await;

        assert!(store.lookup("children").await.is_some());
        assert!(store.lookup("child").await.is_some());
    }

    #[tokio::test]
    async fn missing_sources_degrade_to_fallback() {
        let dir = tempdir().unwrap();
        let store = store_with(vec![Arc::new(JsonWordList::new(
            dir.path().join("absent.json"),
            LevelSource::Primary,
        ))]);
        store.load().await;

        assert_eq!(store.lookup("hello").await.unwrap().level, CefrLevel::A1);
        assert_eq!(store.lookup("fluent").await.unwrap().level, CefrLevel::C2);
    }

    #[tokio::test]
    async fn save_learned_round_trips_through_fresh_load() {
        let dir = tempdir().unwrap();
        let learned_path = dir.path().join("learned.json");

        let store = VocabularyStore::new(Arc::new(Normalizer::new()))
            .with_learned(LearnedWordList::new(&learned_path));
        store.load().await;

        let entry = LevelEntry::new("xylophone", CefrLevel::B2, LevelSource::Llm)
            .with_explanation("musical instrument");
        let mut batch = IndexMap::new();
        batch.insert("xylophone".to_string(), entry.clone());
        store.save_learned(&batch).unwrap();

        let reloaded = VocabularyStore::new(Arc::new(Normalizer::new()))
            .with_learned(LearnedWordList::new(&learned_path));
        reloaded.load().await;
        let resolved = reloaded.lookup("xylophone").await.unwrap();
        assert_eq!(resolved.level, CefrLevel::B2);
        assert_eq!(resolved.explanation.as_deref(), Some("musical instrument"));
    }

    #[tokio::test]
    async fn save_learned_overwrites_per_word_and_survives_corruption() {
        let dir = tempdir().unwrap();
        let learned_path = dir.path().join("learned.json");
        fs::write(&learned_path, "{{ not json").unwrap();

        let store = VocabularyStore::new(Arc::new(Normalizer::new()))
            .with_learned(LearnedWordList::new(&learned_path));

        let mut first = IndexMap::new();
        first.insert(
            "quark".to_string(),
            LevelEntry::new("quark", CefrLevel::C1, LevelSource::Llm),
        );
        store.save_learned(&first).unwrap();

        let mut second = IndexMap::new();
        second.insert(
            "quark".to_string(),
            LevelEntry::new("quark", CefrLevel::C2, LevelSource::Llm),
        );
        second.insert(
            "gluon".to_string(),
            LevelEntry::new("gluon", CefrLevel::C2, LevelSource::Llm),
        );
        store.save_learned(&second).unwrap();

        let records = LearnedWordList::new(&learned_path).read_entries().unwrap();
        assert_eq!(records.len(), 2);
        let quark = records.iter().find(|e| e.word == "quark").unwrap();
        assert_eq!(quark.level, CefrLevel::C2);
    }

    #[tokio::test]
    async fn learn_updates_index_in_place() {
        let store = store_with(Vec::new());
        store.load().await;

        let entry = LevelEntry::new("nebula", CefrLevel::C1, LevelSource::Llm);
        store.learn([&entry]);
        assert_eq!(store.lookup("nebula").await.unwrap().level, CefrLevel::C1);

        // Wholesale replacement at equal priority.
        let revised = LevelEntry::new("nebula", CefrLevel::B2, LevelSource::Llm);
        store.learn([&revised]);
        assert_eq!(store.lookup("nebula").await.unwrap().level, CefrLevel::B2);
    }

    #[tokio::test]
    async fn level_examples_top_up_sparse_bands() {
        // The empty store degrades to the fallback vocabulary, which holds
        // two words per band; the hard-coded examples fill the rest.
        let store = store_with(Vec::new());
        let examples = store.level_examples(5).await;
        for level in CefrLevel::BANDS {
            assert_eq!(examples[&level].len(), 5, "band {level} short of examples");
        }
        assert!(examples[&CefrLevel::A1].contains(&"hello".to_string()));
        assert!(examples[&CefrLevel::A1].contains(&"world".to_string()));
    }

    #[tokio::test]
    async fn snapshot_serves_lookups_off_the_store_lock() {
        let loads = Arc::new(AtomicUsize::new(0));
        let store = store_with(vec![Arc::new(CountingSource {
            loads: loads.clone(),
        })]);

        let snapshot = store.snapshot().await;
        assert!(store.key_count().await >= 1);
        assert_eq!(snapshot.get("hello").unwrap().level, CefrLevel::A1);
        assert!(snapshot
            .resolve(&["absent".to_string(), "hello".to_string()])
            .is_some());
        assert!(!snapshot.is_empty());
    }
}
