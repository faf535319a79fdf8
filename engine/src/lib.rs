#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! CEFR word-level classification engine: prioritized vocabulary sources,
//! rule-based word normalization, and a batched remote fallback for words
//! no source knows.

/// CEFR band and provenance data model.
#[path = "../levels.rs"]
pub mod levels;

/// Word normalization pipeline.
#[path = "../normalizer/main.rs"]
pub mod normalizer;

/// Vocabulary source capabilities and file formats.
#[path = "../sources.rs"]
pub mod sources;

/// Vocabulary index, prioritized merging, and learned-word persistence.
#[path = "../store.rs"]
pub mod store;

/// Remote classification capability and response handling.
#[path = "../remote.rs"]
pub mod remote;

/// Word classifier with local resolution and batched remote fallback.
#[path = "../classifier.rs"]
pub mod classifier;

/// Aggregate statistics and annotated text rendering.
#[path = "../report.rs"]
pub mod report;

/// Structured JSON-lines logging.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// High-level orchestration entry point.
#[path = "../main.rs"]
pub mod orchestration_entry;

pub use classifier::{Resolution, WordClassifier, BATCH_SIZE};
pub use levels::{CefrLevel, LevelEntry, LevelSource};
pub use normalizer::morphology::{Morphology, WordForms};
pub use normalizer::Normalizer;
pub use orchestration_entry::{
    AnalyzerConfig, AnalyzerRuntime, TextAnalysis, WordLevel,
};
pub use remote::{
    ClassificationRequest, LoopbackClassifier, RemoteClassifier, RemoteError, CEFR_DEFINITIONS,
};
pub use report::{AnnotationFormat, LevelStatistics, TextAnnotator};
pub use sources::{
    CsvWordList, JsonWordList, LearnedWordList, RawEntry, SourceError, VocabularySource,
};
pub use store::{PersistError, VocabularyIndex, VocabularyStore};
pub use telemetry::{AnalyzerTelemetry, JsonLogger, LogLevel, LogRecord};
