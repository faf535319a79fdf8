use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Log severity level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// Informational events.
    Info,
    /// Warning indicator.
    Warn,
    /// Error indicator.
    Error,
}

/// Structured record written as one JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp in ISO8601.
    pub timestamp: DateTime<Utc>,
    /// Component emitting the record.
    pub component: String,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Arbitrary JSON payload for counts and identifiers.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, Value>,
}

impl LogRecord {
    /// Creates a record with an empty payload.
    #[must_use]
    pub fn new(component: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            component: component.into(),
            level,
            message: message.into(),
            metadata: serde_json::Map::new(),
        }
    }
}

/// Thread-safe JSON-lines logger with append-only semantics.
#[derive(Debug)]
pub struct JsonLogger {
    path: PathBuf,
    writer: Mutex<File>,
}

impl JsonLogger {
    /// Creates or opens a logger at the desired path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    /// Appends a record as one JSON line.
    pub fn log(&self, record: &LogRecord) -> Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Underlying file path (useful for tests).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Telemetry handle shared by the engine components. Cheap to clone;
/// logging is best-effort and never interferes with classification.
#[derive(Clone)]
pub struct AnalyzerTelemetry {
    inner: Arc<TelemetryInner>,
}

struct TelemetryInner {
    component: String,
    logger: Option<JsonLogger>,
}

impl fmt::Debug for AnalyzerTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerTelemetry")
            .field("component", &self.inner.component)
            .finish()
    }
}

impl AnalyzerTelemetry {
    /// Creates a telemetry handle writing JSON lines to the given path.
    pub fn to_file(component: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(TelemetryInner {
                component: component.into(),
                logger: Some(JsonLogger::new(path)?),
            }),
        })
    }

    /// Creates a disabled handle; every log call is a no-op. Lets callers
    /// thread one telemetry value through without branching.
    #[must_use]
    pub fn disabled(component: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TelemetryInner {
                component: component.into(),
                logger: None,
            }),
        }
    }

    /// Logs a structured record; failures are swallowed after best effort.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) {
        if let Some(logger) = &self.inner.logger {
            let mut record = LogRecord::new(&self.inner.component, level, message);
            if let Some(payload) = metadata.as_object() {
                record.metadata = payload.clone();
            }
            if let Err(err) = logger.log(&record) {
                eprintln!("telemetry write failed: {err:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn logger_writes_json_lines() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("engine.log")).unwrap();
        logger
            .log(&LogRecord::new("classifier", LogLevel::Info, "batch done"))
            .unwrap();
        let content = fs::read_to_string(logger.path()).unwrap();
        assert!(content.contains("\"message\":\"batch done\""));
        assert!(content.contains("\"level\":\"INFO\""));
    }

    #[test]
    fn telemetry_attaches_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analyzer.log");
        let telemetry = AnalyzerTelemetry::to_file("analyzer", &path).unwrap();
        telemetry.log(
            LogLevel::Warn,
            "vocabulary.source.failed",
            json!({ "source": "primary.json" }),
        );
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("vocabulary.source.failed"));
        assert!(content.contains("primary.json"));
    }

    #[test]
    fn disabled_telemetry_is_a_no_op() {
        let telemetry = AnalyzerTelemetry::disabled("analyzer");
        telemetry.log(LogLevel::Debug, "ignored", json!({}));
    }
}
