//! JSONL file writer for flow events.
//!
//! Each [`FlowEvent`] is serialized as a single JSON line with a `type`
//! field and `timestamp`, appended to the file via a buffered writer.

use chrono::{SecondsFormat, Utc};
use flow_application::{FlowEvent, FlowEventLogger};
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL flow event logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlFlowEventLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlFlowEventLogger {
    /// Create a logger appending to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create flow event log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Could not open flow event log file {}: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FlowEventLogger for JsonlFlowEventLogger {
    fn log(&self, event: FlowEvent) {
        let Ok(line) = serde_json::to_string(&to_record(event)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

/// Object payloads gain `type` and `timestamp` keys; anything else is
/// wrapped under `data`.
fn to_record(event: FlowEvent) -> Value {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    match event.payload {
        Value::Object(mut map) => {
            map.insert("type".to_string(), Value::from(event.event_type));
            map.insert("timestamp".to_string(), Value::String(timestamp));
            Value::Object(map)
        }
        payload => json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "data": payload,
        }),
    }
}

impl Drop for JsonlFlowEventLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_jsonl_logger_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow-events.jsonl");
        let logger = JsonlFlowEventLogger::new(&path).unwrap();

        logger.log(FlowEvent::new(
            "execution_recorded",
            serde_json::json!({
                "flow_type": "TREE_OF_THOUGHTS",
                "execution_time_ms": 1200,
                "status": "SUCCESS"
            }),
        ));
        logger.log(FlowEvent::new(
            "performance_metrics_dropped",
            serde_json::json!({"error": "disk full"}),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.get("type").is_some());
            let timestamp = line["timestamp"].as_str().unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        }
        assert_eq!(lines[0]["type"], "execution_recorded");
        assert_eq!(lines[0]["flow_type"], "TREE_OF_THOUGHTS");
        assert_eq!(lines[0]["execution_time_ms"], 1200);
        assert_eq!(lines[1]["error"], "disk full");
    }

    #[test]
    fn test_jsonl_logger_handles_non_object_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow-events.jsonl");
        let logger = JsonlFlowEventLogger::new(&path).unwrap();

        logger.log(FlowEvent::new("note", serde_json::json!("just a string")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "note");
        assert_eq!(lines[0]["data"], "just a string");
    }

    #[test]
    fn test_jsonl_logger_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow-events.jsonl");

        for _ in 0..2 {
            let logger = JsonlFlowEventLogger::new(&path).unwrap();
            logger.log(FlowEvent::new(
                "response_improvement_updated",
                serde_json::json!({"improved": true}),
            ));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }
}
