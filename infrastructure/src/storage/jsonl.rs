//! Append-only JSONL execution log.
//!
//! Every write appends one record; opening the file replays all records
//! into memory. Later improvement records override earlier ones.
//!
//! ```text
//! {"record":"execution", "id":"…", "flow_type":"TREE_OF_THOUGHTS", …}
//! {"record":"performance_metrics", "execution_id":"…", …}
//! {"record":"response_improvement", "execution_id":"…", "improvement":{…}}
//! ```

use super::memory::{ExecutionStore, lock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flow_application::{AgenticFlowAnalyticsRepository, RepositoryError};
use flow_domain::{
    AgenticFlowExecution, AgenticFlowType, FlowPerformanceMetrics, ResponseImprovement,
};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum LogRecord {
    Execution(AgenticFlowExecution),
    PerformanceMetrics(FlowPerformanceMetrics),
    ResponseImprovement {
        execution_id: Uuid,
        improvement: ResponseImprovement,
    },
}

/// Repository backed by a JSONL file.
///
/// Reads are served from memory; writes go to the file first and are only
/// applied in memory once the line is flushed.
pub struct JsonlAnalyticsRepository {
    store: Mutex<ExecutionStore>,
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAnalyticsRepository {
    /// Open (or create) the log at `path` and replay its records.
    ///
    /// Lines that fail to parse are skipped with a warning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                RepositoryError::Storage(format!(
                    "could not create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut store = ExecutionStore::default();
        if path.exists() {
            replay(path, &mut store)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                RepositoryError::Storage(format!("could not open {}: {}", path.display(), e))
            })?;

        debug!(
            "Opened execution log {} ({} executions)",
            path.display(),
            store.len()
        );

        Ok(Self {
            store: Mutex::new(store),
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored executions
    pub fn len(&self) -> usize {
        lock(&self.store).map(|store| store.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append(&self, record: &LogRecord) -> Result<(), RepositoryError> {
        let line = serde_json::to_string(record)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| RepositoryError::Storage("execution log lock poisoned".to_string()))?;
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|e| RepositoryError::Storage(e.to_string()))
    }
}

fn replay(path: &Path, store: &mut ExecutionStore) -> Result<(), RepositoryError> {
    let file = File::open(path)
        .map_err(|e| RepositoryError::Storage(format!("could not read {}: {}", path.display(), e)))?;

    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| RepositoryError::Storage(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogRecord>(&line) {
            Ok(LogRecord::Execution(execution)) => store.push_execution(execution),
            Ok(LogRecord::PerformanceMetrics(metrics)) => store.push_metrics(metrics),
            Ok(LogRecord::ResponseImprovement {
                execution_id,
                improvement,
            }) => {
                if store.set_improvement(execution_id, improvement).is_err() {
                    warn!(
                        "{}:{}: improvement for unknown execution {}",
                        path.display(),
                        number + 1,
                        execution_id
                    );
                }
            }
            Err(e) => warn!("{}:{}: skipping unreadable record: {}", path.display(), number + 1, e),
        }
    }
    Ok(())
}

#[async_trait]
impl AgenticFlowAnalyticsRepository for JsonlAnalyticsRepository {
    async fn save(&self, execution: &AgenticFlowExecution) -> Result<(), RepositoryError> {
        self.append(&LogRecord::Execution(execution.clone()))?;
        lock(&self.store)?.push_execution(execution.clone());
        Ok(())
    }

    async fn save_performance_metrics(
        &self,
        metrics: &FlowPerformanceMetrics,
    ) -> Result<(), RepositoryError> {
        self.append(&LogRecord::PerformanceMetrics(metrics.clone()))?;
        lock(&self.store)?.push_metrics(metrics.clone());
        Ok(())
    }

    async fn find_by_organization_and_flow_type_and_date_range(
        &self,
        organization_id: &str,
        flow_type: AgenticFlowType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AgenticFlowExecution>, RepositoryError> {
        Ok(lock(&self.store)?.by_organization(organization_id, Some(flow_type), start, end))
    }

    async fn find_by_debate_id(
        &self,
        debate_id: &str,
    ) -> Result<Vec<AgenticFlowExecution>, RepositoryError> {
        Ok(lock(&self.store)?.select(|e| e.debate_id == debate_id))
    }

    async fn find_by_organization_and_date_range(
        &self,
        organization_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AgenticFlowExecution>, RepositoryError> {
        Ok(lock(&self.store)?.by_organization(organization_id, None, start, end))
    }

    async fn update_response_improvement(
        &self,
        execution_id: Uuid,
        improvement: &ResponseImprovement,
    ) -> Result<(), RepositoryError> {
        if !lock(&self.store)?.contains(execution_id) {
            return Err(RepositoryError::NotFound(execution_id));
        }
        self.append(&LogRecord::ResponseImprovement {
            execution_id,
            improvement: improvement.clone(),
        })?;
        lock(&self.store)?.set_improvement(execution_id, improvement.clone())
    }
}

impl Drop for JsonlAnalyticsRepository {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_domain::FlowStatus;
    use std::io::Read;

    fn execution(flow_type: AgenticFlowType) -> AgenticFlowExecution {
        AgenticFlowExecution::new("flow-1", "debate-7", "org-1", flow_type)
            .with_status(FlowStatus::Success)
            .with_confidence(Some(72.5))
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("executions.jsonl");
        let record = execution(AgenticFlowType::MultiAgentRedTeam);
        let id = record.id;

        {
            let repository = JsonlAnalyticsRepository::open(&path).unwrap();
            repository.save(&record).await.unwrap();
            repository
                .save_performance_metrics(&FlowPerformanceMetrics {
                    execution_id: id,
                    flow_type: AgenticFlowType::MultiAgentRedTeam,
                    step_count: 3,
                    metrics: Default::default(),
                    recorded_at: Utc::now(),
                })
                .await
                .unwrap();
            repository
                .update_response_improvement(
                    id,
                    &ResponseImprovement::new(true).with_note("judge sided with skeptic"),
                )
                .await
                .unwrap();
        }

        let reopened = JsonlAnalyticsRepository::open(&path).unwrap();
        let found = reopened.find_by_debate_id("debate-7").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
        assert_eq!(found[0].confidence, Some(72.5));
        assert_eq!(
            found[0].response_improvement.as_ref().unwrap().note.as_deref(),
            Some("judge sided with skeptic")
        );
    }

    #[tokio::test]
    async fn test_writes_one_tagged_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("executions.jsonl");
        let repository = JsonlAnalyticsRepository::open(&path).unwrap();

        repository
            .save(&execution(AgenticFlowType::PromptChaining))
            .await
            .unwrap();
        repository
            .save(&execution(AgenticFlowType::StepBackPrompting))
            .await
            .unwrap();
        drop(repository);

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["record"], "execution");
        assert_eq!(first["flow_type"], "PROMPT_CHAINING");
    }

    #[tokio::test]
    async fn test_unreadable_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("executions.jsonl");
        {
            let repository = JsonlAnalyticsRepository::open(&path).unwrap();
            repository
                .save(&execution(AgenticFlowType::InternalMonologue))
                .await
                .unwrap();
        }
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{\"record\":\"execution\",\"id\":").unwrap();
        drop(file);

        let reopened = JsonlAnalyticsRepository::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_execution_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("executions.jsonl");
        let repository = JsonlAnalyticsRepository::open(&path).unwrap();

        let outcome = repository
            .update_response_improvement(Uuid::new_v4(), &ResponseImprovement::new(false))
            .await;
        drop(repository);

        assert!(matches!(outcome, Err(RepositoryError::NotFound(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
