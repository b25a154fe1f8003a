//! Audit sinks for storing audit records

use crate::ObserveResult;
use async_trait::async_trait;
use offboard_types::AuditRecord;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Trait for audit sinks. Implementations must be append-only.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append a record
    async fn record(&self, record: AuditRecord) -> ObserveResult<()>;

    /// Number of records appended
    async fn record_count(&self) -> ObserveResult<u64>;
}

/// In-memory audit sink for tests
#[derive(Default)]
pub struct MemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records appended so far
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().clone()
    }

    /// Records carrying the given operation tag
    pub fn with_operation(&self, operation: &str) -> Vec<AuditRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.operation == operation)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, record: AuditRecord) -> ObserveResult<()> {
        self.records.write().push(record);
        Ok(())
    }

    async fn record_count(&self) -> ObserveResult<u64> {
        Ok(self.records.read().len() as u64)
    }
}

/// Append-only JSON-lines file sink
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Open a sink at `path`, creating parent directories if needed
    pub async fn new(path: impl Into<PathBuf>) -> ObserveResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back from the file
    pub async fn read_all(&self) -> ObserveResult<Vec<AuditRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut records = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }

        Ok(records)
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn record(&self, record: AuditRecord) -> ObserveResult<()> {
        let json = serde_json::to_string(&record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        Ok(())
    }

    async fn record_count(&self) -> ObserveResult<u64> {
        Ok(self.read_all().await?.len() as u64)
    }
}

impl std::fmt::Debug for MemoryAuditSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAuditSink")
            .field("records", &self.records.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offboard_types::{OrgNodeId, ProcessId, RiskTier};

    fn make_record(operation: &str) -> AuditRecord {
        AuditRecord::new(
            OrgNodeId::new("subject"),
            OrgNodeId::new("actor"),
            "Alex Admin",
            operation,
            RiskTier::High,
        )
        .with_process(ProcessId::generate())
        .with_step(1)
    }

    #[tokio::test]
    async fn test_memory_sink_appends() {
        let sink = MemoryAuditSink::new();
        sink.record(make_record("STEP_1_COMPLETED")).await.unwrap();
        sink.record(make_record("STEP_2_COMPLETED")).await.unwrap();

        assert_eq!(sink.record_count().await.unwrap(), 2);
        assert_eq!(sink.with_operation("STEP_1_COMPLETED").len(), 1);
        assert_eq!(sink.with_operation("STEP_9_COMPLETED").len(), 0);
    }

    #[tokio::test]
    async fn test_jsonl_sink_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let sink = JsonlAuditSink::new(&path).await.unwrap();
        assert_eq!(sink.path(), path);
        sink.record(make_record("PROCESS_STARTED")).await.unwrap();
        sink.record(make_record("STEP_1_COMPLETED")).await.unwrap();
        sink.record(make_record("STEP_1_ERROR")).await.unwrap();

        assert_eq!(sink.record_count().await.unwrap(), 3);

        let records = sink.read_all().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].operation, "PROCESS_STARTED");
        assert_eq!(records[2].operation, "STEP_1_ERROR");
    }

    #[tokio::test]
    async fn test_jsonl_sink_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        {
            let sink = JsonlAuditSink::new(&path).await.unwrap();
            sink.record(make_record("PROCESS_STARTED")).await.unwrap();
        }
        {
            let sink = JsonlAuditSink::new(&path).await.unwrap();
            sink.record(make_record("STEP_1_COMPLETED")).await.unwrap();
            assert_eq!(sink.record_count().await.unwrap(), 2);
        }
    }

    #[tokio::test]
    async fn test_jsonl_sink_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlAuditSink::new(dir.path().join("empty.jsonl")).await.unwrap();
        assert!(sink.read_all().await.unwrap().is_empty());
    }
}
