//! Downstream sink seam.
//!
//! The correlator hands each finished record and its fingerprint to a
//! `RecordSink`; how the sink persists, indexes, or deduplicates is not this
//! crate's concern.

use crate::models::CourseRecord;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Accept one denormalized record together with its content fingerprint.
    async fn accept(&self, record: CourseRecord, fingerprint: &str) -> Result<()>;
}

/// In-memory sink for local development and unit tests.
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<(CourseRecord, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything accepted so far (primarily for tests).
    pub async fn accepted(&self) -> Vec<(CourseRecord, String)> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn accept(&self, record: CourseRecord, fingerprint: &str) -> Result<()> {
        if record.id.trim().is_empty() {
            return Err(Error::InvalidInput("record id is empty".to_string()));
        }
        self.records
            .lock()
            .await
            .push((record, fingerprint.to_string()));
        Ok(())
    }
}
