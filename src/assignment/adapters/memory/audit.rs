//! In-memory audit sink for tests.

use crate::assignment::ports::{AuditRecord, AuditSink, AuditSinkError};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe audit sink that keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditSink {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the records received so far.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Number of records received so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    /// Whether no records have been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<(), AuditSinkError> {
        let mut records = self
            .records
            .write()
            .map_err(|err| AuditSinkError::new(std::io::Error::other(err.to_string())))?;
        records.push(record);
        Ok(())
    }
}
