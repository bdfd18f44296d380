//! Audit sink that emits records as structured `tracing` events.

use crate::assignment::ports::{AuditRecord, AuditSink, AuditSinkError};
use async_trait::async_trait;

/// Default production audit sink: one `INFO` event per record.
///
/// Hosts that persist audit trails wire their own [`AuditSink`] instead;
/// this one guarantees mutations are at least observable in logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates the sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<(), AuditSinkError> {
        tracing::info!(
            actor = %record.actor_name,
            action = %record.action,
            resource_type = %record.resource_type,
            resource_id = %record.resource_id,
            detail = record.detail.as_ref().map(serde_json::Value::to_string),
            "audit"
        );
        Ok(())
    }
}
