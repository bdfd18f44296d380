//! Audit sink port.
//!
//! Every mutating service operation emits one audit record. Emission is
//! fire-and-forget: a sink failure is logged by the caller and never
//! surfaces to the primary operation.

use crate::assignment::domain::{Actor, ActorId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Acting user, when known.
    pub actor_id: Option<ActorId>,
    /// Acting user's display name.
    pub actor_name: String,
    /// Action label, e.g. `"assignment_recorded"`.
    pub action: String,
    /// Kind of resource acted on, e.g. `"group"`.
    pub resource_type: String,
    /// Identifier of the resource acted on.
    pub resource_id: String,
    /// Optional free-form JSON detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
    /// When the mutation happened.
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Creates a record for an actor-driven mutation.
    #[must_use]
    pub fn new(
        actor: &Actor,
        action: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            actor_id: Some(actor.id),
            actor_name: actor.name.clone(),
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            detail: None,
            recorded_at,
        }
    }

    /// Attaches a free-form JSON detail payload.
    #[must_use]
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Error returned by audit sink implementations.
#[derive(Debug, Clone, Error)]
#[error("audit sink error: {0}")]
pub struct AuditSinkError(Arc<dyn std::error::Error + Send + Sync>);

impl AuditSinkError {
    /// Wraps an underlying sink failure.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}

/// Destination for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Delivers one audit record.
    async fn record(&self, record: AuditRecord) -> Result<(), AuditSinkError>;
}
