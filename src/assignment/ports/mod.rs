//! Port contracts for the fair-assignment engine.
//!
//! Ports define infrastructure-agnostic interfaces used by assignment
//! services.

pub mod audit;
pub mod repository;

pub use audit::{AuditRecord, AuditSink, AuditSinkError};
pub use repository::{
    AssignmentRepository, GroupRepository, MemberRepository, StoreError, StoreResult,
};
