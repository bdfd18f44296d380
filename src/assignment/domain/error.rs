//! Error types for assignment domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignmentDomainError {
    /// The group name is empty after trimming.
    #[error("group name must not be empty")]
    EmptyGroupName,

    /// The member name is empty after trimming.
    #[error("member name must not be empty")]
    EmptyMemberName,

    /// The weight exceeds the schema-backed maximum.
    #[error("weight {0} exceeds the supported maximum")]
    WeightOutOfRange(u32),

    /// The strategy is enumerated on the wire but not yet implemented.
    #[error("assignment strategy '{0}' is reserved and cannot be used yet")]
    ReservedStrategy(String),
}

/// Error returned while parsing assignment statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment status: {0}")]
pub struct ParseAssignmentStatusError(pub String);

/// Error returned while parsing assignment strategies from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment strategy: {0}")]
pub struct ParseStrategyError(pub String);

/// Error returned while parsing user roles from the wire.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown user role: {0}")]
pub struct ParseUserRoleError(pub String);
