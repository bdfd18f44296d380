//! Fair-assignment engine for Rondo.
//!
//! This module implements weighted round-robin selection over a mutable
//! group roster: choosing the next assignee, recording hand-offs, walking
//! each assignment through its lifecycle, and reporting fairness
//! statistics. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
