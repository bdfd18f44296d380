//! In-memory adapter implementations for testing and embedding.
//!
//! All three repository handles created from one [`InMemoryStore`] share
//! the same state, so cross-entity queries behave like a single database.

mod assignment;
mod audit;
mod group;
mod member;
mod store;

pub use assignment::InMemoryAssignmentRepository;
pub use audit::InMemoryAuditSink;
pub use group::InMemoryGroupRepository;
pub use member::InMemoryMemberRepository;
pub use store::InMemoryStore;
