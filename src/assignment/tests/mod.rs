//! Unit and service tests for the fair-assignment engine.

mod lifecycle_tests;
mod roster_tests;
mod selector_tests;
