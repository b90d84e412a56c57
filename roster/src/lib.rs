//! Record-management core for students, instructors, and courses.
//!
//! The crate is the domain and persistence layer a desktop shell calls
//! into: validated entities, a reconciliation service enforcing uniqueness
//! and cross-entity rules, Diesel/SQLite repository adapters, and a
//! flat-JSON snapshot store. UI construction and argument parsing belong to
//! the shells, not here.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(feature = "test-support")]
pub mod test_support;
