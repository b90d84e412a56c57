//! SQLite persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by SQLite via Diesel.
//!
//! # Architecture
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel rows and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are implementation details, never exposed to
//!   the domain layer.
//! - **One connection**: all adapters share the process-wide [`Session`];
//!   the deployment is single-threaded and synchronous.
//! - **Strongly typed errors**: database errors are mapped to the domain
//!   persistence error types.

mod diesel_course_repository;
mod diesel_enrollment_repository;
mod diesel_instructor_repository;
mod diesel_student_repository;
mod error_mapping;
mod models;
mod schema;
mod session;

pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use diesel_instructor_repository::DieselInstructorRepository;
pub use diesel_student_repository::DieselStudentRepository;
pub use session::{Session, SessionError};
