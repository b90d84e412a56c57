//! Port abstraction for instructor persistence adapters and their errors.

use crate::domain::instructor::{Instructor, InstructorId};
use crate::domain::person::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by instructor repository adapters.
    pub enum InstructorPersistenceError {
        /// Store connection could not be established or checked out.
        Connection { message: String } => "instructor repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "instructor repository query failed: {message}",
        /// A unique constraint rejected the write.
        DuplicateRecord { message: String } => "instructor record conflicts with an existing row: {message}",
    }
}

/// Port for instructor record storage and retrieval.
///
/// Reads hydrate `assigned_courses` from the courses that reference the
/// instructor. Writes commit immediately.
#[cfg_attr(test, mockall::automock)]
pub trait InstructorRepository {
    /// Insert a new instructor record.
    fn insert(&self, instructor: &Instructor) -> Result<(), InstructorPersistenceError>;

    /// Fetch every instructor record.
    fn find_all(&self) -> Result<Vec<Instructor>, InstructorPersistenceError>;

    /// Fetch an instructor by natural identifier.
    fn find_by_instructor_id(
        &self,
        instructor_id: &InstructorId,
    ) -> Result<Option<Instructor>, InstructorPersistenceError>;

    /// Fetch an instructor by exact display name.
    fn find_by_name(&self, name: &str) -> Result<Option<Instructor>, InstructorPersistenceError>;

    /// Fetch an instructor by exact email address.
    fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Instructor>, InstructorPersistenceError>;

    /// Fetch any instructor sharing the given natural id or email address
    /// (logical OR, case-sensitive).
    fn find_conflict(
        &self,
        instructor_id: &InstructorId,
        email: &EmailAddress,
    ) -> Result<Option<Instructor>, InstructorPersistenceError>;

    /// Update the identity fields of the row keyed by the instructor's
    /// natural id.
    fn update(&self, instructor: &Instructor) -> Result<(), InstructorPersistenceError>;

    /// Delete the row keyed by the given natural id, clearing the
    /// instructor reference on any course that pointed at it.
    fn delete(&self, instructor_id: &InstructorId) -> Result<(), InstructorPersistenceError>;

    /// All instructors whose name contains `term` or whose natural id
    /// equals `term` exactly.
    fn search(&self, term: &str) -> Result<Vec<Instructor>, InstructorPersistenceError>;
}

/// Fixture implementation behaving as a permanently empty store.
#[derive(Debug, Default)]
pub struct FixtureInstructorRepository;

impl InstructorRepository for FixtureInstructorRepository {
    fn insert(&self, _instructor: &Instructor) -> Result<(), InstructorPersistenceError> {
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Instructor>, InstructorPersistenceError> {
        Ok(Vec::new())
    }

    fn find_by_instructor_id(
        &self,
        _instructor_id: &InstructorId,
    ) -> Result<Option<Instructor>, InstructorPersistenceError> {
        Ok(None)
    }

    fn find_by_name(
        &self,
        _name: &str,
    ) -> Result<Option<Instructor>, InstructorPersistenceError> {
        Ok(None)
    }

    fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<Instructor>, InstructorPersistenceError> {
        Ok(None)
    }

    fn find_conflict(
        &self,
        _instructor_id: &InstructorId,
        _email: &EmailAddress,
    ) -> Result<Option<Instructor>, InstructorPersistenceError> {
        Ok(None)
    }

    fn update(&self, _instructor: &Instructor) -> Result<(), InstructorPersistenceError> {
        Ok(())
    }

    fn delete(&self, _instructor_id: &InstructorId) -> Result<(), InstructorPersistenceError> {
        Ok(())
    }

    fn search(&self, _term: &str) -> Result<Vec<Instructor>, InstructorPersistenceError> {
        Ok(Vec::new())
    }
}
