//! Port abstraction for the student↔course enrollment association.

use crate::domain::course::CourseId;
use crate::domain::enrollment::Enrollment;
use crate::domain::student::StudentId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by enrollment repository adapters.
    pub enum EnrollmentPersistenceError {
        /// Store connection could not be established or checked out.
        Connection { message: String } => "enrollment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "enrollment repository query failed: {message}",
        /// The (student, course) pair already has an active enrollment.
        AlreadyEnrolled { student_id: String, course_id: String } => "student {student_id} is already enrolled in course {course_id}",
        /// One side of the pair does not exist in the store.
        MissingParticipant { message: String } => "enrollment references a missing record: {message}",
    }
}

/// Port for the many-to-many enrollment join.
#[cfg_attr(test, mockall::automock)]
pub trait EnrollmentRepository {
    /// Insert an enrollment row and commit.
    ///
    /// Fails with [`EnrollmentPersistenceError::AlreadyEnrolled`] when the
    /// pair already exists.
    fn enroll(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<(), EnrollmentPersistenceError>;

    /// Whether the pair has an active enrollment.
    fn is_enrolled(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<bool, EnrollmentPersistenceError>;

    /// Every active enrollment, in insertion order.
    fn find_all(&self) -> Result<Vec<Enrollment>, EnrollmentPersistenceError>;
}

/// Fixture implementation with no enrollments; `enroll` accepts and
/// discards.
#[derive(Debug, Default)]
pub struct FixtureEnrollmentRepository;

impl EnrollmentRepository for FixtureEnrollmentRepository {
    fn enroll(
        &self,
        _student_id: &StudentId,
        _course_id: &CourseId,
    ) -> Result<(), EnrollmentPersistenceError> {
        Ok(())
    }

    fn is_enrolled(
        &self,
        _student_id: &StudentId,
        _course_id: &CourseId,
    ) -> Result<bool, EnrollmentPersistenceError> {
        Ok(false)
    }

    fn find_all(&self) -> Result<Vec<Enrollment>, EnrollmentPersistenceError> {
        Ok(Vec::new())
    }
}
