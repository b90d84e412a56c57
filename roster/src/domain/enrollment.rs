//! Enrollment association record.

use serde::{Deserialize, Serialize};

use super::course::CourseId;
use super::student::StudentId;

/// An active student↔course association.
///
/// ## Invariants
/// - A given (student, course) pair appears at most once; the enrollment
///   repository enforces this before insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Enrolled student's natural id.
    pub student_id: StudentId,
    /// Course's natural id.
    pub course_id: CourseId,
}

impl Enrollment {
    /// Build an [`Enrollment`] pair.
    pub const fn new(student_id: StudentId, course_id: CourseId) -> Self {
        Self {
            student_id,
            course_id,
        }
    }
}
