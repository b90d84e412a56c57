//! Domain primitives, ports, and the reconciliation service.
//!
//! Purpose: define the validated entity types, the repository ports they
//! persist through, and the [`Registrar`] service that enforces uniqueness
//! and cross-entity rules. Serialisation contracts (serde) are documented on
//! each entity type.

pub mod cache;
pub mod course;
pub mod enrollment;
pub mod error;
pub mod instructor;
pub mod person;
pub mod ports;
pub mod registrar;
pub mod snapshot;
pub mod student;

pub use self::cache::RosterCache;
pub use self::course::{Course, CourseId, CourseName};
pub use self::enrollment::Enrollment;
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::instructor::{Instructor, InstructorId};
pub use self::person::{Age, EmailAddress, Person, PersonName, ValidationError};
pub use self::registrar::{
    CourseSubmission, CourseUpdate, InstructorSubmission, PersonUpdate, RecordKind, Registrar,
    RegistrationOutcome, RestoreReport, StudentSubmission,
};
pub use self::snapshot::RosterSnapshot;
pub use self::student::{Student, StudentId};

/// Convenient result alias for caller-facing operations.
pub type RosterResult<T> = Result<T, DomainError>;
