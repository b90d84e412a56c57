//! Test utilities shared by unit and integration tests.
//!
//! Compiled only with the `test-support` feature; integration tests enable
//! it through the crate's dev-dependency on itself.

use std::rc::Rc;

use crate::domain::registrar::{
    CourseSubmission, InstructorSubmission, Registrar, StudentSubmission,
};
use crate::outbound::persistence::{
    DieselCourseRepository, DieselEnrollmentRepository, DieselInstructorRepository,
    DieselStudentRepository, Session,
};

/// Registrar wired to the Diesel/SQLite adapters.
pub type SqliteRegistrar = Registrar<
    DieselStudentRepository,
    DieselInstructorRepository,
    DieselCourseRepository,
    DieselEnrollmentRepository,
>;

/// Install a fmt subscriber honouring `RUST_LOG`, once per process.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Open a fresh in-memory database with the schema applied.
///
/// # Panics
///
/// Panics when the in-memory database cannot be opened; tests cannot
/// proceed without it.
pub fn memory_session() -> Session {
    Session::in_memory()
        .unwrap_or_else(|error| panic!("in-memory session should establish: {error}"))
}

/// Open a database file inside a fresh temporary directory.
///
/// The directory guard must stay alive for as long as the session is used.
///
/// # Panics
///
/// Panics when the directory or database cannot be created.
pub fn temp_file_session() -> (tempfile::TempDir, Session) {
    let dir = tempfile::tempdir()
        .unwrap_or_else(|error| panic!("temp dir should create: {error}"));
    let path = dir.path().join("roster.db");
    let session = Session::establish(&path.to_string_lossy())
        .unwrap_or_else(|error| panic!("file session should establish: {error}"));
    (dir, session)
}

/// Build a [`SqliteRegistrar`] over the given session.
pub fn registrar_over(session: &Session) -> SqliteRegistrar {
    Registrar::new(
        Rc::new(DieselStudentRepository::new(session.clone())),
        Rc::new(DieselInstructorRepository::new(session.clone())),
        Rc::new(DieselCourseRepository::new(session.clone())),
        Rc::new(DieselEnrollmentRepository::new(session.clone())),
    )
}

/// Submission values matching the original sample data.
pub mod fixtures {
    use super::{CourseSubmission, InstructorSubmission, StudentSubmission};

    /// A valid student submission.
    pub fn alice() -> StudentSubmission {
        StudentSubmission {
            name: "Alice Smith".to_owned(),
            age: 20,
            email: "alice@x.com".to_owned(),
            student_id: "S1".to_owned(),
        }
    }

    /// A valid instructor submission.
    pub fn john() -> InstructorSubmission {
        InstructorSubmission {
            name: "John Doe".to_owned(),
            age: 30,
            email: "mail@mail.com".to_owned(),
            instructor_id: "I1".to_owned(),
        }
    }

    /// A valid course submission with no instructor.
    pub fn cs101() -> CourseSubmission {
        CourseSubmission {
            course_name: "Introduction to Computer Science".to_owned(),
            course_id: "C1".to_owned(),
            instructor_id: None,
        }
    }
}
