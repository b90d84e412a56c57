//! Record reconciliation service.
//!
//! [`Registrar`] composes validation, the domain entities, and the
//! repository ports: it validates raw field values, enforces uniqueness and
//! cross-entity rules, persists through the ports, and serves listings from
//! its owned [`RosterCache`]. Every operation runs to completion before the
//! next begins; a validation failure never reaches the store.

use std::rc::Rc;

use tabular::{TabularDocument, TabularError};
use tracing::debug;

use super::cache::RosterCache;
use super::course::{Course, CourseId, CourseName};
use super::error::DomainError;
use super::instructor::{Instructor, InstructorId};
use super::person::{Person, ValidationError};
use super::ports::{
    CoursePersistenceError, CourseRepository, EnrollmentPersistenceError, EnrollmentRepository,
    InstructorPersistenceError, InstructorRepository, StudentPersistenceError, StudentRepository,
};
use super::snapshot::RosterSnapshot;
use super::student::{Student, StudentId};

/// Raw field values for a new student.
#[derive(Debug, Clone)]
pub struct StudentSubmission {
    /// Display name.
    pub name: String,
    /// Age in whole years.
    pub age: i32,
    /// Email address.
    pub email: String,
    /// Natural identifier, unique across students.
    pub student_id: String,
}

/// Raw field values for a new instructor.
#[derive(Debug, Clone)]
pub struct InstructorSubmission {
    /// Display name.
    pub name: String,
    /// Age in whole years.
    pub age: i32,
    /// Email address.
    pub email: String,
    /// Natural identifier, unique across instructors.
    pub instructor_id: String,
}

/// Raw field values for a new course.
#[derive(Debug, Clone)]
pub struct CourseSubmission {
    /// Course title; collisions are permitted.
    pub course_name: String,
    /// Natural identifier, unique across courses.
    pub course_id: String,
    /// Optional instructor reference; blank means unassigned.
    pub instructor_id: Option<String>,
}

/// Raw replacement values for a student's or instructor's identity fields.
#[derive(Debug, Clone)]
pub struct PersonUpdate {
    /// New display name.
    pub name: String,
    /// New age in whole years.
    pub age: i32,
    /// New email address.
    pub email: String,
}

/// Raw replacement values for a course.
#[derive(Debug, Clone)]
pub struct CourseUpdate {
    /// New course title.
    pub course_name: String,
    /// New instructor reference; blank or absent clears the assignment.
    pub instructor_id: Option<String>,
}

/// Result of a registration request.
///
/// Registering an already-enrolled pair is an informational no-op rather
/// than an error, so UIs can surface the original's "already registered"
/// notice without a failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A new enrollment row was created.
    Registered,
    /// The pair was already enrolled; nothing changed.
    AlreadyRegistered,
}

impl RegistrationOutcome {
    /// Whether the request created a new enrollment.
    pub const fn is_new(self) -> bool {
        matches!(self, Self::Registered)
    }
}

/// Record families available to listings and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Student records.
    Students,
    /// Instructor records.
    Instructors,
    /// Course records.
    Courses,
    /// Enrollment join records.
    Enrollments,
}

/// Counters describing what a snapshot restore actually applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Students inserted.
    pub students_added: usize,
    /// Instructors inserted.
    pub instructors_added: usize,
    /// Courses inserted.
    pub courses_added: usize,
    /// Enrollment rows created from `registered_courses` lists.
    pub enrollments_added: usize,
    /// Records skipped because an id or email was already present.
    pub skipped_duplicates: usize,
    /// References (instructor or course ids) that did not resolve.
    pub skipped_unresolved: usize,
}

/// Reconciliation service over the four repository ports.
///
/// Single-threaded by design: operations take `&mut self` and assume
/// exclusive access to the backing session.
pub struct Registrar<S, I, C, E> {
    students: Rc<S>,
    instructors: Rc<I>,
    courses: Rc<C>,
    enrollments: Rc<E>,
    cache: RosterCache,
}

impl<S, I, C, E> Registrar<S, I, C, E> {
    /// Create a service over the given repositories with an empty cache.
    pub const fn new(
        students: Rc<S>,
        instructors: Rc<I>,
        courses: Rc<C>,
        enrollments: Rc<E>,
    ) -> Self {
        Self {
            students,
            instructors,
            courses,
            enrollments,
            cache: RosterCache::new(),
        }
    }
}

impl<S, I, C, E> Registrar<S, I, C, E>
where
    S: StudentRepository,
    I: InstructorRepository,
    C: CourseRepository,
    E: EnrollmentRepository,
{
    fn map_validation_error(error: ValidationError) -> DomainError {
        DomainError::invalid_field(error.to_string())
    }

    fn map_student_error(error: StudentPersistenceError) -> DomainError {
        match error {
            StudentPersistenceError::Connection { message } => {
                DomainError::store_unavailable(format!("student repository unavailable: {message}"))
            }
            StudentPersistenceError::Query { message } => {
                DomainError::internal(format!("student repository error: {message}"))
            }
            StudentPersistenceError::DuplicateRecord { message } => {
                DomainError::duplicate_key(message)
            }
        }
    }

    fn map_instructor_error(error: InstructorPersistenceError) -> DomainError {
        match error {
            InstructorPersistenceError::Connection { message } => DomainError::store_unavailable(
                format!("instructor repository unavailable: {message}"),
            ),
            InstructorPersistenceError::Query { message } => {
                DomainError::internal(format!("instructor repository error: {message}"))
            }
            InstructorPersistenceError::DuplicateRecord { message } => {
                DomainError::duplicate_key(message)
            }
        }
    }

    fn map_course_error(error: CoursePersistenceError) -> DomainError {
        match error {
            CoursePersistenceError::Connection { message } => {
                DomainError::store_unavailable(format!("course repository unavailable: {message}"))
            }
            CoursePersistenceError::Query { message } => {
                DomainError::internal(format!("course repository error: {message}"))
            }
            CoursePersistenceError::DuplicateRecord { message } => {
                DomainError::duplicate_key(message)
            }
            CoursePersistenceError::MissingInstructor { instructor_id } => {
                DomainError::instructor_not_found(format!(
                    "instructor {instructor_id} not found"
                ))
            }
        }
    }

    fn map_enrollment_error(error: EnrollmentPersistenceError) -> DomainError {
        match error {
            EnrollmentPersistenceError::Connection { message } => DomainError::store_unavailable(
                format!("enrollment repository unavailable: {message}"),
            ),
            EnrollmentPersistenceError::Query { message } => {
                DomainError::internal(format!("enrollment repository error: {message}"))
            }
            EnrollmentPersistenceError::AlreadyEnrolled {
                student_id,
                course_id,
            } => DomainError::already_enrolled(format!(
                "student {student_id} is already enrolled in course {course_id}"
            )),
            EnrollmentPersistenceError::MissingParticipant { message } => {
                DomainError::not_found(message)
            }
        }
    }

    fn map_tabular_error(error: TabularError) -> DomainError {
        DomainError::internal(format!("export row shape mismatch: {error}"))
    }

    /// Validate and persist a new student.
    ///
    /// # Errors
    ///
    /// `InvalidField` on malformed input; `DuplicateKey` when the natural
    /// id or email is already present; `StoreUnavailable`/`Internal` on
    /// repository failure.
    pub fn submit_student(
        &mut self,
        submission: StudentSubmission,
    ) -> Result<Student, DomainError> {
        let StudentSubmission {
            name,
            age,
            email,
            student_id,
        } = submission;
        let student = Student::try_from_fields(name, age, email, student_id)
            .map_err(Self::map_validation_error)?;

        if let Some(existing) = self
            .students
            .find_conflict(student.student_id(), student.person().email())
            .map_err(Self::map_student_error)?
        {
            return Err(DomainError::duplicate_key(
                "student id or email already exists",
            )
            .with_details(serde_json::json!({
                "student_id": existing.student_id().as_ref(),
            })));
        }

        self.students
            .insert(&student)
            .map_err(Self::map_student_error)?;
        self.cache.invalidate_students();
        debug!(student_id = %student.student_id(), "student submitted");
        Ok(student)
    }

    /// Validate and persist a new instructor.
    ///
    /// # Errors
    ///
    /// As [`Registrar::submit_student`].
    pub fn submit_instructor(
        &mut self,
        submission: InstructorSubmission,
    ) -> Result<Instructor, DomainError> {
        let InstructorSubmission {
            name,
            age,
            email,
            instructor_id,
        } = submission;
        let instructor = Instructor::try_from_fields(name, age, email, instructor_id)
            .map_err(Self::map_validation_error)?;

        if let Some(existing) = self
            .instructors
            .find_conflict(instructor.instructor_id(), instructor.person().email())
            .map_err(Self::map_instructor_error)?
        {
            return Err(DomainError::duplicate_key(
                "instructor id or email already exists",
            )
            .with_details(serde_json::json!({
                "instructor_id": existing.instructor_id().as_ref(),
            })));
        }

        self.instructors
            .insert(&instructor)
            .map_err(Self::map_instructor_error)?;
        self.cache.invalidate_instructors();
        debug!(instructor_id = %instructor.instructor_id(), "instructor submitted");
        Ok(instructor)
    }

    /// Validate and persist a new course.
    ///
    /// # Errors
    ///
    /// `InvalidField` on malformed input; `DuplicateKey` on a course-id
    /// collision (name collisions are permitted); `InstructorNotFound` when
    /// a non-empty instructor reference does not resolve. Nothing is
    /// persisted on failure.
    pub fn submit_course(&mut self, submission: CourseSubmission) -> Result<Course, DomainError> {
        let CourseSubmission {
            course_name,
            course_id,
            instructor_id,
        } = submission;
        let mut course = Course::try_from_fields(course_id, course_name)
            .map_err(Self::map_validation_error)?;

        if self
            .courses
            .find_by_course_id(course.course_id())
            .map_err(Self::map_course_error)?
            .is_some()
        {
            return Err(DomainError::duplicate_key("course id already exists"));
        }

        if let Some(reference) = instructor_id.filter(|value| !value.trim().is_empty()) {
            let instructor_id = InstructorId::new(reference)
                .map_err(Self::map_validation_error)?;
            let instructor = self
                .instructors
                .find_by_instructor_id(&instructor_id)
                .map_err(Self::map_instructor_error)?
                .ok_or_else(|| {
                    DomainError::instructor_not_found(format!(
                        "instructor {instructor_id} not found"
                    ))
                })?;
            course.assign_instructor(Some(instructor.instructor_id().clone()));
        }

        self.courses
            .insert(&course)
            .map_err(Self::map_course_error)?;
        self.cache.invalidate_courses();
        debug!(course_id = %course.course_id(), "course submitted");
        Ok(course)
    }

    /// Register a student for a course.
    ///
    /// Both references resolve by exact natural id first, then by exact
    /// name. An already-enrolled pair yields
    /// [`RegistrationOutcome::AlreadyRegistered`] and changes nothing.
    ///
    /// # Errors
    ///
    /// `NotFound` when either reference does not resolve;
    /// `StoreUnavailable`/`Internal` on repository failure.
    pub fn register(
        &mut self,
        student_ref: &str,
        course_ref: &str,
    ) -> Result<RegistrationOutcome, DomainError> {
        let student = self.resolve_student(student_ref)?;
        let course = self.resolve_course(course_ref)?;

        match self
            .enrollments
            .enroll(student.student_id(), course.course_id())
        {
            Ok(()) => {
                self.cache.invalidate_students();
                self.cache.invalidate_courses();
                debug!(
                    student_id = %student.student_id(),
                    course_id = %course.course_id(),
                    "student registered"
                );
                Ok(RegistrationOutcome::Registered)
            }
            Err(EnrollmentPersistenceError::AlreadyEnrolled { .. }) => {
                Ok(RegistrationOutcome::AlreadyRegistered)
            }
            Err(error) => Err(Self::map_enrollment_error(error)),
        }
    }

    /// Assign (or reassign) an instructor to a course.
    ///
    /// # Errors
    ///
    /// `NotFound` when either reference does not resolve.
    pub fn assign_instructor(
        &mut self,
        instructor_ref: &str,
        course_ref: &str,
    ) -> Result<(), DomainError> {
        let instructor = self.resolve_instructor(instructor_ref)?;
        let course = self.resolve_course(course_ref)?;

        self.courses
            .assign_instructor(course.course_id(), Some(instructor.instructor_id()))
            .map_err(Self::map_course_error)?;
        self.cache.invalidate_instructors();
        self.cache.invalidate_courses();
        debug!(
            instructor_id = %instructor.instructor_id(),
            course_id = %course.course_id(),
            "instructor assigned"
        );
        Ok(())
    }

    /// Replace the identity fields of an existing student.
    ///
    /// # Errors
    ///
    /// `InvalidField` on malformed input; `NotFound` when the id is absent;
    /// `DuplicateKey` when the new email belongs to a different student.
    pub fn update_student(
        &mut self,
        student_id: &str,
        update: PersonUpdate,
    ) -> Result<Student, DomainError> {
        let student_id = StudentId::new(student_id).map_err(Self::map_validation_error)?;
        let PersonUpdate { name, age, email } = update;
        let person =
            Person::try_from_fields(name, age, email).map_err(Self::map_validation_error)?;

        let existing = self
            .students
            .find_by_student_id(&student_id)
            .map_err(Self::map_student_error)?
            .ok_or_else(|| {
                DomainError::not_found(format!("student {student_id} not found"))
            })?;

        if let Some(holder) = self
            .students
            .find_by_email(person.email())
            .map_err(Self::map_student_error)?
        {
            if holder.student_id() != &student_id {
                return Err(DomainError::duplicate_key("email already exists"));
            }
        }

        let updated = Student::with_registered_courses(
            person,
            student_id,
            existing.registered_courses().to_vec(),
        );
        self.students
            .update(&updated)
            .map_err(Self::map_student_error)?;
        self.cache.invalidate_students();
        Ok(updated)
    }

    /// Replace the identity fields of an existing instructor.
    ///
    /// # Errors
    ///
    /// As [`Registrar::update_student`].
    pub fn update_instructor(
        &mut self,
        instructor_id: &str,
        update: PersonUpdate,
    ) -> Result<Instructor, DomainError> {
        let instructor_id =
            InstructorId::new(instructor_id).map_err(Self::map_validation_error)?;
        let PersonUpdate { name, age, email } = update;
        let person =
            Person::try_from_fields(name, age, email).map_err(Self::map_validation_error)?;

        let existing = self
            .instructors
            .find_by_instructor_id(&instructor_id)
            .map_err(Self::map_instructor_error)?
            .ok_or_else(|| {
                DomainError::not_found(format!("instructor {instructor_id} not found"))
            })?;

        if let Some(holder) = self
            .instructors
            .find_by_email(person.email())
            .map_err(Self::map_instructor_error)?
        {
            if holder.instructor_id() != &instructor_id {
                return Err(DomainError::duplicate_key("email already exists"));
            }
        }

        let updated = Instructor::with_assigned_courses(
            person,
            instructor_id,
            existing.assigned_courses().to_vec(),
        );
        self.instructors
            .update(&updated)
            .map_err(Self::map_instructor_error)?;
        self.cache.invalidate_instructors();
        Ok(updated)
    }

    /// Replace the title and instructor reference of an existing course.
    ///
    /// # Errors
    ///
    /// `InvalidField` on malformed input; `NotFound` when the course id is
    /// absent; `InstructorNotFound` when a non-empty instructor reference
    /// does not resolve.
    pub fn update_course(
        &mut self,
        course_id: &str,
        update: CourseUpdate,
    ) -> Result<Course, DomainError> {
        let course_id = CourseId::new(course_id).map_err(Self::map_validation_error)?;
        let CourseUpdate {
            course_name,
            instructor_id,
        } = update;
        let course_name = CourseName::new(course_name).map_err(Self::map_validation_error)?;

        let existing = self
            .courses
            .find_by_course_id(&course_id)
            .map_err(Self::map_course_error)?
            .ok_or_else(|| DomainError::not_found(format!("course {course_id} not found")))?;

        let instructor = match instructor_id.filter(|value| !value.trim().is_empty()) {
            Some(reference) => {
                let id = InstructorId::new(reference).map_err(Self::map_validation_error)?;
                let instructor = self
                    .instructors
                    .find_by_instructor_id(&id)
                    .map_err(Self::map_instructor_error)?
                    .ok_or_else(|| {
                        DomainError::instructor_not_found(format!("instructor {id} not found"))
                    })?;
                Some(instructor.instructor_id().clone())
            }
            None => None,
        };

        let updated = Course::with_parts(
            course_id,
            course_name,
            instructor,
            existing.enrolled_students().to_vec(),
        );
        self.courses
            .update(&updated)
            .map_err(Self::map_course_error)?;
        self.cache.invalidate_courses();
        self.cache.invalidate_instructors();
        Ok(updated)
    }

    /// Delete a student and its enrollment rows.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent.
    pub fn delete_student(&mut self, student_id: &str) -> Result<(), DomainError> {
        let student_id = StudentId::new(student_id).map_err(Self::map_validation_error)?;
        if self
            .students
            .find_by_student_id(&student_id)
            .map_err(Self::map_student_error)?
            .is_none()
        {
            return Err(DomainError::not_found(format!(
                "student {student_id} not found"
            )));
        }
        self.students
            .delete(&student_id)
            .map_err(Self::map_student_error)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Delete an instructor, clearing the reference on their courses.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent.
    pub fn delete_instructor(&mut self, instructor_id: &str) -> Result<(), DomainError> {
        let instructor_id =
            InstructorId::new(instructor_id).map_err(Self::map_validation_error)?;
        if self
            .instructors
            .find_by_instructor_id(&instructor_id)
            .map_err(Self::map_instructor_error)?
            .is_none()
        {
            return Err(DomainError::not_found(format!(
                "instructor {instructor_id} not found"
            )));
        }
        self.instructors
            .delete(&instructor_id)
            .map_err(Self::map_instructor_error)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Delete a course and its enrollment rows.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent.
    pub fn delete_course(&mut self, course_id: &str) -> Result<(), DomainError> {
        let course_id = CourseId::new(course_id).map_err(Self::map_validation_error)?;
        if self
            .courses
            .find_by_course_id(&course_id)
            .map_err(Self::map_course_error)?
            .is_none()
        {
            return Err(DomainError::not_found(format!(
                "course {course_id} not found"
            )));
        }
        self.courses
            .delete(&course_id)
            .map_err(Self::map_course_error)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Every student, served from the cache.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable`/`Internal` when the cache has to refill and the
    /// repository fails.
    pub fn list_students(&mut self) -> Result<Vec<Student>, DomainError> {
        let students = self
            .cache
            .students_or_fill(|| self.students.find_all().map_err(Self::map_student_error))?;
        Ok(students.to_vec())
    }

    /// Every instructor, served from the cache.
    ///
    /// # Errors
    ///
    /// As [`Registrar::list_students`].
    pub fn list_instructors(&mut self) -> Result<Vec<Instructor>, DomainError> {
        let instructors = self.cache.instructors_or_fill(|| {
            self.instructors
                .find_all()
                .map_err(Self::map_instructor_error)
        })?;
        Ok(instructors.to_vec())
    }

    /// Every course, served from the cache.
    ///
    /// # Errors
    ///
    /// As [`Registrar::list_students`].
    pub fn list_courses(&mut self) -> Result<Vec<Course>, DomainError> {
        let courses = self
            .cache
            .courses_or_fill(|| self.courses.find_all().map_err(Self::map_course_error))?;
        Ok(courses.to_vec())
    }

    /// Drop and refill every cache slot from the repositories.
    ///
    /// # Errors
    ///
    /// As [`Registrar::list_students`].
    pub fn refresh(&mut self) -> Result<(), DomainError> {
        self.cache.invalidate();
        self.list_students()?;
        self.list_instructors()?;
        self.list_courses()?;
        Ok(())
    }

    /// Students whose name contains `term` or whose id equals `term`.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable`/`Internal` on repository failure.
    pub fn search_students(&self, term: &str) -> Result<Vec<Student>, DomainError> {
        self.students.search(term).map_err(Self::map_student_error)
    }

    /// Instructors whose name contains `term` or whose id equals `term`.
    ///
    /// # Errors
    ///
    /// As [`Registrar::search_students`].
    pub fn search_instructors(&self, term: &str) -> Result<Vec<Instructor>, DomainError> {
        self.instructors
            .search(term)
            .map_err(Self::map_instructor_error)
    }

    /// Courses whose title contains `term` or whose id equals `term`.
    ///
    /// # Errors
    ///
    /// As [`Registrar::search_students`].
    pub fn search_courses(&self, term: &str) -> Result<Vec<Course>, DomainError> {
        self.courses.search(term).map_err(Self::map_course_error)
    }

    /// Tabular rows of one record family, for CSV collaborators.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable`/`Internal` on repository failure.
    pub fn export(&self, kind: RecordKind) -> Result<TabularDocument, DomainError> {
        match kind {
            RecordKind::Students => {
                let mut document =
                    TabularDocument::new(["name", "age", "email", "student_id"]);
                for student in self.students.find_all().map_err(Self::map_student_error)? {
                    document
                        .push_row([
                            student.person().name().to_string(),
                            student.person().age().to_string(),
                            student.person().email().to_string(),
                            student.student_id().to_string(),
                        ])
                        .map_err(Self::map_tabular_error)?;
                }
                Ok(document)
            }
            RecordKind::Instructors => {
                let mut document =
                    TabularDocument::new(["name", "age", "email", "instructor_id"]);
                for instructor in self
                    .instructors
                    .find_all()
                    .map_err(Self::map_instructor_error)?
                {
                    document
                        .push_row([
                            instructor.person().name().to_string(),
                            instructor.person().age().to_string(),
                            instructor.person().email().to_string(),
                            instructor.instructor_id().to_string(),
                        ])
                        .map_err(Self::map_tabular_error)?;
                }
                Ok(document)
            }
            RecordKind::Courses => {
                let mut document =
                    TabularDocument::new(["course_name", "course_id", "instructor_id"]);
                for course in self.courses.find_all().map_err(Self::map_course_error)? {
                    document
                        .push_row([
                            course.course_name().to_string(),
                            course.course_id().to_string(),
                            course
                                .instructor()
                                .map(ToString::to_string)
                                .unwrap_or_default(),
                        ])
                        .map_err(Self::map_tabular_error)?;
                }
                Ok(document)
            }
            RecordKind::Enrollments => {
                let mut document = TabularDocument::new(["student_id", "course_id"]);
                for enrollment in self
                    .enrollments
                    .find_all()
                    .map_err(Self::map_enrollment_error)?
                {
                    document
                        .push_row([
                            enrollment.student_id.to_string(),
                            enrollment.course_id.to_string(),
                        ])
                        .map_err(Self::map_tabular_error)?;
                }
                Ok(document)
            }
        }
    }

    /// The full state of the store as a flat document.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable`/`Internal` on repository failure.
    pub fn snapshot(&self) -> Result<RosterSnapshot, DomainError> {
        Ok(RosterSnapshot {
            students: self.students.find_all().map_err(Self::map_student_error)?,
            instructors: self
                .instructors
                .find_all()
                .map_err(Self::map_instructor_error)?,
            courses: self.courses.find_all().map_err(Self::map_course_error)?,
        })
    }

    /// Seed the store from a snapshot document.
    ///
    /// Instructors load first, then courses, then students, then the
    /// enrollments derived from each student's `registered_courses`.
    /// Records colliding with existing rows are skipped and counted, as are
    /// instructor or course references that do not resolve; nothing makes
    /// the whole restore fail except a repository error.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable`/`Internal` on repository failure.
    pub fn restore_snapshot(
        &mut self,
        snapshot: RosterSnapshot,
    ) -> Result<RestoreReport, DomainError> {
        let RosterSnapshot {
            students,
            instructors,
            courses,
        } = snapshot;
        let mut report = RestoreReport::default();

        for instructor in instructors {
            if self
                .instructors
                .find_conflict(instructor.instructor_id(), instructor.person().email())
                .map_err(Self::map_instructor_error)?
                .is_some()
            {
                report.skipped_duplicates += 1;
                continue;
            }
            self.instructors
                .insert(&instructor)
                .map_err(Self::map_instructor_error)?;
            report.instructors_added += 1;
        }

        for mut course in courses {
            if self
                .courses
                .find_by_course_id(course.course_id())
                .map_err(Self::map_course_error)?
                .is_some()
            {
                report.skipped_duplicates += 1;
                continue;
            }
            let unresolved = match course.instructor() {
                Some(instructor_id) => self
                    .instructors
                    .find_by_instructor_id(instructor_id)
                    .map_err(Self::map_instructor_error)?
                    .is_none(),
                None => false,
            };
            if unresolved {
                report.skipped_unresolved += 1;
                course.assign_instructor(None);
            }
            self.courses
                .insert(&course)
                .map_err(Self::map_course_error)?;
            report.courses_added += 1;
        }

        for student in students {
            if self
                .students
                .find_conflict(student.student_id(), student.person().email())
                .map_err(Self::map_student_error)?
                .is_some()
            {
                report.skipped_duplicates += 1;
                continue;
            }
            self.students
                .insert(&student)
                .map_err(Self::map_student_error)?;
            report.students_added += 1;

            for course_id in student.registered_courses() {
                if self
                    .courses
                    .find_by_course_id(course_id)
                    .map_err(Self::map_course_error)?
                    .is_none()
                {
                    report.skipped_unresolved += 1;
                    continue;
                }
                match self.enrollments.enroll(student.student_id(), course_id) {
                    Ok(()) => report.enrollments_added += 1,
                    Err(EnrollmentPersistenceError::AlreadyEnrolled { .. }) => {}
                    Err(error) => return Err(Self::map_enrollment_error(error)),
                }
            }
        }

        self.cache.invalidate();
        debug!(
            students = report.students_added,
            instructors = report.instructors_added,
            courses = report.courses_added,
            "snapshot restored"
        );
        Ok(report)
    }

    fn resolve_student(&self, reference: &str) -> Result<Student, DomainError> {
        if let Ok(student_id) = StudentId::new(reference) {
            if let Some(student) = self
                .students
                .find_by_student_id(&student_id)
                .map_err(Self::map_student_error)?
            {
                return Ok(student);
            }
        }
        self.students
            .find_by_name(reference)
            .map_err(Self::map_student_error)?
            .ok_or_else(|| DomainError::not_found(format!("student {reference} not found")))
    }

    fn resolve_instructor(&self, reference: &str) -> Result<Instructor, DomainError> {
        if let Ok(instructor_id) = InstructorId::new(reference) {
            if let Some(instructor) = self
                .instructors
                .find_by_instructor_id(&instructor_id)
                .map_err(Self::map_instructor_error)?
            {
                return Ok(instructor);
            }
        }
        self.instructors
            .find_by_name(reference)
            .map_err(Self::map_instructor_error)?
            .ok_or_else(|| DomainError::not_found(format!("instructor {reference} not found")))
    }

    fn resolve_course(&self, reference: &str) -> Result<Course, DomainError> {
        if let Ok(course_id) = CourseId::new(reference) {
            if let Some(course) = self
                .courses
                .find_by_course_id(&course_id)
                .map_err(Self::map_course_error)?
            {
                return Ok(course);
            }
        }
        self.courses
            .find_by_name(reference)
            .map_err(Self::map_course_error)?
            .ok_or_else(|| DomainError::not_found(format!("course {reference} not found")))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use mockall::predicate::eq;
    use rstest::rstest;

    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{
        FixtureCourseRepository, FixtureEnrollmentRepository, FixtureInstructorRepository,
        FixtureStudentRepository, MockCourseRepository, MockEnrollmentRepository,
        MockInstructorRepository, MockStudentRepository,
    };

    fn alice_submission() -> StudentSubmission {
        StudentSubmission {
            name: "Alice".to_owned(),
            age: 20,
            email: "alice@x.com".to_owned(),
            student_id: "S1".to_owned(),
        }
    }

    fn sample_student() -> Student {
        Student::try_from_fields("Alice", 20, "alice@x.com", "S1")
            .expect("student should validate")
    }

    fn sample_course() -> Course {
        Course::try_from_fields("C1", "CS101").expect("course should validate")
    }

    fn with_students(
        students: MockStudentRepository,
    ) -> Registrar<
        MockStudentRepository,
        FixtureInstructorRepository,
        FixtureCourseRepository,
        FixtureEnrollmentRepository,
    > {
        Registrar::new(
            Rc::new(students),
            Rc::new(FixtureInstructorRepository),
            Rc::new(FixtureCourseRepository),
            Rc::new(FixtureEnrollmentRepository),
        )
    }

    #[rstest]
    fn submit_student_persists_valid_input() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_conflict()
            .times(1)
            .return_once(|_, _| Ok(None));
        students.expect_insert().times(1).return_once(|_| Ok(()));

        let mut registrar = with_students(students);
        let student = registrar
            .submit_student(alice_submission())
            .expect("submission should succeed");

        assert_eq!(student.student_id().as_ref(), "S1");
        assert_eq!(student.person().email().as_ref(), "alice@x.com");
    }

    #[rstest]
    fn submit_student_rejects_duplicates_without_inserting() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_conflict()
            .times(1)
            .return_once(|_, _| Ok(Some(sample_student())));
        students.expect_insert().times(0);

        let mut registrar = with_students(students);
        let error = registrar
            .submit_student(alice_submission())
            .expect_err("duplicate should be rejected");

        assert_eq!(error.code(), ErrorCode::DuplicateKey);
    }

    #[rstest]
    fn submit_student_rejects_invalid_email_before_any_repository_call() {
        let mut students = MockStudentRepository::new();
        students.expect_find_conflict().times(0);
        students.expect_insert().times(0);

        let mut registrar = with_students(students);
        let error = registrar
            .submit_student(StudentSubmission {
                email: "not-an-email".to_owned(),
                ..alice_submission()
            })
            .expect_err("invalid email should be rejected");

        assert_eq!(error.code(), ErrorCode::InvalidField);
    }

    #[rstest]
    fn submit_student_maps_connection_failure_to_store_unavailable() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_conflict()
            .times(1)
            .return_once(|_, _| Err(StudentPersistenceError::connection("disk gone")));

        let mut registrar = with_students(students);
        let error = registrar
            .submit_student(alice_submission())
            .expect_err("connection failure should surface");

        assert_eq!(error.code(), ErrorCode::StoreUnavailable);
    }

    #[rstest]
    fn submit_course_rejects_unknown_instructor_without_inserting() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_course_id()
            .times(1)
            .return_once(|_| Ok(None));
        courses.expect_insert().times(0);

        let mut instructors = MockInstructorRepository::new();
        instructors
            .expect_find_by_instructor_id()
            .times(1)
            .return_once(|_| Ok(None));

        let mut registrar = Registrar::new(
            Rc::new(FixtureStudentRepository),
            Rc::new(instructors),
            Rc::new(courses),
            Rc::new(FixtureEnrollmentRepository),
        );
        let error = registrar
            .submit_course(CourseSubmission {
                course_name: "CS101".to_owned(),
                course_id: "C1".to_owned(),
                instructor_id: Some("I1".to_owned()),
            })
            .expect_err("unknown instructor should be rejected");

        assert_eq!(error.code(), ErrorCode::InstructorNotFound);
    }

    #[rstest]
    fn submit_course_treats_blank_instructor_as_unassigned() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_course_id()
            .times(1)
            .return_once(|_| Ok(None));
        courses
            .expect_insert()
            .times(1)
            .withf(|course: &Course| course.instructor().is_none())
            .return_once(|_| Ok(()));

        let mut registrar = Registrar::new(
            Rc::new(FixtureStudentRepository),
            Rc::new(FixtureInstructorRepository),
            Rc::new(courses),
            Rc::new(FixtureEnrollmentRepository),
        );
        let course = registrar
            .submit_course(CourseSubmission {
                course_name: "CS101".to_owned(),
                course_id: "C1".to_owned(),
                instructor_id: Some("   ".to_owned()),
            })
            .expect("blank instructor should be accepted");

        assert!(course.instructor().is_none());
    }

    #[rstest]
    fn register_enrolls_a_resolvable_pair() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_student_id()
            .times(1)
            .return_once(|_| Ok(Some(sample_student())));

        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_course_id()
            .times(1)
            .return_once(|_| Ok(Some(sample_course())));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments
            .expect_enroll()
            .with(
                eq(StudentId::new("S1").expect("student id should validate")),
                eq(CourseId::new("C1").expect("course id should validate")),
            )
            .times(1)
            .return_once(|_, _| Ok(()));

        let mut registrar = Registrar::new(
            Rc::new(students),
            Rc::new(FixtureInstructorRepository),
            Rc::new(courses),
            Rc::new(enrollments),
        );
        let outcome = registrar
            .register("S1", "C1")
            .expect("registration should succeed");

        assert!(outcome.is_new());
    }

    #[rstest]
    fn register_treats_existing_enrollment_as_informational() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_student_id()
            .times(1)
            .return_once(|_| Ok(Some(sample_student())));

        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_course_id()
            .times(1)
            .return_once(|_| Ok(Some(sample_course())));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments
            .expect_enroll()
            .times(1)
            .return_once(|_, _| Err(EnrollmentPersistenceError::already_enrolled("S1", "C1")));

        let mut registrar = Registrar::new(
            Rc::new(students),
            Rc::new(FixtureInstructorRepository),
            Rc::new(courses),
            Rc::new(enrollments),
        );
        let outcome = registrar
            .register("S1", "C1")
            .expect("existing enrollment should be a no-op");

        assert_eq!(outcome, RegistrationOutcome::AlreadyRegistered);
    }

    #[rstest]
    fn register_fails_for_unknown_student() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_student_id()
            .times(1)
            .return_once(|_| Ok(None));
        students
            .expect_find_by_name()
            .times(1)
            .return_once(|_| Ok(None));

        let mut registrar = Registrar::new(
            Rc::new(students),
            Rc::new(FixtureInstructorRepository),
            Rc::new(FixtureCourseRepository),
            Rc::new(FixtureEnrollmentRepository),
        );
        let error = registrar
            .register("S9", "C1")
            .expect_err("unknown student should fail");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    fn register_falls_back_to_name_resolution() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_student_id()
            .times(1)
            .return_once(|_| Ok(None));
        students
            .expect_find_by_name()
            .withf(|name| name == "Alice")
            .times(1)
            .return_once(|_| Ok(Some(sample_student())));

        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_course_id()
            .times(1)
            .return_once(|_| Ok(Some(sample_course())));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments
            .expect_enroll()
            .times(1)
            .return_once(|_, _| Ok(()));

        let mut registrar = Registrar::new(
            Rc::new(students),
            Rc::new(FixtureInstructorRepository),
            Rc::new(courses),
            Rc::new(enrollments),
        );
        let outcome = registrar
            .register("Alice", "C1")
            .expect("name resolution should succeed");

        assert!(outcome.is_new());
    }

    #[rstest]
    fn assign_instructor_fails_for_unknown_course() {
        let mut instructors = MockInstructorRepository::new();
        instructors
            .expect_find_by_instructor_id()
            .times(1)
            .return_once(|_| {
                Ok(Some(
                    Instructor::try_from_fields("John", 30, "mail@mail.com", "I1")
                        .expect("instructor should validate"),
                ))
            });

        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_course_id()
            .times(1)
            .return_once(|_| Ok(None));
        courses.expect_find_by_name().times(1).return_once(|_| Ok(None));
        courses.expect_assign_instructor().times(0);

        let mut registrar = Registrar::new(
            Rc::new(FixtureStudentRepository),
            Rc::new(instructors),
            Rc::new(courses),
            Rc::new(FixtureEnrollmentRepository),
        );
        let error = registrar
            .assign_instructor("I1", "C9")
            .expect_err("unknown course should fail");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    fn update_student_rejects_email_held_by_another_student() {
        let other = Student::try_from_fields("Bob", 21, "bob@x.com", "S2")
            .expect("student should validate");

        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_student_id()
            .times(1)
            .return_once(|_| Ok(Some(sample_student())));
        students
            .expect_find_by_email()
            .times(1)
            .return_once(move |_| Ok(Some(other)));
        students.expect_update().times(0);

        let mut registrar = with_students(students);
        let error = registrar
            .update_student(
                "S1",
                PersonUpdate {
                    name: "Alice".to_owned(),
                    age: 21,
                    email: "bob@x.com".to_owned(),
                },
            )
            .expect_err("borrowed email should be rejected");

        assert_eq!(error.code(), ErrorCode::DuplicateKey);
    }

    #[rstest]
    fn update_student_keeps_registrations() {
        let mut existing = sample_student();
        existing.register_course(CourseId::new("C1").expect("course id should validate"));

        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_student_id()
            .times(1)
            .return_once(move |_| Ok(Some(existing)));
        students
            .expect_find_by_email()
            .times(1)
            .return_once(|_| Ok(None));
        students
            .expect_update()
            .times(1)
            .withf(|student: &Student| student.registered_courses().len() == 1)
            .return_once(|_| Ok(()));

        let mut registrar = with_students(students);
        let updated = registrar
            .update_student(
                "S1",
                PersonUpdate {
                    name: "Alice Smith".to_owned(),
                    age: 21,
                    email: "alice@x.com".to_owned(),
                },
            )
            .expect("update should succeed");

        assert_eq!(updated.person().name().as_ref(), "Alice Smith");
        assert_eq!(updated.registered_courses().len(), 1);
    }

    #[rstest]
    fn delete_student_fails_for_unknown_id() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_by_student_id()
            .times(1)
            .return_once(|_| Ok(None));
        students.expect_delete().times(0);

        let mut registrar = with_students(students);
        let error = registrar
            .delete_student("S9")
            .expect_err("unknown id should fail");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    fn list_students_serves_cached_rows_until_invalidated() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_all()
            .times(1)
            .return_once(|| Ok(vec![sample_student()]));

        let mut registrar = with_students(students);
        let first = registrar.list_students().expect("listing should succeed");
        let second = registrar.list_students().expect("listing should succeed");

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[rstest]
    fn search_returns_empty_sequence_for_no_matches() {
        let mut students = MockStudentRepository::new();
        students
            .expect_search()
            .withf(|term| term == "zzz")
            .times(1)
            .return_once(|_| Ok(Vec::new()));

        let registrar = with_students(students);
        let matches = registrar
            .search_students("zzz")
            .expect("empty search should succeed");

        assert!(matches.is_empty());
    }

    #[rstest]
    fn export_students_produces_one_row_per_record() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_all()
            .times(1)
            .return_once(|| Ok(vec![sample_student()]));

        let registrar = with_students(students);
        let document = registrar
            .export(RecordKind::Students)
            .expect("export should succeed");

        assert_eq!(
            document.columns(),
            ["name", "age", "email", "student_id"]
        );
        assert_eq!(document.row_count(), 1);
        assert_eq!(
            document.rows().first().map(|row| row.join("|")),
            Some("Alice|20|alice@x.com|S1".to_owned())
        );
    }

    #[rstest]
    fn export_courses_uses_empty_cell_for_unassigned_instructor() {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_all()
            .times(1)
            .return_once(|| Ok(vec![sample_course()]));

        let registrar = Registrar::new(
            Rc::new(FixtureStudentRepository),
            Rc::new(FixtureInstructorRepository),
            Rc::new(courses),
            Rc::new(FixtureEnrollmentRepository),
        );
        let document = registrar
            .export(RecordKind::Courses)
            .expect("export should succeed");

        assert_eq!(
            document.rows().first().map(|row| row.join("|")),
            Some("CS101|C1|".to_owned())
        );
    }

    #[rstest]
    fn restore_snapshot_skips_existing_records() {
        let mut students = MockStudentRepository::new();
        students
            .expect_find_conflict()
            .times(1)
            .return_once(|_, _| Ok(Some(sample_student())));
        students.expect_insert().times(0);

        let mut registrar = with_students(students);
        let report = registrar
            .restore_snapshot(RosterSnapshot {
                students: vec![sample_student()],
                instructors: Vec::new(),
                courses: Vec::new(),
            })
            .expect("restore should succeed");

        assert_eq!(report.students_added, 0);
        assert_eq!(report.skipped_duplicates, 1);
    }

    #[rstest]
    fn restore_snapshot_drops_unresolvable_instructor_reference() {
        let mut course = sample_course();
        course.assign_instructor(Some(
            InstructorId::new("I9").expect("instructor id should validate"),
        ));

        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_course_id()
            .times(1)
            .return_once(|_| Ok(None));
        courses
            .expect_insert()
            .times(1)
            .withf(|stored: &Course| stored.instructor().is_none())
            .return_once(|_| Ok(()));

        let mut registrar = Registrar::new(
            Rc::new(FixtureStudentRepository),
            Rc::new(FixtureInstructorRepository),
            Rc::new(courses),
            Rc::new(FixtureEnrollmentRepository),
        );
        let report = registrar
            .restore_snapshot(RosterSnapshot {
                students: Vec::new(),
                instructors: Vec::new(),
                courses: vec![course],
            })
            .expect("restore should succeed");

        assert_eq!(report.courses_added, 1);
        assert_eq!(report.skipped_unresolved, 1);
    }
}
