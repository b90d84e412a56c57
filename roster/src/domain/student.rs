//! Student entity and identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::course::CourseId;
use super::person::{Person, ValidationError};

/// Natural student identifier supplied by the caller (e.g. `"S1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentId(String);

impl StudentId {
    /// Validate and construct a [`StudentId`] from owned input.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        Self::from_owned(id.into())
    }

    fn from_owned(id: String) -> Result<Self, ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId {
                field: "student_id",
            });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for StudentId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<StudentId> for String {
    fn from(value: StudentId) -> Self {
        value.0
    }
}

impl TryFrom<String> for StudentId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// A student record.
///
/// ## Invariants
/// - Identity fields satisfy [`Person`]'s invariants.
/// - `registered_courses` keeps registration order. Duplicates are permitted
///   here; enrollment uniqueness is the store's concern.
///
/// Serialized shape:
/// `{ "name", "age", "email", "student_id", "registered_courses" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StudentDto", into = "StudentDto")]
pub struct Student {
    person: Person,
    student_id: StudentId,
    registered_courses: Vec<CourseId>,
}

impl Student {
    /// Build a [`Student`] from validated components with no registrations.
    pub const fn new(person: Person, student_id: StudentId) -> Self {
        Self {
            person,
            student_id,
            registered_courses: Vec::new(),
        }
    }

    /// Build a [`Student`] including an existing registration list.
    pub const fn with_registered_courses(
        person: Person,
        student_id: StudentId,
        registered_courses: Vec<CourseId>,
    ) -> Self {
        Self {
            person,
            student_id,
            registered_courses,
        }
    }

    /// Fallible constructor running validation on raw field values.
    pub fn try_from_fields(
        name: impl Into<String>,
        age: i32,
        email: impl Into<String>,
        student_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let person = Person::try_from_fields(name, age, email)?;
        let student_id = StudentId::new(student_id)?;

        Ok(Self::new(person, student_id))
    }

    /// Shared identity fields.
    pub const fn person(&self) -> &Person {
        &self.person
    }

    /// Natural identifier.
    pub const fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    /// Course ids this student is registered for, in registration order.
    pub fn registered_courses(&self) -> &[CourseId] {
        &self.registered_courses
    }

    /// Append a course registration.
    pub fn register_course(&mut self, course_id: CourseId) {
        self.registered_courses.push(course_id);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StudentDto {
    name: String,
    age: i32,
    email: String,
    student_id: String,
    registered_courses: Vec<String>,
}

impl From<Student> for StudentDto {
    fn from(value: Student) -> Self {
        let Student {
            person,
            student_id,
            registered_courses,
        } = value;
        Self {
            name: person.name().to_string(),
            age: person.age().value(),
            email: person.email().to_string(),
            student_id: student_id.into(),
            registered_courses: registered_courses.into_iter().map(String::from).collect(),
        }
    }
}

impl TryFrom<StudentDto> for Student {
    type Error = ValidationError;

    fn try_from(value: StudentDto) -> Result<Self, Self::Error> {
        let StudentDto {
            name,
            age,
            email,
            student_id,
            registered_courses,
        } = value;

        let person = Person::try_from_fields(name, age, email)?;
        let student_id = StudentId::new(student_id)?;
        let registered_courses = registered_courses
            .into_iter()
            .map(CourseId::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::with_registered_courses(
            person,
            student_id,
            registered_courses,
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    fn sample_student() -> Student {
        let mut student = Student::try_from_fields("Alice", 20, "alice@x.com", "S1")
            .expect("student should validate");
        student.register_course(CourseId::new("C1").expect("course id should validate"));
        student
    }

    #[rstest]
    fn serialize_uses_contract_keys() {
        let json = serde_json::to_value(sample_student()).expect("student should serialise");

        assert_eq!(json["name"], "Alice");
        assert_eq!(json["age"], 20);
        assert_eq!(json["email"], "alice@x.com");
        assert_eq!(json["student_id"], "S1");
        assert_eq!(json["registered_courses"][0], "C1");
    }

    #[rstest]
    fn round_trip_reconstructs_every_field() {
        let student = sample_student();
        let json = serde_json::to_string(&student).expect("student should serialise");
        let restored: Student = serde_json::from_str(&json).expect("student should deserialise");

        assert_eq!(restored, student);
    }

    #[rstest]
    #[case::missing_key(r#"{"name":"Alice","age":20,"email":"alice@x.com"}"#)]
    #[case::invalid_email(
        r#"{"name":"Alice","age":20,"email":"nope","student_id":"S1","registered_courses":[]}"#
    )]
    #[case::negative_age(
        r#"{"name":"Alice","age":-3,"email":"alice@x.com","student_id":"S1","registered_courses":[]}"#
    )]
    #[case::unknown_key(
        r#"{"name":"Alice","age":20,"email":"alice@x.com","student_id":"S1","registered_courses":[],"extra":1}"#
    )]
    fn deserialisation_rejects_malformed_records(#[case] json: &str) {
        let result: Result<Student, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[rstest]
    fn register_course_permits_duplicates() {
        let mut student = sample_student();
        student.register_course(CourseId::new("C1").expect("course id should validate"));

        assert_eq!(student.registered_courses().len(), 2);
    }

    #[rstest]
    fn new_students_share_no_registration_list() {
        let first = Student::try_from_fields("A", 1, "a@x.com", "S1")
            .expect("student should validate");
        let mut second = Student::try_from_fields("B", 2, "b@x.com", "S2")
            .expect("student should validate");
        second.register_course(CourseId::new("C1").expect("course id should validate"));

        assert!(first.registered_courses().is_empty());
        assert_eq!(second.registered_courses().len(), 1);
    }
}
