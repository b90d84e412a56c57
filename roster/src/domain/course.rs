//! Course entity, identifier, and name newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::instructor::InstructorId;
use super::person::ValidationError;
use super::student::StudentId;

/// Natural course identifier supplied by the caller (e.g. `"C1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseId(String);

impl CourseId {
    /// Validate and construct a [`CourseId`] from owned input.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        Self::from_owned(id.into())
    }

    fn from_owned(id: String) -> Result<Self, ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId { field: "course_id" });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for CourseId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CourseId> for String {
    fn from(value: CourseId) -> Self {
        value.0
    }
}

impl TryFrom<String> for CourseId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human-readable course title. Collisions are permitted; only
/// [`CourseId`] is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseName(String);

impl CourseName {
    /// Validate and construct a [`CourseName`] from owned input.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyCourseName);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for CourseName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CourseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CourseName> for String {
    fn from(value: CourseName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CourseName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// A course record.
///
/// ## Invariants
/// - At most one instructor is assigned at a time.
/// - `enrolled_students` keeps enrollment order.
///
/// Serialized shape:
/// `{ "course_name", "course_id", "instructor_id"?, "enrolled_students" }`,
/// where `instructor_id` is omitted when no instructor is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CourseDto", into = "CourseDto")]
pub struct Course {
    course_id: CourseId,
    course_name: CourseName,
    instructor: Option<InstructorId>,
    enrolled_students: Vec<StudentId>,
}

impl Course {
    /// Build a [`Course`] from validated components with no instructor and
    /// no enrollments.
    pub const fn new(course_id: CourseId, course_name: CourseName) -> Self {
        Self {
            course_id,
            course_name,
            instructor: None,
            enrolled_students: Vec::new(),
        }
    }

    /// Build a [`Course`] from all parts.
    pub const fn with_parts(
        course_id: CourseId,
        course_name: CourseName,
        instructor: Option<InstructorId>,
        enrolled_students: Vec<StudentId>,
    ) -> Self {
        Self {
            course_id,
            course_name,
            instructor,
            enrolled_students,
        }
    }

    /// Fallible constructor running validation on raw field values.
    pub fn try_from_fields(
        course_id: impl Into<String>,
        course_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let course_id = CourseId::new(course_id)?;
        let course_name = CourseName::new(course_name)?;

        Ok(Self::new(course_id, course_name))
    }

    /// Natural identifier.
    pub const fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    /// Course title.
    pub const fn course_name(&self) -> &CourseName {
        &self.course_name
    }

    /// Assigned instructor, if any.
    pub const fn instructor(&self) -> Option<&InstructorId> {
        self.instructor.as_ref()
    }

    /// Set or replace the assigned instructor.
    pub fn assign_instructor(&mut self, instructor: Option<InstructorId>) {
        self.instructor = instructor;
    }

    /// Student ids enrolled in this course, in enrollment order.
    pub fn enrolled_students(&self) -> &[StudentId] {
        &self.enrolled_students
    }

    /// Append an enrolled student.
    pub fn add_student(&mut self, student_id: StudentId) {
        self.enrolled_students.push(student_id);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CourseDto {
    course_name: String,
    course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instructor_id: Option<String>,
    enrolled_students: Vec<String>,
}

impl From<Course> for CourseDto {
    fn from(value: Course) -> Self {
        let Course {
            course_id,
            course_name,
            instructor,
            enrolled_students,
        } = value;
        Self {
            course_name: course_name.into(),
            course_id: course_id.into(),
            instructor_id: instructor.map(String::from),
            enrolled_students: enrolled_students.into_iter().map(String::from).collect(),
        }
    }
}

impl TryFrom<CourseDto> for Course {
    type Error = ValidationError;

    fn try_from(value: CourseDto) -> Result<Self, Self::Error> {
        let CourseDto {
            course_name,
            course_id,
            instructor_id,
            enrolled_students,
        } = value;

        let course_id = CourseId::new(course_id)?;
        let course_name = CourseName::new(course_name)?;
        let instructor = instructor_id.map(InstructorId::new).transpose()?;
        let enrolled_students = enrolled_students
            .into_iter()
            .map(StudentId::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::with_parts(
            course_id,
            course_name,
            instructor,
            enrolled_students,
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    fn sample_course() -> Course {
        Course::try_from_fields("C1", "CS101").expect("course should validate")
    }

    #[rstest]
    fn unassigned_course_omits_instructor_key() {
        let json = serde_json::to_value(sample_course()).expect("course should serialise");

        assert!(json.get("instructor_id").is_none());
        assert_eq!(json["course_name"], "CS101");
        assert_eq!(json["course_id"], "C1");
    }

    #[rstest]
    fn assigned_course_round_trips() {
        let mut course = sample_course();
        course.assign_instructor(Some(
            InstructorId::new("I1").expect("instructor id should validate"),
        ));
        course.add_student(StudentId::new("S1").expect("student id should validate"));

        let json = serde_json::to_string(&course).expect("course should serialise");
        let restored: Course = serde_json::from_str(&json).expect("course should deserialise");

        assert_eq!(restored, course);
    }

    #[rstest]
    fn assign_instructor_replaces_existing() {
        let mut course = sample_course();
        course.assign_instructor(Some(
            InstructorId::new("I1").expect("instructor id should validate"),
        ));
        course.assign_instructor(Some(
            InstructorId::new("I2").expect("instructor id should validate"),
        ));

        assert_eq!(course.instructor().map(AsRef::as_ref), Some("I2"));
    }

    #[rstest]
    #[case::missing_name(r#"{"course_id":"C1","enrolled_students":[]}"#)]
    #[case::empty_id(r#"{"course_name":"CS101","course_id":"","enrolled_students":[]}"#)]
    fn deserialisation_rejects_malformed_records(#[case] json: &str) {
        let result: Result<Course, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
