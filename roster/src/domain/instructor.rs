//! Instructor entity and identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::course::CourseId;
use super::person::{Person, ValidationError};

/// Natural instructor identifier supplied by the caller (e.g. `"I1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstructorId(String);

impl InstructorId {
    /// Validate and construct an [`InstructorId`] from owned input.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        Self::from_owned(id.into())
    }

    fn from_owned(id: String) -> Result<Self, ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId {
                field: "instructor_id",
            });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for InstructorId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for InstructorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<InstructorId> for String {
    fn from(value: InstructorId) -> Self {
        value.0
    }
}

impl TryFrom<String> for InstructorId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// An instructor record.
///
/// Serialized shape:
/// `{ "name", "age", "email", "instructor_id", "assigned_courses" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "InstructorDto", into = "InstructorDto")]
pub struct Instructor {
    person: Person,
    instructor_id: InstructorId,
    assigned_courses: Vec<CourseId>,
}

impl Instructor {
    /// Build an [`Instructor`] from validated components with no assignments.
    pub const fn new(person: Person, instructor_id: InstructorId) -> Self {
        Self {
            person,
            instructor_id,
            assigned_courses: Vec::new(),
        }
    }

    /// Build an [`Instructor`] including an existing assignment list.
    pub const fn with_assigned_courses(
        person: Person,
        instructor_id: InstructorId,
        assigned_courses: Vec<CourseId>,
    ) -> Self {
        Self {
            person,
            instructor_id,
            assigned_courses,
        }
    }

    /// Fallible constructor running validation on raw field values.
    pub fn try_from_fields(
        name: impl Into<String>,
        age: i32,
        email: impl Into<String>,
        instructor_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let person = Person::try_from_fields(name, age, email)?;
        let instructor_id = InstructorId::new(instructor_id)?;

        Ok(Self::new(person, instructor_id))
    }

    /// Shared identity fields.
    pub const fn person(&self) -> &Person {
        &self.person
    }

    /// Natural identifier.
    pub const fn instructor_id(&self) -> &InstructorId {
        &self.instructor_id
    }

    /// Course ids this instructor teaches, in assignment order.
    pub fn assigned_courses(&self) -> &[CourseId] {
        &self.assigned_courses
    }

    /// Append a course assignment.
    pub fn assign_course(&mut self, course_id: CourseId) {
        self.assigned_courses.push(course_id);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct InstructorDto {
    name: String,
    age: i32,
    email: String,
    instructor_id: String,
    assigned_courses: Vec<String>,
}

impl From<Instructor> for InstructorDto {
    fn from(value: Instructor) -> Self {
        let Instructor {
            person,
            instructor_id,
            assigned_courses,
        } = value;
        Self {
            name: person.name().to_string(),
            age: person.age().value(),
            email: person.email().to_string(),
            instructor_id: instructor_id.into(),
            assigned_courses: assigned_courses.into_iter().map(String::from).collect(),
        }
    }
}

impl TryFrom<InstructorDto> for Instructor {
    type Error = ValidationError;

    fn try_from(value: InstructorDto) -> Result<Self, Self::Error> {
        let InstructorDto {
            name,
            age,
            email,
            instructor_id,
            assigned_courses,
        } = value;

        let person = Person::try_from_fields(name, age, email)?;
        let instructor_id = InstructorId::new(instructor_id)?;
        let assigned_courses = assigned_courses
            .into_iter()
            .map(CourseId::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::with_assigned_courses(
            person,
            instructor_id,
            assigned_courses,
        ))
    }
}
