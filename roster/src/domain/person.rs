//! Shared person value and validated field newtypes.
//!
//! `Student` and `Instructor` both carry the same identity fields; this
//! module defines them once. Every field is a newtype whose constructor
//! rejects malformed input, so an entity holding these types is valid by
//! construction.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by field constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    NegativeAge { value: i32 },
    InvalidEmail { value: String },
    EmptyId { field: &'static str },
    EmptyCourseName,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NegativeAge { value } => {
                write!(f, "invalid age {value}: age must be a non-negative integer")
            }
            Self::InvalidEmail { value } => write!(f, "invalid email format: {value}"),
            Self::EmptyId { field } => write!(f, "{field} must not be empty"),
            Self::EmptyCourseName => write!(f, "course name must not be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A person's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a [`PersonName`] from owned input.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// A person's age in whole years.
///
/// ## Invariants
/// - Never negative. The relational store holds it as `INTEGER`, so the
///   backing representation is `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Age(i32);

impl Age {
    /// Validate and construct an [`Age`].
    pub const fn new(value: i32) -> Result<Self, ValidationError> {
        if value < 0 {
            return Err(ValidationError::NegativeAge { value });
        }
        Ok(Self(value))
    }

    /// The age in whole years.
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Age> for i32 {
    fn from(value: Age) -> Self {
        value.0
    }
}

impl TryFrom<i32> for Age {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[A-Za-z0-9_.+-]+@[A-Za-z0-9-]+\.[A-Za-z0-9-.]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// A validated email address.
///
/// Held privately by [`Person`] but exposed in serialized output under the
/// plain key `email`; there is no hidden representation beyond the accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`] from owned input.
    pub fn new(email: impl Into<String>) -> Result<Self, ValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, ValidationError> {
        if !email_regex().is_match(&email) {
            return Err(ValidationError::InvalidEmail { value: email });
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Identity fields shared by students and instructors.
///
/// ## Invariants
/// - `name` is non-empty once trimmed of whitespace.
/// - `age` is non-negative.
/// - `email` matches the accepted `local@domain` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    name: PersonName,
    age: Age,
    email: EmailAddress,
}

impl Person {
    /// Build a [`Person`] from validated components.
    pub const fn new(name: PersonName, age: Age, email: EmailAddress) -> Self {
        Self { name, age, email }
    }

    /// Fallible constructor running validation on raw field values.
    pub fn try_from_fields(
        name: impl Into<String>,
        age: i32,
        email: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = PersonName::new(name)?;
        let age = Age::new(age)?;
        let email = EmailAddress::new(email)?;

        Ok(Self::new(name, age, email))
    }

    /// Display name.
    pub const fn name(&self) -> &PersonName {
        &self.name
    }

    /// Age in whole years.
    pub const fn age(&self) -> Age {
        self.age
    }

    /// Email address; serialized under the plain key `email`.
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }
}
