//! Validation outcomes.
//!
//! A failed check is not an error: it is a [`Failure`] collected into a [`Report`], with the
//! path to the offending value and the reason it was rejected. A report can be turned into an
//! [`Error::FailValidate`] with [`Report::into_result`] when `?` is more convenient.

use crate::error::{Error, Result};
use std::fmt;

/// One step into a value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A property or dict key.
    Field(String),
    /// A position in a list or host sequence.
    Index(usize),
}

impl From<&str> for Segment {
    fn from(v: &str) -> Self {
        Segment::Field(v.to_string())
    }
}

impl From<String> for Segment {
    fn from(v: String) -> Self {
        Segment::Field(v)
    }
}

impl From<usize> for Segment {
    fn from(v: usize) -> Self {
        Segment::Index(v)
    }
}

/// Where a failure happened, from the candidate's root. Displayed as `figure.data[1]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(pub Vec<Segment>);

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// This path, nested under `prefix`.
    pub fn under(mut self, prefix: &Path) -> Self {
        let mut segments = prefix.0.clone();
        segments.append(&mut self.0);
        Path(segments)
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl<S: Into<Segment>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// Why a value was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    /// Null, where the node is not nullable.
    NotNullable,
    /// The value is not of the expected kind.
    WrongType { expected: String, found: String },
    /// None of the `anyof` alternatives passed.
    NoAlternative { tried: usize },
    /// The value equals none of the allowed literals.
    NotAllowed,
    /// A top-level property with no node, where the schema forbids unknown properties.
    UnknownProperty,
    /// A dict key with no node, where the dict forbids unknown fields.
    UnknownField,
    /// A required property is missing or null.
    Required,
    /// A custom validator rejected the value, with its message.
    Custom(String),
    /// The value contains itself.
    Cycle,
    /// A component in a layout whose type has no registered validator.
    UnregisteredComponent(String),
    /// A component in a layout reuses an `id` seen earlier.
    DuplicateId(String),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::NotNullable => f.write_str("null is not allowed"),
            Reason::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            Reason::NoAlternative { tried } => {
                write!(f, "none of {} alternatives matched", tried)
            }
            Reason::NotAllowed => f.write_str("not one of the allowed values"),
            Reason::UnknownProperty => f.write_str("unknown property"),
            Reason::UnknownField => f.write_str("unknown field"),
            Reason::Required => f.write_str("required property is missing"),
            Reason::Custom(msg) => f.write_str(msg),
            Reason::Cycle => f.write_str("value contains itself"),
            Reason::UnregisteredComponent(ty) => {
                write!(f, "no validator registered for component type {}", ty)
            }
            Reason::DuplicateId(id) => write!(f, "duplicate component id {:?}", id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub path: Path,
    pub reason: Reason,
}

impl Failure {
    pub fn new(path: Path, reason: Reason) -> Self {
        Self { path, reason }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// The outcome of validating one candidate. Empty means valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    failures: Vec<Failure>,
}

impl Report {
    pub fn new(failures: Vec<Failure>) -> Self {
        Self { failures }
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }

    /// Failures whose path starts with the given top-level property.
    pub fn for_prop<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Failure> + 'a {
        self.failures.iter().filter(move |f| {
            matches!(f.path.segments().first(), Some(Segment::Field(n)) if n == name)
        })
    }

    /// `Ok(())` if valid, otherwise every failure joined into one [`Error::FailValidate`].
    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::FailValidate(self.to_string()))
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return f.write_str("valid");
        }
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            fmt::Display::fmt(failure, f)?;
        }
        Ok(())
    }
}
