use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Occurs when a schema document mixes keys that can never be satisfied together, names an
    /// unknown type, or is otherwise structurally invalid.
    MalformedSchema(String),
    /// Occurs when a schema node names a custom validator that isn't in the validator's
    /// registry.
    UnknownValidator(String),
    /// Occurs when serde serialization or deserialization fails
    SerdeFail(String),
    /// Validation failure, for callers that turned a report into an error.
    FailValidate(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::MalformedSchema(ref err) => write!(f, "Malformed schema: {}", err),
            Error::UnknownValidator(ref name) => {
                write!(f, "Schema uses unknown custom validator {:?}", name)
            }
            Error::SerdeFail(ref msg) => f.write_str(msg),
            Error::FailValidate(ref err) => write!(f, "Failed validation: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl std::convert::From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::SerdeFail(e.to_string())
    }
}
