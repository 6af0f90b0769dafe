use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("primitive kind `{0}` is not registered")]
    UnknownKind(String),
    #[error("cannot assign `{found}` returned by {routine} to a `{expected}` value")]
    TypeMismatch {
        routine: String,
        expected: String,
        found: String,
    },
    #[error("cannot assign multiple values returned by {routine} to a `{kind}` value")]
    ArityMismatch { routine: String, kind: String },
    #[error("routine {0} never closed with a return statement")]
    UnterminatedRoutine(String),
    #[error("block is closed, no further element can be added")]
    ClosedBlock,
    #[error("dependency `{0}` can only be added to the root container")]
    MisplacedDependency(String),
    #[error("unknown condition discriminant `{0}`")]
    UnknownCondition(String),
    #[error("`{0}` values cannot drive a while loop, expected an array or a map")]
    UnsupportedIterable(String),
    #[error("invalid signal name `{0}`")]
    InvalidSignal(String),
    #[error("signal handlers must be routines")]
    InvalidHandler,
    #[error("`{method}` is not a method of `{kind}` values")]
    UnknownMethod { kind: String, method: String },
    #[error("block root is already set")]
    RootAlreadySet,
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = result::Result<T, Error>;

// Convert from eyre::Report to our Error type
impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err.to_string())
    }
}

// Convert from std::io::Error to our Error type
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
