//! Error handling design (§7): a closed, disjoint set of error kinds, each
//! wrapped in an [`Error`] that carries a path-qualified message so a
//! caller several layers removed from the failure can still locate it.

use std::io;

use thiserror::Error;

/// The eight disjoint error kinds from §7.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("invalid input")]
    InvalidInput,

    #[error("not found")]
    NotFound,

    #[error("denied")]
    Denied,

    #[error("collision")]
    Collision,

    #[error("reference error")]
    ReferenceError,

    #[error("cycle")]
    Cycle,

    #[error("system error")]
    System,

    #[error("internal error")]
    Internal,
}

/// A [`ErrorKind`] plus an optional path-qualified message and an optional
/// underlying cause, per §7's "return the first error to their caller along
/// with a path-qualified message".
#[derive(Error, Debug)]
#[error("{kind}{}", path.as_deref().map(|p| format!(" at {p}")).unwrap_or_default())]
pub struct Error {
    pub kind: ErrorKind,
    pub path: Option<String>,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Error {
            kind,
            path: None,
            source: None,
        }
    }

    pub fn with_path(kind: ErrorKind, path: impl Into<String>) -> Self {
        Error {
            kind,
            path: Some(path.into()),
            source: None,
        }
    }

    pub fn with_source(
        kind: ErrorKind,
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error {
            kind,
            path: Some(path.into()),
            source: Some(Box::new(source)),
        }
    }

    pub fn is_kind(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error {
            kind: ErrorKind::System,
            path: None,
            source: Some(Box::new(err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
