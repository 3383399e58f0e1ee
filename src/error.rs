//! Error reporting for kinematic operations.
//!
//! Every fallible operation in this crate returns a [`KinematicsError`]. Operations that are
//! built on top of simpler operations wrap the inner error instead of replacing it, so that
//! the full causal chain can be inspected with [`KinematicsError::chain`] or with any tool
//! that follows [`std::error::Error::source`].
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// The category of a [`KinematicsError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A tensor has the wrong length, a length that is not a perfect square, or tensors that
    /// must share a dimension disagree.
    Shape,
    /// A well-shaped input outside the domain of the operation, e.g. a singular matrix.
    Domain,
    /// A control parameter is out of range.
    Parameter,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Shape => write!(f, "shape error"),
            ErrorKind::Domain => write!(f, "domain error"),
            ErrorKind::Parameter => write!(f, "parameter error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KinematicsError {
    kind: ErrorKind,
    operation: &'static str,
    message: String,
    cause: Option<Box<KinematicsError>>,
}

pub type Result<T> = std::result::Result<T, KinematicsError>;

impl KinematicsError {
    pub fn new(kind: ErrorKind, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation,
            message: message.into(),
            cause: None,
        }
    }

    pub fn shape(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Shape, operation, message)
    }

    pub fn domain(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, operation, message)
    }

    pub fn parameter(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parameter, operation, message)
    }

    /// Wraps this error in a new error record attributed to `operation`.
    ///
    /// The returned error has the same [`kind`](Self::kind) as the root cause.
    pub fn wrap(self, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: self.kind,
            operation,
            message: message.into(),
            cause: Some(Box::new(self)),
        }
    }

    /// The kind of the root cause of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The name of the operation that reported this record.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The record directly wrapped by this one, if any.
    pub fn cause(&self) -> Option<&KinematicsError> {
        self.cause.as_deref()
    }

    /// Iterates over the records of the chain, starting with this one and ending with the
    /// root cause.
    pub fn chain(&self) -> impl Iterator<Item = &KinematicsError> {
        std::iter::successors(Some(self), |error| error.cause.as_deref())
    }

    /// The innermost record of the chain.
    pub fn root_cause(&self) -> &KinematicsError {
        // The chain always contains at least `self`
        self.chain().last().unwrap_or(self)
    }
}

/// Displays the outermost record. The alternate form `{:#}` displays the entire chain,
/// one record per line.
impl Display for KinematicsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)?;
        if f.alternate() {
            for cause in self.chain().skip(1) {
                write!(f, "\n  caused by {}: {}", cause.operation, cause.message)?;
            }
        }
        Ok(())
    }
}

impl Error for KinematicsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

/// Convenience for wrapping the error of a fallible inner operation.
pub(crate) trait WrapError<T> {
    fn wrap_error(self, operation: &'static str, message: &str) -> Result<T>;
}

impl<T> WrapError<T> for Result<T> {
    fn wrap_error(self, operation: &'static str, message: &str) -> Result<T> {
        self.map_err(|error| error.wrap(operation, message))
    }
}
