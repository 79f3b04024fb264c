//! Error taxonomy shared by every range type.
//!
//! - **`RangeErrorKind`**: flat, `Copy` discriminant for matching in callers/tests
//! - **`GatewayError`**  : what a remote gateway reports for a failed round trip
//! - **`RangeError`**    : the error every public operation returns
//!
//! Validation errors are raised before any state changes. Gateway failures are
//! wrapped once and never retried here.

use thiserror::Error;

/// Flat classification of [`RangeError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RangeErrorKind {
    IncorrectCellLabel,
    InvalidArgumentValue,
    InvalidRange,
    CellNotFound,
    NoPermission,
    DuplicateNamedRange,
    RequestError,
    NotRegistered,
    AlreadyRegistered,
    Deleted,
}

/// Failure reported by a remote gateway implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request never produced a response (connection, timeout, ...).
    #[error("transport failure: {0}")]
    Transport(String),
    /// The remote answered with an error status.
    #[error("remote rejected request ({code}): {message}")]
    Api { code: u16, message: String },
    /// The remote refused to create an entity whose unique key is taken.
    #[error("remote entity already exists: {0}")]
    AlreadyExists(String),
    /// A reply arrived but did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("not a valid cell label: `{label}`")]
    IncorrectCellLabel { label: String },

    #[error("invalid argument: {0}")]
    InvalidArgumentValue(String),

    #[error("invalid range `{label}`: end must not precede start")]
    InvalidRange { label: String },

    #[error("no row/column at index {index} (window holds {len})")]
    CellNotFound { index: usize, len: usize },

    #[error("requesting user cannot edit this protected range")]
    NoPermission,

    #[error("a named range called `{name}` already exists")]
    DuplicateNamedRange { name: String },

    #[error("request failed: {0}")]
    Request(#[from] GatewayError),

    #[error("{entity} is not registered with the remote")]
    NotRegistered { entity: &'static str },

    #[error("{entity} is already registered as `{id}`")]
    AlreadyRegistered { entity: &'static str, id: String },

    #[error("{entity} has been deleted")]
    Deleted { entity: &'static str },
}

impl RangeError {
    pub fn kind(&self) -> RangeErrorKind {
        match self {
            RangeError::IncorrectCellLabel { .. } => RangeErrorKind::IncorrectCellLabel,
            RangeError::InvalidArgumentValue(_) => RangeErrorKind::InvalidArgumentValue,
            RangeError::InvalidRange { .. } => RangeErrorKind::InvalidRange,
            RangeError::CellNotFound { .. } => RangeErrorKind::CellNotFound,
            RangeError::NoPermission => RangeErrorKind::NoPermission,
            RangeError::DuplicateNamedRange { .. } => RangeErrorKind::DuplicateNamedRange,
            RangeError::Request(_) => RangeErrorKind::RequestError,
            RangeError::NotRegistered { .. } => RangeErrorKind::NotRegistered,
            RangeError::AlreadyRegistered { .. } => RangeErrorKind::AlreadyRegistered,
            RangeError::Deleted { .. } => RangeErrorKind::Deleted,
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        RangeError::InvalidArgumentValue(msg.into())
    }

    /// Map a gateway failure from a create/rename call on a named range,
    /// surfacing name collisions as [`RangeError::DuplicateNamedRange`].
    pub fn from_named_range_failure(err: GatewayError, name: &str) -> Self {
        match err {
            GatewayError::AlreadyExists(_) => RangeError::DuplicateNamedRange {
                name: name.to_string(),
            },
            other => RangeError::Request(other),
        }
    }
}
