//! Transaction failure taxonomy.
//!
//! Every failed transaction settles with exactly one [`TransactionError`]: a
//! [`TransactionErrorKind`] from a closed set plus the message shown to the
//! holder when the reader session is invalidated.

use thiserror::Error;

use crate::domain::ports::TagTransportError;

/// Stable identifier for a failure category, free of any payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Reading is not available on this device.
    Unavailable,
    /// The reader failed while waiting for a tag.
    ReadFailure,
    /// A tag answered with no data.
    NoDataFound,
    /// The tag carried no readable account.
    UserNotFound,
    /// A transport call to the tag failed.
    TagFault,
    /// The tag reported a capability status the engine does not know.
    Unknown,
    /// The tag does not speak the record format.
    TagNotCompliant,
    /// The tag cannot be written.
    TagReadOnly,
    /// A discovery event reported no tags.
    NoTagsFound,
    /// The tag holds a different account than the one being reloaded.
    VerifyUser,
    /// The engine could not build the data it needed to write.
    Internal,
}

impl ErrorCode {
    /// Snake-case label used in structured logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::ReadFailure => "read_failure",
            Self::NoDataFound => "no_data_found",
            Self::UserNotFound => "user_not_found",
            Self::TagFault => "tag_fault",
            Self::Unknown => "unknown",
            Self::TagNotCompliant => "tag_not_compliant",
            Self::TagReadOnly => "tag_read_only",
            Self::NoTagsFound => "no_tags_found",
            Self::VerifyUser => "verify_user",
            Self::Internal => "internal",
        }
    }
}

/// Why a transaction failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionErrorKind {
    /// Reading is not available on this device.
    #[error("tag reading is unavailable")]
    Unavailable,
    /// The reader failed while waiting for a tag.
    #[error("the tag reader failed to read")]
    ReadFailure,
    /// A tag answered with no data.
    #[error("the tag has no data")]
    NoDataFound,
    /// The tag carried no readable account.
    #[error("no account found on the tag")]
    UserNotFound,
    /// A transport call to the tag failed.
    #[error("tag transport failed: {0}")]
    TagFault(#[source] TagTransportError),
    /// The tag reported a capability status the engine does not know.
    #[error("unrecognised tag status")]
    Unknown,
    /// The tag does not speak the record format.
    #[error("the tag is not NDEF compliant")]
    TagNotCompliant,
    /// The tag cannot be written.
    #[error("the tag is read only")]
    TagReadOnly,
    /// A discovery event reported no tags.
    #[error("no tags found")]
    NoTagsFound,
    /// The tag holds a different account than the one being reloaded.
    #[error("the tag holds a different account")]
    VerifyUser,
    /// The engine could not build the data it needed to write.
    #[error("internal engine fault: {0}")]
    Internal(String),
}

impl TransactionErrorKind {
    /// Stable identifier for this kind.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unavailable => ErrorCode::Unavailable,
            Self::ReadFailure => ErrorCode::ReadFailure,
            Self::NoDataFound => ErrorCode::NoDataFound,
            Self::UserNotFound => ErrorCode::UserNotFound,
            Self::TagFault(_) => ErrorCode::TagFault,
            Self::Unknown => ErrorCode::Unknown,
            Self::TagNotCompliant => ErrorCode::TagNotCompliant,
            Self::TagReadOnly => ErrorCode::TagReadOnly,
            Self::NoTagsFound => ErrorCode::NoTagsFound,
            Self::VerifyUser => ErrorCode::VerifyUser,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }
}

/// Failure outcome of one transaction.
///
/// # Examples
/// ```
/// use tag_engine::domain::{ErrorCode, TransactionError, TransactionErrorKind};
///
/// let err = TransactionError::new(TransactionErrorKind::VerifyUser, "Failed to verify user");
/// assert_eq!(err.code(), ErrorCode::VerifyUser);
/// assert_eq!(err.message(), "Failed to verify user");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransactionError {
    #[source]
    kind: TransactionErrorKind,
    message: String,
}

impl TransactionError {
    /// Pair a failure kind with the message shown to the holder.
    pub fn new(kind: TransactionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> &TransactionErrorKind {
        &self.kind
    }

    /// Stable identifier for the failure category.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    /// Message shown to the holder.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Reasons the engine refuses to start a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    /// Another transaction still owns the engine.
    #[error("a tag transaction is already in progress")]
    TransactionInProgress,
    /// The engine's transaction slot could not be locked.
    #[error("transaction state unavailable: {message}")]
    StateUnavailable {
        /// Lock failure detail.
        message: String,
    },
}
