//! Transaction requests and their settled outcomes.

use std::fmt;

use account_record::{AccountRecord, ReloadAmount};

use crate::domain::{SessionState, TransactionError};

/// Prompt shown while a create transaction waits for a tag.
pub const CREATE_USER_PROMPT: &str =
    "Hold your device near the tag to reload your account with additional funds.";
/// Prompt shown while a read transaction waits for a tag.
pub const READ_USER_PROMPT: &str = "Hold your device near a tag to setup new user.";
/// Prompt shown while a reload transaction waits for a tag.
pub const RELOAD_USER_PROMPT: &str = "Hold your device near a tag to read account data.";

/// One unit of work against a single tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionRequest {
    /// Write `record` to a blank or reusable tag.
    CreateUser {
        /// Record to write.
        record: AccountRecord,
    },
    /// Read the record stored on the tag.
    ReadUser,
    /// Credit `amount` to the record on the tag, which must match `record`.
    ReloadUser {
        /// Account the caller expects to find on the tag.
        record: AccountRecord,
        /// Amount to add to the stored balance.
        amount: ReloadAmount,
    },
}

impl TransactionRequest {
    /// Text surfaced to the holder while the reader polls.
    ///
    /// The pairing between variants and prompts is fixed and deliberately
    /// does not follow the variant names.
    #[must_use]
    pub const fn prompt(&self) -> &'static str {
        match self {
            Self::CreateUser { .. } => CREATE_USER_PROMPT,
            Self::ReadUser => READ_USER_PROMPT,
            Self::ReloadUser { .. } => RELOAD_USER_PROMPT,
        }
    }

    /// Variant tag without the payload.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        match self {
            Self::CreateUser { .. } => TransactionKind::CreateUser,
            Self::ReadUser => TransactionKind::ReadUser,
            Self::ReloadUser { .. } => TransactionKind::ReloadUser,
        }
    }
}

/// Payload-free label for a [`TransactionRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// See [`TransactionRequest::CreateUser`].
    CreateUser,
    /// See [`TransactionRequest::ReadUser`].
    ReadUser,
    /// See [`TransactionRequest::ReloadUser`].
    ReloadUser,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CreateUser => "create_user",
            Self::ReadUser => "read_user",
            Self::ReloadUser => "reload_user",
        };
        f.write_str(label)
    }
}

/// What a successful transaction did to the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessKind {
    /// A new record was written.
    RecordWritten,
    /// The stored record was read.
    RecordRead,
    /// The stored record was credited and written back.
    ReloadCompleted,
}

/// Success payload of a settled transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSuccess {
    /// What happened.
    pub kind: SuccessKind,
    /// Record now stored on the tag.
    pub record: AccountRecord,
    /// Message left on the reader surface.
    pub message: String,
}

/// How a transaction settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// The step sequence completed.
    Succeeded(TransactionSuccess),
    /// The transaction stopped with a classified error.
    Failed(TransactionError),
    /// The transaction was cancelled before it settled.
    Cancelled,
}

/// Result of [`TransactionEngine::execute`](crate::domain::TransactionEngine::execute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReport {
    /// Settled outcome.
    pub outcome: TransactionOutcome,
    /// Session states visited, in order, starting at [`SessionState::Idle`].
    pub trail: Vec<SessionState>,
}

impl TransactionReport {
    /// Success payload, if the transaction succeeded.
    #[must_use]
    pub const fn success(&self) -> Option<&TransactionSuccess> {
        match &self.outcome {
            TransactionOutcome::Succeeded(success) => Some(success),
            _ => None,
        }
    }

    /// Failure, if the transaction failed.
    #[must_use]
    pub const fn error(&self) -> Option<&TransactionError> {
        match &self.outcome {
            TransactionOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Whether the transaction was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.outcome, TransactionOutcome::Cancelled)
    }
}
