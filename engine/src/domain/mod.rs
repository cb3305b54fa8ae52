//! Domain types and services for tag transactions.
//!
//! Public surface:
//! - [`TransactionEngine`] runs one [`TransactionRequest`] at a time against
//!   the platform reader behind [`ports::TagReader`].
//! - [`TransactionReport`] carries the settled [`TransactionOutcome`] and the
//!   [`SessionState`] trail.
//! - [`TransactionError`] pairs a [`TransactionErrorKind`] with the message
//!   shown to the holder.
//! - [`AccountCoordinator`] keeps the current account and reload selection.

pub mod account_coordinator;
pub mod error;
pub mod ports;
pub mod session_state;
pub mod transaction;
pub mod transaction_engine;
pub mod verifier;

pub use self::account_coordinator::{AccountCoordinator, CoordinatorError};
pub use self::error::{ErrorCode, StartError, TransactionError, TransactionErrorKind};
pub use self::session_state::SessionState;
pub use self::transaction::{
    CREATE_USER_PROMPT, READ_USER_PROMPT, RELOAD_USER_PROMPT, SuccessKind, TransactionKind,
    TransactionOutcome, TransactionReport, TransactionRequest, TransactionSuccess,
};
pub use self::transaction_engine::{
    RetrySleeper, TokioSleeper, TransactionEngine, TransactionEngineConfig,
    TransactionEnginePorts, TransactionEngineRuntime,
};
pub use self::verifier::verify;
