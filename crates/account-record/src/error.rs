//! Error types for the account-record crate.
//!
//! Decoding never fails loudly (malformed payloads decode to `None`), so the
//! only errors here cover encoding and reload amount construction.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while serializing an account record for a tag.
///
/// The record schema holds only strings, a decimal, and an integer, so this
/// is not expected in practice. Callers treat it as a fatal internal fault
/// rather than a transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The JSON serializer rejected the record.
    #[error("failed to encode account record: {message}")]
    Serialization {
        /// Description of the serializer failure.
        message: String,
    },
}

/// Errors raised when building a [`crate::ReloadAmount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReloadAmountError {
    /// Reload amounts only ever add funds.
    #[error("reload amount must not be negative, got {value}")]
    Negative {
        /// The rejected value.
        value: Decimal,
    },
    /// The text could not be parsed as a decimal amount.
    #[error("invalid reload amount '{input}'")]
    Invalid {
        /// The rejected input.
        input: String,
    },
}
