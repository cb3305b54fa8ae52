//! Driven port receiving transaction outcomes.
//!
//! The engine calls exactly one outcome method per settled transaction. A
//! cancelled transaction produces no callback. Implementations must not block:
//! calls happen on the engine's task after the reader session is invalidated.

use account_record::AccountRecord;

use crate::domain::TransactionError;

/// Observer for settled tag transactions.
#[cfg_attr(test, mockall::automock)]
pub trait TransactionNotifier: Send + Sync {
    /// A record was read from, or written to, a tag.
    fn record_read(&self, record: &AccountRecord);

    /// A reload finished and `record` now holds the credited balance.
    fn reload_completed(&self, record: &AccountRecord);

    /// The transaction failed with `error`.
    fn transaction_failed(&self, error: &TransactionError);

    /// The tag held no readable account. Follows `transaction_failed`.
    fn no_record_found(&self);
}

/// Notifier that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpTransactionNotifier;

impl TransactionNotifier for NoOpTransactionNotifier {
    fn record_read(&self, _record: &AccountRecord) {}

    fn reload_completed(&self, _record: &AccountRecord) {}

    fn transaction_failed(&self, _error: &TransactionError) {}

    fn no_record_found(&self) {}
}
