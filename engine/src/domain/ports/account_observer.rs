//! Driving-side observer for the account coordinator.
//!
//! Presentation layers implement this to refresh whatever shows the current
//! account after the coordinator applies a transaction outcome.

use account_record::AccountRecord;

/// Receives account state changes from
/// [`AccountCoordinator`](crate::domain::AccountCoordinator).
#[cfg_attr(test, mockall::automock)]
pub trait AccountObserver: Send + Sync {
    /// The current account changed after a read or create.
    fn user_updated(&self, record: &AccountRecord);

    /// A reload completed and `record` holds the new balance.
    fn payment_success(&self, record: &AccountRecord);

    /// The presented tag carried no readable account.
    fn no_user_found(&self);
}
