//! Adapter that reports transaction outcomes and account changes as tracing
//! events.

use account_record::AccountRecord;
use tracing::{info, warn};

use crate::domain::TransactionError;
use crate::domain::ports::{AccountObserver, TransactionNotifier};

/// Writes each settled outcome and account change to the active `tracing`
/// subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl TransactionNotifier for TracingNotifier {
    fn record_read(&self, record: &AccountRecord) {
        info!(
            account_id = record.id,
            holder = %record.display_name(),
            funds = %record.funds_available(),
            "account record read"
        );
    }

    fn reload_completed(&self, record: &AccountRecord) {
        info!(
            account_id = record.id,
            funds = %record.funds_available(),
            "account reload completed"
        );
    }

    fn transaction_failed(&self, error: &TransactionError) {
        warn!(
            code = error.code().as_str(),
            reason = %error.kind(),
            message = error.message(),
            "tag transaction failed"
        );
    }

    fn no_record_found(&self) {
        info!("tag holds no account record");
    }
}

impl AccountObserver for TracingNotifier {
    fn user_updated(&self, record: &AccountRecord) {
        info!(
            account_id = record.id,
            funds = %record.funds_available(),
            "current account updated"
        );
    }

    fn payment_success(&self, record: &AccountRecord) {
        info!(
            account_id = record.id,
            funds = %record.funds_available(),
            "payment processed"
        );
    }

    fn no_user_found(&self) {
        info!("no account found, a demo account can be written to this tag");
    }
}
