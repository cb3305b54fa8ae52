//! Domain ports for the tag reader and the observers of transaction outcomes.

mod macros;
pub(crate) use macros::define_port_error;

mod account_observer;
mod reader_session;
mod transaction_notifier;

#[cfg(test)]
pub use account_observer::MockAccountObserver;
pub use account_observer::AccountObserver;
#[cfg(test)]
pub use reader_session::{MockReaderSession, MockTagReader};
pub use reader_session::{
    ReaderSession, ReaderSessionError, SessionInvalidation, TagHandle, TagReader, TagStatus,
    TagTransportError,
};
#[cfg(test)]
pub use transaction_notifier::MockTransactionNotifier;
pub use transaction_notifier::{NoOpTransactionNotifier, TransactionNotifier};
