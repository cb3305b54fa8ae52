//! Cancellation signal observed at every suspension point.

use std::future::Future;

use tokio::sync::watch;

use crate::domain::{TransactionError, TransactionErrorKind};

/// Why a transaction stopped short of success.
#[derive(Debug)]
pub(super) enum Interrupt {
    Failed(TransactionError),
    Cancelled,
}

impl Interrupt {
    pub(super) fn failed(kind: TransactionErrorKind, message: impl Into<String>) -> Self {
        Self::Failed(TransactionError::new(kind, message))
    }
}

/// Receiving half of the active transaction's cancel flag.
pub(super) struct CancelSignal {
    receiver: watch::Receiver<bool>,
}

impl CancelSignal {
    pub(super) const fn new(receiver: watch::Receiver<bool>) -> Self {
        Self { receiver }
    }

    /// Await `operation` unless cancellation is requested first.
    ///
    /// A flag raised before the call is honoured without polling `operation`.
    pub(super) async fn guard<F>(&mut self, operation: F) -> Result<F::Output, Interrupt>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            () = requested(&mut self.receiver) => Err(Interrupt::Cancelled),
            output = operation => Ok(output),
        }
    }
}

async fn requested(receiver: &mut watch::Receiver<bool>) {
    let closed = receiver.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
        // The sender lives in the active slot; once it is gone nobody can cancel.
        std::future::pending::<()>().await;
    }
}
