//! Port and runtime dependency bundles for the transaction engine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{TagReader, TransactionNotifier};

use super::RetrySleeper;

/// Port bundle required by the transaction engine.
pub struct TransactionEnginePorts {
    /// Platform reader adapter.
    pub reader: Arc<dyn TagReader>,
    /// Receiver of settled outcomes.
    pub notifier: Arc<dyn TransactionNotifier>,
}

impl TransactionEnginePorts {
    /// Build a strongly-typed engine port bundle.
    pub fn new(reader: Arc<dyn TagReader>, notifier: Arc<dyn TransactionNotifier>) -> Self {
        Self { reader, notifier }
    }
}

/// Runtime helpers used by the multiple-tag retry.
pub struct TransactionEngineRuntime {
    /// Async sleep implementation.
    pub sleeper: Arc<dyn RetrySleeper>,
}

impl Default for TransactionEngineRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
        }
    }
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
