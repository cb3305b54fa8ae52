//! Test utilities for the engine crate.
//!
//! Shared doubles for unit tests (in `src/`) and integration tests (in
//! `tests/`). Only compiled for tests or with the `test-support` feature.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use account_record::AccountRecord;
use async_trait::async_trait;

use crate::domain::ports::{AccountObserver, TransactionNotifier};
use crate::domain::{RetrySleeper, TransactionError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

type SleepHook = Box<dyn Fn(Duration) + Send + Sync>;

/// Sleeper that returns immediately and remembers every requested delay.
///
/// An optional hook runs on each call, which lets a test change the tag
/// field while the engine is backing off.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
    hook: Option<SleepHook>,
}

impl RecordingSleeper {
    /// Build a sleeper that runs `hook` on each call.
    #[must_use]
    pub fn with_hook(hook: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        Self {
            delays: Mutex::new(Vec::new()),
            hook: Some(Box::new(hook)),
        }
    }

    /// Delays requested so far, in order.
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        lock(&self.delays).clone()
    }
}

#[async_trait]
impl RetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.delays).push(duration);
        if let Some(hook) = &self.hook {
            hook(duration);
        }
    }
}

/// One call observed by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierEvent {
    /// `record_read` was called.
    RecordRead(AccountRecord),
    /// `reload_completed` was called.
    ReloadCompleted(AccountRecord),
    /// `transaction_failed` was called.
    TransactionFailed(TransactionError),
    /// `no_record_found` was called.
    NoRecordFound,
}

/// Notifier that records every callback in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotifierEvent>>,
}

impl RecordingNotifier {
    /// Callbacks received so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<NotifierEvent> {
        lock(&self.events).clone()
    }

    fn push(&self, event: NotifierEvent) {
        lock(&self.events).push(event);
    }
}

impl TransactionNotifier for RecordingNotifier {
    fn record_read(&self, record: &AccountRecord) {
        self.push(NotifierEvent::RecordRead(record.clone()));
    }

    fn reload_completed(&self, record: &AccountRecord) {
        self.push(NotifierEvent::ReloadCompleted(record.clone()));
    }

    fn transaction_failed(&self, error: &TransactionError) {
        self.push(NotifierEvent::TransactionFailed(error.clone()));
    }

    fn no_record_found(&self) {
        self.push(NotifierEvent::NoRecordFound);
    }
}

/// One call observed by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    /// `user_updated` was called.
    UserUpdated(AccountRecord),
    /// `payment_success` was called.
    PaymentSuccess(AccountRecord),
    /// `no_user_found` was called.
    NoUserFound,
}

/// Account observer that records every callback in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    /// Callbacks received so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<ObserverEvent> {
        lock(&self.events).clone()
    }
}

impl AccountObserver for RecordingObserver {
    fn user_updated(&self, record: &AccountRecord) {
        lock(&self.events).push(ObserverEvent::UserUpdated(record.clone()));
    }

    fn payment_success(&self, record: &AccountRecord) {
        lock(&self.events).push(ObserverEvent::PaymentSuccess(record.clone()));
    }

    fn no_user_found(&self) {
        lock(&self.events).push(ObserverEvent::NoUserFound);
    }
}
