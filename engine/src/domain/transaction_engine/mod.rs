//! Session controller for tag transactions.
//!
//! The engine runs one transaction at a time as an explicit state machine:
//! open a reader session, wait for exactly one tag, connect, check that the
//! tag is writable, run the request's step sequence, then finalize. Every
//! path, including cancellation, finalizes through the same code so the
//! session is invalidated exactly once and the active slot is always freed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    ReaderSession, ReaderSessionError, SessionInvalidation, TagHandle, TagReader, TagStatus,
    TransactionNotifier,
};
use crate::domain::{
    SessionState, StartError, SuccessKind, TransactionErrorKind, TransactionKind,
    TransactionOutcome, TransactionReport, TransactionRequest, TransactionSuccess,
};

mod cancellation;
mod runtime;
mod steps;

use cancellation::{CancelSignal, Interrupt};
pub use runtime::{TokioSleeper, TransactionEnginePorts, TransactionEngineRuntime};
pub use steps::{
    CREATE_FAILED_MESSAGE, RELOAD_COMPLETED_MESSAGE, RELOAD_WRITE_FAILED_MESSAGE,
    USER_NOT_FOUND_MESSAGE, VERIFY_FAILED_MESSAGE,
};

/// Alert shown while more than one tag is in the field.
pub const MULTIPLE_TAGS_ALERT: &str =
    "More than 1 tag is detected. Please remove all tags and try again.";
/// Session message when a discovery event reports no tags.
pub const NO_TAGS_MESSAGE: &str = "No tags found, try again";
/// Session message when connecting to the tag fails.
pub const CONNECT_FAILED_MESSAGE: &str = "Unable to connect to tag.";
/// Session message for tags that do not speak the record format.
pub const NOT_COMPLIANT_MESSAGE: &str = "Tag is not NDEF compliant.";
/// Session message for read-only tags.
pub const READ_ONLY_MESSAGE: &str = "Tag is read only";
/// Session message for unrecognised capability statuses.
pub const UNKNOWN_STATUS_MESSAGE: &str = "Unknown NDEF tag status.";
/// Session message when the capability query fails.
pub const QUERY_FAILED_MESSAGE: &str = "Unable to query the NDEF status of tag.";
/// Message when no reader session can be opened.
pub const UNAVAILABLE_MESSAGE: &str = "Tag reading is not available on this device.";
/// Session message when the platform ends discovery with an error.
pub const READ_FAILURE_MESSAGE: &str = "The tag reader stopped before a tag was read.";
/// Session message after a cancellation.
pub const CANCELLED_MESSAGE: &str = "Transaction cancelled.";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEngineConfig {
    /// Pause before polling restarts after several tags were detected.
    pub multi_tag_retry_delay: Duration,
}

impl Default for TransactionEngineConfig {
    fn default() -> Self {
        Self {
            multi_tag_retry_delay: Duration::from_millis(500),
        }
    }
}

/// Async clock-independent sleeping abstraction for the multiple-tag retry.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

struct ActiveTransaction {
    id: u64,
    kind: TransactionKind,
    cancel: watch::Sender<bool>,
}

/// Domain-owned tag transaction engine.
pub struct TransactionEngine {
    reader: Arc<dyn TagReader>,
    notifier: Arc<dyn TransactionNotifier>,
    sleeper: Arc<dyn RetrySleeper>,
    config: TransactionEngineConfig,
    active: Mutex<Option<ActiveTransaction>>,
    next_id: AtomicU64,
}

impl TransactionEngine {
    /// Build an engine using default runtime dependencies.
    #[must_use]
    pub fn new(ports: TransactionEnginePorts, config: TransactionEngineConfig) -> Self {
        Self::with_runtime(ports, TransactionEngineRuntime::default(), config)
    }

    /// Build an engine with injected runtime abstractions.
    #[must_use]
    pub fn with_runtime(
        ports: TransactionEnginePorts,
        runtime: TransactionEngineRuntime,
        config: TransactionEngineConfig,
    ) -> Self {
        Self {
            reader: ports.reader,
            notifier: ports.notifier,
            sleeper: runtime.sleeper,
            config,
            active: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Run `request` to completion against the next tag presented.
    ///
    /// The returned report carries the outcome and the states visited. The
    /// notifier has already been called by the time this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StartError::TransactionInProgress`] without touching the
    /// reader when another transaction is active, and
    /// [`StartError::StateUnavailable`] when the active slot is poisoned.
    pub async fn execute(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionReport, StartError> {
        let kind = request.kind();
        let (slot, mut cancel) = self.claim(kind)?;
        let mut session = OpenSession::default();
        let mut run = TransactionRun::new(slot.id, kind);
        info!(transaction = run.id, kind = %kind, "tag transaction started");

        let settled = self
            .drive(&mut run, request, &mut session, &mut cancel)
            .await;
        Ok(self.finalize(run, slot, session, settled).await)
    }

    /// Ask the active transaction to stop at its next suspension point.
    ///
    /// Returns `false` when nothing is active.
    #[must_use]
    pub fn cancel(&self) -> bool {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(current) = active.as_ref() else {
            debug!("cancel requested with no active transaction");
            return false;
        };
        current.cancel.send_replace(true);
        info!(
            transaction = current.id,
            kind = %current.kind,
            "tag transaction cancellation requested"
        );
        true
    }

    /// Whether a transaction currently owns the engine.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn claim(&self, kind: TransactionKind) -> Result<(ActiveSlot<'_>, CancelSignal), StartError> {
        let mut active = self
            .active
            .lock()
            .map_err(|err| StartError::StateUnavailable {
                message: err.to_string(),
            })?;
        if let Some(current) = active.as_ref() {
            warn!(
                active_transaction = current.id,
                active_kind = %current.kind,
                requested = %kind,
                "rejected tag transaction while another is active"
            );
            return Err(StartError::TransactionInProgress);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = watch::channel(false);
        *active = Some(ActiveTransaction {
            id,
            kind,
            cancel: sender,
        });
        Ok((
            ActiveSlot {
                active: &self.active,
                id,
                settled: false,
            },
            CancelSignal::new(receiver),
        ))
    }

    async fn drive(
        &self,
        run: &mut TransactionRun,
        request: &TransactionRequest,
        held: &mut OpenSession,
        cancel: &mut CancelSignal,
    ) -> Result<TransactionSuccess, Interrupt> {
        let opened = match cancel.guard(self.reader.open(request.prompt())).await {
            Ok(Ok(opened)) => opened,
            Ok(Err(ReaderSessionError::UserCancelled)) => return Err(Interrupt::Cancelled),
            Ok(Err(err)) => {
                warn!(transaction = run.id, error = %err, "reader session could not be opened");
                return Err(Interrupt::failed(
                    TransactionErrorKind::Unavailable,
                    UNAVAILABLE_MESSAGE,
                ));
            }
            Err(interrupt) => return Err(interrupt),
        };

        let session = held.hold(opened);
        run.enter(SessionState::Discovering);
        self.run_session(run, session, request, cancel).await
    }

    async fn run_session(
        &self,
        run: &mut TransactionRun,
        session: &dyn ReaderSession,
        request: &TransactionRequest,
        cancel: &mut CancelSignal,
    ) -> Result<TransactionSuccess, Interrupt> {
        let tag = self.discover_single_tag(run, session, cancel).await?;

        run.enter(SessionState::Connecting);
        cancel.guard(session.connect(tag)).await?.map_err(|err| {
            Interrupt::failed(TransactionErrorKind::TagFault(err), CONNECT_FAILED_MESSAGE)
        })?;

        run.enter(SessionState::QueryingCapability);
        let status = cancel.guard(session.query_status(tag)).await?.map_err(|err| {
            Interrupt::failed(TransactionErrorKind::TagFault(err), QUERY_FAILED_MESSAGE)
        })?;
        require_read_write(status)?;

        run.enter(SessionState::Executing);
        steps::execute(session, tag, request, cancel).await
    }

    async fn discover_single_tag(
        &self,
        run: &mut TransactionRun,
        session: &dyn ReaderSession,
        cancel: &mut CancelSignal,
    ) -> Result<TagHandle, Interrupt> {
        loop {
            let tags = cancel
                .guard(session.discover())
                .await?
                .map_err(|err| discovery_interrupt(&err))?;
            match tags.as_slice() {
                [] => {
                    return Err(Interrupt::failed(
                        TransactionErrorKind::NoTagsFound,
                        NO_TAGS_MESSAGE,
                    ));
                }
                [tag] => return Ok(*tag),
                _ => {
                    warn!(
                        transaction = run.id,
                        tag_count = tags.len(),
                        "multiple tags detected, restarting discovery"
                    );
                    session.alert(MULTIPLE_TAGS_ALERT).await;
                    cancel
                        .guard(self.sleeper.sleep(self.config.multi_tag_retry_delay))
                        .await?;
                    session.restart_polling().await;
                    run.enter(SessionState::Discovering);
                }
            }
        }
    }

    async fn finalize(
        &self,
        mut run: TransactionRun,
        slot: ActiveSlot<'_>,
        session: OpenSession,
        settled: Result<TransactionSuccess, Interrupt>,
    ) -> TransactionReport {
        run.enter(SessionState::Finalizing);
        let outcome = match settled {
            Ok(success) => TransactionOutcome::Succeeded(success),
            Err(Interrupt::Failed(error)) => TransactionOutcome::Failed(error),
            Err(Interrupt::Cancelled) => TransactionOutcome::Cancelled,
        };

        session.release(invalidation_for(&outcome)).await;
        slot.release();
        self.notify(&outcome);

        run.enter(SessionState::Terminated);
        log_outcome(run.id, run.kind, &outcome);
        TransactionReport {
            outcome,
            trail: run.trail,
        }
    }

    fn notify(&self, outcome: &TransactionOutcome) {
        match outcome {
            TransactionOutcome::Succeeded(success) => match success.kind {
                SuccessKind::RecordWritten | SuccessKind::RecordRead => {
                    self.notifier.record_read(&success.record);
                }
                SuccessKind::ReloadCompleted => self.notifier.reload_completed(&success.record),
            },
            TransactionOutcome::Failed(error) => {
                self.notifier.transaction_failed(error);
                if matches!(error.kind(), TransactionErrorKind::UserNotFound) {
                    self.notifier.no_record_found();
                }
            }
            TransactionOutcome::Cancelled => {}
        }
    }
}

/// Ownership of the engine's active slot for one transaction.
///
/// Dropping the slot frees the engine even when the transaction future is
/// abandoned before it settles.
struct ActiveSlot<'a> {
    active: &'a Mutex<Option<ActiveTransaction>>,
    id: u64,
    settled: bool,
}

impl ActiveSlot<'_> {
    fn release(mut self) {
        self.settled = true;
    }
}

impl Drop for ActiveSlot<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                transaction = self.id,
                "tag transaction dropped before it settled"
            );
        }
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.as_ref().is_some_and(|current| current.id == self.id) {
            *active = None;
        }
    }
}

/// Reader session opened for one transaction.
///
/// Dropping it while it still holds a session spawns a cancelled
/// invalidation on the current runtime, so an abandoned transaction future
/// still releases the reader exactly once.
#[derive(Default)]
struct OpenSession {
    session: Option<Box<dyn ReaderSession>>,
}

impl OpenSession {
    fn hold(&mut self, session: Box<dyn ReaderSession>) -> &dyn ReaderSession {
        &**self.session.insert(session)
    }

    /// Invalidate the held session, if any.
    ///
    /// The invalidation runs as its own task and is awaited, so it finishes
    /// even when the caller stops polling part way through.
    async fn release(mut self, invalidation: SessionInvalidation) {
        let Some(session) = self.session.take() else {
            return;
        };
        let released = tokio::spawn(async move { session.invalidate(invalidation).await });
        if let Err(err) = released.await {
            if err.is_panic() {
                std::panic::resume_unwind(err.into_panic());
            }
            warn!(error = %err, "reader session invalidation did not complete");
        }
    }
}

impl Drop for OpenSession {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        warn!("reader session abandoned before finalization");
        let invalidation = SessionInvalidation::Cancelled {
            message: CANCELLED_MESSAGE.to_owned(),
        };
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move { session.invalidate(invalidation).await });
            }
            Err(err) => {
                warn!(error = %err, "no runtime left to invalidate the abandoned reader session");
            }
        }
    }
}

/// States visited by one transaction.
struct TransactionRun {
    id: u64,
    kind: TransactionKind,
    state: SessionState,
    trail: Vec<SessionState>,
}

impl TransactionRun {
    fn new(id: u64, kind: TransactionKind) -> Self {
        Self {
            id,
            kind,
            state: SessionState::Idle,
            trail: vec![SessionState::Idle],
        }
    }

    fn enter(&mut self, next: SessionState) {
        if !self.state.can_transition_to(next) {
            warn!(
                transaction = self.id,
                from = %self.state,
                to = %next,
                "unexpected session transition"
            );
        }
        debug!(transaction = self.id, from = %self.state, to = %next, "session state changed");
        self.state = next;
        self.trail.push(next);
    }
}

fn require_read_write(status: TagStatus) -> Result<(), Interrupt> {
    match status {
        TagStatus::ReadWrite => Ok(()),
        TagStatus::NotSupported => Err(Interrupt::failed(
            TransactionErrorKind::TagNotCompliant,
            NOT_COMPLIANT_MESSAGE,
        )),
        TagStatus::ReadOnly => Err(Interrupt::failed(
            TransactionErrorKind::TagReadOnly,
            READ_ONLY_MESSAGE,
        )),
        TagStatus::Unrecognised { code } => {
            debug!(code, "tag reported an unrecognised status");
            Err(Interrupt::failed(
                TransactionErrorKind::Unknown,
                UNKNOWN_STATUS_MESSAGE,
            ))
        }
    }
}

fn discovery_interrupt(err: &ReaderSessionError) -> Interrupt {
    match err {
        ReaderSessionError::UserCancelled => Interrupt::Cancelled,
        ReaderSessionError::Unavailable { .. } => {
            warn!(error = %err, "tag reader became unavailable during discovery");
            Interrupt::failed(TransactionErrorKind::Unavailable, UNAVAILABLE_MESSAGE)
        }
        ReaderSessionError::Invalidated { .. } => {
            warn!(error = %err, "reader session ended during discovery");
            Interrupt::failed(TransactionErrorKind::ReadFailure, READ_FAILURE_MESSAGE)
        }
    }
}

fn invalidation_for(outcome: &TransactionOutcome) -> SessionInvalidation {
    match outcome {
        TransactionOutcome::Succeeded(success) => SessionInvalidation::Completed {
            message: success.message.clone(),
        },
        TransactionOutcome::Failed(error) => SessionInvalidation::Failed {
            message: error.message().to_owned(),
        },
        TransactionOutcome::Cancelled => SessionInvalidation::Cancelled {
            message: CANCELLED_MESSAGE.to_owned(),
        },
    }
}

fn log_outcome(id: u64, kind: TransactionKind, outcome: &TransactionOutcome) {
    match outcome {
        TransactionOutcome::Succeeded(success) => info!(
            transaction = id,
            kind = %kind,
            account_id = success.record.id,
            "tag transaction succeeded"
        ),
        TransactionOutcome::Failed(error) => warn!(
            transaction = id,
            kind = %kind,
            code = error.code().as_str(),
            message = error.message(),
            "tag transaction failed"
        ),
        TransactionOutcome::Cancelled => {
            info!(transaction = id, kind = %kind, "tag transaction cancelled");
        }
    }
}
