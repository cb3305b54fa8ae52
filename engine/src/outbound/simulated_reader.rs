//! In-memory tag field implementing the reader ports.
//!
//! Tags are placed into and removed from a shared field. Sessions opened on
//! the field report whatever tags are present when they poll, and every call
//! they receive is written to a [`FieldJournal`] so callers can inspect what
//! the engine did. The command-line binary drives real transactions through
//! this adapter and integration tests use it to script the holder's actions.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use account_record::{
    AccountRecord, EncodeError, NdefMessage, NdefRecord, RECORD_TYPE, decode_message, encode,
};
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

use crate::domain::ports::{
    ReaderSession, ReaderSessionError, SessionInvalidation, TagHandle, TagReader, TagStatus,
    TagTransportError,
};

/// Tag-level operation, used to script faults and to journal calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagOperation {
    /// [`ReaderSession::connect`].
    Connect,
    /// [`ReaderSession::query_status`].
    QueryStatus,
    /// [`ReaderSession::read`].
    Read,
    /// [`ReaderSession::write`].
    Write,
}

/// A tag that can be placed in a [`SimulatedTagField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTag {
    status: TagStatus,
    message: Option<NdefMessage>,
    faults: HashMap<TagOperation, TagTransportError>,
}

impl SimulatedTag {
    /// A writable tag with nothing stored on it.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            status: TagStatus::ReadWrite,
            message: None,
            faults: HashMap::new(),
        }
    }

    /// A writable tag holding `record`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if the record cannot be serialized.
    pub fn holding(record: &AccountRecord) -> Result<Self, EncodeError> {
        Ok(Self::blank().with_message(encode(record)?))
    }

    /// A writable tag whose single text record carries `payload` verbatim.
    #[must_use]
    pub fn with_payload(payload: Vec<u8>) -> Self {
        Self::blank().with_message(NdefMessage::single(NdefRecord {
            record_type: RECORD_TYPE.to_vec(),
            payload,
            ..NdefRecord::default()
        }))
    }

    /// Replace the stored message.
    #[must_use]
    pub fn with_message(mut self, message: NdefMessage) -> Self {
        self.message = Some(message);
        self
    }

    /// Replace the capability status the tag reports.
    #[must_use]
    pub const fn with_status(mut self, status: TagStatus) -> Self {
        self.status = status;
        self
    }

    /// Make `operation` fail with `error` every time it is attempted.
    #[must_use]
    pub fn failing(mut self, operation: TagOperation, error: TagTransportError) -> Self {
        self.faults.insert(operation, error);
        self
    }

    /// Message currently stored on the tag.
    #[must_use]
    pub const fn message(&self) -> Option<&NdefMessage> {
        self.message.as_ref()
    }

    /// Account currently stored on the tag, if it decodes.
    #[must_use]
    pub fn record(&self) -> Option<AccountRecord> {
        self.message.as_ref().and_then(decode_message)
    }

    /// Payload of the first stored record.
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        self.message
            .as_ref()
            .and_then(NdefMessage::first_record)
            .map(|record| record.payload.as_slice())
    }
}

/// Everything the engine asked of the field, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldJournal {
    /// Prompts passed to [`TagReader::open`].
    pub prompts: Vec<String>,
    /// Number of [`ReaderSession::discover`] calls.
    pub discoveries: usize,
    /// Alerts displayed during discovery.
    pub alerts: Vec<String>,
    /// Number of polling restarts.
    pub restarts: usize,
    /// Tag operations attempted.
    pub operations: Vec<(TagHandle, TagOperation)>,
    /// Every invalidation received, including repeats.
    pub invalidations: Vec<SessionInvalidation>,
}

impl FieldJournal {
    /// Whether any tag operation of `kind` was attempted.
    #[must_use]
    pub fn attempted(&self, kind: TagOperation) -> bool {
        self.operations.iter().any(|(_, operation)| *operation == kind)
    }
}

#[derive(Debug)]
enum ScriptedEvent {
    Empty,
    Dismissed,
    Failed(String),
}

#[derive(Debug)]
struct FieldState {
    tags: BTreeMap<TagHandle, SimulatedTag>,
    next_handle: u64,
    available: bool,
    scripted: VecDeque<ScriptedEvent>,
    journal: FieldJournal,
}

struct FieldInner {
    state: Mutex<FieldState>,
    changes: watch::Sender<u64>,
}

impl FieldInner {
    fn lock(&self) -> MutexGuard<'_, FieldState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn changed(&self) {
        self.changes.send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

/// Shared in-memory field of tags.
///
/// Clones share the same field.
#[derive(Clone)]
pub struct SimulatedTagField {
    inner: Arc<FieldInner>,
}

impl Default for SimulatedTagField {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTagField {
    /// An empty field on a device that can read tags.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(FieldInner {
                state: Mutex::new(FieldState {
                    tags: BTreeMap::new(),
                    next_handle: 1,
                    available: true,
                    scripted: VecDeque::new(),
                    journal: FieldJournal::default(),
                }),
                changes,
            }),
        }
    }

    /// A field on a device without tag reading; every open fails.
    #[must_use]
    pub fn unavailable() -> Self {
        let field = Self::new();
        field.inner.lock().available = false;
        field
    }

    /// Bring `tag` into the field and return its handle.
    pub fn place(&self, tag: SimulatedTag) -> TagHandle {
        let handle = {
            let mut state = self.inner.lock();
            let handle = TagHandle::new(state.next_handle);
            state.next_handle = state.next_handle.wrapping_add(1);
            state.tags.insert(handle, tag);
            handle
        };
        debug!(tag = handle.raw(), "tag placed in field");
        self.inner.changed();
        handle
    }

    /// Take the tag behind `handle` out of the field.
    pub fn remove(&self, handle: TagHandle) -> Option<SimulatedTag> {
        let removed = self.inner.lock().tags.remove(&handle);
        self.inner.changed();
        removed
    }

    /// Snapshot of the tag behind `handle`, if it is still in the field.
    #[must_use]
    pub fn tag(&self, handle: TagHandle) -> Option<SimulatedTag> {
        self.inner.lock().tags.get(&handle).cloned()
    }

    /// Make the next discovery report an event with no tags.
    pub fn report_empty_discovery(&self) {
        self.script(ScriptedEvent::Empty);
    }

    /// Make the next discovery end because the holder dismissed the reader.
    pub fn dismiss(&self) {
        self.script(ScriptedEvent::Dismissed);
    }

    /// Make the next discovery end with a platform error.
    pub fn fail_discovery(&self, message: impl Into<String>) {
        self.script(ScriptedEvent::Failed(message.into()));
    }

    /// Snapshot of the calls received so far.
    #[must_use]
    pub fn journal(&self) -> FieldJournal {
        self.inner.lock().journal.clone()
    }

    /// Wait until sessions on this field have polled at least `count` times.
    pub async fn wait_for_discoveries(&self, count: usize) {
        let mut changes = self.inner.changes.subscribe();
        loop {
            let seen = self.inner.lock().journal.discoveries;
            if seen >= count || changes.changed().await.is_err() {
                return;
            }
        }
    }

    fn script(&self, event: ScriptedEvent) {
        self.inner.lock().scripted.push_back(event);
        self.inner.changed();
    }
}

#[async_trait]
impl TagReader for SimulatedTagField {
    async fn open(&self, prompt: &str) -> Result<Box<dyn ReaderSession>, ReaderSessionError> {
        {
            let mut state = self.inner.lock();
            if !state.available {
                return Err(ReaderSessionError::unavailable(
                    "device does not support tag reading",
                ));
            }
            state.journal.prompts.push(prompt.to_owned());
        }
        debug!(prompt, "reader session opened");
        Ok(Box::new(SimulatedSession {
            field: Arc::clone(&self.inner),
            invalidated: AtomicBool::new(false),
        }))
    }
}

struct SimulatedSession {
    field: Arc<FieldInner>,
    invalidated: AtomicBool,
}

impl SimulatedSession {
    fn poll(&self) -> Option<Result<Vec<TagHandle>, ReaderSessionError>> {
        let mut state = self.field.lock();
        if self.invalidated.load(Ordering::SeqCst) {
            return Some(Err(ReaderSessionError::invalidated(
                "session already invalidated",
            )));
        }
        match state.scripted.pop_front() {
            Some(ScriptedEvent::Empty) => Some(Ok(Vec::new())),
            Some(ScriptedEvent::Dismissed) => Some(Err(ReaderSessionError::user_cancelled())),
            Some(ScriptedEvent::Failed(message)) => {
                Some(Err(ReaderSessionError::invalidated(message)))
            }
            None if state.tags.is_empty() => None,
            None => Some(Ok(state.tags.keys().copied().collect())),
        }
    }

    fn with_tag<T>(
        &self,
        handle: TagHandle,
        operation: TagOperation,
        apply: impl FnOnce(&mut SimulatedTag) -> Result<T, TagTransportError>,
    ) -> Result<T, TagTransportError> {
        if self.invalidated.load(Ordering::SeqCst) {
            return Err(TagTransportError::rejected("session already invalidated"));
        }
        let mut state = self.field.lock();
        state.journal.operations.push((handle, operation));
        let Some(tag) = state.tags.get_mut(&handle) else {
            return Err(TagTransportError::connection_lost("tag left the field"));
        };
        if let Some(fault) = tag.faults.get(&operation) {
            return Err(fault.clone());
        }
        apply(tag)
    }
}

#[async_trait]
impl ReaderSession for SimulatedSession {
    async fn discover(&self) -> Result<Vec<TagHandle>, ReaderSessionError> {
        let mut changes = self.field.changes.subscribe();
        self.field.lock().journal.discoveries += 1;
        self.field.changed();
        loop {
            if let Some(result) = self.poll() {
                return result;
            }
            if changes.changed().await.is_err() {
                return Err(ReaderSessionError::invalidated("tag field closed"));
            }
        }
    }

    async fn alert(&self, message: &str) {
        self.field.lock().journal.alerts.push(message.to_owned());
    }

    async fn restart_polling(&self) {
        self.field.lock().journal.restarts += 1;
        self.field.changed();
    }

    async fn connect(&self, tag: TagHandle) -> Result<(), TagTransportError> {
        self.with_tag(tag, TagOperation::Connect, |_| Ok(()))
    }

    async fn query_status(&self, tag: TagHandle) -> Result<TagStatus, TagTransportError> {
        self.with_tag(tag, TagOperation::QueryStatus, |stored| Ok(stored.status))
    }

    async fn read(&self, tag: TagHandle) -> Result<Option<NdefMessage>, TagTransportError> {
        self.with_tag(tag, TagOperation::Read, |stored| Ok(stored.message.clone()))
    }

    async fn write(&self, tag: TagHandle, message: &NdefMessage) -> Result<(), TagTransportError> {
        self.with_tag(tag, TagOperation::Write, |stored| {
            if stored.status != TagStatus::ReadWrite {
                return Err(TagTransportError::rejected("tag is not writable"));
            }
            stored.message = Some(message.clone());
            Ok(())
        })
    }

    async fn invalidate(&self, reason: SessionInvalidation) {
        let repeated = self.invalidated.swap(true, Ordering::SeqCst);
        debug!(?reason, repeated, "reader session invalidated");
        self.field.lock().journal.invalidations.push(reason);
        self.field.changed();
    }
}
