//! Driven port for the platform's contactless tag reader.
//!
//! A [`TagReader`] opens one [`ReaderSession`] per transaction. The session
//! reports discovery events, carries the connection to a single tag, and is
//! invalidated exactly once by the engine when the transaction settles. All
//! tag-facing calls are asynchronous because the platform answers through
//! completion callbacks that may arrive on any thread.

use account_record::NdefMessage;
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Transport failures reported while talking to a connected tag.
    pub enum TagTransportError {
        /// The tag left the field or the radio link dropped.
        ConnectionLost {
            /// Platform detail.
            message: String,
        } => "tag connection lost: {message}",
        /// The platform gave up waiting for the tag to answer.
        Timeout {
            /// Platform detail.
            message: String,
        } => "tag did not answer in time: {message}",
        /// The tag or platform refused the operation.
        Rejected {
            /// Platform detail.
            message: String,
        } => "tag rejected the operation: {message}",
    }
}

define_port_error! {
    /// Failures affecting a reader session as a whole.
    pub enum ReaderSessionError {
        /// Tag reading is not available on this device.
        Unavailable {
            /// Platform detail.
            message: String,
        } => "tag reader unavailable: {message}",
        /// The holder dismissed the reader before a transaction finished.
        UserCancelled => "reader session cancelled by the holder",
        /// The platform invalidated the session on its own.
        Invalidated {
            /// Platform detail.
            message: String,
        } => "reader session invalidated: {message}",
    }
}

/// Opaque handle for one tag reported by a discovery event.
///
/// Handles are only meaningful to the session that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagHandle(u64);

impl TagHandle {
    /// Wrap a platform-assigned tag identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Platform-assigned identifier behind this handle.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Capability status a connected tag reports for its record storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStatus {
    /// The tag does not speak the record format at all.
    NotSupported,
    /// Records can be read but not written.
    ReadOnly,
    /// Records can be read and written.
    ReadWrite,
    /// The platform returned a status code the engine does not know.
    Unrecognised {
        /// Raw status code from the platform.
        code: u8,
    },
}

/// How a session ends once the engine is done with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInvalidation {
    /// Dismiss the reader showing a success message to the holder.
    Completed {
        /// Message left on the reader surface.
        message: String,
    },
    /// Dismiss the reader showing an error message to the holder.
    Failed {
        /// Message shown as the failure reason.
        message: String,
    },
    /// Dismiss the reader after the transaction was cancelled.
    Cancelled {
        /// Message left on the reader surface.
        message: String,
    },
}

/// One live reader session, bound to a single transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReaderSession: Send + Sync {
    /// Wait for the next discovery event and return the tags it reported.
    ///
    /// A [`ReaderSessionError::UserCancelled`] error means the holder
    /// dismissed the reader while the engine was waiting.
    async fn discover(&self) -> Result<Vec<TagHandle>, ReaderSessionError>;

    /// Replace the message displayed on the reader surface.
    async fn alert(&self, message: &str);

    /// Resume polling after a discovery event was rejected.
    async fn restart_polling(&self);

    /// Connect to a discovered tag.
    async fn connect(&self, tag: TagHandle) -> Result<(), TagTransportError>;

    /// Query the record capability of the connected tag.
    async fn query_status(&self, tag: TagHandle) -> Result<TagStatus, TagTransportError>;

    /// Read the message stored on the tag, `None` when the tag is blank.
    async fn read(&self, tag: TagHandle) -> Result<Option<NdefMessage>, TagTransportError>;

    /// Replace the message stored on the tag.
    async fn write(&self, tag: TagHandle, message: &NdefMessage) -> Result<(), TagTransportError>;

    /// End the session. Invalidating an already terminated session is a no-op.
    async fn invalidate(&self, reason: SessionInvalidation);
}

/// Factory for reader sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagReader: Send + Sync {
    /// Open a session that shows `prompt` to the holder while polling.
    async fn open(&self, prompt: &str) -> Result<Box<dyn ReaderSession>, ReaderSessionError>;
}
