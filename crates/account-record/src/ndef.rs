//! Tag message container.
//!
//! Mirrors the NDEF message layout a platform reader hands back: an ordered
//! list of records, each with a type name format, a type, an optional
//! identifier, and an opaque payload.

/// Type name format of a record (NDEF TNF field).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TypeNameFormat {
    /// Record carries no type or payload.
    Empty,
    /// NFC Forum well-known type.
    #[default]
    WellKnown,
    /// RFC 2046 media type.
    Media,
    /// Absolute URI.
    AbsoluteUri,
    /// NFC Forum external type.
    External,
    /// Unknown type.
    Unknown,
    /// Continuation chunk of a previous record.
    Unchanged,
}

/// One record inside a tag message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NdefRecord {
    /// Type name format.
    pub format: TypeNameFormat,
    /// Record type bytes.
    pub record_type: Vec<u8>,
    /// Record identifier; empty when unused.
    pub identifier: Vec<u8>,
    /// Application payload.
    pub payload: Vec<u8>,
}

/// Message stored on a tag.
///
/// # Examples
/// ```
/// use account_record::{NdefMessage, NdefRecord};
///
/// let message = NdefMessage::single(NdefRecord::default());
/// assert!(message.first_record().is_some());
/// assert!(NdefMessage::default().first_record().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NdefMessage {
    /// Records in tag order.
    pub records: Vec<NdefRecord>,
}

impl NdefMessage {
    /// Build a message holding exactly one record.
    #[must_use]
    pub fn single(record: NdefRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    /// First record of the message, if any.
    #[must_use]
    pub fn first_record(&self) -> Option<&NdefRecord> {
        self.records.first()
    }

    /// Return whether the message holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
