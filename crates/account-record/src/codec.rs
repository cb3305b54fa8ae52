//! Record codec between [`AccountRecord`] and tag messages.
//!
//! Encoding writes the UTF-8 JSON of the record as the payload of a single
//! well-known record of type `"T"` with an empty identifier. Decoding is
//! partial: anything that does not parse as an account record yields `None`.

use crate::{AccountRecord, EncodeError, NdefMessage, NdefRecord, TypeNameFormat};

/// Type of the record carrying the account payload.
pub const RECORD_TYPE: &[u8] = b"T";

/// Serialize `record` to its JSON payload bytes.
///
/// # Errors
///
/// Returns [`EncodeError::Serialization`] if the JSON serializer fails.
pub fn encode_payload(record: &AccountRecord) -> Result<Vec<u8>, EncodeError> {
    serde_json::to_vec(record).map_err(|err| EncodeError::Serialization {
        message: err.to_string(),
    })
}

/// Build the single-record tag message for `record`.
///
/// # Errors
///
/// Returns [`EncodeError::Serialization`] if the JSON serializer fails.
pub fn encode(record: &AccountRecord) -> Result<NdefMessage, EncodeError> {
    let payload = encode_payload(record)?;
    Ok(NdefMessage::single(NdefRecord {
        format: TypeNameFormat::WellKnown,
        record_type: RECORD_TYPE.to_vec(),
        identifier: Vec::new(),
        payload,
    }))
}

/// Decode an account record from raw payload bytes.
///
/// Malformed JSON, invalid UTF-8, and schema mismatches all yield `None`.
#[must_use]
pub fn decode(payload: &[u8]) -> Option<AccountRecord> {
    serde_json::from_slice(payload).ok()
}

/// Decode the account record held by the first record of `message`.
#[must_use]
pub fn decode_message(message: &NdefMessage) -> Option<AccountRecord> {
    message
        .first_record()
        .and_then(|record| decode(&record.payload))
}
