//! Account records stored on passive contactless tags.
//!
//! This crate owns the data exchanged with a tag and the codec that maps it
//! to and from the tag's record format. It is independent of the transaction
//! engine so that adapters and tooling can read tag payloads without pulling
//! in session orchestration.
//!
//! # Overview
//!
//! - [`AccountRecord`] is the account stored on a tag, keyed by `id`.
//! - [`ReloadAmount`] is a non-negative top-up applied during a reload.
//! - [`NdefMessage`] and [`NdefRecord`] model the tag message container.
//! - [`encode`] and [`decode`] convert between records and tag payloads.
//!
//! # Example
//!
//! ```
//! use account_record::{AccountRecord, decode_message, encode};
//! use rust_decimal::Decimal;
//!
//! let record = AccountRecord::new("Amanda", "Gonzalez", Decimal::new(1050, 2), 1);
//! let message = encode(&record).expect("record encodes");
//!
//! assert_eq!(message.records.len(), 1);
//! assert_eq!(decode_message(&message), Some(record));
//! ```

mod codec;
mod error;
mod ndef;
mod record;
mod reload;

pub use codec::{RECORD_TYPE, decode, decode_message, encode, encode_payload};
pub use error::{EncodeError, ReloadAmountError};
pub use ndef::{NdefMessage, NdefRecord, TypeNameFormat};
pub use record::AccountRecord;
pub use reload::ReloadAmount;
