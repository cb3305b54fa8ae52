//! Transaction engine for account tags.
//!
//! The engine drives one contactless tag transaction at a time: it opens a
//! reader session, waits for exactly one tag, checks that the tag can be
//! written, then creates, reads, or reloads the account stored on it. Outcomes
//! are reported once per transaction through [`domain::ports::TransactionNotifier`].
//!
//! - [`domain`] holds the state machine, request and outcome types, the
//!   failure taxonomy, and the driven ports.
//! - [`outbound`] holds adapters: an in-memory tag field and a tracing
//!   notifier.
//! - [`config`] loads [`config::EngineSettings`] via OrthoConfig.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
