//! Outbound adapters implementing the engine's driven ports.
//!
//! - **simulated_reader**: an in-memory tag field standing in for the
//!   platform reader, used by the command-line binary and tests.
//! - **tracing_notifier**: reports transaction outcomes through `tracing`.
//!
//! Adapters translate between port calls and their backing representation.
//! They contain no transaction logic.

pub mod simulated_reader;
pub mod tracing_notifier;

pub use simulated_reader::{FieldJournal, SimulatedTag, SimulatedTagField, TagOperation};
pub use tracing_notifier::TracingNotifier;
