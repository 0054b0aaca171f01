//! Structured audit trail built on top of `reaper-core`'s queue. Every
//! terminal item transition is emitted as one `tracing` event so a run can
//! be reconstructed from whatever log sink the operator points at.

pub mod error;
pub mod events;

pub use error::AuditError;
pub use events::{record_terminal_items, AuditEvent};
