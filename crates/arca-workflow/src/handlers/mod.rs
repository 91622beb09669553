//! The workflow step handlers.
//!
//! Each handler consumes one event variant, performs its side effects
//! against the unit of work's collaborators, and queues the successor
//! event. [`record::record_workflow_event`] runs alongside every step and
//! persists the audit row.

pub mod catalog;
pub mod cleanup;
pub mod deposit;
pub mod receive;
pub mod record;
pub mod store;
pub mod unpack;
pub mod verify;

use crate::error::WorkflowError;
use crate::events::Event;

/// Error for a handler invoked with an event variant it does not consume.
/// Registration keys make this unreachable in a correctly wired bus.
fn unexpected(event: &Event) -> WorkflowError {
    WorkflowError::UnexpectedEvent(event.kind().to_string())
}
