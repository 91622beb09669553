//! Event-driven ingestion workflow for the Arca preservation repository.
//!
//! A deposited package moves through receive, verify, unpack, store, and
//! catalog steps, each expressed as a handler on a synchronous message
//! bus. Every transition leaves a row in the workflow audit trail, and a
//! verification failure halts the run without touching storage.
//!
//! [`wiring::build_message_bus`] assembles the standard pipeline;
//! everything else is exposed so embedders can rewire or extend it.

pub mod bag;
pub mod bus;
pub mod commands;
pub mod error;
pub mod events;
pub mod handlers;
pub mod resources;
pub mod uow;
pub mod wiring;
pub mod workspace;

pub use bag::{BagReader, ValidationError, INFO_TAG_FILE};
pub use bus::{CommandHandler, EventHandler, Message, MessageBus};
pub use commands::{Command, CommandKind};
pub use error::{WorkflowError, WorkflowResult};
pub use events::{Event, EventKind};
pub use resources::{ResourceProvider, ROOT_RESOURCE_TYPE};
pub use uow::{Transaction, UnitOfWork};
pub use wiring::build_message_bus;
pub use workspace::{Translocator, Workspace};
