//! Catalog and workflow-event-log adapters for the Arca preservation
//! repository.
//!
//! This crate provides:
//! - The [`Revision`] catalog record and the [`Catalog`] trait boundary
//!   (`add` / `get` / `get_by_alternate_identifier`)
//! - The [`WorkflowEvent`] audit record and the [`EventStore`] trait
//!   boundary (append-only, queryable by tracking identifier)
//! - In-memory implementations for tests and embedding

pub mod error;
pub mod memory;
pub mod revision;
pub mod traits;
pub mod workflow_event;

pub use error::CatalogError;
pub use memory::{InMemoryCatalog, InMemoryEventStore};
pub use revision::Revision;
pub use traits::{Catalog, EventStore};
pub use workflow_event::{WorkflowEvent, WorkflowEventType};
