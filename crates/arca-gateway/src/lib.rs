//! Versioned object-storage gateway for the Arca preservation repository.
//!
//! This crate is the storage engine behind the ingestion workflow. It
//! provides:
//! - The [`RepositoryGateway`] trait boundary: create a storage root, stage
//!   files for an object, commit a new immutable version, resolve current
//!   file contents, list version history, delete objects
//! - [`EmbeddedRepositoryGateway`]: manipulates an OCFL-style storage root
//!   directly, with a mutable-head staging extension for uncommitted
//!   versions
//! - [`CliRepositoryGateway`]: shells out to the external `rocfl` tool and
//!   classifies its stderr onto the typed error taxonomy
//! - [`InMemoryRepositoryGateway`]: implementation for tests and embedding
//!
//! The staging/commit protocol guarantees that no half-written version ever
//! becomes visible as HEAD: staged content lives in a separate extension
//! directory until `commit_object_changes` finalizes it.

pub mod cli;
pub mod embedded;
pub mod error;
pub mod inventory;
pub mod layout;
pub mod memory;
pub mod traits;

pub use cli::CliRepositoryGateway;
pub use embedded::EmbeddedRepositoryGateway;
pub use error::{GatewayError, GatewayResult};
pub use inventory::{Inventory, VersionRecord, VersionUser};
pub use layout::StorageLayout;
pub use memory::InMemoryRepositoryGateway;
pub use traits::RepositoryGateway;
