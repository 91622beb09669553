//! Foundation types for the Arca preservation repository.
//!
//! This crate provides the small value types shared by the storage gateway
//! and the ingestion workflow. Every other Arca crate depends on
//! `arca-types`.
//!
//! # Key Types
//!
//! - [`Coordinator`] — who is attributed as author of a stored version
//! - [`CommitInfo`] — commit intent (coordinator + message) carried through
//!   the ingestion workflow
//! - [`VersionInfo`] — one entry in an object's version log
//! - [`Bundle`] — a set of files, relative to a root, handed to the gateway
//!   for staging
//! - [`ObjectFile`] — a resolved logical-path → literal-path mapping
//! - [`PackageResource`] — the structured description of one preservable
//!   entity exchanged between the unpack, store, and catalog steps

pub mod bundle;
pub mod resource;
pub mod version;

pub use bundle::{Bundle, ObjectFile};
pub use resource::{
    Agent, AlternateIdentifier, FileMetadata, FileReference, PackageResource, PreservationEvent,
    StructMap, StructMapItem, StructMapType,
};
pub use version::{CommitInfo, Coordinator, LogOrder, VersionInfo};
