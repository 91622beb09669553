use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arca_types::PackageResource;

/// One cataloged revision of a preserved object.
///
/// Written by the `catalog_revision` workflow step after the object's files
/// have been committed to storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub identifier: Uuid,
    /// Identifiers for this object in other schemes.
    pub alternate_identifiers: Vec<String>,
    /// Storage version number this revision corresponds to.
    pub revision_number: u32,
    pub created_at: DateTime<Utc>,
    /// The parsed common descriptive-metadata payload.
    pub common_metadata: serde_json::Value,
    /// Full resource list as unpacked from the submitted package.
    pub package_resources: Vec<PackageResource>,
}
