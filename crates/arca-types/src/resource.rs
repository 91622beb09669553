use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An identifier for a resource in a scheme other than the repository's own
/// (e.g. a library catalog number).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// The actor recorded on a preservation event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub address: String,
    pub role: String,
}

/// A preservation event attached to a resource: who did what to it, when,
/// and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreservationEvent {
    pub identifier: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub datetime: DateTime<Utc>,
    pub detail: String,
    pub agent: Agent,
}

/// A reference to a file's location plus its descriptive typing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub locref: String,
    #[serde(default)]
    pub mdtype: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
}

/// Metadata about one file belonging to a resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: String,
    #[serde(rename = "use")]
    pub use_: String,
    #[serde(default)]
    pub groupid: Option<String>,
    #[serde(rename = "ref")]
    pub reference: FileReference,
}

/// Whether a structural map describes physical or logical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructMapType {
    #[serde(rename = "PHYSICAL")]
    Physical,
    #[serde(rename = "LOGICAL")]
    Logical,
}

/// One position in a structural map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMapItem {
    pub order: u32,
    pub label: String,
    pub asset_id: String,
}

/// Structural ordering of a resource's constituent assets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMap {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StructMapType,
    pub items: Vec<StructMapItem>,
}

/// The structured description of one preservable entity — a root object or
/// a constituent file set — and its files, events, and metadata references.
///
/// This is the unit exchanged between the unpack, store, and catalog steps
/// of the ingestion workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageResource {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub alternate_identifier: AlternateIdentifier,
    pub events: Vec<PreservationEvent>,
    #[serde(default)]
    pub metadata_files: Vec<FileMetadata>,
    #[serde(default)]
    pub data_files: Vec<FileMetadata>,
    #[serde(default)]
    pub struct_maps: Vec<StructMap>,
    #[serde(default)]
    pub root: bool,
}

impl PackageResource {
    /// Every file path this resource contributes to the stored object tree.
    ///
    /// Absolute `https://` metadata references point outside the repository
    /// and are excluded; all data files are included.
    pub fn entries(&self) -> Vec<PathBuf> {
        let mut entries = Vec::new();
        for file_metadata in &self.metadata_files {
            if !file_metadata.reference.locref.starts_with("https://") {
                entries.push(PathBuf::from(&file_metadata.reference.locref));
            }
        }
        for file_metadata in &self.data_files {
            entries.push(PathBuf::from(&file_metadata.reference.locref));
        }
        entries
    }

    /// The preservation event of the given type, if present.
    pub fn event_of_kind(&self, kind: &str) -> Option<&PreservationEvent> {
        self.events.iter().find(|event| event.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, locref: &str) -> FileMetadata {
        FileMetadata {
            id: id.into(),
            use_: "function:source".into(),
            groupid: None,
            reference: FileReference {
                locref: locref.into(),
                mdtype: None,
                mimetype: None,
            },
        }
    }

    fn resource(metadata_files: Vec<FileMetadata>, data_files: Vec<FileMetadata>) -> PackageResource {
        PackageResource {
            id: Uuid::nil(),
            kind: "Monograph".into(),
            alternate_identifier: AlternateIdentifier {
                kind: "DLXS".into(),
                id: "xyzzy:0001".into(),
            },
            events: Vec::new(),
            metadata_files,
            data_files,
            struct_maps: Vec::new(),
            root: true,
        }
    }

    #[test]
    fn entries_include_metadata_and_data_files() {
        let resource = resource(
            vec![file("m1", "metadata/common.json")],
            vec![file("d1", "data/00000001.txt")],
        );
        assert_eq!(
            resource.entries(),
            vec![
                PathBuf::from("metadata/common.json"),
                PathBuf::from("data/00000001.txt"),
            ]
        );
    }

    #[test]
    fn entries_exclude_absolute_https_metadata_references() {
        let resource = resource(
            vec![
                file("m1", "https://example.edu/schemas/common.json"),
                file("m2", "metadata/common.json"),
            ],
            Vec::new(),
        );
        assert_eq!(resource.entries(), vec![PathBuf::from("metadata/common.json")]);
    }

    #[test]
    fn event_of_kind_finds_ingest_event() {
        let mut resource = resource(Vec::new(), Vec::new());
        resource.events.push(PreservationEvent {
            identifier: "e1".into(),
            kind: "ingest".into(),
            datetime: Utc::now(),
            detail: "Giving it our all".into(),
            agent: Agent {
                address: "steward@example.edu".into(),
                role: "collection manager".into(),
            },
        });
        assert!(resource.event_of_kind("ingest").is_some());
        assert!(resource.event_of_kind("update").is_none());
    }

    #[test]
    fn resource_deserializes_from_descriptor_json() {
        let raw = serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "type": "Monograph",
            "alternate_identifier": {"type": "DLXS", "id": "xyzzy:0001"},
            "events": [],
            "metadata_files": [
                {
                    "id": "m1",
                    "use": "function:source",
                    "ref": {"locref": "metadata/common.json"}
                }
            ],
            "root": true
        });
        let resource: PackageResource = serde_json::from_value(raw).unwrap();
        assert!(resource.root);
        assert_eq!(resource.metadata_files[0].reference.locref, "metadata/common.json");
    }
}
