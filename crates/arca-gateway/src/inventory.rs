use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

/// Name of the inventory file inside an object (or staged object) root.
pub const INVENTORY_FILE: &str = "inventory.json";

/// The author block recorded on a committed version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionUser {
    pub name: String,
    /// `mailto:` form of the coordinator's email.
    pub address: String,
}

/// One version's metadata and state inside an inventory.
///
/// `state` maps a content digest to the set of logical paths visible at
/// this version — the "current tree" as of this version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub created: DateTime<Utc>,
    pub message: String,
    pub user: VersionUser,
    pub state: BTreeMap<String, Vec<String>>,
}

impl VersionRecord {
    /// An empty version, used when a staging area is first opened.
    pub fn empty(created: DateTime<Utc>) -> Self {
        Self {
            created,
            message: String::new(),
            user: VersionUser {
                name: String::new(),
                address: String::new(),
            },
            state: BTreeMap::new(),
        }
    }

    /// Every logical path visible in this version's state.
    pub fn logical_paths(&self) -> Vec<&str> {
        self.state
            .values()
            .flat_map(|paths| paths.iter().map(String::as_str))
            .collect()
    }
}

/// The per-object record of identity, version history, manifest, and state.
///
/// `manifest` maps a content digest to the content paths (relative to the
/// object root, `vN/content/...`) that were introduced for it at some
/// version. The same shape serves both committed objects and staged
/// (uncommitted) versions; a staged inventory holds exactly one version,
/// the one being built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub id: String,
    #[serde(rename = "type")]
    pub spec_type: String,
    #[serde(rename = "digestAlgorithm")]
    pub digest_algorithm: String,
    pub head: String,
    pub manifest: BTreeMap<String, Vec<String>>,
    pub versions: BTreeMap<String, VersionRecord>,
}

impl Inventory {
    pub const SPEC_TYPE: &'static str = "https://ocfl.io/1.1/spec/#inventory";
    pub const DIGEST_ALGORITHM: &'static str = "blake3";

    /// A new inventory whose head is `version_number`, with an empty state.
    pub fn new(id: &str, version_number: u32, created: DateTime<Utc>) -> Self {
        let head = version_name(version_number);
        let mut versions = BTreeMap::new();
        versions.insert(head.clone(), VersionRecord::empty(created));
        Self {
            id: id.to_owned(),
            spec_type: Self::SPEC_TYPE.to_owned(),
            digest_algorithm: Self::DIGEST_ALGORITHM.to_owned(),
            head,
            manifest: BTreeMap::new(),
            versions,
        }
    }

    /// The head version number.
    pub fn head_number(&self) -> u32 {
        version_number(&self.head).unwrap_or(0)
    }

    /// The head version record. Present by construction.
    pub fn head_version(&self) -> Option<&VersionRecord> {
        self.versions.get(&self.head)
    }

    pub fn head_version_mut(&mut self) -> Option<&mut VersionRecord> {
        self.versions.get_mut(&self.head)
    }

    /// Record `logical_path` as visible under `digest` in the given state,
    /// replacing any previous digest association for that path.
    pub fn set_state_path(
        state: &mut BTreeMap<String, Vec<String>>,
        digest: &str,
        logical_path: &str,
    ) {
        for paths in state.values_mut() {
            paths.retain(|path| path != logical_path);
        }
        state.retain(|_, paths| !paths.is_empty());
        let paths = state.entry(digest.to_owned()).or_default();
        if !paths.iter().any(|path| path == logical_path) {
            paths.push(logical_path.to_owned());
            paths.sort();
        }
    }

    /// Resolve the content path supplying `logical_path` for `digest`.
    ///
    /// When several versions introduced identical content, the earliest
    /// version whose content path suffix matches the logical path wins;
    /// if no suffix matches, the first manifest entry is used.
    pub fn resolve_content_path(&self, digest: &str, logical_path: &str) -> Option<&str> {
        let candidates = self.manifest.get(digest)?;
        let suffix = format!("content/{logical_path}");
        candidates
            .iter()
            .filter(|candidate| candidate.ends_with(&suffix))
            .min_by_key(|candidate| content_path_version(candidate).unwrap_or(u32::MAX))
            .or_else(|| candidates.first())
            .map(String::as_str)
    }

    pub fn load(path: &Path) -> GatewayResult<Self> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| GatewayError::Serialization(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> GatewayResult<()> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| GatewayError::Serialization(e.to_string()))?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// `vN` directory name for a version number.
pub fn version_name(number: u32) -> String {
    format!("v{number}")
}

/// Parse a `vN` version name back to its number.
pub fn version_number(name: &str) -> Option<u32> {
    name.strip_prefix('v')?.parse().ok()
}

/// The version number a content path (`vN/content/...`) belongs to.
pub fn content_path_version(content_path: &str) -> Option<u32> {
    let (version, _) = content_path.split_once('/')?;
    version_number(version)
}
