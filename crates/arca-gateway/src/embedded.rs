use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use arca_types::{Bundle, Coordinator, LogOrder, ObjectFile, VersionInfo};

use crate::error::{GatewayError, GatewayResult};
use crate::inventory::{version_name, Inventory, VersionRecord, VersionUser, INVENTORY_FILE};
use crate::layout::{self, StorageLayout, ROOT_MARKER, ROOT_MARKER_CONTENT};
use crate::traits::RepositoryGateway;

/// Library-driven gateway backend: manipulates an OCFL-style storage root
/// directly.
///
/// Uncommitted versions live under the `extensions/rocfl-staging` directory,
/// keyed by a hashed n-tuple of the object id, and hold a `vN/content/...`
/// tree mirroring the eventual committed layout plus their own inventory.
/// Commit folds the staged version into the object's immutable history and
/// clears the staging area.
pub struct EmbeddedRepositoryGateway {
    storage_path: PathBuf,
    layout: StorageLayout,
}

impl EmbeddedRepositoryGateway {
    pub fn new(storage_path: impl Into<PathBuf>, layout: StorageLayout) -> Self {
        Self {
            storage_path: storage_path.into(),
            layout,
        }
    }

    fn object_root(&self, id: &str) -> PathBuf {
        self.storage_path.join(self.layout.object_path(id))
    }

    fn staging_root(&self, id: &str) -> PathBuf {
        self.storage_path.join(layout::staging_path(id))
    }

    fn committed_inventory(&self, id: &str) -> GatewayResult<Option<Inventory>> {
        let path = self.object_root(id).join(INVENTORY_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        Inventory::load(&path).map(Some)
    }

    fn staged_inventory(&self, id: &str) -> GatewayResult<Option<Inventory>> {
        let path = self.staging_root(id).join(INVENTORY_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        Inventory::load(&path).map(Some)
    }

    /// Open a staging area for the object's next version and return its
    /// inventory.
    fn open_staging(&self, id: &str) -> GatewayResult<Inventory> {
        let next = match self.committed_inventory(id)? {
            Some(inventory) => inventory.head_number() + 1,
            None => 1,
        };
        let staging_root = self.staging_root(id);
        fs::create_dir_all(staging_root.join(version_name(next)).join("content"))?;
        let inventory = Inventory::new(id, next, Utc::now());
        inventory.save(&staging_root.join(INVENTORY_FILE))?;
        debug!(object_id = id, version = next, "opened staging area");
        Ok(inventory)
    }
}

impl RepositoryGateway for EmbeddedRepositoryGateway {
    fn create_repository(&self) -> GatewayResult<()> {
        fs::create_dir_all(&self.storage_path)?;
        fs::write(self.storage_path.join(ROOT_MARKER), ROOT_MARKER_CONTENT)?;
        let layout_marker = serde_json::json!({
            "extension": self.layout.extension_name(),
            "description": "Arca preservation storage root",
        });
        fs::write(
            self.storage_path.join("ocfl_layout.json"),
            serde_json::to_string_pretty(&layout_marker)
                .map_err(|e| GatewayError::Serialization(e.to_string()))?,
        )?;
        info!(root = %self.storage_path.display(), "created storage root");
        Ok(())
    }

    fn has_object(&self, id: &str) -> GatewayResult<bool> {
        Ok(self.object_root(id).join(INVENTORY_FILE).is_file())
    }

    fn create_staged_object(&self, id: &str) -> GatewayResult<()> {
        if self.staging_root(id).join(INVENTORY_FILE).is_file() {
            return Err(GatewayError::StagedObjectAlreadyExists(id.to_owned()));
        }
        self.open_staging(id)?;
        Ok(())
    }

    fn stage_object_files(&self, id: &str, source_bundle: &Bundle) -> GatewayResult<()> {
        let mut staged = match self.staged_inventory(id)? {
            Some(inventory) => inventory,
            // An existing object may be staged for its next version without
            // an explicit create; a brand-new object may not.
            None if self.has_object(id)? => self.open_staging(id)?,
            None => return Err(GatewayError::ObjectDoesNotExist(id.to_owned())),
        };

        let staging_root = self.staging_root(id);
        let version = staged.head.clone();
        for entry in &source_bundle.entries {
            let source = source_bundle.resolve(entry);
            let data = fs::read(&source)?;
            let digest = hex::encode(blake3::hash(&data).as_bytes());
            let logical = path_string(entry);
            let content_path = format!("{version}/content/{logical}");

            let destination = staging_root.join(&content_path);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&destination, &data)?;

            // Re-staging a path replaces any earlier digest association.
            for paths in staged.manifest.values_mut() {
                paths.retain(|path| path != &content_path);
            }
            staged.manifest.retain(|_, paths| !paths.is_empty());
            staged
                .manifest
                .entry(digest.clone())
                .or_default()
                .push(content_path);
            if let Some(record) = staged.head_version_mut() {
                Inventory::set_state_path(&mut record.state, &digest, &logical);
            }
        }
        staged.save(&staging_root.join(INVENTORY_FILE))?;
        debug!(
            object_id = id,
            entries = source_bundle.entries.len(),
            "staged object files"
        );
        Ok(())
    }

    fn commit_object_changes(
        &self,
        id: &str,
        coordinator: &Coordinator,
        message: &str,
        date: Option<DateTime<Utc>>,
    ) -> GatewayResult<()> {
        let staged = self
            .staged_inventory(id)?
            .ok_or_else(|| GatewayError::NoStagedChanges(id.to_owned()))?;
        let committed = self.committed_inventory(id)?;

        let staged_state = staged
            .head_version()
            .map(|record| record.state.clone())
            .unwrap_or_default();
        // An empty commit is only meaningful for a brand-new object.
        if committed.is_some() && staged_state.is_empty() {
            return Err(GatewayError::NoStagedChanges(id.to_owned()));
        }

        let number = staged.head_number();
        let object_root = self.object_root(id);
        fs::create_dir_all(object_root.join(version_name(number)).join("content"))?;

        let mut state = committed
            .as_ref()
            .and_then(Inventory::head_version)
            .map(|record| record.state.clone())
            .unwrap_or_default();
        for (digest, logical_paths) in &staged_state {
            for logical_path in logical_paths {
                Inventory::set_state_path(&mut state, digest, logical_path);
            }
        }

        let staging_root = self.staging_root(id);
        let mut manifest = committed
            .as_ref()
            .map(|inventory| inventory.manifest.clone())
            .unwrap_or_default();
        for (digest, content_paths) in &staged.manifest {
            if manifest.contains_key(digest) {
                // Content already held by an earlier version; the state
                // entry will resolve to the earliest content path.
                continue;
            }
            for content_path in content_paths {
                let source = staging_root.join(content_path);
                let destination = object_root.join(content_path);
                if let Some(parent) = destination.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(&source, &destination)?;
            }
            manifest.insert(digest.clone(), content_paths.clone());
        }

        let record = VersionRecord {
            created: date.unwrap_or_else(Utc::now),
            message: message.to_owned(),
            user: VersionUser {
                name: coordinator.username.clone(),
                address: coordinator.mailto_address(),
            },
            state,
        };

        let mut inventory = committed.unwrap_or_else(|| Inventory {
            id: id.to_owned(),
            spec_type: Inventory::SPEC_TYPE.to_owned(),
            digest_algorithm: Inventory::DIGEST_ALGORITHM.to_owned(),
            head: String::new(),
            manifest: BTreeMap::new(),
            versions: BTreeMap::new(),
        });
        inventory.head = version_name(number);
        inventory.manifest = manifest;
        inventory.versions.insert(inventory.head.clone(), record);
        inventory.save(&object_root.join(INVENTORY_FILE))?;
        inventory.save(
            &object_root
                .join(version_name(number))
                .join(INVENTORY_FILE),
        )?;

        fs::remove_dir_all(&staging_root)?;
        info!(object_id = id, version = number, "committed object version");
        Ok(())
    }

    fn get_object_files(&self, id: &str, include_staged: bool) -> GatewayResult<Vec<ObjectFile>> {
        let committed = self.committed_inventory(id)?;
        let staged = if include_staged {
            self.staged_inventory(id)?
        } else {
            None
        };
        if committed.is_none() && staged.is_none() {
            return Err(GatewayError::ObjectDoesNotExist(id.to_owned()));
        }

        let mut resolved: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
        if let Some(inventory) = &committed {
            let object_root = self.object_root(id);
            collect_object_files(inventory, &object_root, &mut resolved);
        }
        // Staged paths overlay committed ones for the same logical path.
        if let Some(inventory) = &staged {
            let staging_root = self.staging_root(id);
            collect_object_files(inventory, &staging_root, &mut resolved);
        }

        Ok(resolved
            .into_iter()
            .map(|(logical_path, literal_path)| ObjectFile::new(logical_path, literal_path))
            .collect())
    }

    fn log(&self, id: &str, order: LogOrder) -> GatewayResult<Vec<VersionInfo>> {
        let inventory = self
            .committed_inventory(id)?
            .ok_or_else(|| GatewayError::ObjectDoesNotExist(id.to_owned()))?;

        let mut entries: Vec<VersionInfo> = inventory
            .versions
            .iter()
            .filter_map(|(name, record)| {
                crate::inventory::version_number(name).map(|number| VersionInfo {
                    version: number,
                    author: format!("{} <{}>", record.user.name, record.user.address),
                    date: record.created,
                    message: record.message.clone(),
                })
            })
            .collect();
        entries.sort_by_key(|entry| entry.version);
        if order == LogOrder::Descending {
            entries.reverse();
        }
        Ok(entries)
    }

    fn purge_object(&self, id: &str) -> GatewayResult<()> {
        let object_root = self.object_root(id);
        if object_root.exists() {
            fs::remove_dir_all(&object_root)?;
        }
        let staging_root = self.staging_root(id);
        if staging_root.exists() {
            fs::remove_dir_all(&staging_root)?;
        }
        info!(object_id = id, "purged object");
        Ok(())
    }
}

/// Resolve every logical path in the inventory's head state against `root`.
fn collect_object_files(
    inventory: &Inventory,
    root: &Path,
    resolved: &mut BTreeMap<PathBuf, PathBuf>,
) {
    let Some(record) = inventory.head_version() else {
        return;
    };
    for (digest, logical_paths) in &record.state {
        for logical_path in logical_paths {
            if let Some(content_path) = inventory.resolve_content_path(digest, logical_path) {
                resolved.insert(PathBuf::from(logical_path), root.join(content_path));
            }
        }
    }
}

/// Render a relative path with `/` separators, as stored in inventories.
fn path_string(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
