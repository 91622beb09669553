use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use arca_types::{Bundle, Coordinator, LogOrder, ObjectFile, VersionInfo};

use crate::error::{GatewayError, GatewayResult};
use crate::traits::RepositoryGateway;

#[derive(Clone, Debug)]
struct StoredVersion {
    number: u32,
    coordinator: Coordinator,
    message: String,
    date: DateTime<Utc>,
    files: BTreeSet<PathBuf>,
}

#[derive(Clone, Debug, Default)]
struct StoredObject {
    versions: Vec<StoredVersion>,
    staged_files: Option<BTreeSet<PathBuf>>,
}

/// In-memory gateway for tests and embedding.
///
/// Tracks logical paths only — literal paths mirror logical ones — but
/// honors the same staging/commit preconditions as the real backends.
#[derive(Default)]
pub struct InMemoryRepositoryGateway {
    store: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryRepositoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryGateway for InMemoryRepositoryGateway {
    fn create_repository(&self) -> GatewayResult<()> {
        Ok(())
    }

    fn has_object(&self, id: &str) -> GatewayResult<bool> {
        let store = self.store.read().expect("lock poisoned");
        Ok(store.get(id).is_some_and(|object| !object.versions.is_empty()))
    }

    fn create_staged_object(&self, id: &str) -> GatewayResult<()> {
        let mut store = self.store.write().expect("lock poisoned");
        let object = store.entry(id.to_owned()).or_default();
        if object.staged_files.is_some() {
            return Err(GatewayError::StagedObjectAlreadyExists(id.to_owned()));
        }
        object.staged_files = Some(BTreeSet::new());
        Ok(())
    }

    fn stage_object_files(&self, id: &str, source_bundle: &Bundle) -> GatewayResult<()> {
        let mut store = self.store.write().expect("lock poisoned");
        let object = store
            .get_mut(id)
            .ok_or_else(|| GatewayError::ObjectDoesNotExist(id.to_owned()))?;
        // An existing object may be staged implicitly; a brand-new one may not.
        if object.staged_files.is_none() && object.versions.is_empty() {
            return Err(GatewayError::ObjectDoesNotExist(id.to_owned()));
        }
        let staged = object.staged_files.get_or_insert_with(BTreeSet::new);
        staged.extend(source_bundle.entries.iter().cloned());
        Ok(())
    }

    fn commit_object_changes(
        &self,
        id: &str,
        coordinator: &Coordinator,
        message: &str,
        date: Option<DateTime<Utc>>,
    ) -> GatewayResult<()> {
        let mut store = self.store.write().expect("lock poisoned");
        let object = store
            .get_mut(id)
            .ok_or_else(|| GatewayError::NoStagedChanges(id.to_owned()))?;
        let staged = object
            .staged_files
            .take()
            .ok_or_else(|| GatewayError::NoStagedChanges(id.to_owned()))?;
        if staged.is_empty() && !object.versions.is_empty() {
            object.staged_files = Some(staged);
            return Err(GatewayError::NoStagedChanges(id.to_owned()));
        }

        let latest = object.versions.last();
        let number = latest.map(|version| version.number + 1).unwrap_or(1);
        let mut files = latest.map(|version| version.files.clone()).unwrap_or_default();
        files.extend(staged);

        object.versions.push(StoredVersion {
            number,
            coordinator: coordinator.clone(),
            message: message.to_owned(),
            date: date.unwrap_or_else(Utc::now),
            files,
        });
        Ok(())
    }

    fn get_object_files(&self, id: &str, include_staged: bool) -> GatewayResult<Vec<ObjectFile>> {
        let store = self.store.read().expect("lock poisoned");
        let object = store
            .get(id)
            .ok_or_else(|| GatewayError::ObjectDoesNotExist(id.to_owned()))?;

        let mut files = object
            .versions
            .last()
            .map(|version| version.files.clone())
            .unwrap_or_default();
        if include_staged {
            if let Some(staged) = &object.staged_files {
                files.extend(staged.iter().cloned());
            }
        } else if object.versions.is_empty() {
            return Err(GatewayError::ObjectDoesNotExist(id.to_owned()));
        }

        Ok(files
            .into_iter()
            .map(|path| ObjectFile::new(path.clone(), path))
            .collect())
    }

    fn log(&self, id: &str, order: LogOrder) -> GatewayResult<Vec<VersionInfo>> {
        let store = self.store.read().expect("lock poisoned");
        let object = store
            .get(id)
            .filter(|object| !object.versions.is_empty())
            .ok_or_else(|| GatewayError::ObjectDoesNotExist(id.to_owned()))?;

        let mut entries: Vec<VersionInfo> = object
            .versions
            .iter()
            .map(|version| VersionInfo {
                version: version.number,
                author: version.coordinator.to_string(),
                date: version.date,
                message: version.message.clone(),
            })
            .collect();
        if order == LogOrder::Descending {
            entries.reverse();
        }
        Ok(entries)
    }

    fn purge_object(&self, id: &str) -> GatewayResult<()> {
        let mut store = self.store.write().expect("lock poisoned");
        store.remove(id);
        Ok(())
    }
}
