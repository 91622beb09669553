use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;
use walkdir::WalkDir;

use arca_types::Bundle;

use crate::error::{WorkflowError, WorkflowResult};

/// A private working directory holding one received package.
///
/// The workspace identifier doubles as its filesystem path. The root
/// identifier is learned during unpacking and is required before the
/// object data directory can be addressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workspace {
    identifier: String,
    root_identifier: Option<String>,
}

impl Workspace {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            root_identifier: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn set_root_identifier(&mut self, root_identifier: impl Into<String>) {
        self.root_identifier = Some(root_identifier.into());
    }

    /// The directory holding the package's full contents.
    pub fn package_directory(&self) -> PathBuf {
        PathBuf::from(&self.identifier)
    }

    /// The payload subtree belonging to the root object:
    /// `<package>/data/<root identifier>`.
    pub fn object_data_directory(&self) -> WorkflowResult<PathBuf> {
        let root_identifier = self
            .root_identifier
            .as_deref()
            .ok_or(WorkflowError::MissingPackageInfoKey("Root-Identifier"))?;
        Ok(self.package_directory().join("data").join(root_identifier))
    }

    /// Bundle the given entries rooted at the object data directory, ready
    /// for staging.
    pub fn bundle(&self, entries: Vec<PathBuf>) -> WorkflowResult<Bundle> {
        Ok(Bundle::new(self.object_data_directory()?, entries))
    }

    /// Delete the workspace directory and everything under it.
    pub fn remove(&self) -> WorkflowResult<()> {
        fs::remove_dir_all(self.package_directory())?;
        Ok(())
    }
}

/// Copies packages from the shared inbox into freshly minted workspaces.
#[derive(Clone, Debug)]
pub struct Translocator {
    inbox_path: PathBuf,
    workspaces_path: PathBuf,
}

impl Translocator {
    pub fn new(inbox_path: impl Into<PathBuf>, workspaces_path: impl Into<PathBuf>) -> Self {
        Self {
            inbox_path: inbox_path.into(),
            workspaces_path: workspaces_path.into(),
        }
    }

    /// Copy `inbox/<package identifier>` into a new workspace directory
    /// named by a fresh UUID. The inbox copy is left untouched.
    pub fn create_workspace_for_package(&self, package_identifier: &str) -> WorkflowResult<Workspace> {
        let source = self.inbox_path.join(package_identifier);
        let destination = self.workspaces_path.join(Uuid::now_v7().to_string());
        debug!(package = package_identifier, workspace = %destination.display(), "receiving package");
        copy_directory(&source, &destination)?;
        Ok(Workspace::new(destination.to_string_lossy()))
    }
}

fn copy_directory(source: &Path, destination: &Path) -> WorkflowResult<()> {
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| WorkflowError::Io(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| WorkflowError::Serialization(e.to_string()))?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
