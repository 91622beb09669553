use std::fs;
use std::path::PathBuf;

use arca_types::PackageResource;

use crate::error::{WorkflowError, WorkflowResult};

/// The resource type naming the primary preservable object of a package.
pub const ROOT_RESOURCE_TYPE: &str = "Monograph";

/// Reads the resource descriptors out of an unpacked object data tree.
///
/// Descriptors live as JSON files under `<object data>/descriptor/`, one
/// per resource.
pub struct ResourceProvider {
    data_path: PathBuf,
}

impl ResourceProvider {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    /// Every resource described by the package, in descriptor filename
    /// order.
    pub fn resources(&self) -> WorkflowResult<Vec<PackageResource>> {
        let descriptor_path = self.data_path.join("descriptor");
        let mut descriptor_files: Vec<PathBuf> = fs::read_dir(&descriptor_path)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        descriptor_files.sort();

        let mut resources = Vec::with_capacity(descriptor_files.len());
        for descriptor_file in descriptor_files {
            let raw = fs::read_to_string(&descriptor_file)?;
            let resource: PackageResource = serde_json::from_str(&raw).map_err(|e| {
                WorkflowError::Serialization(format!(
                    "{}: {e}",
                    descriptor_file.display()
                ))
            })?;
            resources.push(resource);
        }
        Ok(resources)
    }
}
