use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::{WorkflowError, WorkflowResult};

/// The repository-specific tag file every deposit must carry, listed in
/// the bag's tagmanifest.
pub const INFO_TAG_FILE: &str = "dor-info.txt";

/// A deposit package that violates the contract. Carried in the
/// `PackageNotVerified` event rather than propagated as a workflow error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Reads BagIt-shaped deposit packages.
///
/// Validation checks the structural contract only: declaration and payload
/// present, manifests accounted for, and the repository's own tag file
/// declared. Fixity verification belongs to the packaging layer that sealed
/// the bag.
pub struct BagReader {
    path: PathBuf,
}

impl BagReader {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Check the package against the deposit contract.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.path.join("bagit.txt").is_file() {
            return Err(ValidationError::new("bagit.txt does not exist."));
        }
        if !self.path.join("data").is_dir() {
            return Err(ValidationError::new("Payload directory data does not exist."));
        }

        let manifests = self.tag_files_with_prefix("manifest-");
        if manifests.is_empty() {
            return Err(ValidationError::new("No manifest file found."));
        }
        for manifest in &manifests {
            for listed in manifest_paths(manifest) {
                if !self.path.join(&listed).is_file() {
                    return Err(ValidationError::new(format!(
                        "{} exists in manifest but was not found on filesystem.",
                        listed.display()
                    )));
                }
            }
        }

        let tagmanifests = self.tag_files_with_prefix("tagmanifest-");
        if tagmanifests.is_empty() {
            return Err(ValidationError::new("No tagmanifest file found."));
        }
        let info_listed = tagmanifests
            .iter()
            .any(|tagmanifest| manifest_paths(tagmanifest).contains(&PathBuf::from(INFO_TAG_FILE)));
        if !info_listed {
            return Err(ValidationError::new(format!(
                "{INFO_TAG_FILE} must be listed in the tagmanifest file."
            )));
        }
        if !self.path.join(INFO_TAG_FILE).is_file() {
            return Err(ValidationError::new(format!(
                "{INFO_TAG_FILE} does not exist."
            )));
        }
        Ok(())
    }

    /// Parse the repository tag file into its key/value pairs.
    pub fn info(&self) -> WorkflowResult<HashMap<String, String>> {
        let raw = fs::read_to_string(self.path.join(INFO_TAG_FILE))?;
        let mut info = HashMap::new();
        for line in raw.lines() {
            if let Some((key, value)) = line.split_once(':') {
                info.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Ok(info)
    }

    /// A required key from the repository tag file.
    pub fn info_value(&self, key: &'static str) -> WorkflowResult<String> {
        self.info()?
            .remove(key)
            .ok_or(WorkflowError::MissingPackageInfoKey(key))
    }

    fn tag_files_with_prefix(&self, prefix: &str) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.path) else {
            return Vec::new();
        };
        let mut matching: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with(prefix) && name.ends_with(".txt"))
            })
            .collect();
        matching.sort();
        matching
    }
}

/// The file paths named by a checksum manifest, one `<digest> <path>` pair
/// per line.
fn manifest_paths(manifest: &Path) -> Vec<PathBuf> {
    let Ok(raw) = fs::read_to_string(manifest) else {
        return Vec::new();
    };
    raw.lines()
        .filter_map(|line| {
            line.split_once(char::is_whitespace)
                .map(|(_, path)| PathBuf::from(path.trim()))
        })
        .collect()
}
