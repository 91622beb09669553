use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A set of file paths, relative to a root, handed to the gateway for
/// staging. Entries are resolved against `root_path` before copy and keep
/// their relative paths inside the staged version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub root_path: PathBuf,
    pub entries: Vec<PathBuf>,
}

impl Bundle {
    pub fn new(root_path: impl Into<PathBuf>, entries: Vec<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            entries,
        }
    }

    /// Resolve an entry to its on-disk location under the bundle root.
    pub fn resolve(&self, entry: &Path) -> PathBuf {
        self.root_path.join(entry)
    }
}

/// A resolved mapping from a tree-relative logical path to the physical
/// storage location currently holding its content.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectFile {
    pub logical_path: PathBuf,
    pub literal_path: PathBuf,
}

impl ObjectFile {
    pub fn new(logical_path: impl Into<PathBuf>, literal_path: impl Into<PathBuf>) -> Self {
        Self {
            logical_path: logical_path.into(),
            literal_path: literal_path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_resolves_entries_against_root() {
        let bundle = Bundle::new("/deposits/one", vec![PathBuf::from("B/B.txt")]);
        assert_eq!(
            bundle.resolve(Path::new("B/B.txt")),
            PathBuf::from("/deposits/one/B/B.txt")
        );
    }

    #[test]
    fn object_files_order_by_logical_path() {
        let mut files = vec![
            ObjectFile::new("b.txt", "v1/content/b.txt"),
            ObjectFile::new("a.txt", "v2/content/a.txt"),
        ];
        files.sort();
        assert_eq!(files[0].logical_path, PathBuf::from("a.txt"));
    }
}
