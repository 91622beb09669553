use std::path::PathBuf;

/// Namaste marker file declaring the versioning scheme at the storage root.
pub const ROOT_MARKER: &str = "0=ocfl_1.1";
pub const ROOT_MARKER_CONTENT: &str = "ocfl_1.1\n";

/// Directory under the storage root holding uncommitted (staged) versions.
pub const STAGING_EXTENSION: &str = "extensions/rocfl-staging";

/// How object directories are arranged under the storage root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageLayout {
    /// One directory per object, named by the object id.
    #[default]
    FlatDirect,
    /// Object directories keyed by a hashed n-tuple of the id, avoiding
    /// filesystem fanout for large repositories.
    HashedNTuple,
}

impl StorageLayout {
    /// The registered extension name for this layout, as recorded in the
    /// storage root and understood by external OCFL tooling.
    pub fn extension_name(&self) -> &'static str {
        match self {
            Self::FlatDirect => "0002-flat-direct-storage-layout",
            Self::HashedNTuple => "0004-hashed-n-tuple-storage-layout",
        }
    }

    /// The object directory for `id`, relative to the storage root.
    pub fn object_path(&self, id: &str) -> PathBuf {
        match self {
            Self::FlatDirect => PathBuf::from(id),
            Self::HashedNTuple => hashed_n_tuple_path(id),
        }
    }
}

/// Hashed path for an object id: three tuples of three hex characters from
/// the id's digest, then the full digest. Used by the hashed-n-tuple layout
/// and by the staging extension regardless of the committed layout.
pub fn hashed_n_tuple_path(id: &str) -> PathBuf {
    const TUPLE_SIZE: usize = 3;
    const NUM_TUPLES: usize = 3;

    let digest = hex::encode(blake3::hash(id.as_bytes()).as_bytes());
    let mut path = PathBuf::new();
    for i in 0..NUM_TUPLES {
        path.push(&digest[i * TUPLE_SIZE..(i + 1) * TUPLE_SIZE]);
    }
    path.push(&digest);
    path
}

/// The staging directory for `id`, relative to the storage root.
pub fn staging_path(id: &str) -> PathBuf {
    PathBuf::from(STAGING_EXTENSION).join(hashed_n_tuple_path(id))
}
