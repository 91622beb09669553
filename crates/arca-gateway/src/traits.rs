use chrono::{DateTime, Utc};

use arca_types::{Bundle, Coordinator, LogOrder, ObjectFile, VersionInfo};

use crate::error::GatewayResult;

/// The storage engine boundary driven by the ingestion workflow.
///
/// All implementations must satisfy these invariants:
/// - A committed object's version history is append-only; no version is
///   ever mutated or deleted except by an explicit purge of the whole
///   object.
/// - Staged content is invisible to `has_object` and to
///   `get_object_files(id, false)` until committed; a failed ingestion
///   never leaves a half-written version as HEAD.
/// - At most one staged version exists per object at a time.
pub trait RepositoryGateway: Send + Sync {
    /// Initialize the storage root with the layout marker required by the
    /// versioning scheme. Only defined for an empty root.
    fn create_repository(&self) -> GatewayResult<()>;

    /// Returns `true` iff a committed (non-staged) version exists.
    fn has_object(&self, id: &str) -> GatewayResult<bool>;

    /// Open a new staging area for the object's next version (v1 if new,
    /// head+1 if existing).
    ///
    /// Fails with `StagedObjectAlreadyExists` if staging is already open
    /// for this id.
    fn create_staged_object(&self, id: &str) -> GatewayResult<()>;

    /// Copy each bundle entry into the staging area, preserving relative
    /// paths.
    ///
    /// Fails with `ObjectDoesNotExist` if neither a committed object nor an
    /// open staged version exists for `id`.
    fn stage_object_files(&self, id: &str, source_bundle: &Bundle) -> GatewayResult<()>;

    /// Finalize the staged version into an immutable new version, carrying
    /// forward unchanged content from the prior head. Clears the staging
    /// area on success. Uses `date` if given, else the current time.
    ///
    /// Fails with `NoStagedChanges` if no staging area is open.
    fn commit_object_changes(
        &self,
        id: &str,
        coordinator: &Coordinator,
        message: &str,
        date: Option<DateTime<Utc>>,
    ) -> GatewayResult<()>;

    /// Resolve every logical path visible in the object's HEAD state to the
    /// literal storage location holding its content. When multiple versions
    /// could supply identical content for a path, the earliest version that
    /// introduced that digest wins.
    ///
    /// With `include_staged`, staged paths overlay committed ones for the
    /// same logical path.
    fn get_object_files(&self, id: &str, include_staged: bool) -> GatewayResult<Vec<ObjectFile>>;

    /// The object's full version history, newest-first by default.
    fn log(&self, id: &str, order: LogOrder) -> GatewayResult<Vec<VersionInfo>>;

    /// Irreversibly remove the object and its history. A no-op if the
    /// object does not exist.
    fn purge_object(&self, id: &str) -> GatewayResult<()>;
}
