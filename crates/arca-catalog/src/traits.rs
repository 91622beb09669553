use uuid::Uuid;

use crate::error::CatalogResult;
use crate::revision::Revision;
use crate::workflow_event::WorkflowEvent;

/// The relational catalog boundary used by the ingestion workflow.
///
/// Only the operations the workflow needs are modeled here; query and
/// summary APIs live outside this core.
pub trait Catalog: Send + Sync {
    fn add(&self, revision: Revision) -> CatalogResult<()>;

    fn get(&self, identifier: Uuid) -> CatalogResult<Option<Revision>>;

    fn get_by_alternate_identifier(&self, identifier: &str) -> CatalogResult<Option<Revision>>;
}

/// Append-only audit trail of workflow transitions.
pub trait EventStore: Send + Sync {
    fn add(&self, event: WorkflowEvent) -> CatalogResult<()>;

    /// Every event sharing the tracking identifier, newest-first.
    fn get_all_by_tracking_identifier(
        &self,
        tracking_identifier: &str,
    ) -> CatalogResult<Vec<WorkflowEvent>>;
}
