use std::sync::RwLock;

use uuid::Uuid;

use crate::error::CatalogResult;
use crate::revision::Revision;
use crate::traits::{Catalog, EventStore};
use crate::workflow_event::WorkflowEvent;

/// In-memory catalog for tests and embedding.
#[derive(Default)]
pub struct InMemoryCatalog {
    revisions: RwLock<Vec<Revision>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cataloged revisions.
    pub fn len(&self) -> usize {
        self.revisions.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.read().expect("lock poisoned").is_empty()
    }
}

impl Catalog for InMemoryCatalog {
    fn add(&self, revision: Revision) -> CatalogResult<()> {
        self.revisions.write().expect("lock poisoned").push(revision);
        Ok(())
    }

    fn get(&self, identifier: Uuid) -> CatalogResult<Option<Revision>> {
        let revisions = self.revisions.read().expect("lock poisoned");
        Ok(revisions
            .iter()
            .find(|revision| revision.identifier == identifier)
            .cloned())
    }

    fn get_by_alternate_identifier(&self, identifier: &str) -> CatalogResult<Option<Revision>> {
        let revisions = self.revisions.read().expect("lock poisoned");
        Ok(revisions
            .iter()
            .find(|revision| {
                revision
                    .alternate_identifiers
                    .iter()
                    .any(|alternate| alternate == identifier)
            })
            .cloned())
    }
}

/// In-memory workflow event log for tests and embedding.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<WorkflowEvent>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of recorded events, across all tracking identifiers.
    pub fn len(&self) -> usize {
        self.events.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().expect("lock poisoned").is_empty()
    }
}

impl EventStore for InMemoryEventStore {
    fn add(&self, event: WorkflowEvent) -> CatalogResult<()> {
        self.events.write().expect("lock poisoned").push(event);
        Ok(())
    }

    fn get_all_by_tracking_identifier(
        &self,
        tracking_identifier: &str,
    ) -> CatalogResult<Vec<WorkflowEvent>> {
        let events = self.events.read().expect("lock poisoned");
        let mut matching: Vec<WorkflowEvent> = events
            .iter()
            .filter(|event| event.tracking_identifier == tracking_identifier)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(matching)
    }
}
