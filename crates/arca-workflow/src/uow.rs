use std::collections::VecDeque;
use std::sync::Arc;

use tracing::warn;

use arca_catalog::{Catalog, EventStore, Revision, WorkflowEvent};
use arca_gateway::RepositoryGateway;

use crate::error::WorkflowResult;
use crate::events::Event;

/// The collaborators a handler may touch during one message dispatch, plus
/// the outbox of follow-up events the dispatch produced.
///
/// The gateway is shared and not transactional: storage commits are
/// finalized by the gateway itself. Catalog and event-store writes go
/// through [`UnitOfWork::begin`] so a handler either persists all of its
/// rows or none of them.
pub struct UnitOfWork {
    pub gateway: Arc<dyn RepositoryGateway>,
    pub catalog: Arc<dyn Catalog>,
    pub event_store: Arc<dyn EventStore>,
    events: VecDeque<Event>,
}

impl UnitOfWork {
    pub fn new(
        gateway: Arc<dyn RepositoryGateway>,
        catalog: Arc<dyn Catalog>,
        event_store: Arc<dyn EventStore>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            event_store,
            events: VecDeque::new(),
        }
    }

    /// Queue a follow-up event for the bus to dispatch after the current
    /// handler returns.
    pub fn add_event(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Take the oldest queued follow-up event, if any.
    pub fn pop_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Open a write transaction against the catalog and event store.
    pub fn begin(&self) -> Transaction<'_> {
        Transaction {
            uow: self,
            pending_revisions: Vec::new(),
            pending_events: Vec::new(),
            committed: false,
        }
    }
}

/// Buffered catalog and event-store writes. Nothing reaches the backing
/// stores until [`commit`](Transaction::commit); a dropped transaction
/// discards its writes.
pub struct Transaction<'a> {
    uow: &'a UnitOfWork,
    pending_revisions: Vec<Revision>,
    pending_events: Vec<WorkflowEvent>,
    committed: bool,
}

impl Transaction<'_> {
    pub fn add_revision(&mut self, revision: Revision) {
        self.pending_revisions.push(revision);
    }

    pub fn record_event(&mut self, event: WorkflowEvent) {
        self.pending_events.push(event);
    }

    /// Flush all buffered writes.
    pub fn commit(mut self) -> WorkflowResult<()> {
        for revision in self.pending_revisions.drain(..) {
            self.uow.catalog.add(revision)?;
        }
        for event in self.pending_events.drain(..) {
            self.uow.event_store.add(event)?;
        }
        self.committed = true;
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed && !(self.pending_revisions.is_empty() && self.pending_events.is_empty())
        {
            warn!(
                revisions = self.pending_revisions.len(),
                events = self.pending_events.len(),
                "transaction dropped without commit; discarding writes"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use arca_catalog::{InMemoryCatalog, InMemoryEventStore, WorkflowEventType};
    use arca_gateway::InMemoryRepositoryGateway;

    fn unit_of_work() -> (UnitOfWork, Arc<InMemoryCatalog>, Arc<InMemoryEventStore>) {
        let catalog = Arc::new(InMemoryCatalog::new());
        let event_store = Arc::new(InMemoryEventStore::new());
        let uow = UnitOfWork::new(
            Arc::new(InMemoryRepositoryGateway::new()),
            catalog.clone(),
            event_store.clone(),
        );
        (uow, catalog, event_store)
    }

    #[test]
    fn events_pop_in_fifo_order() {
        let (mut uow, _, _) = unit_of_work();
        uow.add_event(Event::PackageSubmitted {
            package_identifier: "first".into(),
            tracking_identifier: "t1".into(),
            update_flag: false,
        });
        uow.add_event(Event::PackageSubmitted {
            package_identifier: "second".into(),
            tracking_identifier: "t1".into(),
            update_flag: false,
        });

        assert_eq!(uow.pop_event().unwrap().package_identifier(), "first");
        assert_eq!(uow.pop_event().unwrap().package_identifier(), "second");
        assert!(uow.pop_event().is_none());
    }

    #[test]
    fn commit_flushes_buffered_writes() {
        let (uow, _, event_store) = unit_of_work();
        let mut tx = uow.begin();
        tx.record_event(WorkflowEvent::create(
            "pkg",
            "t1",
            WorkflowEventType::PackageSubmitted,
            None,
        ));
        assert!(event_store.is_empty());
        tx.commit().unwrap();
        assert_eq!(event_store.len(), 1);
    }

    #[test]
    fn dropped_transaction_discards_writes() {
        let (uow, catalog, event_store) = unit_of_work();
        {
            let mut tx = uow.begin();
            tx.record_event(WorkflowEvent::create(
                "pkg",
                "t1",
                WorkflowEventType::PackageSubmitted,
                None,
            ));
        }
        assert!(catalog.is_empty());
        assert!(event_store.is_empty());
    }
}
