use arca_catalog::WorkflowEvent;

use crate::error::WorkflowResult;
use crate::events::Event;
use crate::uow::UnitOfWork;

/// Persist one audit row for the transition being dispatched.
///
/// Registered ahead of the step handler for every event variant, in its
/// own transaction, so the trail records the transition even when the step
/// itself later fails.
pub fn record_workflow_event(event: &Event, uow: &mut UnitOfWork) -> WorkflowResult<()> {
    let record = WorkflowEvent::create(
        event.package_identifier(),
        event.tracking_identifier(),
        event.workflow_event_type(),
        event.message().map(str::to_owned),
    );
    let mut tx = uow.begin();
    tx.record_event(record);
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use arca_catalog::{EventStore, InMemoryCatalog, InMemoryEventStore, WorkflowEventType};
    use arca_gateway::InMemoryRepositoryGateway;

    #[test]
    fn each_transition_appends_one_audit_row() {
        let event_store = Arc::new(InMemoryEventStore::new());
        let mut uow = UnitOfWork::new(
            Arc::new(InMemoryRepositoryGateway::new()),
            Arc::new(InMemoryCatalog::new()),
            event_store.clone(),
        );

        record_workflow_event(
            &Event::PackageSubmitted {
                package_identifier: "pkg".into(),
                tracking_identifier: "t1".into(),
                update_flag: false,
            },
            &mut uow,
        )
        .unwrap();
        record_workflow_event(
            &Event::PackageNotVerified {
                package_identifier: "pkg".into(),
                tracking_identifier: "t1".into(),
                message: "bagit.txt does not exist.".into(),
            },
            &mut uow,
        )
        .unwrap();

        let rows = event_store.get_all_by_tracking_identifier("t1").unwrap();
        assert_eq!(rows.len(), 2);
        let failure = rows
            .iter()
            .find(|row| row.event_type == WorkflowEventType::PackageNotVerified)
            .expect("failure row present");
        assert_eq!(failure.message.as_deref(), Some("bagit.txt does not exist."));
    }
}
