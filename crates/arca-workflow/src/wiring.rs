use std::sync::Arc;

use crate::bus::MessageBus;
use crate::commands::CommandKind;
use crate::error::WorkflowResult;
use crate::events::EventKind;
use crate::handlers::{
    catalog::catalog_revision, cleanup::cleanup_workspace, deposit::deposit_package,
    receive::receive_package, record::record_workflow_event, store::store_files,
    unpack::unpack_package, verify::verify_package,
};
use crate::workspace::Translocator;

/// Wire the full ingestion workflow onto a fresh bus.
///
/// Every event variant gets the audit recorder first, then its step
/// handler; terminal variants get the recorder alone. The bus pushes
/// follow-ups onto a stack, so the recorder-then-step registration order
/// keeps each transition audited before the next one runs.
pub fn build_message_bus(translocator: Arc<Translocator>) -> WorkflowResult<MessageBus> {
    let mut bus = MessageBus::new();

    for kind in EventKind::ALL {
        bus.register_event_handler(kind, Box::new(record_workflow_event));
    }

    bus.register_event_handler(
        EventKind::PackageSubmitted,
        Box::new(move |event, uow| receive_package(event, uow, &translocator)),
    );
    bus.register_event_handler(EventKind::PackageReceived, Box::new(verify_package));
    bus.register_event_handler(EventKind::PackageVerified, Box::new(unpack_package));
    bus.register_event_handler(EventKind::PackageUnpacked, Box::new(store_files));
    bus.register_event_handler(EventKind::PackageStored, Box::new(catalog_revision));
    bus.register_event_handler(EventKind::RevisionCataloged, Box::new(cleanup_workspace));
    // PackageNotVerified and WorkspaceCleaned are terminal: audit only.

    bus.register_command_handler(CommandKind::DepositPackage, Box::new(deposit_package))?;

    Ok(bus)
}
