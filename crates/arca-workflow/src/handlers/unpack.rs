use arca_types::{CommitInfo, Coordinator};

use crate::bag::BagReader;
use crate::error::{WorkflowError, WorkflowResult};
use crate::events::Event;
use crate::handlers::unexpected;
use crate::resources::ResourceProvider;
use crate::uow::UnitOfWork;
use crate::workspace::Workspace;

/// Parse a verified package's descriptors and extract the object
/// identifier, resource set, and commit intent for the steps downstream.
///
/// The commit intent comes from the root resource's `update` preservation
/// event on an update deposit, or its `ingest` event otherwise: the
/// event's agent becomes the version author and its detail the commit
/// message.
pub fn unpack_package(event: &Event, uow: &mut UnitOfWork) -> WorkflowResult<()> {
    let Event::PackageVerified {
        package_identifier,
        tracking_identifier,
        update_flag,
        workspace_identifier,
    } = event
    else {
        return Err(unexpected(event));
    };

    let mut workspace = Workspace::new(workspace_identifier.clone());
    let reader = BagReader::load(workspace.package_directory());
    let root_identifier = reader.info_value("Root-Identifier")?;
    workspace.set_root_identifier(&root_identifier);

    let resources = ResourceProvider::new(workspace.object_data_directory()?).resources()?;
    let root_resource = resources
        .iter()
        .find(|resource| resource.id.to_string() == root_identifier)
        .ok_or_else(|| WorkflowError::MissingRootResource(root_identifier.clone()))?;

    let event_kind = if *update_flag { "update" } else { "ingest" };
    let preservation_event = root_resource.event_of_kind(event_kind).ok_or_else(|| {
        WorkflowError::MissingPreservationEvent(root_identifier.clone(), event_kind.to_string())
    })?;
    let version_info = CommitInfo::new(
        Coordinator::new(
            preservation_event.agent.address.clone(),
            preservation_event.agent.address.clone(),
        ),
        preservation_event.detail.clone(),
    );

    uow.add_event(Event::PackageUnpacked {
        package_identifier: package_identifier.clone(),
        tracking_identifier: tracking_identifier.clone(),
        update_flag: *update_flag,
        identifier: root_identifier,
        resources,
        version_info,
        workspace_identifier: workspace_identifier.clone(),
    });
    Ok(())
}
