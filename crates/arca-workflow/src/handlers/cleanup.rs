use tracing::debug;

use crate::error::WorkflowResult;
use crate::events::Event;
use crate::handlers::unexpected;
use crate::uow::UnitOfWork;
use crate::workspace::Workspace;

/// Delete the workspace after an update deposit has been cataloged.
///
/// First-ingest workspaces are kept on disk for operator inspection; only
/// the update flow cleans up, so repeat revisions of the same object do
/// not accumulate working copies.
pub fn cleanup_workspace(event: &Event, uow: &mut UnitOfWork) -> WorkflowResult<()> {
    let Event::RevisionCataloged {
        package_identifier,
        tracking_identifier,
        update_flag,
        workspace_identifier,
        ..
    } = event
    else {
        return Err(unexpected(event));
    };

    if !*update_flag {
        debug!(package = package_identifier, "retaining first-ingest workspace");
        return Ok(());
    }

    Workspace::new(workspace_identifier.clone()).remove()?;
    uow.add_event(Event::WorkspaceCleaned {
        package_identifier: package_identifier.clone(),
        tracking_identifier: tracking_identifier.clone(),
    });
    Ok(())
}
