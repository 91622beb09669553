use tracing::warn;

use crate::bag::BagReader;
use crate::error::WorkflowResult;
use crate::events::Event;
use crate::handlers::unexpected;
use crate::uow::UnitOfWork;
use crate::workspace::Workspace;

/// Check a received package against the deposit contract.
///
/// A contract violation is an outcome, not an error: the run transitions
/// to the terminal `PackageNotVerified` carrying the reason, and the
/// handler still returns `Ok`.
pub fn verify_package(event: &Event, uow: &mut UnitOfWork) -> WorkflowResult<()> {
    let Event::PackageReceived {
        package_identifier,
        tracking_identifier,
        update_flag,
        workspace_identifier,
    } = event
    else {
        return Err(unexpected(event));
    };

    let workspace = Workspace::new(workspace_identifier.clone());
    let reader = BagReader::load(workspace.package_directory());
    match reader.validate() {
        Ok(()) => uow.add_event(Event::PackageVerified {
            package_identifier: package_identifier.clone(),
            tracking_identifier: tracking_identifier.clone(),
            update_flag: *update_flag,
            workspace_identifier: workspace_identifier.clone(),
        }),
        Err(validation) => {
            warn!(
                package = package_identifier,
                reason = %validation,
                "package failed verification"
            );
            uow.add_event(Event::PackageNotVerified {
                package_identifier: package_identifier.clone(),
                tracking_identifier: tracking_identifier.clone(),
                message: validation.message,
            });
        }
    }
    Ok(())
}
