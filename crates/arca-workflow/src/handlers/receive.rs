use crate::error::WorkflowResult;
use crate::events::Event;
use crate::handlers::unexpected;
use crate::uow::UnitOfWork;
use crate::workspace::Translocator;

/// Copy a submitted package out of the inbox into a private workspace.
pub fn receive_package(
    event: &Event,
    uow: &mut UnitOfWork,
    translocator: &Translocator,
) -> WorkflowResult<()> {
    let Event::PackageSubmitted {
        package_identifier,
        tracking_identifier,
        update_flag,
    } = event
    else {
        return Err(unexpected(event));
    };

    let workspace = translocator.create_workspace_for_package(package_identifier)?;
    uow.add_event(Event::PackageReceived {
        package_identifier: package_identifier.clone(),
        tracking_identifier: tracking_identifier.clone(),
        update_flag: *update_flag,
        workspace_identifier: workspace.identifier().to_string(),
    });
    Ok(())
}
