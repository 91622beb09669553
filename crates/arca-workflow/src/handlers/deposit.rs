use tracing::info;
use uuid::Uuid;

use crate::commands::Command;
use crate::error::{WorkflowError, WorkflowResult};
use crate::events::Event;
use crate::uow::UnitOfWork;

/// Start an ingestion run for a package sitting in the inbox.
///
/// Mints the tracking identifier that correlates every subsequent event
/// and audit row of this run.
pub fn deposit_package(command: &Command, uow: &mut UnitOfWork) -> WorkflowResult<()> {
    let Command::DepositPackage {
        package_identifier,
        update_flag,
    } = command
    else {
        return Err(WorkflowError::NoHandlerForCommand(
            command.kind().to_string(),
        ));
    };

    let tracking_identifier = Uuid::now_v7().to_string();
    info!(
        package = package_identifier,
        tracking = tracking_identifier,
        update = update_flag,
        "starting ingestion"
    );
    uow.add_event(Event::PackageSubmitted {
        package_identifier: package_identifier.clone(),
        tracking_identifier,
        update_flag: *update_flag,
    });
    Ok(())
}
