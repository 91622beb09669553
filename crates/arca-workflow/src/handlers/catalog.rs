use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use arca_catalog::Revision;

use crate::error::{WorkflowError, WorkflowResult};
use crate::events::Event;
use crate::handlers::unexpected;
use crate::resources::ROOT_RESOURCE_TYPE;
use crate::uow::UnitOfWork;

/// Write a catalog revision row for the freshly stored version.
///
/// The revision's common metadata is read back out of storage rather than
/// the workspace, so the catalog reflects exactly what was preserved.
pub fn catalog_revision(event: &Event, uow: &mut UnitOfWork) -> WorkflowResult<()> {
    let Event::PackageStored {
        package_identifier,
        tracking_identifier,
        update_flag,
        identifier,
        resources,
        workspace_identifier,
        revision_number,
    } = event
    else {
        return Err(unexpected(event));
    };

    let root_resource = resources
        .iter()
        .find(|resource| resource.kind == ROOT_RESOURCE_TYPE)
        .ok_or_else(|| WorkflowError::MissingRootResource(identifier.clone()))?;
    let common_reference = root_resource
        .metadata_files
        .iter()
        .find(|metadata| metadata.reference.locref.contains("common"))
        .ok_or_else(|| WorkflowError::MissingCommonMetadata(identifier.clone()))?;
    let common_path = PathBuf::from(&common_reference.reference.locref);

    let object_files = uow.gateway.get_object_files(identifier, false)?;
    let common_file = object_files
        .iter()
        .find(|file| file.logical_path == common_path)
        .ok_or_else(|| WorkflowError::MissingCommonMetadata(identifier.clone()))?;
    let raw = fs::read_to_string(&common_file.literal_path)?;
    let common_metadata: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| WorkflowError::Serialization(e.to_string()))?;

    let revision = Revision {
        identifier: Uuid::parse_str(identifier)
            .map_err(|_| WorkflowError::InvalidIdentifier(identifier.clone()))?,
        alternate_identifiers: vec![root_resource.alternate_identifier.id.clone()],
        revision_number: *revision_number,
        created_at: Utc::now(),
        common_metadata,
        package_resources: resources.clone(),
    };

    let mut tx = uow.begin();
    tx.add_revision(revision);
    tx.commit()?;

    uow.add_event(Event::RevisionCataloged {
        package_identifier: package_identifier.clone(),
        tracking_identifier: tracking_identifier.clone(),
        update_flag: *update_flag,
        identifier: identifier.clone(),
        workspace_identifier: workspace_identifier.clone(),
    });
    Ok(())
}
