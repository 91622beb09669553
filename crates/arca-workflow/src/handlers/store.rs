use tracing::info;

use arca_types::LogOrder;

use crate::error::WorkflowResult;
use crate::events::Event;
use crate::handlers::unexpected;
use crate::uow::UnitOfWork;
use crate::workspace::Workspace;

/// Stage every file the package's resources contribute and commit them as
/// the object's next version.
///
/// On a first ingest this creates v1; on an update it stages head+1
/// against the existing object. The version number reported downstream is
/// read back from the head of the log after the commit.
pub fn store_files(event: &Event, uow: &mut UnitOfWork) -> WorkflowResult<()> {
    let Event::PackageUnpacked {
        package_identifier,
        tracking_identifier,
        update_flag,
        identifier,
        resources,
        version_info,
        workspace_identifier,
    } = event
    else {
        return Err(unexpected(event));
    };

    let mut workspace = Workspace::new(workspace_identifier.clone());
    workspace.set_root_identifier(identifier);
    let entries = resources
        .iter()
        .flat_map(|resource| resource.entries())
        .collect();
    let bundle = workspace.bundle(entries)?;

    uow.gateway.create_staged_object(identifier)?;
    uow.gateway.stage_object_files(identifier, &bundle)?;
    uow.gateway.commit_object_changes(
        identifier,
        &version_info.coordinator,
        &version_info.message,
        None,
    )?;

    let revision_number = uow
        .gateway
        .log(identifier, LogOrder::Descending)?
        .first()
        .map(|version| version.version)
        .unwrap_or(1);
    info!(object = identifier, version = revision_number, "stored object version");

    uow.add_event(Event::PackageStored {
        package_identifier: package_identifier.clone(),
        tracking_identifier: tracking_identifier.clone(),
        update_flag: *update_flag,
        identifier: identifier.clone(),
        resources: resources.clone(),
        workspace_identifier: workspace_identifier.clone(),
        revision_number,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    use arca_catalog::{InMemoryCatalog, InMemoryEventStore};
    use arca_gateway::{EmbeddedRepositoryGateway, RepositoryGateway, StorageLayout};
    use arca_types::{
        AlternateIdentifier, CommitInfo, Coordinator, FileMetadata, FileReference, PackageResource,
    };
    use uuid::Uuid;

    const ROOT_ID: &str = "00000000-0000-0000-0000-000000000001";

    fn file(id: &str, locref: &str) -> FileMetadata {
        FileMetadata {
            id: id.into(),
            use_: "function:source".into(),
            groupid: None,
            reference: FileReference {
                locref: locref.into(),
                mdtype: None,
                mimetype: None,
            },
        }
    }

    fn resource() -> PackageResource {
        PackageResource {
            id: Uuid::parse_str(ROOT_ID).unwrap(),
            kind: "Monograph".into(),
            alternate_identifier: AlternateIdentifier {
                kind: "DLXS".into(),
                id: "xyzzy:0001".into(),
            },
            events: Vec::new(),
            metadata_files: vec![file("m1", "metadata/common.json")],
            data_files: vec![file("d1", "data/00000001.txt")],
            struct_maps: Vec::new(),
            root: true,
        }
    }

    fn write_object_data(workspace: &Path) {
        let data = workspace.join("data").join(ROOT_ID);
        fs::create_dir_all(data.join("metadata")).unwrap();
        fs::create_dir_all(data.join("data")).unwrap();
        fs::write(data.join("metadata/common.json"), "{\"title\": \"T\"}\n").unwrap();
        fs::write(data.join("data/00000001.txt"), "page one\n").unwrap();
    }

    fn unpacked(workspace: &Path) -> Event {
        Event::PackageUnpacked {
            package_identifier: "xyzzy-0001-v1".into(),
            tracking_identifier: "t1".into(),
            update_flag: false,
            identifier: ROOT_ID.into(),
            resources: vec![resource()],
            version_info: CommitInfo::new(
                Coordinator::new("steward@example.edu", "steward@example.edu"),
                "Giving it our all",
            ),
            workspace_identifier: workspace.to_string_lossy().into_owned(),
        }
    }

    #[test]
    fn store_commits_v1_and_reports_revision_number() {
        let root = tempfile::tempdir().unwrap();
        let workspace = root.path().join("ws-1");
        write_object_data(&workspace);
        let storage = root.path().join("storage");
        fs::create_dir_all(&storage).unwrap();
        let gateway = Arc::new(EmbeddedRepositoryGateway::new(&storage, StorageLayout::FlatDirect));
        gateway.create_repository().unwrap();

        let mut uow = UnitOfWork::new(
            gateway.clone(),
            Arc::new(InMemoryCatalog::new()),
            Arc::new(InMemoryEventStore::new()),
        );
        store_files(&unpacked(&workspace), &mut uow).unwrap();

        let Some(Event::PackageStored { revision_number, .. }) = uow.pop_event() else {
            panic!("expected PackageStored");
        };
        assert_eq!(revision_number, 1);
        assert!(gateway.has_object(ROOT_ID).unwrap());

        let files = gateway.get_object_files(ROOT_ID, false).unwrap();
        let logical: Vec<_> = files
            .iter()
            .map(|f| f.logical_path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(logical, vec!["data/00000001.txt", "metadata/common.json"]);
    }

    #[test]
    fn storing_again_produces_version_two() {
        let root = tempfile::tempdir().unwrap();
        let workspace = root.path().join("ws-1");
        write_object_data(&workspace);
        let storage = root.path().join("storage");
        fs::create_dir_all(&storage).unwrap();
        let gateway = Arc::new(EmbeddedRepositoryGateway::new(&storage, StorageLayout::FlatDirect));
        gateway.create_repository().unwrap();

        let mut uow = UnitOfWork::new(
            gateway,
            Arc::new(InMemoryCatalog::new()),
            Arc::new(InMemoryEventStore::new()),
        );
        store_files(&unpacked(&workspace), &mut uow).unwrap();
        uow.pop_event();

        fs::write(
            workspace.join("data").join(ROOT_ID).join("data/00000001.txt"),
            "page one, corrected\n",
        )
        .unwrap();
        store_files(&unpacked(&workspace), &mut uow).unwrap();

        let Some(Event::PackageStored { revision_number, .. }) = uow.pop_event() else {
            panic!("expected PackageStored");
        };
        assert_eq!(revision_number, 2);
    }
}
