//! End-to-end ingestion runs against real on-disk packages and storage.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arca_catalog::{Catalog, EventStore, InMemoryCatalog, InMemoryEventStore, WorkflowEventType};
use arca_gateway::{EmbeddedRepositoryGateway, RepositoryGateway, StorageLayout};
use arca_types::LogOrder;
use arca_workflow::{build_message_bus, Command, Event, Message, Translocator, UnitOfWork};
use uuid::Uuid;

const ROOT_ID: &str = "00000000-0000-0000-0000-000000000001";

struct Fixture {
    _root: tempfile::TempDir,
    inbox: PathBuf,
    workspaces: PathBuf,
    gateway: Arc<EmbeddedRepositoryGateway>,
    catalog: Arc<InMemoryCatalog>,
    event_store: Arc<InMemoryEventStore>,
}

impl Fixture {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let root = tempfile::tempdir().unwrap();
        let inbox = root.path().join("inbox");
        let workspaces = root.path().join("workspaces");
        let storage = root.path().join("storage");
        fs::create_dir_all(&inbox).unwrap();
        fs::create_dir_all(&workspaces).unwrap();
        fs::create_dir_all(&storage).unwrap();

        let gateway = Arc::new(EmbeddedRepositoryGateway::new(&storage, StorageLayout::FlatDirect));
        gateway.create_repository().unwrap();

        Self {
            _root: root,
            inbox,
            workspaces,
            gateway,
            catalog: Arc::new(InMemoryCatalog::new()),
            event_store: Arc::new(InMemoryEventStore::new()),
        }
    }

    fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(
            self.gateway.clone(),
            self.catalog.clone(),
            self.event_store.clone(),
        )
    }

    fn dispatch(&self, message: Message) {
        let translocator = Arc::new(Translocator::new(&self.inbox, &self.workspaces));
        let bus = build_message_bus(translocator).unwrap();
        let mut uow = self.unit_of_work();
        bus.handle(message, &mut uow).unwrap();
    }
}

fn descriptor(event_kind: &str, page_file: &str) -> String {
    format!(
        r#"{{
            "id": "{ROOT_ID}",
            "type": "Monograph",
            "alternate_identifier": {{"type": "DLXS", "id": "xyzzy:0001"}},
            "events": [
                {{
                    "identifier": "e1",
                    "type": "{event_kind}",
                    "datetime": "2026-08-27T12:00:00Z",
                    "detail": "Giving it our all",
                    "agent": {{"address": "steward@example.edu", "role": "collection manager"}}
                }}
            ],
            "metadata_files": [
                {{"id": "m1", "use": "function:source", "ref": {{"locref": "metadata/common.json"}}}}
            ],
            "data_files": [
                {{"id": "d1", "use": "function:source", "ref": {{"locref": "{page_file}"}}}}
            ],
            "root": true
        }}"#
    )
}

/// Lay down a conforming deposit package under `inbox/<name>`.
fn write_package(inbox: &Path, name: &str, event_kind: &str, page_text: &str, declare_info: bool) {
    let bag = inbox.join(name);
    let object_data = bag.join("data").join(ROOT_ID);
    fs::create_dir_all(object_data.join("descriptor")).unwrap();
    fs::create_dir_all(object_data.join("metadata")).unwrap();
    fs::create_dir_all(object_data.join("data")).unwrap();

    fs::write(bag.join("bagit.txt"), "BagIt-Version: 1.0\nTag-File-Character-Encoding: UTF-8\n")
        .unwrap();
    fs::write(bag.join("dor-info.txt"), format!("Root-Identifier: {ROOT_ID}\n")).unwrap();
    fs::write(
        object_data.join("descriptor/xyzzy-0001.monograph.json"),
        descriptor(event_kind, "data/00000001.txt"),
    )
    .unwrap();
    fs::write(
        object_data.join("metadata/common.json"),
        "{\"title\": \"A Most Serious Monograph\"}\n",
    )
    .unwrap();
    fs::write(object_data.join("data/00000001.txt"), page_text).unwrap();

    fs::write(
        bag.join("manifest-sha512.txt"),
        format!(
            "aa11 data/{ROOT_ID}/descriptor/xyzzy-0001.monograph.json\n\
             bb22 data/{ROOT_ID}/metadata/common.json\n\
             cc33 data/{ROOT_ID}/data/00000001.txt\n"
        ),
    )
    .unwrap();
    let mut tagmanifest = String::from("dd44 bagit.txt\nee55 manifest-sha512.txt\n");
    if declare_info {
        tagmanifest.push_str("ff66 dor-info.txt\n");
    }
    fs::write(bag.join("tagmanifest-sha512.txt"), tagmanifest).unwrap();
}

#[test]
fn deposit_ingests_stores_and_catalogs_a_package() {
    let fixture = Fixture::new();
    write_package(&fixture.inbox, "xyzzy-0001-v1", "ingest", "page one\n", true);

    fixture.dispatch(Message::Command(Command::DepositPackage {
        package_identifier: "xyzzy-0001-v1".into(),
        update_flag: false,
    }));

    // The object landed in storage with exactly the declared files.
    assert!(fixture.gateway.has_object(ROOT_ID).unwrap());
    let files = fixture.gateway.get_object_files(ROOT_ID, false).unwrap();
    let logical: Vec<_> = files
        .iter()
        .map(|f| f.logical_path.to_string_lossy().into_owned())
        .collect();
    assert_eq!(logical, vec!["data/00000001.txt", "metadata/common.json"]);

    // The commit carries the preservation event's agent and detail.
    let log = fixture.gateway.log(ROOT_ID, LogOrder::Descending).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].author, "steward@example.edu <mailto:steward@example.edu>");
    assert_eq!(log[0].message, "Giving it our all");

    // One revision row, reachable both ways.
    let revision = fixture
        .catalog
        .get(Uuid::parse_str(ROOT_ID).unwrap())
        .unwrap()
        .expect("revision cataloged");
    assert_eq!(revision.revision_number, 1);
    assert_eq!(revision.common_metadata["title"], "A Most Serious Monograph");
    assert!(fixture
        .catalog
        .get_by_alternate_identifier("xyzzy:0001")
        .unwrap()
        .is_some());

    // Six audited transitions: submitted through cataloged, no cleanup on
    // first ingest.
    assert_eq!(fixture.event_store.len(), 6);

    // The inbox copy survives the run.
    assert!(fixture.inbox.join("xyzzy-0001-v1").join("bagit.txt").is_file());
}

#[test]
fn verification_failure_halts_before_storage() {
    let fixture = Fixture::new();
    write_package(&fixture.inbox, "xyzzy-0001-v1", "ingest", "page one\n", false);

    fixture.dispatch(Message::Event(Event::PackageSubmitted {
        package_identifier: "xyzzy-0001-v1".into(),
        tracking_identifier: "t-fail".into(),
        update_flag: false,
    }));

    assert!(!fixture.gateway.has_object(ROOT_ID).unwrap());
    assert!(fixture.catalog.is_empty());

    let rows = fixture
        .event_store
        .get_all_by_tracking_identifier("t-fail")
        .unwrap();
    assert_eq!(rows.len(), 3);
    let failure = rows
        .iter()
        .find(|row| row.event_type == WorkflowEventType::PackageNotVerified)
        .expect("failure audited");
    assert_eq!(
        failure.message.as_deref(),
        Some("dor-info.txt must be listed in the tagmanifest file.")
    );
}

#[test]
fn update_deposit_creates_version_two_and_cleans_workspace() {
    let fixture = Fixture::new();
    write_package(&fixture.inbox, "xyzzy-0001-v1", "ingest", "page one\n", true);
    fixture.dispatch(Message::Command(Command::DepositPackage {
        package_identifier: "xyzzy-0001-v1".into(),
        update_flag: false,
    }));

    write_package(
        &fixture.inbox,
        "xyzzy-0001-v2",
        "update",
        "page one, corrected\n",
        true,
    );
    fixture.dispatch(Message::Event(Event::PackageSubmitted {
        package_identifier: "xyzzy-0001-v2".into(),
        tracking_identifier: "t-update".into(),
        update_flag: true,
    }));

    let log = fixture.gateway.log(ROOT_ID, LogOrder::Ascending).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].version, 2);

    // HEAD resolves to the corrected page.
    let files = fixture.gateway.get_object_files(ROOT_ID, true).unwrap();
    let page = files
        .iter()
        .find(|f| f.logical_path == PathBuf::from("data/00000001.txt"))
        .expect("page present");
    assert_eq!(
        fs::read_to_string(&page.literal_path).unwrap(),
        "page one, corrected\n"
    );

    // The update run audits all seven transitions, including cleanup.
    let rows = fixture
        .event_store
        .get_all_by_tracking_identifier("t-update")
        .unwrap();
    assert_eq!(rows.len(), 7);
    assert!(rows
        .iter()
        .any(|row| row.event_type == WorkflowEventType::WorkspaceCleaned));

    // Exactly one workspace remains: the retained first-ingest copy.
    let remaining: Vec<_> = fs::read_dir(&fixture.workspaces)
        .unwrap()
        .flatten()
        .collect();
    assert_eq!(remaining.len(), 1);
}
