use std::fmt;

use serde::{Deserialize, Serialize};

use arca_catalog::WorkflowEventType;
use arca_types::{CommitInfo, PackageResource};

/// A state transition in the ingestion workflow.
///
/// Every variant carries the package identifier naming the deposited
/// package and the tracking identifier correlating one ingestion attempt
/// end to end. Handlers consume one variant and emit the next; the
/// terminal variants (`PackageNotVerified`, `WorkspaceCleaned`, and
/// `RevisionCataloged` on first ingest) emit nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A package has been deposited into the inbox and is ready for pickup.
    PackageSubmitted {
        package_identifier: String,
        tracking_identifier: String,
        /// `true` when the deposit revises an object already in storage.
        update_flag: bool,
    },
    /// The package has been copied out of the inbox into a private
    /// workspace.
    PackageReceived {
        package_identifier: String,
        tracking_identifier: String,
        update_flag: bool,
        workspace_identifier: String,
    },
    /// The package satisfies the deposit contract.
    PackageVerified {
        package_identifier: String,
        tracking_identifier: String,
        update_flag: bool,
        workspace_identifier: String,
    },
    /// The package violates the deposit contract. Terminal.
    PackageNotVerified {
        package_identifier: String,
        tracking_identifier: String,
        message: String,
    },
    /// The package's resource descriptors have been parsed and the object
    /// identifier and commit intent extracted.
    PackageUnpacked {
        package_identifier: String,
        tracking_identifier: String,
        update_flag: bool,
        /// The repository identifier of the object being ingested.
        identifier: String,
        resources: Vec<PackageResource>,
        version_info: CommitInfo,
        workspace_identifier: String,
    },
    /// The object's files have been committed as a new version.
    PackageStored {
        package_identifier: String,
        tracking_identifier: String,
        update_flag: bool,
        identifier: String,
        resources: Vec<PackageResource>,
        workspace_identifier: String,
        /// The version number the commit produced.
        revision_number: u32,
    },
    /// A revision row for the new version has been written to the catalog.
    RevisionCataloged {
        package_identifier: String,
        tracking_identifier: String,
        update_flag: bool,
        identifier: String,
        workspace_identifier: String,
    },
    /// The workspace for an update deposit has been deleted. Terminal.
    WorkspaceCleaned {
        package_identifier: String,
        tracking_identifier: String,
    },
}

/// Discriminant used to key handler registration. One per [`Event`]
/// variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    PackageSubmitted,
    PackageReceived,
    PackageVerified,
    PackageNotVerified,
    PackageUnpacked,
    PackageStored,
    RevisionCataloged,
    WorkspaceCleaned,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::PackageSubmitted,
        EventKind::PackageReceived,
        EventKind::PackageVerified,
        EventKind::PackageNotVerified,
        EventKind::PackageUnpacked,
        EventKind::PackageStored,
        EventKind::RevisionCataloged,
        EventKind::WorkspaceCleaned,
    ];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PackageSubmitted => "PackageSubmitted",
            Self::PackageReceived => "PackageReceived",
            Self::PackageVerified => "PackageVerified",
            Self::PackageNotVerified => "PackageNotVerified",
            Self::PackageUnpacked => "PackageUnpacked",
            Self::PackageStored => "PackageStored",
            Self::RevisionCataloged => "RevisionCataloged",
            Self::WorkspaceCleaned => "WorkspaceCleaned",
        };
        write!(f, "{s}")
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PackageSubmitted { .. } => EventKind::PackageSubmitted,
            Event::PackageReceived { .. } => EventKind::PackageReceived,
            Event::PackageVerified { .. } => EventKind::PackageVerified,
            Event::PackageNotVerified { .. } => EventKind::PackageNotVerified,
            Event::PackageUnpacked { .. } => EventKind::PackageUnpacked,
            Event::PackageStored { .. } => EventKind::PackageStored,
            Event::RevisionCataloged { .. } => EventKind::RevisionCataloged,
            Event::WorkspaceCleaned { .. } => EventKind::WorkspaceCleaned,
        }
    }

    /// The audit row type persisted for this transition.
    pub fn workflow_event_type(&self) -> WorkflowEventType {
        match self.kind() {
            EventKind::PackageSubmitted => WorkflowEventType::PackageSubmitted,
            EventKind::PackageReceived => WorkflowEventType::PackageReceived,
            EventKind::PackageVerified => WorkflowEventType::PackageVerified,
            EventKind::PackageNotVerified => WorkflowEventType::PackageNotVerified,
            EventKind::PackageUnpacked => WorkflowEventType::PackageUnpacked,
            EventKind::PackageStored => WorkflowEventType::PackageStored,
            EventKind::RevisionCataloged => WorkflowEventType::RevisionCataloged,
            EventKind::WorkspaceCleaned => WorkflowEventType::WorkspaceCleaned,
        }
    }

    pub fn package_identifier(&self) -> &str {
        match self {
            Event::PackageSubmitted { package_identifier, .. }
            | Event::PackageReceived { package_identifier, .. }
            | Event::PackageVerified { package_identifier, .. }
            | Event::PackageNotVerified { package_identifier, .. }
            | Event::PackageUnpacked { package_identifier, .. }
            | Event::PackageStored { package_identifier, .. }
            | Event::RevisionCataloged { package_identifier, .. }
            | Event::WorkspaceCleaned { package_identifier, .. } => package_identifier,
        }
    }

    pub fn tracking_identifier(&self) -> &str {
        match self {
            Event::PackageSubmitted { tracking_identifier, .. }
            | Event::PackageReceived { tracking_identifier, .. }
            | Event::PackageVerified { tracking_identifier, .. }
            | Event::PackageNotVerified { tracking_identifier, .. }
            | Event::PackageUnpacked { tracking_identifier, .. }
            | Event::PackageStored { tracking_identifier, .. }
            | Event::RevisionCataloged { tracking_identifier, .. }
            | Event::WorkspaceCleaned { tracking_identifier, .. } => tracking_identifier,
        }
    }

    /// The failure detail, for the one variant that carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Event::PackageNotVerified { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let event = Event::PackageSubmitted {
            package_identifier: "xyzzy-0001-v1".into(),
            tracking_identifier: "t1".into(),
            update_flag: false,
        };
        assert_eq!(event.kind(), EventKind::PackageSubmitted);
        assert_eq!(event.package_identifier(), "xyzzy-0001-v1");
        assert_eq!(event.tracking_identifier(), "t1");
        assert!(event.message().is_none());
    }

    #[test]
    fn message_present_only_on_not_verified() {
        let event = Event::PackageNotVerified {
            package_identifier: "pkg".into(),
            tracking_identifier: "t1".into(),
            message: "dor-info.txt must be listed in the tagmanifest file.".into(),
        };
        assert_eq!(
            event.message(),
            Some("dor-info.txt must be listed in the tagmanifest file.")
        );
    }

    #[test]
    fn every_kind_maps_to_an_audit_type() {
        // Display names line up with the persisted type names.
        for kind in EventKind::ALL {
            assert!(!kind.to_string().is_empty());
        }
    }
}
