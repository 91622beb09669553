use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The workflow transition a persisted [`WorkflowEvent`] records. Mirrors
/// the in-memory event variant names one-to-one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowEventType {
    PackageSubmitted,
    PackageReceived,
    PackageVerified,
    PackageNotVerified,
    PackageUnpacked,
    PackageStored,
    RevisionCataloged,
    WorkspaceCleaned,
}

impl fmt::Display for WorkflowEventType {
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

/// One row of the append-only workflow audit trail. Immutable once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub identifier: Uuid,
    pub package_identifier: String,
    /// Correlates all events belonging to one ingestion attempt.
    pub tracking_identifier: String,
    pub event_type: WorkflowEventType,
    pub timestamp: DateTime<Utc>,
    /// Failure detail, present only for events that carry one.
    pub message: Option<String>,
}

impl WorkflowEvent {
    /// Mint a new audit record stamped with the current time.
    pub fn create(
        package_identifier: impl Into<String>,
        tracking_identifier: impl Into<String>,
        event_type: WorkflowEventType,
        message: Option<String>,
    ) -> Self {
        Self {
            identifier: Uuid::now_v7(),
            package_identifier: package_identifier.into(),
            tracking_identifier: tracking_identifier.into(),
            event_type,
            timestamp: Utc::now(),
            message,
        }
    }
}
