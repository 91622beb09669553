use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The human or agent attributed as author of a stored version.
///
/// The email is rendered in `mailto:` form when handed to the underlying
/// versioning machinery.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinator {
    pub username: String,
    pub email: String,
}

impl Coordinator {
    /// Create a new coordinator.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }

    /// The coordinator's address in the `mailto:` form recorded in version
    /// metadata.
    pub fn mailto_address(&self) -> String {
        format!("mailto:{}", self.email)
    }
}

impl fmt::Display for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.username, self.mailto_address())
    }
}

/// Commit intent carried through the ingestion workflow: who is committing
/// and why. Resolved into a full [`VersionInfo`] once the gateway finalizes
/// the version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub coordinator: Coordinator,
    pub message: String,
}

impl CommitInfo {
    pub fn new(coordinator: Coordinator, message: impl Into<String>) -> Self {
        Self {
            coordinator,
            message: message.into(),
        }
    }
}

/// One entry in an object's version log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Version number, starting at 1.
    pub version: u32,
    /// Author in `name <mailto:address>` form.
    pub author: String,
    /// When the version was committed.
    pub date: DateTime<Utc>,
    /// The commit message.
    pub message: String,
}

/// Ordering for version-log queries. Newest-first is the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogOrder {
    #[default]
    Descending,
    Ascending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinator_mailto_address() {
        let coordinator = Coordinator::new("test", "test@example.edu");
        assert_eq!(coordinator.mailto_address(), "mailto:test@example.edu");
    }

    #[test]
    fn coordinator_display_includes_mailto() {
        let coordinator = Coordinator::new("test", "test@example.edu");
        assert_eq!(
            coordinator.to_string(),
            "test <mailto:test@example.edu>"
        );
    }

    #[test]
    fn log_order_defaults_to_descending() {
        assert_eq!(LogOrder::default(), LogOrder::Descending);
    }
}
