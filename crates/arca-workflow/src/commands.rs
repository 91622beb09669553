use std::fmt;

use serde::{Deserialize, Serialize};

/// An instruction from outside the workflow, as opposed to an [`Event`]
/// raised inside it.
///
/// [`Event`]: crate::events::Event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Ask the packaging layer to assemble a deposit package for a group of
    /// source files.
    CreatePackage {
        package_identifier: String,
        /// Arbitrary descriptive metadata forwarded to the packager.
        package_metadata: serde_json::Value,
    },
    /// Announce that a finished package is sitting in the inbox, starting
    /// an ingestion run.
    DepositPackage {
        package_identifier: String,
        /// `true` when the deposit revises an object already in storage.
        update_flag: bool,
    },
}

/// Discriminant used to key command-handler registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    CreatePackage,
    DepositPackage,
}

impl CommandKind {
    /// The wire name of the command, stable across releases.
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::CreatePackage => "package.create",
            Self::DepositPackage => "package.deposit",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.discriminator())
    }
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::CreatePackage { .. } => CommandKind::CreatePackage,
            Command::DepositPackage { .. } => CommandKind::DepositPackage,
        }
    }
}
