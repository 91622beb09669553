use thiserror::Error;

use arca_catalog::CatalogError;
use arca_gateway::GatewayError;

/// Errors raised while driving the ingestion workflow.
///
/// Bag validation failures are deliberately absent: a package that fails
/// verification is a workflow outcome (`PackageNotVerified`), not an error.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no handler registered for event {0}")]
    NoHandlerForEvent(String),

    #[error("no handler registered for command {0}")]
    NoHandlerForCommand(String),

    #[error("a handler is already registered for command {0}")]
    CommandHandlerAlreadyRegistered(String),

    #[error("handler cannot process event {0}")]
    UnexpectedEvent(String),

    #[error("package info is missing required key {0}")]
    MissingPackageInfoKey(&'static str),

    #[error("no root resource found in package for object {0}")]
    MissingRootResource(String),

    #[error("root resource for object {0} carries no {1} preservation event")]
    MissingPreservationEvent(String, String),

    #[error("no common metadata file found for object {0}")]
    MissingCommonMetadata(String),

    #[error("object identifier {0} is not a valid UUID")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
