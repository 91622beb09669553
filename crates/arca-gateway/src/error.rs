/// Errors produced by repository gateway operations.
///
/// The precondition variants (`ObjectDoesNotExist`, `ObjectAlreadyExists`,
/// `StagedObjectAlreadyExists`, `NoStagedChanges`) are always surfaced to
/// the caller and never silently retried. `Repository` wraps any unexpected
/// backend failure and must be treated as fatal for that operation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("object {0} does not exist")]
    ObjectDoesNotExist(String),

    #[error("object {0} already exists")]
    ObjectAlreadyExists(String),

    #[error("a staged version already exists for object {0}")]
    StagedObjectAlreadyExists(String),

    #[error("no staged changes found for object {0}")]
    NoStagedChanges(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("inventory serialization error: {0}")]
    Serialization(String),

    #[error("repository gateway error: {0}")]
    Repository(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
