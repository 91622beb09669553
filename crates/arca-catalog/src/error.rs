/// Errors produced by catalog and event-store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("catalog backend error: {0}")]
    Backend(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
