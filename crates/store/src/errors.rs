use deadpool_sqlite::HookError;
use gymlog_model::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A store handle could not be resolved or opened
    #[error("Store not available: {0}")]
    Unavailable(String),
    #[error("Rusqlite error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Deadpool pool error: {0}")]
    Pool(#[from] deadpool_sqlite::PoolError),
    #[error("Deadpool interact error: {0}")]
    Interact(#[from] deadpool_sqlite::InteractError),
    #[error("Csv encode error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Json encode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Bundle error: {0}")]
    Bundle(#[from] zip::result::ZipError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for HookError {
    fn from(err: StoreError) -> Self {
        Self::Message(err.to_string())
    }
}
