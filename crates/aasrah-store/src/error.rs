use aasrah_shared::ServiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Creating the data directory or reading/writing an image file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A local storage value is not the JSON shape its reader expects.
    #[error("Malformed stored value: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Migration {version} failed: {reason}")]
    Migration { version: u32, reason: String },

    /// A thread panicked while holding the database lock.
    #[error("Database lock poisoned")]
    Poisoned,
}

/// Local backends surface every store failure as a storage error.
impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
