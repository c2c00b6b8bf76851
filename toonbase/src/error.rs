use std::io;
use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    RequestFailed(Arc<reqwest::Error>),
    #[error("catalog could not be read: {0}")]
    ReadFailed(Arc<io::Error>),
    #[error("catalog is malformed: {0}")]
    Malformed(Arc<serde_json::Error>),
}

impl FetchError {
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }

    pub fn is_transport(&self) -> bool {
        !self.is_decode()
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        Self::RequestFailed(Arc::new(error))
    }
}

impl From<io::Error> for FetchError {
    fn from(error: io::Error) -> Self {
        Self::ReadFailed(Arc::new(error))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(Arc::new(error))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("database failed: {0}")]
    Database(Arc<sqlx::Error>),
    #[error("database file is not accessible: {0}")]
    Io(Arc<io::Error>),
}

impl From<sqlx::Error> for StorageError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database(Arc::new(error))
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        Self::Io(Arc::new(error))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("reminder scheduler is not running")]
    Stopped,
}
