use std::path::PathBuf;

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum FeedItemError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("malformed batch record: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("error unmarshalling {field} field: {source}")]
    CorruptField {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid release_date '{value}', expected YYYY-MM-DD")]
    DateFormat { value: String },
    #[error("Invalid ftype value {0}")]
    UnknownFeedType(String),
    #[error("Invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("error loading {}: {source}", file.display())]
    Batch {
        file: PathBuf,
        #[source]
        source: Box<FeedItemError>,
    },
}

impl FeedItemError {
    pub fn in_file(self, file: impl Into<PathBuf>) -> Self {
        FeedItemError::Batch {
            file: file.into(),
            source: Box::new(self),
        }
    }

    /// True for errors caused by the caller's input rather than by storage or files.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            FeedItemError::UnknownFeedType(_) | FeedItemError::InvalidParameter { .. }
        )
    }
}

impl From<sqlx::Error> for FeedItemError {
    fn from(err: sqlx::Error) -> Self {
        FeedItemError::Storage(err.to_string())
    }
}

impl From<AppError> for FeedItemError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Database(e) => FeedItemError::Storage(e.to_string()),
            _ => FeedItemError::Storage(err.to_string()),
        }
    }
}

impl From<FeedItemError> for AppError {
    fn from(err: FeedItemError) -> Self {
        if err.is_caller_error() {
            return AppError::BadRequest(err.to_string());
        }
        AppError::Internal(err.to_string())
    }
}
