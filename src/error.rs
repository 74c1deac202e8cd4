use std::path::PathBuf;

use probe_table_lib::TableError;
use thiserror::Error;
use tonic::Status;

pub type Result<T> = std::result::Result<T, AttendanceError>;

#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Invalid sort order '{0}': expected 'asc' or 'desc'")]
    InvalidSortOrder(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Input is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AttendanceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AttendanceError::Io { path: path.into(), source }
    }
}

impl From<AttendanceError> for Status {
    fn from(err: AttendanceError) -> Self {
        match err {
            AttendanceError::InvalidSortOrder(_)
            | AttendanceError::UnsupportedInput(_)
            | AttendanceError::MissingColumns(_) => Status::invalid_argument(err.to_string()),
            AttendanceError::Table(TableError::CapacityExceeded { .. }) => {
                Status::resource_exhausted(err.to_string())
            }
            AttendanceError::Config(_) => Status::failed_precondition(err.to_string()),
            _ => Status::internal(err.to_string()),
        }
    }
}
