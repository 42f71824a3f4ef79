use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PtrsError {
    #[error("Config directory not found at {0}. Run 'ptrs init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported dataset format '{0}'. Use a .json or .csv file.")]
    UnsupportedDataset(PathBuf),

    #[error("Invalid input in row {row}, field '{field}': {reason}")]
    InvalidInput {
        row: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Report '{0}' not found in history")]
    ReportNotFound(String),

    #[error("Invalid report index '{0}'. Use 'ptrs list' to see available reports.")]
    InvalidReportIndex(String),
}

pub type Result<T> = std::result::Result<T, PtrsError>;
