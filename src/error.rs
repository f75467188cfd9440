use std::path::PathBuf;

use thiserror::Error;

/// Failures while obtaining the event table. Any of these stops the session.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("data source {} not found; supply a file with --data or ABP_DATA_PATH", .0.display())]
    DataUnavailable(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("spreadsheet {} has no worksheet", .0.display())]
    EmptySheet(PathBuf),

    #[error("unsupported data file extension: {0}")]
    UnsupportedFormat(String),

    #[error("required column `{0}` is missing")]
    MissingRequiredColumn(&'static str),

    #[error("row {row}: `{value}` is not a known time bucket")]
    InvalidTimeBucket { row: usize, value: String },
}

/// Failures local to a single view. The caller skips that view and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("column `{0}` is not present in the data")]
    MissingDimension(&'static str),
}
