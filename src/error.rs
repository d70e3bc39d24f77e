use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("Could not open {path} as a spreadsheet: {reason}")]
    Load { path: String, reason: String },

    #[error("Sheet '{sheet}' could not be processed: {reason}")]
    Sheet { sheet: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report error: {0}")]
    Report(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl From<rust_xlsxwriter::XlsxError> for ReconError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ReconError::Report(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReconError>;
