use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid API key for OpenAI")]
    InvalidCredential,

    #[error("Failed to read source workbook '{}': {reason}", path.display())]
    SourceRead { path: PathBuf, reason: String },

    #[error("Failed to save workbook '{}': {source}", path.display())]
    SaveWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("A translation run is already in progress")]
    AlreadyRunning,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error during processing: {0}")]
    Unexpected(String),
}
