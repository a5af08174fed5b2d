use thiserror::Error;

use crate::extraction::ExtractionError;

#[derive(Error, Debug)]
pub enum Pic2TextError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Pic2TextError {
    /// Errors the caller is expected to show to the user without tearing
    /// anything down. Every error in this crate is non-fatal today except
    /// configuration problems found at startup.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Pic2TextError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Pic2TextError>;
