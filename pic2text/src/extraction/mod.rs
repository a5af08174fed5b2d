//! Text extraction and translation of a single image.
//!
//! The [`Extractor`] trait is the seam the processing controller depends on.
//! [`ExtractionClient`] implements it against the remote OCR service; tests
//! substitute their own implementations.

mod api;

pub use api::ExtractionClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Language, SourceFile};

/// Text found in an image and its translation into the requested language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub original: String,
    pub translated: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The service could not be reached or did not answer in time.
    #[error("request failed: {0}")]
    Transport(String),

    /// The request could not be built, so nothing was sent.
    #[error("invalid request: {0}")]
    Request(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with an explicit `error` field.
    #[error("service reported an error: {0}")]
    Remote(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extracts and translates the text of one image. Implementations must be
    /// safe to call concurrently and must not retry on their own.
    async fn extract(
        &self,
        source: &SourceFile,
        language: Language,
    ) -> std::result::Result<Extraction, ExtractionError>;
}
