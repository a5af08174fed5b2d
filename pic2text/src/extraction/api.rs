use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{Extraction, ExtractionError, Extractor};
use crate::config::ExtractionConfig;
use crate::error::{Pic2TextError, Result};
use crate::models::{Language, SourceFile};

const FALLBACK_FILE_NAME: &str = "image";

/// Body returned by the OCR service. An `error` field wins over everything
/// else, whatever the HTTP status was.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServiceReply {
    Failure { error: String },
    Success { original: String, translated: String },
}

/// Stateless HTTP client for the remote OCR + translation endpoint.
#[derive(Debug, Clone)]
pub struct ExtractionClient {
    client: Client,
    endpoint: Url,
}

impl ExtractionClient {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            Pic2TextError::Config(format!("Invalid OCR endpoint '{}': {e}", config.endpoint))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Pic2TextError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn extract_internal(
        &self,
        source: &SourceFile,
        language: Language,
    ) -> std::result::Result<Extraction, ExtractionError> {
        let file_name = source
            .file_name
            .clone()
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
        let mime_type = mime_guess::from_path(&file_name).first_or_octet_stream();
        let part = file_part(source, file_name, mime_type.essence_str())?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("lang", language.service_code());

        debug!(endpoint = %self.endpoint, %language, bytes = source.len(), "Sending extraction request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::Transport("Request timeout".to_string())
                } else {
                    ExtractionError::Transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        debug!("Extraction response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| ExtractionError::Transport(format!("Failed to read response body: {e}")))?;

        Self::interpret(status, &body)
    }

    fn interpret(
        status: StatusCode,
        body: &str,
    ) -> std::result::Result<Extraction, ExtractionError> {
        let reply = serde_json::from_str::<ServiceReply>(body);

        if !status.is_success() {
            let body = match reply {
                Ok(ServiceReply::Failure { error }) => error,
                _ => body.to_string(),
            };
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        match reply {
            Ok(ServiceReply::Success {
                original,
                translated,
            }) => Ok(Extraction {
                original,
                translated,
            }),
            Ok(ServiceReply::Failure { error }) => Err(ExtractionError::Remote(error)),
            Err(e) => Err(ExtractionError::Malformed(format!(
                "Failed to parse extraction response: {e}"
            ))),
        }
    }
}

fn file_part(
    source: &SourceFile,
    file_name: String,
    mime_type: &str,
) -> std::result::Result<multipart::Part, ExtractionError> {
    multipart::Part::bytes(source.bytes.to_vec())
        .file_name(file_name)
        .mime_str(mime_type)
        .map_err(|e| ExtractionError::Request(format!("Invalid MIME type '{mime_type}': {e}")))
}

#[async_trait]
impl Extractor for ExtractionClient {
    async fn extract(
        &self,
        source: &SourceFile,
        language: Language,
    ) -> std::result::Result<Extraction, ExtractionError> {
        self.extract_internal(source, language).await
    }
}
