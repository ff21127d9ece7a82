//! HTTP client for the external face-encoding service.
//!
//! One multipart file-upload request per call, bounded by the configured
//! timeout (60 s by default). Failures are terminal for the request: a
//! non-2xx response is preserved verbatim for propagation to the caller,
//! and transport errors are never retried.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::config::EncoderConfig;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("face-encoding service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("error connecting to face-encoding service: {0}")]
    Unreachable(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct FaceEncoderClient {
    client: Client,
    base_url: String,
    endpoint: String,
}

impl FaceEncoderClient {
    pub fn new(config: &EncoderConfig) -> Result<Self, EncoderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            endpoint: config.endpoint.clone(),
        })
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(config: &EncoderConfig, base_url: String) -> Result<Self, EncoderError> {
        let mut config = config.clone();
        config.base_url = base_url;
        Self::new(&config)
    }

    /// Send one image to the face-encoding service and return the response
    /// body as JSON (a nested numeric embedding, opaque to this crate).
    pub async fn encode(
        &self,
        image: Bytes,
        filename: &str,
    ) -> Result<serde_json::Value, EncoderError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), self.endpoint);

        let part = Part::stream(image).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Face-encoding service error");
            return Err(EncoderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let encoding = response.json().await?;
        Ok(encoding)
    }
}
