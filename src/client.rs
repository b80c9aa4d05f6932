//! Remote OCR collaborator.
//!
//! The pipeline only sees the [`OcrClient`] trait: upload the document, get a
//! short-lived URL for it, and ask the service to recognise that URL.
//! [`MistralClient`] implements it against the Mistral REST API; tests swap in
//! an in-memory implementation.
//!
//! Every call is made exactly once. A failed request surfaces as an
//! [`OcrError`] and ends the run.

use crate::config::OcrConfig;
use crate::error::OcrError;
use crate::output::RecognitionResult;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Handle to a document stored on the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub id: String,
    pub filename: String,
}

/// The operations the pipeline needs from an OCR service.
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Store `bytes` remotely under `filename`.
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<FileHandle, OcrError>;

    /// Obtain a temporary URL through which the service can read the file.
    async fn access_url(&self, handle: &FileHandle, expiry: Duration) -> Result<String, OcrError>;

    /// Run recognition on the document behind `url`.
    async fn recognize(&self, url: &str) -> Result<RecognitionResult, OcrError>;
}

/// [`OcrClient`] backed by the Mistral files and OCR endpoints.
pub struct MistralClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for MistralClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MistralClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct UploadedFile {
    id: String,
}

#[derive(Deserialize)]
struct SignedUrl {
    url: String,
}

impl MistralClient {
    /// Build a client from `config`.
    ///
    /// # Errors
    /// [`OcrError::MissingApiKey`] when neither the config nor the
    /// environment supplies a key.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let api_key = config.resolve_api_key()?;

        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| OcrError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }
}

/// The service counts signed-URL lifetime in whole hours.
pub fn expiry_hours(expiry: Duration) -> u64 {
    expiry.as_secs().div_ceil(3600).max(1)
}

/// Read the response body for an error message, capped to keep logs sane.
async fn error_body(resp: Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        let snippet: String = body.chars().take(500).collect();
        format!("HTTP {status}: {snippet}")
    }
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Error text for a non-success response. Credential rejections stay in the
/// calling operation's error kind but are called out in the message.
async fn rejection(status: StatusCode, resp: Response) -> String {
    let body = error_body(resp).await;
    if is_auth_failure(status) {
        format!("credentials rejected ({body})")
    } else {
        body
    }
}

#[async_trait]
impl OcrClient for MistralClient {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<FileHandle, OcrError> {
        let upload_err = |reason: String| OcrError::Upload {
            filename: filename.to_string(),
            reason,
        };

        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| upload_err(e.to_string()))?;
        let form = Form::new().text("purpose", "ocr").part("file", part);

        debug!("Uploading {} ({} bytes)", filename, size);
        let resp = self
            .http
            .post(self.endpoint("files"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| upload_err(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(upload_err(rejection(status, resp).await));
        }

        let uploaded: UploadedFile = resp
            .json()
            .await
            .map_err(|e| upload_err(format!("unexpected response: {e}")))?;

        Ok(FileHandle {
            id: uploaded.id,
            filename: filename.to_string(),
        })
    }

    async fn access_url(&self, handle: &FileHandle, expiry: Duration) -> Result<String, OcrError> {
        let hours = expiry_hours(expiry);
        let resp = self
            .http
            .get(self.endpoint(&format!("files/{}/url", handle.id)))
            .bearer_auth(&self.api_key)
            .query(&[("expiry", hours)])
            .send()
            .await
            .map_err(|e| OcrError::Auth {
                detail: format!("signed URL request failed: {e}"),
            })?;

        if !resp.status().is_success() {
            return Err(OcrError::Auth {
                detail: format!(
                    "no signed URL for file '{}': {}",
                    handle.id,
                    error_body(resp).await
                ),
            });
        }

        let signed: SignedUrl = resp.json().await.map_err(|e| OcrError::Auth {
            detail: format!("unexpected signed URL response: {e}"),
        })?;
        Ok(signed.url)
    }

    async fn recognize(&self, url: &str) -> Result<RecognitionResult, OcrError> {
        let body = json!({
            "model": self.model,
            "document": {
                "type": "document_url",
                "document_url": url,
            },
            "include_image_base64": true,
        });

        let resp = self
            .http
            .post(self.endpoint("ocr"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OcrError::Service {
                detail: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OcrError::Service {
                detail: rejection(status, resp).await,
            });
        }

        resp.json().await.map_err(|e| OcrError::Service {
            detail: format!("unexpected OCR response: {e}"),
        })
    }
}
