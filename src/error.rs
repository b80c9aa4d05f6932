//! Error types for the mistral-ocr2md library.
//!
//! Every stage of the pipeline returns [`OcrError`]. The variants mirror the
//! stage that failed so a log line is enough to tell whether the problem was
//! the input file, the remote service, or the local disk.
//!
//! None of these are recovered from inside the library: the run boundary in
//! [`crate::process::run`] turns whichever error surfaced into a single
//! `{"error": ...}` report.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the mistral-ocr2md library.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but is not a PDF (wrong extension or magic bytes).
    #[error("Only PDF files are supported: '{}' ({detail})", path.display())]
    UnsupportedType { path: PathBuf, detail: String },

    // ── Remote service errors ─────────────────────────────────────────────
    /// The document could not be uploaded to the OCR service.
    #[error("Upload of '{filename}' failed: {reason}")]
    Upload { filename: String, reason: String },

    /// The service rejected our credentials or the file handle.
    #[error("Authentication error from the OCR service: {detail}")]
    Auth { detail: String },

    /// The service accepted the request but recognition failed.
    #[error("OCR service error: {detail}")]
    Service { detail: String },

    // ── Artifact errors ───────────────────────────────────────────────────
    /// An embedded image payload is missing or not valid base64.
    #[error("Failed to decode image '{image_id}': {detail}")]
    Decode { image_id: String, detail: String },

    /// Could not create the output directory or write an artifact.
    #[error("Failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Neither an explicit key nor the environment variable was set.
    #[error("API key is required. Provide via --api-key or {env_var} env var.")]
    MissingApiKey { env_var: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl OcrError {
    /// Wrap an I/O error with the path it concerns.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OcrError::Io {
            path: path.into(),
            source,
        }
    }
}
