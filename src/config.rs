//! Configuration types for an OCR run.
//!
//! Everything the remote client and the pipeline need lives in
//! [`OcrConfig`], built via [`OcrConfigBuilder`]. The builder lets the CLI and
//! library callers set only the knobs they care about and rely on the
//! defaults for the rest.

use crate::error::OcrError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::time::Duration;

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Default recognition model.
pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";

/// Configuration for a single OCR run.
///
/// # Example
/// ```rust
/// use mistral_ocr2md::OcrConfig;
///
/// let config = OcrConfig::builder()
///     .api_key("sk-test")
///     .model("mistral-ocr-latest")
///     .build()
///     .unwrap();
/// assert_eq!(config.url_expiry.as_secs(), 3600);
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// Explicit API key. If None, [`API_KEY_ENV`] is read at client construction.
    pub api_key: Option<String>,

    /// Service base URL without trailing slash. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Recognition model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Lifetime requested for the signed document URL. Default: 1 hour.
    ///
    /// The service counts expiry in whole hours; the client rounds up.
    pub url_expiry: Duration,

    /// Overall timeout per HTTP request. Default: None.
    ///
    /// Recognition of a long document can take minutes, so no timeout is
    /// applied unless the caller asks for one.
    pub request_timeout_secs: Option<u64>,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            url_expiry: Duration::from_secs(3600),
            request_timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("url_expiry", &self.url_expiry)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn OcrProgressCallback>"),
            )
            .finish()
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve the API key from the config, then the environment.
    pub fn resolve_api_key(&self) -> Result<String, OcrError> {
        resolve_api_key(self.api_key.as_deref()).ok_or(OcrError::MissingApiKey {
            env_var: API_KEY_ENV,
        })
    }
}

/// Pick the explicit key if non-empty, else a non-empty [`API_KEY_ENV`].
pub fn resolve_api_key(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| {
            std::env::var(API_KEY_ENV)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        })
}

/// Builder for [`OcrConfig`].
#[derive(Debug)]
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

impl OcrConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn url_expiry(mut self, expiry: Duration) -> Self {
        self.config.url_expiry = expiry;
        self
    }

    pub fn url_expiry_hours(mut self, hours: u64) -> Self {
        self.config.url_expiry = Duration::from_secs(hours.saturating_mul(3600));
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OcrConfig, OcrError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(OcrError::InvalidConfig(format!(
                "base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        if c.model.trim().is_empty() {
            return Err(OcrError::InvalidConfig("model must not be empty".into()));
        }
        if c.url_expiry.is_zero() {
            return Err(OcrError::InvalidConfig(
                "URL expiry must be greater than zero".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(OcrError::InvalidConfig(
                "request timeout must be at least 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
