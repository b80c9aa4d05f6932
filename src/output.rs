//! Data types flowing through the pipeline.
//!
//! [`RecognitionResult`] and its children deserialize straight from the OCR
//! service's JSON response; unknown fields (bounding boxes, page dimensions)
//! are ignored. [`OutputBundle`] describes what ended up on disk.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Identifier → filename (relative to the output directory).
pub type ImagePathMap = BTreeMap<String, String>;

/// The per-page recognition result returned by the OCR service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Pages in document order.
    pub pages: Vec<Page>,

    /// Model that produced the result, as reported by the service.
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub usage_info: Option<UsageInfo>,
}

impl RecognitionResult {
    /// Total number of embedded images across all pages.
    pub fn image_total(&self) -> usize {
        self.pages.iter().map(|p| p.images.len()).sum()
    }
}

/// One recognized page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// 0-based page index as reported by the service.
    #[serde(default)]
    pub index: usize,

    /// Recognized text, with `![id](id)` placeholders for images.
    #[serde(default)]
    pub markdown: String,

    #[serde(default)]
    pub images: Vec<Image>,
}

/// An image embedded in a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    /// Opaque identifier, unique within the document.
    pub id: String,

    /// Base64 payload, possibly prefixed with a `data:` URI header.
    /// Absent when the service was asked not to include image data.
    #[serde(default)]
    pub image_base64: Option<String>,
}

/// Service-side accounting for the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageInfo {
    #[serde(default)]
    pub pages_processed: usize,
    #[serde(default)]
    pub doc_size_bytes: Option<u64>,
}

/// The artifacts written by a successful run.
#[derive(Debug, Clone)]
pub struct OutputBundle {
    /// Sanitised name used for the directory and the Markdown stem.
    pub safe_name: String,
    /// `<inputDir>/<safe_name>`
    pub result_dir: PathBuf,
    /// `<result_dir>/<safe_name>.md`
    pub markdown_file: PathBuf,
    /// Number of distinct image identifiers saved.
    pub image_count: usize,
}
