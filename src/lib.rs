//! # mistral-ocr2md
//!
//! Convert a PDF into a self-contained Markdown bundle using the Mistral OCR
//! service: recognised text becomes one Markdown file and every embedded
//! image is saved next to it and linked by relative path.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Validate   path exists, `.pdf`, `%PDF` magic
//!  ├─ 2. Name       sanitised output name (UUID fallback)
//!  ├─ 3. Upload     multipart upload → file id
//!  ├─ 4. Sign       temporary URL for the uploaded file
//!  ├─ 5. OCR        per-page markdown + base64 images
//!  ├─ 6. Images     image_{page}_{n}.png
//!  └─ 7. Markdown   placeholders rewritten, pages joined → <name>.md
//! ```
//!
//! The bundle lands next to the input:
//!
//! ```text
//! scans/Annual Report.pdf
//! scans/annual-report/annual-report.md
//! scans/annual-report/image_1_1.png
//! scans/annual-report/image_3_1.png
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mistral_ocr2md::{run, OcrConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Key taken from MISTRAL_API_KEY when not set explicitly
//!     let config = OcrConfig::default();
//!     let report = run("scans/Annual Report.pdf", &config).await;
//!     print!("{}", report.render());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{FileHandle, MistralClient, OcrClient};
pub use config::{OcrConfig, OcrConfigBuilder, API_KEY_ENV};
pub use error::OcrError;
pub use output::{Image, ImagePathMap, OutputBundle, Page, RecognitionResult, UsageInfo};
pub use pipeline::assemble::{assemble_markdown, rewrite_page, write_markdown};
pub use pipeline::images::extract_images;
pub use pipeline::input::{validate, Document};
pub use pipeline::naming::safe_name;
pub use process::{process_document, process_with_client, run, run_sync, run_with_client};
pub use progress::{NoopProgressCallback, OcrProgressCallback, ProgressCallback, Stage};
pub use report::RunReport;
