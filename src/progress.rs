//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn OcrProgressCallback>`] via
//! [`crate::config::OcrConfigBuilder::progress_callback`] to be told when
//! each stage starts and each image lands on disk. The CLI uses it to drive a
//! spinner; library callers can forward the events anywhere.
//!
//! # Example
//!
//! ```rust
//! use mistral_ocr2md::{OcrConfig, OcrProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     saved: AtomicUsize,
//! }
//!
//! impl OcrProgressCallback for CountingCallback {
//!     fn on_image_saved(&self, _page: usize, _image: usize, filename: &str) {
//!         self.saved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("saved {filename}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { saved: AtomicUsize::new(0) });
//!
//! let config = OcrConfig::builder()
//!     .progress_callback(counter as Arc<dyn OcrProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploading,
    SigningUrl,
    Recognizing,
    ExtractingImages,
    WritingMarkdown,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Uploading => "Uploading document",
            Stage::SigningUrl => "Requesting signed URL",
            Stage::Recognizing => "Running OCR",
            Stage::ExtractingImages => "Extracting images",
            Stage::WritingMarkdown => "Writing Markdown",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as it moves through each stage.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait OcrProgressCallback: Send + Sync {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called after an image file has been written.
    ///
    /// # Arguments
    /// * `page_num`  — 1-indexed page number
    /// * `image_num` — 1-indexed position of the image within the page
    /// * `filename`  — name of the file written inside the output directory
    fn on_image_saved(&self, page_num: usize, image_num: usize, filename: &str) {
        let _ = (page_num, image_num, filename);
    }

    /// Called once after the Markdown file has been written.
    fn on_document_complete(&self, image_count: usize) {
        let _ = image_count;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl OcrProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::OcrConfig`].
pub type ProgressCallback = Arc<dyn OcrProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        stages: Mutex<Vec<Stage>>,
        images: AtomicUsize,
        completed: AtomicUsize,
    }

    impl OcrProgressCallback for TrackingCallback {
        fn on_stage_start(&self, stage: Stage) {
            self.stages.lock().unwrap().push(stage);
        }

        fn on_image_saved(&self, _page_num: usize, _image_num: usize, _filename: &str) {
            self.images.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(&self, image_count: usize) {
            self.completed.store(image_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Uploading);
        cb.on_image_saved(1, 1, "image_1_1.png");
        cb.on_document_complete(1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_stage_start(Stage::Recognizing);
        tracker.on_stage_start(Stage::ExtractingImages);
        tracker.on_image_saved(1, 1, "image_1_1.png");
        tracker.on_image_saved(2, 1, "image_2_1.png");
        tracker.on_document_complete(2);

        assert_eq!(
            *tracker.stages.lock().unwrap(),
            vec![Stage::Recognizing, Stage::ExtractingImages]
        );
        assert_eq!(tracker.images.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Recognizing.to_string(), "Running OCR");
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_stage_start(Stage::WritingMarkdown);
    }
}
