//! Run entry points: validate, upload, recognise, and assemble the bundle.
//!
//! [`process_document`] returns a `Result` for library callers.
//! [`run`] wraps it in the catch-all boundary used by the CLI: whatever
//! fails is logged with its full cause chain and folded into a
//! [`RunReport::Failure`]. A panic inside the pipeline is caught there too
//! and reported as [`OcrError::Unknown`].

use crate::client::{MistralClient, OcrClient};
use crate::config::OcrConfig;
use crate::error::OcrError;
use crate::output::OutputBundle;
use crate::pipeline::{assemble, images, input, naming};
use crate::progress::{OcrProgressCallback, Stage};
use crate::report::RunReport;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Convert the PDF at `path` into a Markdown bundle next to it.
///
/// The path is validated before the client is built, so a bad path fails
/// without touching the network or requiring a working key.
///
/// # Example
/// ```rust,no_run
/// use mistral_ocr2md::{process_document, OcrConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = OcrConfig::builder().api_key("sk-...").build()?;
/// let bundle = process_document("scans/report.pdf", &config).await?;
/// println!("{} images → {}", bundle.image_count, bundle.markdown_file.display());
/// # Ok(())
/// # }
/// ```
pub async fn process_document(
    path: impl AsRef<Path>,
    config: &OcrConfig,
) -> Result<OutputBundle, OcrError> {
    let document = input::validate(path)?;
    let client = MistralClient::new(config)?;
    process_with_client(
        &document,
        &client,
        config.url_expiry,
        config.progress_callback.as_deref(),
    )
    .await
}

/// Run the pipeline for an already validated document against any client.
pub async fn process_with_client(
    document: &input::Document,
    client: &dyn OcrClient,
    url_expiry: Duration,
    progress: Option<&dyn OcrProgressCallback>,
) -> Result<OutputBundle, OcrError> {
    let start = Instant::now();
    let stage = |s: Stage| {
        if let Some(cb) = progress {
            cb.on_stage_start(s);
        }
    };

    // ── Step 1: Output location ──────────────────────────────────────────
    let safe_name = naming::safe_name(&document.stem());
    let result_dir = document.parent_dir().join(&safe_name);
    std::fs::create_dir_all(&result_dir).map_err(|e| OcrError::io(&result_dir, e))?;

    info!("Processing file: {}", document.path().display());
    info!("Save directory: {}", result_dir.display());

    // ── Step 2: Upload ───────────────────────────────────────────────────
    stage(Stage::Uploading);
    let bytes = std::fs::read(document.path()).map_err(|e| OcrError::io(document.path(), e))?;
    let handle = client.upload(bytes, &document.file_name()).await?;
    info!("File uploaded successfully, ID: {}", handle.id);

    // ── Step 3: Signed URL ───────────────────────────────────────────────
    stage(Stage::SigningUrl);
    let url = client.access_url(&handle, url_expiry).await?;
    info!("Signed URL obtained, processing OCR...");

    // ── Step 4: Recognition ──────────────────────────────────────────────
    stage(Stage::Recognizing);
    let recognition = client.recognize(&url).await?;
    info!(
        "OCR processing complete ({} pages), extracting images...",
        recognition.pages.len()
    );
    if let Some(ref usage) = recognition.usage_info {
        info!(
            "Service usage: {} pages processed{}",
            usage.pages_processed,
            usage
                .doc_size_bytes
                .map(|b| format!(", {b} bytes"))
                .unwrap_or_default()
        );
    }

    // ── Step 5: Images ───────────────────────────────────────────────────
    stage(Stage::ExtractingImages);
    let image_paths = images::extract_images(&recognition, &result_dir, progress)?;
    info!("Extracted {} images, processing Markdown...", image_paths.len());

    // ── Step 6: Markdown ─────────────────────────────────────────────────
    stage(Stage::WritingMarkdown);
    let markdown = assemble::assemble_markdown(&recognition.pages, &image_paths);
    let markdown_file = assemble::write_markdown(&result_dir, &safe_name, &markdown)?;
    info!("Markdown saved successfully: {}", markdown_file.display());

    if let Some(cb) = progress {
        cb.on_document_complete(image_paths.len());
    }
    info!("Finished in {}ms", start.elapsed().as_millis());

    Ok(OutputBundle {
        safe_name,
        result_dir,
        markdown_file,
        image_count: image_paths.len(),
    })
}

/// [`process_document`] behind the catch-all boundary.
pub async fn run(path: impl AsRef<Path>, config: &OcrConfig) -> RunReport {
    into_report(guarded(process_document(path, config)).await)
}

/// [`process_with_client`] behind the catch-all boundary, validating first.
pub async fn run_with_client(
    path: impl AsRef<Path>,
    client: &dyn OcrClient,
    url_expiry: Duration,
    progress: Option<&dyn OcrProgressCallback>,
) -> RunReport {
    let outcome = match input::validate(path) {
        Ok(document) => {
            guarded(process_with_client(&document, client, url_expiry, progress)).await
        }
        Err(e) => Err(e),
    };
    into_report(outcome)
}

/// Synchronous wrapper around [`run`].
///
/// Creates a current-thread tokio runtime internally.
pub fn run_sync(path: impl AsRef<Path>, config: &OcrConfig) -> RunReport {
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt.block_on(run(path, config)),
        Err(e) => into_report(Err(OcrError::Unknown(format!(
            "Failed to create tokio runtime: {e}"
        )))),
    }
}

/// Turn a panic in `fut` into [`OcrError::Unknown`].
async fn guarded<F>(fut: F) -> Result<OutputBundle, OcrError>
where
    F: Future<Output = Result<OutputBundle, OcrError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => Err(OcrError::Unknown(panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic with a non-string payload".to_string()
    }
}

fn into_report(outcome: Result<OutputBundle, OcrError>) -> RunReport {
    match outcome {
        Ok(bundle) => RunReport::success(&bundle),
        Err(err) => {
            log_error_chain(&err);
            RunReport::failure(&err)
        }
    }
}

/// Log `err` and every `source()` beneath it.
fn log_error_chain(err: &OcrError) {
    error!("Error during processing: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        error!("  caused by: {cause}");
        source = cause.source();
    }
}
