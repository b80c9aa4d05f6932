//! Image extraction: decode embedded payloads and write them to disk.
//!
//! Filenames are derived from position, not from the service's identifier:
//! `image_{page}_{n}.png` with both numbers 1-based. Identifiers are opaque
//! strings chosen remotely and are not guaranteed to be filesystem-safe.
//!
//! If the service ever emits the same identifier twice, both files are
//! written but the later one wins in the returned map, so the earlier file
//! is left unreferenced.

use crate::error::OcrError;
use crate::output::{ImagePathMap, RecognitionResult};
use crate::progress::OcrProgressCallback;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::{debug, warn};

/// Filename for image `image_idx` of page `page_idx` (both 0-based).
pub fn image_filename(page_idx: usize, image_idx: usize) -> String {
    format!("image_{}_{}.png", page_idx + 1, image_idx + 1)
}

/// Decode a base64 payload, tolerating a `data:<mime>;base64,` prefix and
/// embedded whitespace.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let body = match payload.split_once(',') {
        Some((_, rest)) => rest,
        None => payload,
    };
    let cleaned: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(cleaned)
}

/// Write every embedded image of `result` into `output_dir`.
///
/// Returns the identifier → filename map used by the Markdown assembler.
///
/// # Errors
/// - [`OcrError::Decode`] when a payload is missing or not valid base64
/// - [`OcrError::Io`] when a file cannot be written
pub fn extract_images(
    result: &RecognitionResult,
    output_dir: &Path,
    progress: Option<&dyn OcrProgressCallback>,
) -> Result<ImagePathMap, OcrError> {
    let mut paths = ImagePathMap::new();

    for (page_idx, page) in result.pages.iter().enumerate() {
        for (img_idx, img) in page.images.iter().enumerate() {
            let filename = image_filename(page_idx, img_idx);

            let payload = img.image_base64.as_deref().ok_or_else(|| OcrError::Decode {
                image_id: img.id.clone(),
                detail: "no image payload in response".into(),
            })?;
            let bytes = decode_payload(payload).map_err(|e| OcrError::Decode {
                image_id: img.id.clone(),
                detail: e.to_string(),
            })?;

            let path = output_dir.join(&filename);
            std::fs::write(&path, &bytes).map_err(|e| OcrError::io(&path, e))?;
            debug!("Saved {} ({} bytes) for image '{}'", filename, bytes.len(), img.id);

            if let Some(cb) = progress {
                cb.on_image_saved(page_idx + 1, img_idx + 1, &filename);
            }

            if let Some(previous) = paths.insert(img.id.clone(), filename) {
                warn!(
                    "Duplicate image id '{}': {} is no longer referenced",
                    img.id, previous
                );
            }
        }
    }

    Ok(paths)
}
