//! Input validation: turn a user-supplied path into a [`Document`].
//!
//! Validation runs before the client is built and before any network call,
//! so a typo in the path never costs an upload. Besides the extension check
//! we peek at the first four bytes: a renamed `.docx` would otherwise be
//! uploaded and rejected remotely with a far less helpful message.

use crate::error::OcrError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The only accepted document extension (compared case-insensitively).
pub const ACCEPTED_EXTENSION: &str = "pdf";

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A path that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
}

impl Document {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Basename sent to the service as the upload filename.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string())
    }

    /// Filename without extension, the input to name sanitisation.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory containing the document; the bundle is created next to it.
    pub fn parent_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Text after the last `.` of the file name.
///
/// Unlike [`Path::extension`], a dot-file such as `.pdf` counts as having
/// the extension `pdf`.
fn extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    name.rsplit_once('.').map(|(_, ext)| ext.to_string())
}

/// Check the path exists and looks like a PDF.
///
/// # Errors
/// - [`OcrError::NotFound`] if nothing exists at `path`
/// - [`OcrError::UnsupportedType`] for a non-`.pdf` extension or a file
///   whose first bytes are not `%PDF`
/// - [`OcrError::Io`] if the file exists but cannot be opened
pub fn validate(path: impl AsRef<Path>) -> Result<Document, OcrError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(OcrError::NotFound { path });
    }

    match extension(&path) {
        Some(ext) if ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION) => {}
        Some(ext) => {
            let detail = format!("extension '{ext}'");
            return Err(OcrError::UnsupportedType { path, detail });
        }
        None => {
            return Err(OcrError::UnsupportedType {
                path,
                detail: "no file extension".into(),
            });
        }
    }

    let mut file = std::fs::File::open(&path).map_err(|e| OcrError::io(&path, e))?;
    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_ok() && &magic != PDF_MAGIC {
        return Err(OcrError::UnsupportedType {
            path,
            detail: format!("first bytes {magic:?}"),
        });
    }

    debug!("Validated input document: {}", path.display());
    Ok(Document { path })
}
