//! Run summary printed for the calling process.
//!
//! A run always ends with exactly one JSON object on stdout, bracketed by
//! sentinel lines so a caller can find it among the interleaved log output:
//!
//! ```text
//! [INFO] Processing file: scans/report.pdf
//! ...
//!
//! ===RESULT_JSON_BEGIN===
//! {"success":true,"message":"OCR processing successful",...}
//! ===RESULT_JSON_END===
//! ```

use crate::error::OcrError;
use crate::output::OutputBundle;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

pub const BEGIN_MARKER: &str = "===RESULT_JSON_BEGIN===";
pub const END_MARKER: &str = "===RESULT_JSON_END===";

pub const SUCCESS_MESSAGE: &str = "OCR processing successful";

/// Outcome of one run, serialised as one of two flat JSON shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunReport {
    Success {
        success: bool,
        message: String,
        result_path: String,
        markdown_file: String,
        image_count: usize,
    },
    Failure {
        error: String,
    },
}

impl RunReport {
    pub fn success(bundle: &OutputBundle) -> Self {
        RunReport::Success {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            result_path: bundle.result_dir.to_string_lossy().into_owned(),
            markdown_file: bundle.markdown_file.to_string_lossy().into_owned(),
            image_count: bundle.image_count,
        }
    }

    pub fn failure(err: &OcrError) -> Self {
        RunReport::Failure {
            error: format!("Error during processing: {err}"),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunReport::Success { .. })
    }

    /// Single-line JSON. Non-ASCII text is emitted as-is, not escaped.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            // Only reachable if serde_json itself misbehaves; keep the contract.
            serde_json::json!({ "error": format!("Error during processing: {e}") }).to_string()
        })
    }

    /// The full block as written to stdout, including the leading blank line.
    pub fn render(&self) -> String {
        format!("\n{BEGIN_MARKER}\n{}\n{END_MARKER}\n", self.to_json())
    }

    /// Write [`Self::render`] to `out` and flush.
    pub fn emit(&self, mut out: impl Write) -> io::Result<()> {
        out.write_all(self.render().as_bytes())?;
        out.flush()
    }

    /// Locate and parse the sentinel-delimited block inside captured output.
    pub fn extract(output: &str) -> Option<RunReport> {
        let start = output.find(BEGIN_MARKER)? + BEGIN_MARKER.len();
        let len = output[start..].find(END_MARKER)?;
        serde_json::from_str(output[start..start + len].trim()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn bundle() -> OutputBundle {
        OutputBundle {
            safe_name: "report".into(),
            result_dir: PathBuf::from("/data/report"),
            markdown_file: PathBuf::from("/data/report/report.md"),
            image_count: 3,
        }
    }

    #[test]
    fn success_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&RunReport::success(&bundle()).to_json()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "OCR processing successful");
        assert_eq!(json["result_path"], "/data/report");
        assert_eq!(json["markdown_file"], "/data/report/report.md");
        assert_eq!(json["image_count"], 3);
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn failure_json_has_only_error() {
        let err = OcrError::Service {
            detail: "HTTP 500".into(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&RunReport::failure(&err).to_json()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["error"], "Error during processing: OCR service error: HTTP 500");
    }

    #[test]
    fn non_ascii_is_not_escaped() {
        let report = RunReport::Failure {
            error: "Fichier introuvable: résumé.pdf".into(),
        };
        assert!(report.to_json().contains("résumé"));
    }

    #[test]
    fn render_is_bracketed_single_line() {
        let block = RunReport::success(&bundle()).render();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], BEGIN_MARKER);
        assert!(lines[2].starts_with('{'));
        assert_eq!(lines[3], END_MARKER);
    }

    #[test]
    fn extract_finds_block_among_logs() {
        let report = RunReport::success(&bundle());
        let captured = format!("[INFO] Processing file: x.pdf\n[INFO] done{}", report.render());
        assert_eq!(RunReport::extract(&captured), Some(report));
        assert_eq!(RunReport::extract("[INFO] no block here"), None);
    }

    #[test]
    fn emit_writes_block() {
        let mut buf = Vec::new();
        let report = RunReport::Failure { error: "x".into() };
        report.emit(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), report.render());
    }
}
