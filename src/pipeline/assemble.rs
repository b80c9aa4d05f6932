//! Markdown assembly: point image placeholders at local files and merge pages.
//!
//! The service marks each image with `![id](id)`. Replacement is a literal
//! string substitution per known identifier; anything else in the text,
//! including placeholders for identifiers we never saved, is left untouched.

use crate::error::OcrError;
use crate::output::{ImagePathMap, Page};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Separator between consecutive pages in the combined document.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Rewrite every `![id](id)` in `markdown` to `![id](<relative_dir>/<file>)`.
///
/// An empty `relative_dir` yields bare filenames, which is what the bundle
/// uses since the Markdown file sits next to its images.
pub fn rewrite_page(markdown: &str, images: &ImagePathMap, relative_dir: &str) -> String {
    let mut text = markdown.to_string();
    for (id, filename) in images {
        let placeholder = format!("![{id}]({id})");
        if !text.contains(&placeholder) {
            continue;
        }
        let target = if relative_dir.is_empty() {
            filename.clone()
        } else {
            format!("{}/{}", relative_dir.trim_end_matches('/'), filename)
        };
        text = text.replace(&placeholder, &format!("![{id}]({target})"));
    }
    text
}

/// Rewrite each page and join them in order with [`PAGE_SEPARATOR`].
pub fn assemble_markdown(pages: &[Page], images: &ImagePathMap) -> String {
    pages
        .iter()
        .map(|page| rewrite_page(&page.markdown, images, ""))
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

/// Write `markdown` to `<output_dir>/<stem>.md` and return the path.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so a failed run never leaves a truncated document behind.
pub fn write_markdown(output_dir: &Path, stem: &str, markdown: &str) -> Result<PathBuf, OcrError> {
    let path = output_dir.join(format!("{stem}.md"));

    let tmp_path = path.with_extension("md.tmp");
    std::fs::write(&tmp_path, markdown.as_bytes()).map_err(|e| OcrError::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, &path).map_err(|e| OcrError::io(&path, e))?;

    debug!("Wrote {} bytes of Markdown to {}", markdown.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn map(entries: &[(&str, &str)]) -> ImagePathMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn page(markdown: &str) -> Page {
        Page {
            markdown: markdown.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn replaces_single_placeholder() {
        let images = map(&[("img1", "image_1_1.png")]);
        let out = assemble_markdown(&[page("![img1](img1)")], &images);
        assert_eq!(out, "![img1](image_1_1.png)");
    }

    #[test]
    fn replaces_every_occurrence() {
        let images = map(&[("a.jpeg", "image_1_1.png")]);
        let out = rewrite_page("![a.jpeg](a.jpeg) and again ![a.jpeg](a.jpeg)", &images, "");
        assert_eq!(out, "![a.jpeg](image_1_1.png) and again ![a.jpeg](image_1_1.png)");
    }

    #[test]
    fn leaves_unknown_placeholders_alone() {
        let images = map(&[("known", "image_1_1.png")]);
        let text = "![other](other) ![known](elsewhere.png)";
        assert_eq!(rewrite_page(text, &images, ""), text);
    }

    #[test]
    fn identifiers_are_literal_not_regex() {
        let images = map(&[("img.(1)", "image_1_1.png")]);
        let out = rewrite_page("![img.(1)](img.(1)) ![imgX(1)](imgX(1))", &images, "");
        assert_eq!(out, "![img.(1)](image_1_1.png) ![imgX(1)](imgX(1))");
    }

    #[test]
    fn relative_dir_is_prefixed() {
        let images = map(&[("img1", "image_1_1.png")]);
        assert_eq!(
            rewrite_page("![img1](img1)", &images, "assets/"),
            "![img1](assets/image_1_1.png)"
        );
    }

    #[test]
    fn pages_joined_with_blank_line_in_order() {
        let images = map(&[("p2", "image_2_1.png")]);
        let out = assemble_markdown(&[page("# One"), page("![p2](p2)"), page("Three")], &images);
        assert_eq!(out, "# One\n\n![p2](image_2_1.png)\n\nThree");
    }

    #[test]
    fn no_pages_is_empty_document() {
        assert_eq!(assemble_markdown(&[], &ImagePathMap::new()), "");
    }

    #[test]
    fn write_markdown_creates_utf8_file() {
        let dir = TempDir::new().unwrap();
        let path = write_markdown(dir.path(), "report", "# Résumé ✓\n").unwrap();
        assert_eq!(path, dir.path().join("report.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Résumé ✓\n");
        // Only the final file remains, no temp leftovers.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_markdown_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        write_markdown(dir.path(), "doc", "old").unwrap();
        let path = write_markdown(dir.path(), "doc", "new").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }

    #[test]
    fn write_markdown_missing_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = write_markdown(&dir.path().join("nope"), "doc", "x").unwrap_err();
        assert!(matches!(err, OcrError::Io { .. }));
    }
}
