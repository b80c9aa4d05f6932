//! Output naming: derive a filesystem-safe name from the document stem.
//!
//! The same name is used for the output directory and the Markdown file, so
//! it must be valid on every common filesystem and must never be empty.
//! Word characters are matched Unicode-aware, so `Übersicht.pdf` keeps its
//! letters (`übersicht`).

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());

static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

/// Sanitise `stem` into a non-empty, lowercase, hyphen-separated name.
///
/// Underscores survive and leading or trailing hyphens are kept, so callers
/// can predict the bundle directory from the input filename. Falls back to a
/// random UUID v4 when nothing usable survives.
///
/// ```rust
/// use mistral_ocr2md::safe_name;
///
/// assert_eq!(safe_name("Annual Report (2024)"), "annual-report-2024");
/// ```
pub fn safe_name(stem: &str) -> String {
    let s = DISALLOWED.replace_all(stem, "");
    let s = s.trim().to_lowercase();
    let s = SEPARATOR_RUN.replace_all(&s, "-");

    if s.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_safe(s: &str) -> bool {
        static SAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9_-]+$").unwrap());
        SAFE.is_match(s)
    }

    #[test]
    fn basic_stem() {
        assert_eq!(safe_name("My Document"), "my-document");
    }

    #[test]
    fn strips_punctuation_and_collapses_separators() {
        assert_eq!(safe_name("  Q3 -- Results!!  (final) "), "q3-results-final");
        assert_eq!(safe_name("a   b\t-c"), "a-b-c");
    }

    #[test]
    fn underscores_are_kept() {
        assert_eq!(safe_name("scan_2024"), "scan_2024");
        assert_eq!(safe_name("Scan_2024 01"), "scan_2024-01");
    }

    #[test]
    fn edge_hyphens_are_kept() {
        assert_eq!(safe_name("-leading"), "-leading");
        assert_eq!(safe_name("trailing-"), "trailing-");
        assert_eq!(safe_name("---"), "-");
        assert_eq!(safe_name("- (x) -"), "-x-");
    }

    #[test]
    fn keeps_unicode_letters() {
        assert_eq!(safe_name("Übersicht Été"), "übersicht-été");
    }

    #[test]
    fn punctuation_only_falls_back_to_uuid() {
        for stem in ["!!!", "...", "()[]{}", "", "   ", "@#$%^&*"] {
            let name = safe_name(stem);
            assert!(!name.is_empty(), "empty for {stem:?}");
            assert!(
                uuid::Uuid::parse_str(&name).is_ok(),
                "expected UUID for {stem:?}, got {name:?}"
            );
            assert!(is_safe(&name), "unsafe name {name:?}");
        }
    }

    #[test]
    fn uuid_fallback_is_fresh() {
        assert_ne!(safe_name("?"), safe_name("?"));
    }

    #[test]
    fn ascii_inputs_yield_safe_names() {
        for stem in ["Report v2.1", "a-b_c d", "-leading", "trailing-", "x"] {
            let name = safe_name(stem);
            assert!(is_safe(&name), "unsafe name {name:?} for {stem:?}");
        }
        assert_eq!(safe_name("a-b_c d"), "a-b_c-d");
        assert_eq!(safe_name("Report v2.1"), "report-v21");
    }
}
