//! Local pipeline stages around the remote OCR call.
//!
//! Each submodule implements exactly one step, so each is testable without a
//! network or a real service response.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ naming ──▶ [remote OCR] ──▶ images ──▶ assemble
//! (validate) (SafeName)                 (decode)    (rewrite + join)
//! ```
//!
//! 1. [`input`]    — reject missing paths and non-PDF files before any upload
//! 2. [`naming`]   — derive the output directory / Markdown stem
//! 3. [`images`]   — decode base64 payloads to `image_{page}_{n}.png`
//! 4. [`assemble`] — point `![id](id)` placeholders at the saved files,
//!    join pages, write `<name>.md`

pub mod assemble;
pub mod images;
pub mod input;
pub mod naming;
