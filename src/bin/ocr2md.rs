//! CLI binary for mistral-ocr2md.
//!
//! A thin shim over the library crate: maps flags to `OcrConfig`, runs the
//! pipeline once, and prints the sentinel-delimited JSON result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mistral_ocr2md::config::{resolve_api_key, DEFAULT_BASE_URL, DEFAULT_MODEL};
use mistral_ocr2md::{run, OcrConfig, OcrError, OcrProgressCallback, RunReport, Stage, API_KEY_ENV};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── Log line format ──────────────────────────────────────────────────────────

/// Renders events as `[LEVEL] message`, the shape callers grep for.
struct BracketedLevel;

impl<S, N> FormatEvent<S, N> for BracketedLevel
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(writer, "[{}] ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Stage spinner on stderr. stdout stays reserved for logs and the result.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("ocr2md");
        bar.set_message("Starting…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl OcrProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_image_saved(&self, page_num: usize, image_num: usize, filename: &str) {
        self.bar.set_message(format!(
            "{}… page {page_num}, image {image_num}  {}",
            Stage::ExtractingImages,
            dim(filename)
        ));
    }

    fn on_document_complete(&self, image_count: usize) {
        self.bar.finish_and_clear();
        eprintln!("{} Bundle written, {image_count} images", green("✔"));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Key from the environment
  export MISTRAL_API_KEY=...
  ocr2md --pdf-path scans/report.pdf

  # Explicit key, spinner on stderr
  ocr2md --pdf-path scans/report.pdf --api-key $KEY --progress

OUTPUT:
  scans/report/report.md         combined Markdown
  scans/report/image_<p>_<n>.png images, linked by relative path

  stdout carries [INFO] log lines followed by one JSON object between
  ===RESULT_JSON_BEGIN=== and ===RESULT_JSON_END===. Failures are reported
  as {"error": "..."} in that block; the exit code is still 0.

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY     API key (used when --api-key is absent)
  MISTRAL_OCR_MODEL   Override the OCR model
  MISTRAL_BASE_URL    Override the API endpoint
  RUST_LOG            Override the log filter (e.g. debug)
"#;

/// Convert a PDF into a Markdown bundle using Mistral OCR.
#[derive(Parser, Debug)]
#[command(
    name = "ocr2md",
    version,
    about = "Convert a PDF into a Markdown bundle using Mistral OCR",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    #[arg(long = "pdf-path", alias = "pdf_path")]
    pdf_path: PathBuf,

    /// Mistral API key. Falls back to MISTRAL_API_KEY.
    #[arg(long = "api-key", alias = "api_key")]
    api_key: Option<String>,

    /// OCR model ID.
    #[arg(long, env = "MISTRAL_OCR_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// API base URL.
    #[arg(long, env = "MISTRAL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Lifetime of the signed document URL, in hours.
    #[arg(long, default_value_t = 1,
          value_parser = clap::value_parser!(u64).range(1..=168))]
    url_expiry_hours: u64,

    /// Per-request HTTP timeout in seconds (none by default).
    #[arg(long)]
    timeout: Option<u64>,

    /// Show a stage spinner on stderr (quiets INFO logs).
    #[arg(long)]
    progress: bool,

    /// Enable DEBUG-level logs.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Credential precondition ──────────────────────────────────────────
    let Some(api_key) = resolve_api_key(cli.api_key.as_deref()) else {
        eprintln!(
            "[ERROR] {}",
            OcrError::MissingApiKey {
                env_var: API_KEY_ENV
            }
        );
        std::process::exit(1);
    };

    // ── Logging setup ────────────────────────────────────────────────────
    // WARN and ERROR go to stderr, everything else to stdout.
    let filter = if cli.verbose {
        "debug"
    } else if cli.progress {
        "warn"
    } else {
        "info"
    };
    let writer = io::stderr.with_max_level(Level::WARN).or_else(io::stdout);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(writer)
        .event_format(BracketedLevel)
        .init();

    // ── Run ──────────────────────────────────────────────────────────────
    let progress = cli.progress.then(CliProgressCallback::new);

    let report = match build_config(&cli, api_key, progress.clone()) {
        Ok(config) => run(&cli.pdf_path, &config).await,
        Err(e) => {
            tracing::error!("Error during processing: {e}");
            RunReport::failure(&e)
        }
    };

    if let Some(cb) = progress {
        cb.bar.finish_and_clear();
    }

    report
        .emit(io::stdout().lock())
        .context("Failed to write result to stdout")?;

    Ok(())
}

/// Map CLI args to `OcrConfig`.
fn build_config(
    cli: &Cli,
    api_key: String,
    progress: Option<Arc<CliProgressCallback>>,
) -> Result<OcrConfig, OcrError> {
    let mut builder = OcrConfig::builder()
        .api_key(api_key)
        .model(cli.model.clone())
        .base_url(cli.base_url.clone())
        .url_expiry_hours(cli.url_expiry_hours);

    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb as Arc<dyn OcrProgressCallback>);
    }

    builder.build()
}
