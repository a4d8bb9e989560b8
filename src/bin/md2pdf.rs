//! CLI binary for md2pdf.
//!
//! A thin shim over the library crate: maps flags to `ConversionConfig` /
//! `ServerConfig`, shows a spinner while Chrome renders, and translates
//! errors into exit codes (0 ok, 1 failure, 2 missing input).

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use md2pdf::{
    convert_file, ConversionConfig, PaperSize, Server, ServerConfig, DEFAULT_HOST, DEFAULT_LANG,
    DEFAULT_PORT, DEFAULT_WATERMARK_TEXT,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert next to the input (report.md → report.pdf)
  md2pdf report.md

  # Explicit output and stylesheet
  md2pdf report.md -o out/report.pdf --css ~/styles/print.css

  # Watermark with the default text (CONFIDENTIAL)
  md2pdf report.md --watermark

  # Custom watermark text
  md2pdf report.md --watermark-text "INTERNAL USE ONLY"

  # US Letter, landscape, 1 inch margins
  md2pdf report.md --paper letter --landscape --margin 1

  # HTTP service
  md2pdf --serve --host 0.0.0.0 --port 8080

HTTP ENDPOINTS:
  GET  /health              {"status":"ok"}
  POST /convert             {"markdown": "...", "css_path"?: "...", "filename"?: "..."}
  POST /convert-watermark   same, plus "watermark_text"? (default CONFIDENTIAL)

ENVIRONMENT VARIABLES:
  MD2PDF_CSS, MD2PDF_WATERMARK_TEXT, MD2PDF_HOST, MD2PDF_PORT,
  MD2PDF_PAPER, MD2PDF_MARGIN, MD2PDF_LANG, MD2PDF_NO_PROGRESS
  CHROME                  Chrome/Chromium executable (same as --chrome)
  RUST_LOG                Override log filter (e.g. md2pdf=debug)

SETUP:
  A Chrome or Chromium installation is required. It is located
  automatically; point --chrome at a specific binary if needed.
"#;

/// Convert Markdown files to PDF, or serve conversions over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "md2pdf",
    version,
    about = "Convert Markdown files to PDF, or serve conversions over HTTP",
    long_about = "Convert Markdown documents to PDF through headless Chrome, with an optional \
tiled diagonal watermark on every page. Run with --serve to expose the same conversion as a \
small local HTTP service.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file to convert (required unless --serve).
    input: Option<PathBuf>,

    /// Output PDF path. Default: input path with a .pdf extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stylesheet to use instead of the bundled default.
    #[arg(long, env = "MD2PDF_CSS")]
    css: Option<PathBuf>,

    /// Add a watermark with the default text (CONFIDENTIAL).
    #[arg(long)]
    watermark: bool,

    /// Watermark text (implies --watermark).
    #[arg(long, env = "MD2PDF_WATERMARK_TEXT")]
    watermark_text: Option<String>,

    /// Run the HTTP conversion service instead of converting a file.
    #[arg(long)]
    serve: bool,

    /// HTTP listen address.
    #[arg(long, env = "MD2PDF_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// HTTP listen port.
    #[arg(long, env = "MD2PDF_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Paper size: a4, a3, a5, letter, legal, or WxH in inches (8.5x11).
    #[arg(long, env = "MD2PDF_PAPER", default_value = "a4")]
    paper: PaperSize,

    /// Landscape orientation.
    #[arg(long)]
    landscape: bool,

    /// Page margin in inches (0–3).
    #[arg(long, env = "MD2PDF_MARGIN", default_value_t = 0.5)]
    margin: f64,

    /// Chrome/Chromium executable.
    #[arg(long, env = "CHROME")]
    chrome: Option<PathBuf>,

    /// `lang` attribute of the generated HTML document.
    #[arg(long, env = "MD2PDF_LANG", default_value = DEFAULT_LANG)]
    lang: String,

    /// Disable the spinner.
    #[arg(long, env = "MD2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// `--watermark-text` wins when non-empty; `--watermark` alone uses the default.
    fn watermark_text(&self) -> Option<String> {
        match self.watermark_text.as_deref() {
            Some(text) if !text.is_empty() => Some(text.to_string()),
            _ if self.watermark => Some(DEFAULT_WATERMARK_TEXT.to_string()),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters in file mode, so
    // library INFO logs are muted while it runs.
    let show_progress = !cli.serve && !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.serve {
        return match run_server(&cli).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{} {e:#}", red("✘"));
                ExitCode::from(1)
            }
        };
    }

    let Some(input) = cli.input.clone() else {
        eprintln!(
            "{} missing input file: an input path is required unless --serve is given",
            red("✘")
        );
        return ExitCode::from(2);
    };

    match run_convert(&cli, input, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", red("✘"));
            ExitCode::from(1)
        }
    }
}

async fn run_convert(cli: &Cli, input: PathBuf, show_progress: bool) -> Result<()> {
    let mut builder = base_config(cli);
    if let Some(text) = cli.watermark_text() {
        builder = builder.watermark_text(text);
    }
    let config = builder.build().context("Invalid configuration")?;

    let spinner = show_progress.then(|| spinner(&input));
    let start = Instant::now();
    let output = cli.output.clone();

    let joined = tokio::task::spawn_blocking(move || {
        convert_file(&input, output.as_deref(), &config)
    })
    .await;

    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }
    let output_path = joined
        .context("Conversion task failed")?
        .context("Conversion failed")?;

    println!("PDF generated: {}", output_path.display());
    if !cli.quiet {
        eprintln!(
            "{}  {}  {}",
            green("✔"),
            bold(&output_path.display().to_string()),
            dim(&format!("{}ms", start.elapsed().as_millis())),
        );
    }
    Ok(())
}

async fn run_server(cli: &Cli) -> Result<()> {
    let conversion = base_config(cli).build().context("Invalid configuration")?;
    let config = ServerConfig {
        host: cli.host.clone(),
        port: cli.port,
        conversion,
        ..ServerConfig::default()
    };

    let server = Server::bind(config)
        .await
        .context("Failed to start HTTP server")?;
    let addr = server.local_addr().context("Failed to read bound address")?;

    if !cli.quiet {
        eprintln!(
            "{} {}",
            cyan("◆"),
            bold(&format!("md2pdf HTTP server running on http://{addr}"))
        );
        eprintln!("  {}  {}", dim("GET "), "/health");
        eprintln!("  {}  {}", dim("POST"), "/convert");
        eprintln!("  {}  {}", dim("POST"), "/convert-watermark");
        eprintln!("  {}", dim("Press Ctrl-C to stop"));
    }

    server.run().await.context("HTTP server failed")?;
    if !cli.quiet {
        eprintln!("\n{} HTTP server stopped", green("✔"));
    }
    Ok(())
}

/// Flags shared by file and serve mode.
fn base_config(cli: &Cli) -> md2pdf::ConversionConfigBuilder {
    let mut builder = ConversionConfig::builder()
        .lang(cli.lang.clone())
        .paper(cli.paper)
        .landscape(cli.landscape)
        .margin_in(cli.margin);
    if let Some(ref css) = cli.css {
        builder = builder.css_path(css);
    }
    if let Some(ref chrome) = cli.chrome {
        builder = builder.chrome_path(chrome);
    }
    builder
}

fn spinner(input: &std::path::Path) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Rendering");
    bar.set_message(
        input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
