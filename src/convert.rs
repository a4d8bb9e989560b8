//! Conversion entry points.
//!
//! Two flavours share one pipeline:
//!
//! * [`convert_file`] — read a Markdown file, write the PDF next to it (or to
//!   an explicit path) and return where it went.
//! * [`render_to_bytes`] — take Markdown text, return the PDF bytes. Used by
//!   the HTTP server.
//!
//! Both are synchronous and keep no state between calls, so they can run on
//! any number of threads at once. Async callers should run them on
//! `tokio::task::spawn_blocking`, as the server does.

use crate::config::ConversionConfig;
use crate::error::Md2PdfError;
use crate::pipeline::css::{resolve_css, resolve_path};
use crate::pipeline::document::assemble_document_with_lang;
use crate::pipeline::markdown::markdown_to_html;
use crate::pipeline::render::{ChromeRenderer, PdfRenderer};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a Markdown file to a PDF file.
///
/// # Arguments
/// * `input_path`  — Markdown source (`~` expanded, made absolute)
/// * `output_path` — destination; defaults to the input path with its
///   extension replaced by `.pdf`
/// * `config`      — stylesheet, watermark, page layout, renderer
///
/// Relative resources in the document resolve against the input file's
/// directory; `config.base_path` is ignored here.
///
/// # Returns
/// The absolute path the PDF was written to.
///
/// # Errors
/// - [`Md2PdfError::InputNotFound`] — input missing or not a regular file
/// - [`Md2PdfError::ResourceNotFound`] — explicit stylesheet missing
/// - [`Md2PdfError::RenderFailed`] — renderer failed or produced no bytes
/// - [`Md2PdfError::OutputWriteFailed`] — destination not writable
///
/// No file is created or modified at the destination unless rendering
/// succeeded.
pub fn convert_file(
    input_path: impl AsRef<Path>,
    output_path: Option<&Path>,
    config: &ConversionConfig,
) -> Result<PathBuf, Md2PdfError> {
    let start = Instant::now();
    let input_path = resolve_path(input_path.as_ref());
    if !input_path.is_file() {
        return Err(Md2PdfError::InputNotFound { path: input_path });
    }
    info!("Starting conversion: {}", input_path.display());

    let output_path = match output_path {
        Some(path) => resolve_path(path),
        None => input_path.with_extension("pdf"),
    };
    debug!("Output path: {}", output_path.display());

    let markdown = std::fs::read_to_string(&input_path).map_err(|e| Md2PdfError::ReadFailed {
        path: input_path.clone(),
        source: e,
    })?;

    let title = input_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base_dir = input_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));

    let pdf = render_pipeline(&markdown, &title, &base_dir, config)?;
    write_atomic(&output_path, &pdf)?;

    info!(
        "PDF generated: {} ({} bytes, {}ms)",
        output_path.display(),
        pdf.len(),
        start.elapsed().as_millis()
    );
    Ok(output_path)
}

/// Render Markdown text to PDF bytes.
///
/// `title` only fills the document `<title>`. Relative resources resolve
/// against `config.base_path`, or the current working directory when unset.
///
/// # Errors
/// - [`Md2PdfError::ResourceNotFound`] — explicit stylesheet missing
/// - [`Md2PdfError::RenderFailed`] — renderer failed or produced no bytes
pub fn render_to_bytes(
    markdown: &str,
    title: &str,
    config: &ConversionConfig,
) -> Result<Vec<u8>, Md2PdfError> {
    let base_dir = match config.base_path {
        Some(ref path) => resolve_path(path),
        None => std::env::current_dir()
            .map_err(|e| Md2PdfError::Internal(format!("current directory: {e}")))?,
    };
    render_pipeline(markdown, title, &base_dir, config)
}

/// Build the HTML document exactly as it would be handed to the renderer.
///
/// Useful for debugging stylesheets without launching a browser.
pub fn render_html(
    markdown: &str,
    title: &str,
    config: &ConversionConfig,
) -> Result<String, Md2PdfError> {
    let css = resolve_css(config.css_path.as_deref())?;
    let body = markdown_to_html(markdown)?;
    Ok(assemble_document_with_lang(
        &config.lang,
        title,
        &body,
        &css,
        config.effective_watermark(),
    ))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn render_pipeline(
    markdown: &str,
    title: &str,
    base_dir: &Path,
    config: &ConversionConfig,
) -> Result<Vec<u8>, Md2PdfError> {
    let html = render_html(markdown, title, config)?;
    debug!(
        "Assembled document: {} bytes, watermark={}",
        html.len(),
        config.effective_watermark().is_some()
    );

    let renderer = resolve_renderer(config);
    let pdf = renderer.render(&html, base_dir)?;
    if pdf.is_empty() {
        return Err(Md2PdfError::RenderFailed {
            detail: "renderer produced no output".into(),
        });
    }
    Ok(pdf)
}

/// Pre-built renderer if configured, otherwise Chrome with the page layout.
fn resolve_renderer(config: &ConversionConfig) -> Arc<dyn PdfRenderer> {
    match config.renderer {
        Some(ref renderer) => Arc::clone(renderer),
        None => Arc::new(ChromeRenderer::new(config.page.clone())),
    }
}

/// Write `bytes` to `path` through a temp file in the same directory, so a
/// failure never leaves a truncated PDF behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Md2PdfError> {
    let write_failed = |source: std::io::Error| Md2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(write_failed)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".md2pdf-")
        .suffix(".pdf.tmp")
        .tempfile_in(parent)
        .map_err(write_failed)?;
    tmp.write_all(bytes).map_err(write_failed)?;
    tmp.as_file().sync_all().map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
