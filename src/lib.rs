//! # md2pdf
//!
//! Convert Markdown documents to print-quality PDF, optionally with a tiled
//! diagonal watermark on every page.
//!
//! ## Why headless Chrome?
//!
//! Markdown's natural output is HTML, and nothing lays out HTML + CSS for
//! print as faithfully as a browser engine. This crate renders Markdown with
//! `comrak`, wraps it in a fixed HTML document carrying the stylesheet and
//! watermark overlay, and asks headless Chrome to print it. Styling is plain
//! CSS; the bundled default looks like GitHub's Markdown rendering.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Parse     comrak → HTML body (tables, fenced code, [TOC])
//!  ├─ 2. Style     explicit stylesheet or bundled default
//!  ├─ 3. Overlay   tiled watermark markup + CSS (optional)
//!  ├─ 4. Assemble  fixed HTML skeleton
//!  ├─ 5. Render    headless Chrome → PDF bytes (blocking)
//!  └─ 6. Output    atomic file write, or bytes for the HTTP response
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2pdf::{convert_file, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().watermark().build()?;
//!     let pdf = convert_file("report.md", None, &config)?;
//!     println!("{}", pdf.display());
//!     Ok(())
//! }
//! ```
//!
//! ## HTTP Service
//!
//! ```rust,no_run
//! use md2pdf::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), md2pdf::Md2PdfError> {
//!     Server::bind(ServerConfig::default()).await?.run().await
//! }
//! ```
//!
//! `POST /convert` and `POST /convert-watermark` take
//! `{"markdown": "...", "css_path"?, "filename"?, "watermark_text"?}` and
//! answer with the PDF as an attachment. See [`server::handler`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! md2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionConfigBuilder, PageLayout, PaperSize, ServerConfig, DEFAULT_HOST,
    DEFAULT_LANG, DEFAULT_PORT, DEFAULT_WATERMARK_TEXT,
};
pub use convert::{convert_file, render_html, render_to_bytes};
pub use error::{Md2PdfError, RequestError};
pub use pipeline::css::resolve_css;
pub use pipeline::document::assemble_document;
pub use pipeline::markdown::markdown_to_html;
pub use pipeline::render::{ChromeRenderer, PdfRenderer};
pub use pipeline::watermark::{build_watermark, WatermarkAssets};
pub use server::{serve, Server};
