//! Shared helpers for integration tests: renderers that never launch Chrome.

#![allow(dead_code)]

use md2pdf::{ConversionConfig, Md2PdfError, PdfRenderer};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

pub const STUB_PDF: &[u8] = b"%PDF-1.4\n% stub\n%%EOF\n";

/// One call into a renderer.
#[derive(Debug, Clone)]
pub struct RenderCall {
    pub html: String,
    pub base_dir: PathBuf,
}

/// Records every document it is asked to render and returns [`STUB_PDF`].
#[derive(Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_html(&self) -> String {
        self.calls()
            .last()
            .map(|c| c.html.clone())
            .expect("renderer was never called")
    }
}

impl PdfRenderer for RecordingRenderer {
    fn render(&self, html: &str, base_dir: &Path) -> Result<Vec<u8>, Md2PdfError> {
        self.calls.lock().unwrap().push(RenderCall {
            html: html.to_string(),
            base_dir: base_dir.to_path_buf(),
        });
        Ok(STUB_PDF.to_vec())
    }
}

/// Always fails with the given detail.
pub struct FailingRenderer(pub &'static str);

impl PdfRenderer for FailingRenderer {
    fn render(&self, _html: &str, _base_dir: &Path) -> Result<Vec<u8>, Md2PdfError> {
        Err(Md2PdfError::RenderFailed {
            detail: self.0.to_string(),
        })
    }
}

/// Succeeds with zero bytes.
pub struct EmptyRenderer;

impl PdfRenderer for EmptyRenderer {
    fn render(&self, _html: &str, _base_dir: &Path) -> Result<Vec<u8>, Md2PdfError> {
        Ok(Vec::new())
    }
}

/// Route library logs through the test harness; `RUST_LOG=md2pdf=debug`
/// shows them for failing tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn config_with(renderer: Arc<dyn PdfRenderer>) -> ConversionConfig {
    init_tracing();
    ConversionConfig::builder()
        .renderer(renderer)
        .build()
        .unwrap()
}
