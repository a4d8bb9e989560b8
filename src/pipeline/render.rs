//! HTML → PDF rendering through headless Chrome.
//!
//! ## Why a trait?
//!
//! The renderer is the one external engine in the pipeline. [`PdfRenderer`]
//! keeps it swappable: the CLI and server use [`ChromeRenderer`], tests
//! inject a recording stub, and library users can plug in any engine that
//! turns an HTML string into PDF bytes.
//!
//! ## Why a temp file?
//!
//! Chrome needs a URL to navigate to. Large documents do not fit comfortably
//! in a `data:` URL, so the HTML is written to a [`tempfile`] that is removed
//! when the render returns, on success, error or panic alike. Relative
//! resources are resolved against the caller's base directory through an
//! injected `<base href>`.
//!
//! Every call launches its own browser; no state is shared between renders,
//! so concurrent calls from server worker threads are safe.

use crate::config::PageLayout;
use crate::error::Md2PdfError;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Turns a complete HTML document into PDF bytes.
///
/// `base_dir` is the absolute directory relative links in `html` resolve
/// against. Implementations must be callable from several threads at once.
pub trait PdfRenderer: Send + Sync {
    fn render(&self, html: &str, base_dir: &Path) -> Result<Vec<u8>, Md2PdfError>;
}

/// Renders through a freshly launched headless Chrome/Chromium.
#[derive(Debug, Clone, Default)]
pub struct ChromeRenderer {
    layout: PageLayout,
}

impl ChromeRenderer {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    fn launch(&self) -> Result<Browser, Md2PdfError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.layout.sandbox)
            .path(self.layout.chrome_path.clone())
            .build()
            .map_err(|e| render_failed("invalid browser launch options", e))?;
        Browser::new(options).map_err(|e| render_failed("failed to launch Chrome", e))
    }
}

impl PdfRenderer for ChromeRenderer {
    fn render(&self, html: &str, base_dir: &Path) -> Result<Vec<u8>, Md2PdfError> {
        let base_url = url::Url::from_directory_path(base_dir).map_err(|()| {
            Md2PdfError::RenderFailed {
                detail: format!("base path is not absolute: '{}'", base_dir.display()),
            }
        })?;
        let html = inject_base_href(html, base_url.as_str());

        let mut page = tempfile::Builder::new()
            .prefix("md2pdf-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| Md2PdfError::Internal(format!("tempfile: {e}")))?;
        page.write_all(html.as_bytes())
            .and_then(|()| page.flush())
            .map_err(|e| Md2PdfError::Internal(format!("tempfile write: {e}")))?;
        let page_url = url::Url::from_file_path(page.path()).map_err(|()| {
            Md2PdfError::Internal(format!(
                "temp file path is not absolute: '{}'",
                page.path().display()
            ))
        })?;

        let browser = self.launch()?;
        let tab = browser
            .new_tab()
            .map_err(|e| render_failed("failed to open tab", e))?;
        tab.navigate_to(page_url.as_str())
            .map_err(|e| render_failed("failed to load document", e))?;
        tab.wait_until_navigated()
            .map_err(|e| render_failed("document did not finish loading", e))?;

        let pdf = tab
            .print_to_pdf(Some(print_options(&self.layout)))
            .map_err(|e| render_failed("print to PDF failed", e))?;

        info!("Chrome rendered {} bytes of PDF", pdf.len());
        Ok(pdf)
    }
}

fn render_failed(context: &str, err: impl std::fmt::Display) -> Md2PdfError {
    Md2PdfError::RenderFailed {
        detail: format!("{context}: {err}"),
    }
}

/// DevTools print options for a page layout.
pub fn print_options(layout: &PageLayout) -> PrintToPdfOptions {
    let (width, height) = layout.paper.dimensions_in();
    PrintToPdfOptions {
        landscape: Some(layout.landscape),
        display_header_footer: Some(false),
        print_background: Some(layout.print_background),
        scale: Some(1.0),
        paper_width: Some(width),
        paper_height: Some(height),
        margin_top: Some(layout.margin_in),
        margin_bottom: Some(layout.margin_in),
        margin_left: Some(layout.margin_in),
        margin_right: Some(layout.margin_in),
        prefer_css_page_size: Some(false),
        ..Default::default()
    }
}

/// Insert `<base href>` as the first element of `<head>`.
///
/// Documents without a `<head>` tag are returned unchanged.
pub fn inject_base_href(html: &str, base_url: &str) -> String {
    let Some(head) = html.find("<head>") else {
        debug!("No <head> in document; relative links resolve against the temp dir");
        return html.to_string();
    };
    let insert_at = head + "<head>".len();
    let tag = format!(
        "\n    <base href=\"{}\" />",
        base_url.replace('&', "&amp;").replace('"', "&quot;")
    );

    let mut out = String::with_capacity(html.len() + tag.len());
    out.push_str(&html[..insert_at]);
    out.push_str(&tag);
    out.push_str(&html[insert_at..]);
    out
}
