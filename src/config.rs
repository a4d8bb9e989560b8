//! Configuration types for Markdown-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The same config value drives the CLI,
//! the HTTP server (one shared default, cloned and specialised per request)
//! and direct library calls.
//!
//! The HTTP listener has its own [`ServerConfig`], which embeds the
//! `ConversionConfig` used as the per-request baseline.

use crate::error::Md2PdfError;
use crate::pipeline::render::PdfRenderer;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Watermark text used when a watermark is requested without explicit text.
pub const DEFAULT_WATERMARK_TEXT: &str = "CONFIDENTIAL";

/// Default `<html lang>` attribute of assembled documents.
pub const DEFAULT_LANG: &str = "zh-CN";

/// Default listen address of the HTTP service.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port of the HTTP service.
pub const DEFAULT_PORT: u16 = 20706;

/// Configuration for a Markdown-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2pdf::{ConversionConfig, PaperSize};
///
/// let config = ConversionConfig::builder()
///     .watermark_text("DRAFT")
///     .paper(PaperSize::Letter)
///     .build()
///     .unwrap();
/// assert_eq!(config.watermark_text.as_deref(), Some("DRAFT"));
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Explicit stylesheet. `None` uses the bundled default stylesheet.
    ///
    /// A leading `~` is expanded to the home directory; relative paths are
    /// resolved against the current working directory.
    pub css_path: Option<PathBuf>,

    /// Watermark text. `None`, empty or whitespace-only means no watermark.
    pub watermark_text: Option<String>,

    /// Directory used to resolve relative resources (images, fonts).
    ///
    /// File conversion always uses the input file's directory; in-memory
    /// rendering falls back to the current working directory when unset.
    pub base_path: Option<PathBuf>,

    /// `lang` attribute of the generated `<html>` element. Default: `zh-CN`.
    pub lang: String,

    /// Page geometry and browser options handed to the renderer.
    pub page: PageLayout,

    /// Pre-constructed renderer. Takes precedence over `page`-driven
    /// construction of a [`crate::pipeline::render::ChromeRenderer`].
    pub renderer: Option<Arc<dyn PdfRenderer>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            css_path: None,
            watermark_text: None,
            base_path: None,
            lang: DEFAULT_LANG.to_string(),
            page: PageLayout::default(),
            renderer: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("css_path", &self.css_path)
            .field("watermark_text", &self.watermark_text)
            .field("base_path", &self.base_path)
            .field("lang", &self.lang)
            .field("page", &self.page)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn PdfRenderer>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The watermark text, if it would actually produce a watermark.
    pub fn effective_watermark(&self) -> Option<&str> {
        self.watermark_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn css_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.css_path = Some(path.into());
        self
    }

    pub fn watermark_text(mut self, text: impl Into<String>) -> Self {
        self.config.watermark_text = Some(text.into());
        self
    }

    /// Enable the watermark with [`DEFAULT_WATERMARK_TEXT`].
    pub fn watermark(self) -> Self {
        self.watermark_text(DEFAULT_WATERMARK_TEXT)
    }

    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.base_path = Some(path.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.config.lang = lang.into();
        self
    }

    pub fn page(mut self, page: PageLayout) -> Self {
        self.config.page = page;
        self
    }

    pub fn paper(mut self, paper: PaperSize) -> Self {
        self.config.page.paper = paper;
        self
    }

    pub fn landscape(mut self, v: bool) -> Self {
        self.config.page.landscape = v;
        self
    }

    pub fn margin_in(mut self, inches: f64) -> Self {
        self.config.page.margin_in = inches;
        self
    }

    pub fn print_background(mut self, v: bool) -> Self {
        self.config.page.print_background = v;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.page.chrome_path = Some(path.into());
        self
    }

    pub fn sandbox(mut self, v: bool) -> Self {
        self.config.page.sandbox = v;
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PdfRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2PdfError> {
        let c = &self.config;
        if c.lang.trim().is_empty() {
            return Err(Md2PdfError::InvalidConfig("lang must not be empty".into()));
        }
        if !(0.0..=3.0).contains(&c.page.margin_in) {
            return Err(Md2PdfError::InvalidConfig(format!(
                "margin must be 0–3 inches, got {}",
                c.page.margin_in
            )));
        }
        let (w, h) = c.page.paper.dimensions_in();
        if !(w > 0.0 && h > 0.0) {
            return Err(Md2PdfError::InvalidConfig(format!(
                "paper size must be positive, got {w}×{h} in"
            )));
        }
        if 2.0 * c.page.margin_in >= w.min(h) {
            return Err(Md2PdfError::InvalidConfig(format!(
                "margin {} in leaves no printable area on {w}×{h} in paper",
                c.page.margin_in
            )));
        }
        Ok(self.config)
    }
}

// ── Page layout ──────────────────────────────────────────────────────────

/// Page geometry and browser options for the PDF renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Paper size. Default: A4.
    pub paper: PaperSize,
    /// Landscape orientation. Default: false.
    pub landscape: bool,
    /// Uniform page margin in inches. Default: 0.5.
    pub margin_in: f64,
    /// Print CSS backgrounds (code block shading, table stripes). Default: true.
    pub print_background: bool,
    /// Chrome/Chromium executable. `None` lets headless_chrome locate one.
    pub chrome_path: Option<PathBuf>,
    /// Run Chrome with its sandbox. Default: false (containers run as root).
    pub sandbox: bool,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            paper: PaperSize::default(),
            landscape: false,
            margin_in: 0.5,
            print_background: true,
            chrome_path: None,
            sandbox: false,
        }
    }
}

/// Predefined paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    /// Width × height in inches.
    Custom { width_in: f64, height_in: f64 },
}

impl PaperSize {
    /// Portrait width and height in inches.
    pub fn dimensions_in(&self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (8.27, 11.69),
            PaperSize::A3 => (11.69, 16.54),
            PaperSize::A5 => (5.83, 8.27),
            PaperSize::Letter => (8.5, 11.0),
            PaperSize::Legal => (8.5, 14.0),
            PaperSize::Custom {
                width_in,
                height_in,
            } => (*width_in, *height_in),
        }
    }
}

impl std::str::FromStr for PaperSize {
    type Err = Md2PdfError;

    /// Parse `a4`, `letter`, … or a custom `WxH` size in inches (`8.5x11`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "a4" => Ok(PaperSize::A4),
            "a3" => Ok(PaperSize::A3),
            "a5" => Ok(PaperSize::A5),
            "letter" => Ok(PaperSize::Letter),
            "legal" => Ok(PaperSize::Legal),
            custom => {
                let parsed = custom.split_once('x').and_then(|(w, h)| {
                    Some((w.trim().parse::<f64>().ok()?, h.trim().parse::<f64>().ok()?))
                });
                match parsed {
                    Some((width_in, height_in)) if width_in > 0.0 && height_in > 0.0 => {
                        Ok(PaperSize::Custom {
                            width_in,
                            height_in,
                        })
                    }
                    _ => Err(Md2PdfError::InvalidConfig(format!(
                        "unknown paper size '{s}' (expected a4, a3, a5, letter, legal or WxH in inches)"
                    ))),
                }
            }
        }
    }
}

// ── Server ───────────────────────────────────────────────────────────────

/// Configuration for the HTTP conversion service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address. Default: `127.0.0.1`.
    pub host: String,
    /// Listen port. `0` picks a free port. Default: 20706.
    pub port: u16,
    /// Largest accepted request body in bytes. Default: 16 MiB.
    pub max_body_bytes: usize,
    /// Baseline conversion settings; `css_path` here is the server-wide
    /// default stylesheet, overridable per request.
    pub conversion: ConversionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_body_bytes: 16 * 1024 * 1024,
            conversion: ConversionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` as given, for display and error messages.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert!(c.css_path.is_none());
        assert!(c.watermark_text.is_none());
        assert_eq!(c.lang, "zh-CN");
        assert_eq!(c.page.paper, PaperSize::A4);
        assert!(c.page.print_background);
    }

    #[test]
    fn watermark_flag_uses_default_text() {
        let c = ConversionConfig::builder().watermark().build().unwrap();
        assert_eq!(c.effective_watermark(), Some(DEFAULT_WATERMARK_TEXT));
    }

    #[test]
    fn blank_watermark_is_not_effective() {
        let c = ConversionConfig::builder()
            .watermark_text("   ")
            .build()
            .unwrap();
        assert_eq!(c.effective_watermark(), None);
    }

    #[test]
    fn rejects_out_of_range_margin() {
        let err = ConversionConfig::builder().margin_in(5.0).build().unwrap_err();
        assert!(matches!(err, Md2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_margin_larger_than_paper() {
        let err = ConversionConfig::builder()
            .paper(PaperSize::Custom {
                width_in: 2.0,
                height_in: 2.0,
            })
            .margin_in(1.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("no printable area"), "got: {err}");
    }

    #[test]
    fn rejects_empty_lang() {
        assert!(ConversionConfig::builder().lang(" ").build().is_err());
    }

    #[test]
    fn paper_size_parsing() {
        assert_eq!("A4".parse::<PaperSize>().unwrap(), PaperSize::A4);
        assert_eq!("letter".parse::<PaperSize>().unwrap(), PaperSize::Letter);
        assert_eq!(
            "8.5x11".parse::<PaperSize>().unwrap(),
            PaperSize::Custom {
                width_in: 8.5,
                height_in: 11.0
            }
        );
        assert!("tabloid".parse::<PaperSize>().is_err());
        assert!("0x11".parse::<PaperSize>().is_err());
    }

    #[test]
    fn server_defaults() {
        let s = ServerConfig::default();
        assert_eq!(s.addr(), "127.0.0.1:20706");
        assert!(s.conversion.css_path.is_none());
    }
}
