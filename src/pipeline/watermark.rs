//! Watermark overlay: a tiled, rotated band of translucent text.
//!
//! The overlay is plain markup plus a matching style block; nothing here
//! knows about the renderer. A `position: fixed` container is repeated by
//! Chrome on every printed page, so one overlay covers the whole document.
//!
//! Layout: an oversized container (twice the viewport, shifted up and left)
//! rotated by [`ROTATION_DEG`] around its centre, holding two horizontal
//! lines of [`REPEAT_COUNT`] copies of the text. Line A sits at
//! [`LINE_A_TOP_PCT`]% of the container, line B at [`LINE_B_TOP_PCT`]%.
//!
//! The repeat count and spacing are tuned for A4/Letter portrait pages and
//! are deliberately not derived from the page size.

use super::document::escape_html;

/// Copies of the text per line.
pub const REPEAT_COUNT: usize = 8;

/// Rotation of the overlay, in degrees.
pub const ROTATION_DEG: i32 = -29;

/// Vertical offset of the first line (percent of the overlay height).
pub const LINE_A_TOP_PCT: u32 = 32;

/// Vertical offset of the second line (percent of the overlay height).
pub const LINE_B_TOP_PCT: u32 = 62;

/// Horizontal gap on each side of one copy, in px. At 48px type copies
/// never touch.
pub const ITEM_MARGIN_PX: u32 = 90;

/// Generated markup and style for one watermark.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatermarkAssets {
    /// Overlay `<div>` placed first in `<body>`. Empty when disabled.
    pub overlay_html: String,
    /// CSS rules appended after the base stylesheet. Empty when disabled.
    pub style_css: String,
}

impl WatermarkAssets {
    pub fn is_empty(&self) -> bool {
        self.overlay_html.is_empty() && self.style_css.is_empty()
    }
}

/// Build the overlay markup and style for `text`.
///
/// `None`, `""` and whitespace-only text yield empty assets. Output is a pure
/// function of the input: the same text always produces byte-identical
/// strings.
pub fn build_watermark(text: Option<&str>) -> WatermarkAssets {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return WatermarkAssets::default();
    };

    let escaped = escape_html(text);
    let mut overlay = String::from("    <div class=\"md2pdf-watermark\" aria-hidden=\"true\">\n");
    for line in ["a", "b"] {
        overlay.push_str(&format!(
            "      <div class=\"md2pdf-watermark-line md2pdf-watermark-line-{line}\">\n"
        ));
        for _ in 0..REPEAT_COUNT {
            overlay.push_str(&format!(
                "        <span class=\"md2pdf-watermark-item\">{escaped}</span>\n"
            ));
        }
        overlay.push_str("      </div>\n");
    }
    overlay.push_str("    </div>\n");

    WatermarkAssets {
        overlay_html: overlay,
        style_css: watermark_css(),
    }
}

fn watermark_css() -> String {
    format!(
        r#"
.md2pdf-watermark {{
  position: fixed;
  top: -50%;
  left: -50%;
  width: 200%;
  height: 200%;
  overflow: hidden;
  pointer-events: none;
  z-index: 9999;
  transform: rotate({rotation}deg);
  transform-origin: 50% 50%;
}}

.md2pdf-watermark-line {{
  position: absolute;
  left: 0;
  width: 100%;
  white-space: nowrap;
  text-align: center;
}}

.md2pdf-watermark-line-a {{
  top: {top_a}%;
}}

.md2pdf-watermark-line-b {{
  top: {top_b}%;
}}

.md2pdf-watermark-item {{
  display: inline-block;
  margin: 0 {margin}px;
  font-size: 48px;
  font-weight: 700;
  letter-spacing: 6px;
  color: rgba(128, 128, 128, 0.16);
  -webkit-user-select: none;
  user-select: none;
}}
"#,
        rotation = ROTATION_DEG,
        top_a = LINE_A_TOP_PCT,
        top_b = LINE_B_TOP_PCT,
        margin = ITEM_MARGIN_PX,
    )
}
