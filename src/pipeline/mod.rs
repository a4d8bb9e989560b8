//! Pipeline stages for Markdown-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step and is
//! independently testable. Only [`markdown`] and [`render`] touch external
//! engines; the middle stages are pure string construction.
//!
//! ## Data Flow
//!
//! ```text
//! markdown ──▶ css + watermark ──▶ document ──▶ render
//! (comrak)     (style, overlay)    (HTML page)  (Chrome → PDF bytes)
//! ```
//!
//! 1. [`markdown`]  — Markdown text to body-level HTML, with heading anchors
//!    and `[TOC]` expansion
//! 2. [`css`]       — explicit stylesheet or the bundled default
//! 3. [`watermark`] — tiled overlay markup and its style rules
//! 4. [`document`]  — fixed HTML skeleton around body, CSS and overlay
//! 5. [`render`]    — HTML document to PDF bytes through a [`render::PdfRenderer`]

pub mod css;
pub mod document;
pub mod markdown;
pub mod render;
pub mod watermark;
