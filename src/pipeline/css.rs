//! Stylesheet resolution: explicit CSS file or the bundled default.
//!
//! The default stylesheet is compiled into the binary with `include_str!`,
//! so a packaged build can never fail to find it and no install-path lookup
//! happens at runtime.

use crate::error::Md2PdfError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The bundled default stylesheet.
pub const DEFAULT_CSS: &str = include_str!("../../assets/default.css");

/// Resolve the stylesheet text for a conversion.
///
/// * `Some(path)` — `~` is expanded, the path is made absolute, and the file
///   must be a regular file; its contents are returned verbatim.
/// * `None` — the bundled default stylesheet.
///
/// # Errors
/// [`Md2PdfError::ResourceNotFound`] (naming the resolved path) when an
/// explicit path is missing or not a regular file.
pub fn resolve_css(explicit_path: Option<&Path>) -> Result<String, Md2PdfError> {
    let Some(path) = explicit_path else {
        return Ok(DEFAULT_CSS.to_string());
    };

    let resolved = resolve_path(path);
    if !resolved.is_file() {
        return Err(Md2PdfError::ResourceNotFound { path: resolved });
    }

    let css = std::fs::read_to_string(&resolved).map_err(|e| Md2PdfError::ReadFailed {
        path: resolved.clone(),
        source: e,
    })?;
    debug!("Loaded stylesheet {} ({} bytes)", resolved.display(), css.len());
    Ok(css)
}

/// Expand a leading `~` and make `path` absolute.
///
/// Symlinks are not resolved, so error messages show the path the caller
/// would recognise.
pub fn resolve_path(path: &Path) -> PathBuf {
    let expanded = expand_home(path);
    std::path::absolute(&expanded).unwrap_or(expanded)
}

/// Replace a leading `~` component with the user's home directory.
///
/// `~user` forms are left untouched.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(std::path::Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}
