//! Error types for the md2pdf library.
//!
//! Two error types reflect the two places a conversion can be refused:
//!
//! * [`Md2PdfError`] — **Fatal**: the conversion itself cannot complete
//!   (missing input or stylesheet, renderer failure, unwritable output).
//!   Returned as `Err(Md2PdfError)` from every library entry point.
//!
//! * [`RequestError`] — **Client**: an HTTP request to the server was
//!   malformed before any conversion started. The server answers `400`
//!   (or `413`) and keeps serving.
//!
//! The `Display` text of [`RequestError`] is exactly the `error` message sent
//! back in the JSON response body, so HTTP clients see the same wording the
//! logs do.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the md2pdf library.
#[derive(Debug, Error)]
pub enum Md2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The Markdown source does not exist or is not a regular file.
    #[error("Input file not found: '{path}'\nCheck the path exists and is a regular file.")]
    InputNotFound { path: PathBuf },

    /// An explicitly requested stylesheet does not exist or is not a regular file.
    #[error("CSS file not found: '{path}'")]
    ResourceNotFound { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The HTML→PDF renderer raised an error or produced no bytes.
    #[error("PDF rendering failed: {detail}")]
    RenderFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory or write the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Server errors ─────────────────────────────────────────────────────
    /// The HTTP listener could not bind (port in use, bad address, …).
    #[error("Failed to start HTTP server on {addr}: {source}")]
    StartupFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Md2PdfError {
    pub(crate) fn startup(addr: impl Into<String>, source: std::io::Error) -> Self {
        Md2PdfError::StartupFailed {
            addr: addr.into(),
            source,
        }
    }
}

/// A malformed HTTP conversion request.
///
/// Rejected before any conversion work is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// No body, or a zero-length body.
    #[error("request body is empty")]
    EmptyBody,

    /// The body exceeded the configured size limit.
    #[error("request body too large (limit {limit} bytes)")]
    BodyTooLarge { limit: usize },

    /// The body is not UTF-8 JSON.
    #[error("invalid json body")]
    InvalidJson,

    /// Valid JSON, but the root is an array, string, number, …
    #[error("json root must be object")]
    NotAnObject,

    /// A field is missing or has the wrong type / emptiness.
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

impl RequestError {
    /// HTTP status code the server answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::BodyTooLarge { .. } => 413,
            _ => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_not_found_names_path() {
        let e = Md2PdfError::ResourceNotFound {
            path: PathBuf::from("/tmp/missing.css"),
        };
        assert!(e.to_string().contains("/tmp/missing.css"), "got: {e}");
    }

    #[test]
    fn input_not_found_names_path() {
        let e = Md2PdfError::InputNotFound {
            path: PathBuf::from("/docs/readme.md"),
        };
        assert!(e.to_string().contains("/docs/readme.md"));
    }

    #[test]
    fn render_failed_keeps_detail() {
        let e = Md2PdfError::RenderFailed {
            detail: "renderer produced no output".into(),
        };
        assert_eq!(
            e.to_string(),
            "PDF rendering failed: renderer produced no output"
        );
    }

    #[test]
    fn startup_failed_display() {
        let e = Md2PdfError::startup(
            "127.0.0.1:20706",
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        );
        let msg = e.to_string();
        assert!(msg.contains("127.0.0.1:20706"), "got: {msg}");
        assert!(msg.contains("address in use"), "got: {msg}");
    }

    #[test]
    fn request_error_messages_match_wire_contract() {
        assert_eq!(RequestError::EmptyBody.to_string(), "request body is empty");
        assert_eq!(RequestError::InvalidJson.to_string(), "invalid json body");
        assert_eq!(RequestError::NotAnObject.to_string(), "json root must be object");
        assert_eq!(
            RequestError::InvalidField {
                field: "markdown",
                expected: "a string",
            }
            .to_string(),
            "field 'markdown' must be a string"
        );
        assert_eq!(
            RequestError::InvalidField {
                field: "watermark_text",
                expected: "a non-empty string",
            }
            .to_string(),
            "field 'watermark_text' must be a non-empty string"
        );
    }

    #[test]
    fn request_error_status_codes() {
        assert_eq!(RequestError::EmptyBody.status_code(), 400);
        assert_eq!(RequestError::NotAnObject.status_code(), 400);
        assert_eq!(RequestError::BodyTooLarge { limit: 10 }.status_code(), 413);
    }
}
