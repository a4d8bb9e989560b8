//! Request routing and the JSON wire contract.
//!
//! | Method | Path                 | Result                                   |
//! |--------|----------------------|------------------------------------------|
//! | GET    | `/health`            | `200 {"status":"ok"}`                    |
//! | POST   | `/convert`           | `200` PDF, no watermark                  |
//! | POST   | `/convert-watermark` | `200` PDF, watermark (`CONFIDENTIAL`)    |
//! | any    | anything else        | `404 {"error":"not found"}`              |
//!
//! Malformed bodies get `400` (`413` when over the size limit) with the
//! [`RequestError`] message; conversion failures get
//! `500 {"error":"convert failed: …"}`.

use super::AppState;
use crate::config::DEFAULT_WATERMARK_TEXT;
use crate::convert::render_to_bytes;
use crate::error::RequestError;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE, SERVER};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// `<title>` of documents rendered over HTTP.
pub const HTTP_TITLE: &str = "http-request.md";

/// Attachment name when the request does not supply one.
pub const DEFAULT_FILENAME: &str = "output.pdf";

const SERVER_NAME: &str = concat!("md2pdf-http/", env!("CARGO_PKG_VERSION"));

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The two conversion endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Convert,
    ConvertWatermark,
}

impl Endpoint {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/convert" => Some(Endpoint::Convert),
            "/convert-watermark" => Some(Endpoint::ConvertWatermark),
            _ => None,
        }
    }
}

/// A validated conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub markdown: String,
    /// Overrides the server's default stylesheet.
    pub css_path: Option<PathBuf>,
    /// Raw attachment name, before sanitisation.
    pub filename: String,
    pub watermark_text: Option<String>,
}

impl ConvertRequest {
    /// Validate a JSON object body for `endpoint`.
    ///
    /// Blank or non-string `css_path` / `filename` fall back to defaults.
    pub fn from_payload(
        endpoint: Endpoint,
        payload: &Map<String, Value>,
    ) -> Result<Self, RequestError> {
        let watermark_text = match endpoint {
            Endpoint::Convert => None,
            Endpoint::ConvertWatermark => match payload.get("watermark_text") {
                None => Some(DEFAULT_WATERMARK_TEXT.to_string()),
                Some(Value::String(text)) if !text.trim().is_empty() => Some(text.clone()),
                Some(_) => {
                    return Err(RequestError::InvalidField {
                        field: "watermark_text",
                        expected: "a non-empty string",
                    })
                }
            },
        };

        let markdown = match payload.get("markdown") {
            Some(Value::String(text)) => text.clone(),
            _ => {
                return Err(RequestError::InvalidField {
                    field: "markdown",
                    expected: "a string",
                })
            }
        };

        Ok(Self {
            markdown,
            css_path: non_blank_string(payload.get("css_path")).map(PathBuf::from),
            filename: non_blank_string(payload.get("filename"))
                .unwrap_or(DEFAULT_FILENAME)
                .to_string(),
            watermark_text,
        })
    }
}

fn non_blank_string(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// Strip characters that would break the quoted `Content-Disposition`
/// filename: double quotes and control characters (newlines included).
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect()
}

/// Route one request.
pub async fn handle<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    // Routes compare the full request target, query string included.
    let path = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());
    debug!("{method} {path}");

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/health") => json_response(StatusCode::OK, &StatusBody { status: "ok" }),
        (&Method::GET, _) => not_found(),
        (&Method::POST, _) => match Endpoint::from_path(&path) {
            Some(endpoint) => handle_convert(endpoint, req.into_body(), &state).await,
            None => not_found(),
        },
        _ => error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
    };

    info!("{method} {path} → {}", response.status().as_u16());
    Ok(response)
}

async fn handle_convert<B>(endpoint: Endpoint, body: B, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let request = match read_json_object(body, state.max_body_bytes)
        .await
        .and_then(|payload| ConvertRequest::from_payload(endpoint, &payload))
    {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected {endpoint:?} request: {e}");
            return request_error(&e);
        }
    };

    let mut config = state.conversion.clone();
    if let Some(css_path) = request.css_path {
        config.css_path = Some(css_path);
    }
    config.watermark_text = request.watermark_text;

    let markdown = request.markdown;
    let rendered =
        tokio::task::spawn_blocking(move || render_to_bytes(&markdown, HTTP_TITLE, &config))
            .await;

    match rendered {
        Ok(Ok(pdf)) => pdf_response(pdf, &sanitize_filename(&request.filename)),
        Ok(Err(e)) => {
            warn!("Conversion failed: {e}");
            convert_failed(&e)
        }
        Err(e) => {
            warn!("Conversion task panicked: {e}");
            convert_failed(&e)
        }
    }
}

/// Read the whole body (bounded) and parse it as a JSON object.
async fn read_json_object<B>(body: B, limit: usize) -> Result<Map<String, Value>, RequestError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(RequestError::BodyTooLarge { limit })
        }
        Err(e) => {
            debug!("Failed to read request body: {e}");
            return Err(RequestError::InvalidJson);
        }
    };

    if bytes.is_empty() {
        return Err(RequestError::EmptyBody);
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(RequestError::NotAnObject),
        Err(_) => Err(RequestError::InvalidJson),
    }
}

// ── Responses ────────────────────────────────────────────────────────────

fn response(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(body));
    *resp.status_mut() = status;
    let headers = resp.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(SERVER, HeaderValue::from_static(SERVER_NAME));
    resp
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(payload) {
        Ok(body) => response(status, JSON_CONTENT_TYPE, Bytes::from(body)),
        Err(e) => {
            warn!("Failed to serialise response body: {e}");
            response(
                StatusCode::INTERNAL_SERVER_ERROR,
                JSON_CONTENT_TYPE,
                Bytes::from_static(br#"{"error":"internal error"}"#),
            )
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response<Full<Bytes>> {
    json_response(
        status,
        &ErrorBody {
            error: message.into(),
        },
    )
}

fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "not found")
}

fn request_error(err: &RequestError) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    error_response(status, err.to_string())
}

fn convert_failed(err: &dyn std::fmt::Display) -> Response<Full<Bytes>> {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("convert failed: {err}"),
    )
}

fn pdf_response(pdf: Vec<u8>, filename: &str) -> Response<Full<Bytes>> {
    let mut resp = response(StatusCode::OK, "application/pdf", Bytes::from(pdf));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"output.pdf\""));
    resp.headers_mut().insert(CONTENT_DISPOSITION, disposition);
    resp
}
