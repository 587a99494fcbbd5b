//! # Response Routing
//!
//! Decides how a dispatch result is delivered and turns routing and dispatch
//! failures into responses.
//!
//! | Result                      | Delivery                                   |
//! |-----------------------------|--------------------------------------------|
//! | [`ActionResult::Text`]      | `200`, `text/plain`                        |
//! | [`ActionResult::Asset`]     | `200`, file streamed with its content type |
//! | [`ActionResult::Template`]  | rendered, then `200`                       |
//! | [`ActionResult::Empty`]     | `204`                                      |
//! | [`ActionResult::Other`]     | `404` page                                 |
//!
//! Error pages carry the error message only in development mode; otherwise
//! they carry the canonical reason phrase.

use crate::controller::ActionResult;
use crate::dispatcher::DispatchEntity;
use crate::error::{DispatchError, FrameworkError, RouteError};
use crate::view::{content_type, AssetDescriptor, Renderer, TemplateHandle};
use http::StatusCode;
use smallvec::SmallVec;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, warn};

const MAX_INLINE_HEADERS: usize = 8;

/// Response headers, inline for the common case of a handful of headers.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// How a dispatch result is delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Text(String),
    Asset(AssetDescriptor),
    Template(TemplateHandle),
    NoContent,
    NotFound,
}

impl Delivery {
    /// Classify a result by its shape
    #[must_use]
    pub fn classify(result: ActionResult) -> Self {
        match result {
            ActionResult::Text(s) => Delivery::Text(s),
            ActionResult::Asset(a) => Delivery::Asset(a),
            ActionResult::Template(t) => Delivery::Template(t),
            ActionResult::Empty => Delivery::NoContent,
            ActionResult::Other(_) => Delivery::NotFound,
        }
    }
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    Text(String),
    /// File to stream from disk
    File(PathBuf),
}

impl Body {
    /// Read the body into memory
    pub fn to_bytes(&self) -> std::io::Result<Vec<u8>> {
        match self {
            Body::Empty => Ok(Vec::new()),
            Body::Text(s) => Ok(s.as_bytes().to_vec()),
            Body::File(path) => std::fs::read(path),
        }
    }
}

/// Transport-neutral response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderVec,
    pub body: Body,
}

impl Response {
    #[must_use]
    pub fn new(status: StatusCode, body: Body) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body,
        }
    }

    #[must_use]
    pub fn text(status: StatusCode, text: impl Into<String>) -> Self {
        Self::new(status, Body::Text(text.into())).with_header("content-type", TEXT_PLAIN)
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Header value (case-insensitive name)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Text body, if the body is text
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        match &self.body {
            Body::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Maps dispatch results and failures to responses.
#[derive(Clone, Default)]
pub struct ResponseRouter {
    renderer: Option<Arc<dyn Renderer>>,
    dev: bool,
}

impl fmt::Debug for ResponseRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseRouter")
            .field("renderer", &self.renderer.is_some())
            .field("dev", &self.dev)
            .finish()
    }
}

impl ResponseRouter {
    #[must_use]
    pub fn new(dev: bool) -> Self {
        Self {
            renderer: None,
            dev,
        }
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.dev
    }

    /// Build the response for a dispatched entity; takes its result
    #[must_use]
    pub fn respond(&self, entity: &mut DispatchEntity) -> Response {
        let Some(result) = entity.take_result() else {
            return self.error_page(StatusCode::INTERNAL_SERVER_ERROR, "entity was not dispatched");
        };
        match Delivery::classify(result) {
            Delivery::Text(s) => Response::text(StatusCode::OK, s),
            Delivery::Asset(asset) => Response::new(StatusCode::OK, Body::File(asset.path))
                .with_header("content-type", asset.content_type),
            Delivery::Template(handle) => self.render(&handle, entity),
            Delivery::NoContent => Response::new(StatusCode::NO_CONTENT, Body::Empty),
            Delivery::NotFound => {
                warn!(
                    dispatch_id = %entity.id(),
                    class_name = entity.class_name().unwrap_or_default(),
                    "Result is not deliverable"
                );
                self.error_page(StatusCode::NOT_FOUND, "result is not deliverable")
            }
        }
    }

    fn render(&self, handle: &TemplateHandle, entity: &DispatchEntity) -> Response {
        let Some(renderer) = &self.renderer else {
            error!(template = %handle.name, "No renderer configured");
            return self.error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("no renderer configured for template '{}'", handle.name),
            );
        };
        match renderer.render(handle, entity.published()) {
            Ok(body) => {
                let ctype = match content_type(Path::new(&handle.name)) {
                    "application/octet-stream" => "text/html",
                    other => other,
                };
                Response::new(StatusCode::OK, Body::Text(body))
                    .with_header("content-type", format!("{ctype}; charset=utf-8"))
            }
            Err(e) => {
                error!(template = %handle.name, error = %e, "Template render failed");
                self.error_page(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
            }
        }
    }

    #[must_use]
    pub fn route_error(&self, err: &RouteError) -> Response {
        let response = self.error_page(err.status(), err.to_string());
        match err.allow_header() {
            Some(allow) => response.with_header("allow", allow),
            None => response,
        }
    }

    #[must_use]
    pub fn dispatch_error(&self, err: &DispatchError) -> Response {
        self.error_page(err.status(), err.to_string())
    }

    #[must_use]
    pub fn framework_error(&self, err: &FrameworkError) -> Response {
        match err {
            FrameworkError::Route(e) => self.route_error(e),
            FrameworkError::Dispatch(e) => self.dispatch_error(e),
        }
    }

    fn error_page(&self, status: StatusCode, detail: impl Into<String>) -> Response {
        let reason = status.canonical_reason().unwrap_or("Error");
        let body = if self.dev {
            format!("{} {reason}: {}", status.as_u16(), detail.into())
        } else {
            format!("{} {reason}", status.as_u16())
        };
        Response::text(status, body)
    }
}
