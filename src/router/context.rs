use http::Method;
use std::collections::HashMap;

/// Everything the matcher needs to know about one incoming request.
///
/// Built fresh per request and never mutated once handed to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchContext {
    path: String,
    method: Method,
    host: String,
    scheme: String,
    parameters: HashMap<String, String>,
}

/// Leading slash, no query string or fragment, empty → `/`.
pub(crate) fn normalize_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let path = &raw[..end];
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

impl MatchContext {
    /// Context for `method` on `path`, host `localhost`, scheme `http`
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            path: normalize_path(path),
            method,
            host: "localhost".to_string(),
            scheme: "http".to_string(),
            parameters: HashMap::new(),
        }
    }

    /// Like [`MatchContext::new`] but from a method string in any case
    pub fn from_parts(method: &str, path: &str) -> Result<Self, http::method::InvalidMethod> {
        let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())?;
        Ok(Self::new(method, path))
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: impl AsRef<str>) -> Self {
        self.scheme = scheme.as_ref().to_ascii_lowercase();
        self
    }

    /// Add a context parameter checked against route context requirements
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }
}
