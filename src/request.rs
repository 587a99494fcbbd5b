//! Transport-neutral request passed to controllers that ask for it.
//!
//! The HTTP server is not part of this crate; whatever transport carries the
//! request builds a [`Request`] and hands it to the
//! [`Application`](crate::app::Application).

use crate::router::MatchContext;
use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use ulid::Ulid;

/// Incoming request data.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Unique request id for log correlation
    pub request_id: Ulid,
    pub method: Method,
    /// Path without query string
    pub path: String,
    /// Lowercase header names
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    /// `http` or `https`
    pub scheme: String,
    pub body: Option<Value>,
    /// Extra parameters checked against route context requirements
    pub context: HashMap<String, String>,
}

/// Parse cookies from a `Cookie` header value.
pub fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim().to_string();
            Some((name.to_string(), value))
        })
        .collect()
}

fn form_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Parse the query string of a request target (everything after `?`).
pub fn parse_query_params(target: &str) -> HashMap<String, String> {
    let Some((_, query)) = target.split_once('?') else {
        return HashMap::new();
    };
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (form_decode(k), form_decode(v)),
            None => (form_decode(pair), String::new()),
        })
        .collect()
}

impl Request {
    /// Build a request from a method and a request target (`/path?query`)
    pub fn new(method: Method, target: &str) -> Self {
        let path = crate::router::normalize_path(target);
        Self {
            request_id: Ulid::new(),
            method,
            path,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            query_params: parse_query_params(target),
            scheme: "http".to_string(),
            body: None,
            context: HashMap::new(),
        }
    }

    /// Add a header; a `Cookie` header also fills [`Request::cookies`]
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if name == "cookie" {
            self.cookies.extend(parse_cookies(&value));
        }
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_ascii_lowercase();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_context(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(name.into(), value.into());
        self
    }

    /// Header by name (case-insensitive)
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Host from the `Host` header without port, `localhost` when absent
    #[must_use]
    pub fn host(&self) -> &str {
        let Some(host) = self.get_header("host") else {
            return "localhost";
        };
        // Bracketed IPv6 literals keep their colons
        if host.starts_with('[') {
            return host.find(']').map_or(host, |i| &host[..=i]);
        }
        host.split(':').next().unwrap_or(host)
    }

    /// Matcher input for this request
    #[must_use]
    pub fn match_context(&self) -> MatchContext {
        let mut ctx = MatchContext::new(self.method.clone(), &self.path)
            .with_host(self.host())
            .with_scheme(&self.scheme);
        for (k, v) in &self.context {
            ctx = ctx.with_parameter(k.clone(), v.clone());
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_path_and_query() {
        let req = Request::new(Method::GET, "/search?q=hello+world&page=2&flag");
        assert_eq!(req.path, "/search");
        assert_eq!(req.get_query_param("q"), Some("hello world"));
        assert_eq!(req.get_query_param("page"), Some("2"));
        assert_eq!(req.get_query_param("flag"), Some(""));
    }

    #[test]
    fn test_headers_cookies_and_host() {
        let req = Request::new(Method::GET, "/")
            .with_header("Host", "shop.example.com:8080")
            .with_header("Cookie", "session=abc; theme=dark");
        assert_eq!(req.get_header("HOST"), Some("shop.example.com:8080"));
        assert_eq!(req.host(), "shop.example.com");
        assert_eq!(req.get_cookie("theme"), Some("dark"));

        let v6 = Request::new(Method::GET, "/").with_header("host", "[::1]:8080");
        assert_eq!(v6.host(), "[::1]");
        assert_eq!(Request::new(Method::GET, "/").host(), "localhost");
    }

    #[test]
    fn test_unterminated_ipv6_host_is_returned_raw() {
        let req = Request::new(Method::GET, "/").with_header("host", "[::1");
        assert_eq!(req.host(), "[::1");
        let req = Request::new(Method::GET, "/").with_header("host", "[");
        assert_eq!(req.host(), "[");
    }

    #[test]
    fn test_match_context_carries_request_data() {
        let req = Request::new(Method::POST, "/api?x=1")
            .with_header("host", "api.example.com")
            .with_scheme("HTTPS")
            .with_context("device", "mobile");
        let ctx = req.match_context();
        assert_eq!(ctx.path(), "/api");
        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.host(), "api.example.com");
        assert_eq!(ctx.scheme(), "https");
        assert_eq!(ctx.parameter("device"), Some("mobile"));
    }
}
