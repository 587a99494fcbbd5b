//! Router core module - first-match-wins scan over the route table.

use super::context::MatchContext;
use crate::error::RouteError;
use crate::routes::{
    CompiledRoute, Route, RouteTable, CONTROLLER_ALIAS, CONTROLLER_KEY, RESERVED_KEYS, ROUTE_KEY,
};
use http::Method;
use regex::Captures;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Parameters of a successful match: extracted placeholder values merged
/// over the route's static attributes, plus `_controller` and `_route`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchParams(BTreeMap<String, String>);

impl MatchParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Handler notation (`_controller`, falling back to `controller`)
    #[must_use]
    pub fn controller(&self) -> Option<&str> {
        self.get(CONTROLLER_KEY).or_else(|| self.get(CONTROLLER_ALIAS))
    }

    /// Name of the matched route
    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.get(ROUTE_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for MatchParams {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MatchParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// `Ok` with the merged parameters, or `NotFound` / `MethodNotAllowed`.
pub type MatchResult = Result<MatchParams, RouteError>;

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn merge(route: &Route, compiled: &CompiledRoute, path: &Captures<'_>, host: Option<&Captures<'_>>) -> MatchParams {
    let mut params = route.defaults.clone();

    for name in &compiled.path.variables {
        if RESERVED_KEYS.contains(&name.as_str()) {
            continue;
        }
        if let Some(m) = path.name(name) {
            params.insert(name.clone(), decode(m.as_str()));
        }
    }
    if let (Some(pattern), Some(caps)) = (&compiled.host, host) {
        for name in &pattern.variables {
            if RESERVED_KEYS.contains(&name.as_str()) {
                continue;
            }
            if let Some(m) = caps.name(name) {
                params.insert(name.clone(), m.as_str().to_string());
            }
        }
    }

    if let Some(notation) = route.controller_notation() {
        params.insert(CONTROLLER_KEY.to_string(), notation.to_string());
    }
    params.insert(ROUTE_KEY.to_string(), route.name.clone());
    MatchParams(params)
}

/// Scan `table` in declaration order and return the first full match.
///
/// A route whose path matches but whose methods exclude the request method
/// does not stop the scan; its methods are remembered and reported as
/// `MethodNotAllowed` only if no later route matches.
pub(crate) fn scan(context: &MatchContext, table: &RouteTable, prefix_check: bool) -> MatchResult {
    let path = context.path();
    let mut allowed: Vec<Method> = Vec::new();

    for compiled in table.compiled() {
        if prefix_check && !compiled.path.prefix_matches(path) {
            continue;
        }
        let Some(path_caps) = compiled.path.regex.captures(path) else {
            continue;
        };
        let host_caps = match &compiled.host {
            Some(host) => match host.regex.captures(context.host()) {
                Some(caps) => Some(caps),
                None => continue,
            },
            None => None,
        };

        let route = compiled.route();
        if !route.schemes.is_empty() && !route.schemes.iter().any(|s| s == context.scheme()) {
            continue;
        }
        if !route.allows_method(context.method()) {
            for method in &route.methods {
                if !allowed.contains(method) {
                    allowed.push(method.clone());
                }
            }
            continue;
        }
        if route
            .context
            .iter()
            .any(|(name, value)| context.parameter(name) != Some(value.as_str()))
        {
            continue;
        }

        return Ok(merge(route, compiled, &path_caps, host_caps.as_ref()));
    }

    if allowed.is_empty() {
        Err(RouteError::NotFound)
    } else {
        Err(RouteError::MethodNotAllowed { allowed })
    }
}

/// Match a request context against a route table.
#[must_use]
pub fn match_route(context: &MatchContext, table: &RouteTable) -> MatchResult {
    scan(context, table, true)
}

/// Router over a shared, immutable [`RouteTable`].
///
/// Cloning a router is cheap; all clones read the same table.
#[derive(Debug, Clone)]
pub struct Router {
    table: Arc<RouteTable>,
}

impl Router {
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self::from_shared(Arc::new(table))
    }

    #[must_use]
    pub fn from_shared(table: Arc<RouteTable>) -> Self {
        info!(routes_count = table.len(), "Router created");
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Match a full request context
    #[must_use]
    pub fn match_context(&self, context: &MatchContext) -> MatchResult {
        debug!(
            method = %context.method(),
            path = %context.path(),
            host = %context.host(),
            "Route match attempt"
        );

        let match_start = Instant::now();
        let result = match_route(context, &self.table);
        let match_duration = match_start.elapsed();

        match &result {
            Ok(params) => {
                if match_duration > Duration::from_millis(1) {
                    warn!(
                        method = %context.method(),
                        path = %context.path(),
                        route_name = params.route_name().unwrap_or_default(),
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    info!(
                        method = %context.method(),
                        path = %context.path(),
                        route_name = params.route_name().unwrap_or_default(),
                        controller = params.controller().unwrap_or_default(),
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
            }
            Err(RouteError::MethodNotAllowed { allowed }) => warn!(
                method = %context.method(),
                path = %context.path(),
                allowed = ?allowed,
                "Method not allowed"
            ),
            Err(RouteError::NotFound) => warn!(
                method = %context.method(),
                path = %context.path(),
                duration_us = match_duration.as_micros(),
                "No route matched"
            ),
        }
        result
    }

    /// Match `method` + `path` with default host and scheme
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> MatchResult {
        self.match_context(&MatchContext::new(method, path))
    }
}
