use super::pattern::{compile_host, compile_path, CompiledPattern};
use super::types::Route;
use crate::error::RouteDefinitionError;
use http::Method;
use std::collections::HashSet;
use std::io::{self, Write};
use tracing::{debug, info};

/// A route together with its compiled path and host patterns.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    route: Route,
    pub(crate) path: CompiledPattern,
    pub(crate) host: Option<CompiledPattern>,
}

impl CompiledRoute {
    /// Validate and compile a route definition
    pub fn compile(route: Route) -> Result<Self, RouteDefinitionError> {
        let path = compile_path(&route)?;
        let host = route
            .host
            .as_deref()
            .map(|h| compile_host(&route, h))
            .transpose()?;

        let mut seen = HashSet::new();
        let host_vars = host.iter().flat_map(|h| h.variables.iter());
        for name in path.variables.iter().chain(host_vars) {
            if !seen.insert(name.as_str()) {
                return Err(RouteDefinitionError::DuplicatePlaceholder {
                    route: route.name.clone(),
                    name: name.clone(),
                });
            }
        }

        Ok(Self { route, path, host })
    }

    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Literal text every matching path starts with
    #[must_use]
    pub fn static_prefix(&self) -> &str {
        &self.path.static_prefix
    }

    /// Placeholder names in declaration order (path first, then host)
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.path
            .variables
            .iter()
            .chain(self.host.iter().flat_map(|h| h.variables.iter()))
            .map(String::as_str)
    }
}

/// Ordered collection of routes; declaration order is match priority.
///
/// The table is built once and then only read. It is `Send + Sync` and is
/// shared between request pipelines behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from routes in priority order
    pub fn from_routes<I>(routes: I) -> Result<Self, RouteDefinitionError>
    where
        I: IntoIterator<Item = Route>,
    {
        let mut table = Self::new();
        for route in routes {
            table.add(route)?;
        }
        info!(routes_count = table.len(), "Routing table loaded");
        Ok(table)
    }

    /// Append a route with the lowest priority so far
    pub fn add(&mut self, route: Route) -> Result<(), RouteDefinitionError> {
        if self.get(&route.name).is_some() {
            return Err(RouteDefinitionError::DuplicateRouteName { route: route.name });
        }
        let compiled = CompiledRoute::compile(route)?;
        debug!(
            route_name = %compiled.route.name,
            path = %compiled.route.path,
            static_prefix = %compiled.path.static_prefix,
            methods = ?compiled.route.methods,
            "Route compiled"
        );
        self.routes.push(compiled);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Look up a route by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes
            .iter()
            .map(CompiledRoute::route)
            .find(|r| r.name == name)
    }

    /// Routes in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().map(CompiledRoute::route)
    }

    pub(crate) fn compiled(&self) -> &[CompiledRoute] {
        &self.routes
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        let stdout = std::io::stdout();
        if let Err(e) = self.write_routes(&mut stdout.lock()) {
            eprintln!("failed to print routes: {e}");
        }
    }

    /// One line per route, in declaration order
    pub fn write_routes(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "[routes] count={}", self.routes.len())?;
        for compiled in &self.routes {
            let route = &compiled.route;
            let methods = if route.methods.is_empty() {
                "ANY".to_string()
            } else {
                route
                    .methods
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join("|")
            };
            writeln!(
                out,
                "[route] {} {methods} {}{} -> {}",
                route.name,
                route.host.as_deref().unwrap_or(""),
                route.path,
                route.controller_notation().unwrap_or("<none>")
            )?;
        }
        Ok(())
    }
}
