use http::Method;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Reserved attribute holding the handler notation (`Class:method`).
pub const CONTROLLER_KEY: &str = "_controller";
/// Short alias of [`CONTROLLER_KEY`] accepted in route files and defaults.
pub const CONTROLLER_ALIAS: &str = "controller";
/// Reserved attribute holding the route name in match results.
pub const ROUTE_KEY: &str = "_route";
/// Short alias of [`ROUTE_KEY`].
pub const ROUTE_ALIAS: &str = "route";

/// Keys that always come from the route itself, never from extracted values.
pub const RESERVED_KEYS: [&str; 4] = [CONTROLLER_KEY, CONTROLLER_ALIAS, ROUTE_KEY, ROUTE_ALIAS];

/// A declarative rule mapping a path/method pattern to a handler.
///
/// Routes are plain data; they are validated and compiled when added to a
/// [`RouteTable`](super::RouteTable) and never change afterwards.
///
/// ```
/// use brrtmvc::routes::Route;
/// use http::Method;
///
/// let route = Route::new("users_show", "/users/{id}")
///     .methods([Method::GET])
///     .controller("Users:show")
///     .requirement("id", r"\d+");
/// assert_eq!(route.controller_notation(), Some("Users:show"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Unique route name, published as `_route` on a match
    pub name: String,
    /// Path pattern with `{name}` / `{*name}` placeholders
    pub path: String,
    /// Accepted methods; empty accepts any method
    pub methods: Vec<Method>,
    /// Optional host pattern, e.g. `{tenant}.example.com`
    pub host: Option<String>,
    /// Accepted schemes (lowercase); empty accepts any scheme
    pub schemes: Vec<String>,
    /// Static attributes merged under the extracted values
    pub defaults: BTreeMap<String, String>,
    /// Per-placeholder regular expressions
    pub requirements: BTreeMap<String, String>,
    /// Context parameters that must be present with exactly these values
    pub context: BTreeMap<String, String>,
}

/// Give a path pattern its leading slash; matching always sees one.
pub(crate) fn normalize_pattern(path: &str) -> Cow<'_, str> {
    if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    }
}

impl Route {
    /// New route; `users/{id}` is stored as `/users/{id}`
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            name: name.into(),
            path,
            methods: Vec::new(),
            host: None,
            schemes: Vec::new(),
            defaults: BTreeMap::new(),
            requirements: BTreeMap::new(),
            context: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn methods<I: IntoIterator<Item = Method>>(mut self, methods: I) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.schemes = schemes
            .into_iter()
            .map(|s| s.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    /// Set the handler notation (`_controller` attribute)
    #[must_use]
    pub fn controller(self, notation: impl Into<String>) -> Self {
        self.default_value(CONTROLLER_KEY, notation)
    }

    #[must_use]
    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn requirement(mut self, placeholder: impl Into<String>, regex: impl Into<String>) -> Self {
        self.requirements.insert(placeholder.into(), regex.into());
        self
    }

    #[must_use]
    pub fn context_requirement(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(name.into(), value.into());
        self
    }

    /// Handler notation from `_controller`, falling back to `controller`
    #[must_use]
    pub fn controller_notation(&self) -> Option<&str> {
        self.defaults
            .get(CONTROLLER_KEY)
            .or_else(|| self.defaults.get(CONTROLLER_ALIAS))
            .map(String::as_str)
    }

    /// Whether `method` passes this route's method restriction.
    ///
    /// `HEAD` is compared as `GET`, so a route must list `GET` to accept
    /// it. A route that lists only `HEAD` never matches a request.
    #[must_use]
    pub fn allows_method(&self, method: &Method) -> bool {
        if self.methods.is_empty() {
            return true;
        }
        let method = if *method == Method::HEAD {
            &Method::GET
        } else {
            method
        };
        self.methods.contains(method)
    }
}
