//! Route file loading.
//!
//! Three formats are accepted, chosen by file extension:
//!
//! * YAML: an ordered mapping of route name → entry, a list of entries, or
//!   either of those under a top-level `routes:` key
//! * JSON: a list of entries, optionally under `"routes"`
//! * TOML: `[[routes]]` tables
//!
//! ```yaml
//! users_show:
//!   path: /users/{id}
//!   methods: [GET]
//!   controller: "App\\Users:show"
//!   requirements: { id: '\d+' }
//! ```

use super::table::RouteTable;
use super::types::{Route, CONTROLLER_KEY};
use anyhow::{anyhow, bail, Context};
use http::Method;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Route file syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFileFormat {
    Yaml,
    Json,
    Toml,
}

impl RouteFileFormat {
    /// Pick the format from a file extension (`.yaml`, `.yml`, `.json`, `.toml`)
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "yaml" | "yml" => Ok(RouteFileFormat::Yaml),
            "json" => Ok(RouteFileFormat::Json),
            "toml" => Ok(RouteFileFormat::Toml),
            other => bail!(
                "unsupported route file extension '{other}' for {}",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    /// `"GET|POST"` and `[GET, POST]` are equivalent
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => s
                .split(['|', ','])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "route", alias = "_route")]
    explicit_name: Option<String>,
    path: String,
    #[serde(default)]
    methods: OneOrMany,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    schemes: OneOrMany,
    #[serde(default, alias = "_controller")]
    controller: Option<String>,
    #[serde(default)]
    defaults: BTreeMap<String, Scalar>,
    #[serde(default)]
    requirements: BTreeMap<String, String>,
    #[serde(default)]
    context: BTreeMap<String, Scalar>,
}

#[derive(Debug, Deserialize)]
struct TomlRoutes {
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

fn parse_method(raw: &str) -> anyhow::Result<Method> {
    let upper = raw.trim().to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| anyhow!("invalid HTTP method '{raw}'"))
}

impl RouteEntry {
    fn into_route(self, key: Option<String>, position: usize) -> anyhow::Result<Route> {
        let name = self
            .explicit_name
            .or(self.name)
            .or(key)
            .ok_or_else(|| anyhow!("route entry #{position} ({}) has no name", self.path))?;

        let methods = self
            .methods
            .into_vec()
            .iter()
            .map(|m| parse_method(m))
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(|| format!("route '{name}'"))?;

        let mut route = Route::new(name, self.path)
            .methods(methods)
            .schemes(self.schemes.into_vec());
        route.host = self.host;
        route.requirements = self.requirements;
        route.defaults = self
            .defaults
            .into_iter()
            .map(|(k, v)| (k, v.into_string()))
            .collect();
        route.context = self
            .context
            .into_iter()
            .map(|(k, v)| (k, v.into_string()))
            .collect();
        if let Some(controller) = self.controller {
            route.defaults.insert(CONTROLLER_KEY.to_string(), controller);
        }
        Ok(route)
    }
}

type NamedEntry = (Option<String>, RouteEntry);

fn yaml_entries(doc: serde_yaml::Value) -> anyhow::Result<Vec<NamedEntry>> {
    use serde_yaml::Value;
    match doc {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| Ok((None, serde_yaml::from_value(item)?)))
            .collect(),
        Value::Mapping(mut map) => {
            if map.len() == 1 {
                let nested = match map.get("routes") {
                    Some(Value::Sequence(_)) => true,
                    Some(Value::Mapping(inner)) => !inner.contains_key("path"),
                    _ => false,
                };
                if nested {
                    if let Some(inner) = map.remove("routes") {
                        return yaml_entries(inner);
                    }
                }
            }
            map.into_iter()
                .map(|(key, value)| {
                    let key = key
                        .as_str()
                        .ok_or_else(|| anyhow!("route names must be strings, got {key:?}"))?
                        .to_string();
                    let entry = serde_yaml::from_value(value)
                        .with_context(|| format!("invalid route entry '{key}'"))?;
                    Ok((Some(key), entry))
                })
                .collect()
        }
        other => bail!("route file must be a mapping or a list, got {other:?}"),
    }
}

fn json_entries(doc: serde_json::Value) -> anyhow::Result<Vec<NamedEntry>> {
    use serde_json::Value;
    match doc {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let entry = serde_json::from_value(item)
                    .with_context(|| format!("invalid route entry #{i}"))?;
                Ok((None, entry))
            })
            .collect(),
        Value::Object(mut obj) if obj.len() == 1 && obj.contains_key("routes") => {
            let inner = obj.remove("routes").unwrap_or(Value::Null);
            if !inner.is_array() {
                bail!("\"routes\" must be an array");
            }
            json_entries(inner)
        }
        Value::Object(_) => bail!(
            "JSON route files must list routes in an array; object keys do not keep declaration order"
        ),
        other => bail!("route file must be an array, got {other}"),
    }
}

/// Parse route definitions from a string, keeping declaration order.
pub fn parse_routes(content: &str, format: RouteFileFormat) -> anyhow::Result<Vec<Route>> {
    let entries = match format {
        RouteFileFormat::Yaml => yaml_entries(serde_yaml::from_str(content)?)?,
        RouteFileFormat::Json => json_entries(serde_json::from_str(content)?)?,
        RouteFileFormat::Toml => toml::from_str::<TomlRoutes>(content)?
            .routes
            .into_iter()
            .map(|e| (None, e))
            .collect(),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(position, (key, entry))| entry.into_route(key, position))
        .collect()
}

/// Parse and compile a route table from a string.
pub fn load_routes_str(content: &str, format: RouteFileFormat) -> anyhow::Result<RouteTable> {
    let routes = parse_routes(content, format)?;
    Ok(RouteTable::from_routes(routes)?)
}

/// Load a route table from a file; the format follows the extension.
pub fn load_routes<P: AsRef<Path>>(path: P) -> anyhow::Result<RouteTable> {
    let path = path.as_ref();
    let format = RouteFileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read route file {}", path.display()))?;
    let table = load_routes_str(&content, format)
        .with_context(|| format!("failed to load routes from {}", path.display()))?;
    info!(
        file = %path.display(),
        routes_count = table.len(),
        "Route file loaded"
    );
    Ok(table)
}
