//! Controller contract.
//!
//! A controller is a type with named actions. Actions receive their
//! arguments positionally, in the order of the formal parameter names they
//! declared when the controller was registered (see [`ActionDescriptor`]).
//! Extra behaviour is opted into through capability accessors on
//! [`Controller`]; the dispatcher asks for each capability and only uses the
//! ones a controller returns.

use crate::project::Project;
use crate::request::Request;
use crate::view::{AssetDescriptor, TemplateHandle};
use anyhow::{anyhow, Context};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Named parameters passed into or published out of a dispatch.
pub type Params = HashMap<String, Value>;

/// Value returned by an action; its shape decides how it is delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// Delivered as a plain text response
    Text(String),
    /// Streamed from disk
    Asset(AssetDescriptor),
    /// Rendered by the view layer, then delivered
    Template(TemplateHandle),
    /// Any other value; not deliverable, answered with a not-found page
    Other(Value),
    /// The action produced nothing
    Empty,
}

impl From<String> for ActionResult {
    fn from(s: String) -> Self {
        ActionResult::Text(s)
    }
}

impl From<&str> for ActionResult {
    fn from(s: &str) -> Self {
        ActionResult::Text(s.to_string())
    }
}

impl From<AssetDescriptor> for ActionResult {
    fn from(a: AssetDescriptor) -> Self {
        ActionResult::Asset(a)
    }
}

impl From<TemplateHandle> for ActionResult {
    fn from(t: TemplateHandle) -> Self {
        ActionResult::Template(t)
    }
}

impl From<()> for ActionResult {
    fn from(_: ()) -> Self {
        ActionResult::Empty
    }
}

/// Static description of one action: its name and formal parameter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub name: String,
    pub params: Vec<String>,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

/// Arguments bound to an action's formal parameters, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    names: Vec<String>,
    values: Vec<Value>,
}

impl Arguments {
    pub(crate) fn new(names: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Formal parameter name at `index`
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// String argument at `index`
    pub fn str(&self, index: usize) -> anyhow::Result<&str> {
        let value = self
            .get(index)
            .ok_or_else(|| anyhow!("no argument at position {index}"))?;
        value.as_str().ok_or_else(|| {
            anyhow!(
                "argument '{}' is not a string",
                self.name(index).unwrap_or_default()
            )
        })
    }

    /// Parse the argument at `index`; numbers and booleans parse from their text form
    pub fn parse<T>(&self, index: usize) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let value = self
            .get(index)
            .ok_or_else(|| anyhow!("no argument at position {index}"))?;
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        text.parse::<T>().with_context(|| {
            format!(
                "argument '{}' has invalid value '{text}'",
                self.name(index).unwrap_or_default()
            )
        })
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Receives the project context after instantiation.
pub trait ProjectAware {
    fn set_project(&mut self, project: Arc<Project>);
}

/// Receives the current request after instantiation.
pub trait RequestAware {
    fn set_request(&mut self, request: Arc<Request>);
}

/// Resolves static assets directly; an asset returned here is delivered
/// without calling the matched action.
pub trait AssetResolver {
    fn resolve_asset(&mut self, params: &Params) -> Option<AssetDescriptor>;
}

/// Publishes parameters for the view layer after the action ran.
///
/// The value must be a JSON object; anything else is a contract violation.
pub trait Publisher {
    fn published_params(&self) -> anyhow::Result<Value>;
}

/// A controller instance. One instance is created per dispatch.
pub trait Controller: Send {
    /// Invoke `action` with positionally bound arguments
    fn call(&mut self, action: &str, args: Arguments) -> anyhow::Result<ActionResult>;

    fn as_project_aware(&mut self) -> Option<&mut dyn ProjectAware> {
        None
    }

    fn as_request_aware(&mut self) -> Option<&mut dyn RequestAware> {
        None
    }

    fn as_asset_resolver(&mut self) -> Option<&mut dyn AssetResolver> {
        None
    }

    fn as_publisher(&self) -> Option<&dyn Publisher> {
        None
    }
}

/// A controller type that can be registered by type: zero-argument
/// construction plus its static action table.
pub trait ControllerType: Controller + Sized + 'static {
    fn create() -> Self;

    fn actions() -> Vec<ActionDescriptor>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> Arguments {
        Arguments::new(
            vec!["id".into(), "page".into(), "flag".into()],
            vec![json!("42"), json!(3), json!(true)],
        )
    }

    #[test]
    fn test_str_accessor() {
        let a = args();
        assert_eq!(a.str(0).unwrap(), "42");
        assert!(a.str(1).unwrap_err().to_string().contains("page"));
        assert!(a.str(9).is_err());
    }

    #[test]
    fn test_parse_accessor() {
        let a = args();
        assert_eq!(a.parse::<u32>(0).unwrap(), 42);
        assert_eq!(a.parse::<i64>(1).unwrap(), 3);
        assert!(a.parse::<bool>(2).unwrap());
        assert!(a.parse::<u8>(2).is_err());
    }

    #[test]
    fn test_action_result_conversions() {
        assert_eq!(ActionResult::from("hi"), ActionResult::Text("hi".into()));
        assert_eq!(ActionResult::from(()), ActionResult::Empty);
    }
}
