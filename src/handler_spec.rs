//! Handler notation parsing.
//!
//! A handler notation is the compact `Class:method` string stored in a
//! route's `_controller` attribute or given as a CLI token. Parsing only
//! splits the string; whether the class and action exist is decided later by
//! the [`Dispatcher`](crate::dispatcher::Dispatcher).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Suffix appended to every parsed method name.
pub const DEFAULT_METHOD_SUFFIX: &str = "Action";
/// Method used when the notation names only a class.
pub const DEFAULT_METHOD: &str = "default";

/// Naming conventions applied while parsing handler notations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub method_suffix: String,
    pub default_method: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            method_suffix: DEFAULT_METHOD_SUFFIX.to_string(),
            default_method: DEFAULT_METHOD.to_string(),
        }
    }
}

impl ParseOptions {
    pub fn new(method_suffix: impl Into<String>, default_method: impl Into<String>) -> Self {
        Self {
            method_suffix: method_suffix.into(),
            default_method: default_method.into(),
        }
    }
}

/// Resolved class and method names of a handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerSpec {
    pub class_name: String,
    pub method_name: String,
}

impl HandlerSpec {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }

    /// Parse with the default suffix (`Action`) and default method (`default`).
    ///
    /// ```
    /// use brrtmvc::handler_spec::HandlerSpec;
    ///
    /// let spec = HandlerSpec::parse("Foo\\Bar:baz");
    /// assert_eq!(spec.class_name, "Foo\\Bar");
    /// assert_eq!(spec.method_name, "bazAction");
    /// ```
    #[must_use]
    pub fn parse(notation: &str) -> Self {
        Self::parse_with(notation, &ParseOptions::default())
    }

    /// Split at the first `:`; the right side gets the method suffix. Without
    /// a `:` the whole notation is the class and the default method is used.
    #[must_use]
    pub fn parse_with(notation: &str, options: &ParseOptions) -> Self {
        match notation.split_once(':') {
            Some((class, method)) => Self {
                class_name: class.to_string(),
                method_name: format!("{method}{}", options.method_suffix),
            },
            None => Self {
                class_name: notation.to_string(),
                method_name: format!("{}{}", options.default_method, options.method_suffix),
            },
        }
    }
}

impl FromStr for HandlerSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for HandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class_name, self.method_name)
    }
}
