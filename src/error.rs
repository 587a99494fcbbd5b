//! Error types for route definition, route matching and controller dispatch.
//!
//! Matching never raises for a missing route: [`RouteError`] is returned as
//! the `Err` side of a match so callers can apply their fallback policy.
//! [`DispatchError`] describes configuration or programming defects (unknown
//! controller, unbound parameters) and is fatal to the current dispatch.

use crate::dispatcher::DispatchState;
use http::{Method, StatusCode};
use std::fmt;

/// A route could not be compiled into a [`RouteTable`](crate::routes::RouteTable).
#[derive(Debug)]
pub enum RouteDefinitionError {
    /// A `{` without a matching `}` (or the reverse) in a path or host pattern
    UnbalancedBrace {
        /// Route name
        route: String,
        /// Offending pattern
        pattern: String,
    },
    /// Placeholder name is empty or not `[A-Za-z_][A-Za-z0-9_]*`
    InvalidPlaceholder {
        /// Route name
        route: String,
        /// Offending placeholder name
        name: String,
    },
    /// The same placeholder appears twice in one route
    DuplicatePlaceholder {
        /// Route name
        route: String,
        /// Repeated placeholder name
        name: String,
    },
    /// A requirement is not a valid regular expression
    InvalidRequirement {
        /// Route name
        route: String,
        /// Placeholder the requirement applies to
        placeholder: String,
        /// Regex compilation error
        source: regex::Error,
    },
    /// Another route with the same name is already in the table
    DuplicateRouteName {
        /// Route name
        route: String,
    },
}

impl fmt::Display for RouteDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteDefinitionError::UnbalancedBrace { route, pattern } => {
                write!(f, "route '{route}': unbalanced braces in pattern '{pattern}'")
            }
            RouteDefinitionError::InvalidPlaceholder { route, name } => {
                write!(f, "route '{route}': invalid placeholder name '{name}'")
            }
            RouteDefinitionError::DuplicatePlaceholder { route, name } => {
                write!(f, "route '{route}': placeholder '{name}' is declared twice")
            }
            RouteDefinitionError::InvalidRequirement {
                route,
                placeholder,
                source,
            } => write!(
                f,
                "route '{route}': requirement for '{placeholder}' is not a valid regex: {source}"
            ),
            RouteDefinitionError::DuplicateRouteName { route } => {
                write!(f, "route '{route}' is already defined")
            }
        }
    }
}

impl std::error::Error for RouteDefinitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteDefinitionError::InvalidRequirement { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Outcome of a failed route match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No route matched the request
    NotFound,
    /// A route's path matched, but none accepted the request method
    MethodNotAllowed {
        /// Methods accepted by the path-matching routes, in declaration order
        allowed: Vec<Method>,
    },
}

impl RouteError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::NotFound => StatusCode::NOT_FOUND,
            RouteError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Value for an `Allow` response header, if this is a 405
    #[must_use]
    pub fn allow_header(&self) -> Option<String> {
        match self {
            RouteError::NotFound => None,
            RouteError::MethodNotAllowed { allowed } => Some(
                allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        }
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NotFound => write!(f, "no route matches the request"),
            RouteError::MethodNotAllowed { .. } => write!(
                f,
                "method not allowed (allowed: {})",
                self.allow_header().unwrap_or_default()
            ),
        }
    }
}

impl std::error::Error for RouteError {}

/// Failure while validating or invoking a controller action.
#[derive(Debug)]
pub enum DispatchError {
    /// The class is unknown, the action is not callable, or the controller
    /// broke the published-parameters contract
    InvalidHandler {
        /// Class name that was being dispatched
        class_name: String,
        /// Human readable reason
        message: String,
    },
    /// The supplied parameters do not cover every formal parameter
    ParameterCount {
        /// Class name
        class_name: String,
        /// Action (method) name
        method_name: String,
        /// Number of formal parameters the action declares
        expected: usize,
        /// Number of formal parameters found in the supplied parameters
        supplied: usize,
        /// Formal parameters without a same-named entry
        missing: Vec<String>,
    },
    /// The action ran and reported an error
    ActionFailed {
        /// Class name
        class_name: String,
        /// Action (method) name
        method_name: String,
        /// Error returned by the action
        source: anyhow::Error,
    },
    /// The entity is not in the `Configured` state
    InvalidState {
        /// State the entity was in
        state: DispatchState,
    },
}

impl DispatchError {
    /// `400` for unbound parameters, `500` for everything else
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::ParameterCount { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn invalid_handler(class_name: &str, message: impl Into<String>) -> Self {
        DispatchError::InvalidHandler {
            class_name: class_name.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::InvalidHandler {
                class_name,
                message,
            } => write!(f, "invalid handler '{class_name}': {message}"),
            DispatchError::ParameterCount {
                class_name,
                method_name,
                expected,
                supplied,
                missing,
            } => write!(
                f,
                "{class_name}::{method_name} expects {expected} parameter(s) but only {supplied} \
                 were supplied (missing: {})",
                missing.join(", ")
            ),
            DispatchError::ActionFailed {
                class_name,
                method_name,
                source,
            } => write!(f, "{class_name}::{method_name} failed: {source}"),
            DispatchError::InvalidState { state } => {
                write!(f, "cannot dispatch an entity in state {state:?}")
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::ActionFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Any failure of the full match → dispatch pipeline.
#[derive(Debug)]
pub enum FrameworkError {
    /// Route matching failed and no fallback applied
    Route(RouteError),
    /// Dispatch failed
    Dispatch(DispatchError),
}

impl fmt::Display for FrameworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameworkError::Route(e) => e.fmt(f),
            FrameworkError::Dispatch(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for FrameworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameworkError::Route(e) => Some(e),
            FrameworkError::Dispatch(e) => Some(e),
        }
    }
}

impl From<RouteError> for FrameworkError {
    fn from(e: RouteError) -> Self {
        FrameworkError::Route(e)
    }
}

impl From<DispatchError> for FrameworkError {
    fn from(e: DispatchError) -> Self {
        FrameworkError::Dispatch(e)
    }
}

impl FrameworkError {
    /// HTTP status the response layer answers with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            FrameworkError::Route(e) => e.status(),
            FrameworkError::Dispatch(e) => e.status(),
        }
    }

    /// Process exit code for the CLI front end
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            FrameworkError::Route(_) => 3,
            FrameworkError::Dispatch(DispatchError::ParameterCount { .. }) => 2,
            FrameworkError::Dispatch(DispatchError::ActionFailed { .. }) => 1,
            FrameworkError::Dispatch(_) => 4,
        }
    }
}
