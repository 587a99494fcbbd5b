//! # Router Module
//!
//! Matches an incoming request against a [`RouteTable`](crate::routes::RouteTable).
//!
//! ## Matching
//!
//! Routes are scanned in declaration order and the first one that passes
//! every check wins:
//!
//! 1. static prefix of the path pattern (cheap rejection, never changes the outcome)
//! 2. full path pattern
//! 3. host pattern, if the route has one
//! 4. scheme restriction
//! 5. method restriction (`HEAD` compared as `GET`); a mismatch is remembered
//!    for a `405` and the scan continues
//! 6. context-parameter requirements
//!
//! ```rust
//! use brrtmvc::router::{MatchContext, Router};
//! use brrtmvc::routes::{Route, RouteTable};
//! use brrtmvc::RouteError;
//! use http::Method;
//!
//! let table = RouteTable::from_routes([Route::new("users_show", "/users/{id}")
//!     .methods([Method::GET])
//!     .controller("Users:show")])
//! .unwrap();
//! let router = Router::new(table);
//!
//! let params = router.route(Method::GET, "/users/42").unwrap();
//! assert_eq!(params.get("id"), Some("42"));
//! assert_eq!(params.controller(), Some("Users:show"));
//!
//! let err = router.route(Method::POST, "/users/42").unwrap_err();
//! assert_eq!(err, RouteError::MethodNotAllowed { allowed: vec![Method::GET] });
//! ```
//!
//! The CLI variant ([`CliRouter`]) skips matching entirely: its token is the
//! handler notation.

mod cli;
mod context;
mod core;

pub use cli::{CliInvocation, CliRouter, CLI_ROUTE_NAME};
pub use context::MatchContext;
pub(crate) use context::normalize_path;
pub use core::{match_route, MatchParams, MatchResult, Router};
