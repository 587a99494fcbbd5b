//! # brrtmvc
//!
//! **brrtmvc** is the routing and dispatch core of an MVC application
//! framework. Given a request (method, path, host, scheme, context) or a
//! command line, it decides which controller action runs, binds the action's
//! arguments by name, invokes it, and hands the result to a response router
//! that delivers it as text, a static asset or a rendered template.
//!
//! ## Architecture
//!
//! - **[`routes`]** - Route definitions, pattern compilation and route files (YAML/JSON/TOML)
//! - **[`router`]** - First-match-wins route matching and the CLI router
//! - **[`handler_spec`]** - `Class:method` handler notation parsing
//! - **[`controller`]** - The controller contract and its optional capabilities
//! - **[`registry`]** - Class name → controller factory and action table
//! - **[`dispatcher`]** - Argument binding and controller invocation
//! - **[`response`]** - Result delivery and error responses
//! - **[`view`]** - Template rendering and asset resolution
//! - **[`app`]** - The assembled pipeline with hot-swappable routes
//! - **[`config`]** / **[`logging`]** - Configuration and structured logging
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant App as Application
//!     participant Router
//!     participant Dispatcher
//!     participant Controller
//!     participant Responses as ResponseRouter
//!
//!     Client->>App: Request GET /users/42
//!     App->>Router: match_context(ctx)
//!     alt No route matched
//!         Router-->>App: NotFound / MethodNotAllowed
//!         App-->>Client: 404 / 405 + Allow
//!     end
//!     Router-->>App: MatchParams {_controller, _route, id}
//!     App->>Dispatcher: dispatch(entity, project + request)
//!     Dispatcher->>Dispatcher: lookup class and action, bind by name
//!     Dispatcher->>Controller: call("showAction", [42])
//!     Controller-->>Dispatcher: ActionResult + published params
//!     Dispatcher-->>App: Dispatched entity
//!     App->>Responses: respond(entity)
//!     Responses-->>Client: 200 text / asset / rendered template
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtmvc::app::Application;
//! use brrtmvc::config::FrameworkConfig;
//! use brrtmvc::controller::{ActionDescriptor, ActionResult, Arguments, Controller, ControllerType};
//! use brrtmvc::registry::Registry;
//! use brrtmvc::request::Request;
//! use brrtmvc::routes::load_routes_str;
//! use brrtmvc::routes::RouteFileFormat;
//! use http::{Method, StatusCode};
//!
//! struct Users;
//!
//! impl Controller for Users {
//!     fn call(&mut self, action: &str, args: Arguments) -> anyhow::Result<ActionResult> {
//!         match action {
//!             "showAction" => Ok(format!("user {}", args.parse::<u32>(0)?).into()),
//!             other => anyhow::bail!("unknown action {other}"),
//!         }
//!     }
//! }
//!
//! impl ControllerType for Users {
//!     fn create() -> Self {
//!         Users
//!     }
//!     fn actions() -> Vec<ActionDescriptor> {
//!         vec![ActionDescriptor::new("showAction", &["id"])]
//!     }
//! }
//!
//! let routes = load_routes_str(
//!     r#"
//! users_show:
//!   path: /users/{id}
//!   methods: [GET]
//!   controller: "Users:show"
//!   requirements: { id: '\d+' }
//! "#,
//!     RouteFileFormat::Yaml,
//! )?;
//!
//! let mut registry = Registry::new();
//! registry.register::<Users>("Users");
//!
//! let app = Application::new(FrameworkConfig::default(), routes, registry);
//! let response = app.handle(Request::new(Method::GET, "/users/42"));
//! assert_eq!(response.status, StatusCode::OK);
//! assert_eq!(response.body_text(), Some("user 42"));
//!
//! let response = app.handle(Request::new(Method::POST, "/users/42"));
//! assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
//! assert_eq!(response.header("allow"), Some("GET"));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Logging
//!
//! Every stage emits `tracing` events with structured fields (`route_name`,
//! `class_name`, `dispatch_id`, ...). Install a subscriber with
//! [`logging::init_logging_with_config`].

pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod handler_spec;
pub mod logging;
pub mod project;
pub mod registry;
pub mod request;
pub mod response;
pub mod router;
pub mod routes;
pub mod view;

pub use app::Application;
pub use error::{DispatchError, FrameworkError, RouteDefinitionError, RouteError};
pub use handler_spec::HandlerSpec;
pub use router::{MatchContext, MatchParams, Router};
pub use routes::{load_routes, Route, RouteTable};
