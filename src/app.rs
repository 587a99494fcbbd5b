//! # Application
//!
//! Wires the pipeline together: route table → router → dispatcher →
//! response router. One [`Application`] serves any number of threads; each
//! request runs its own synchronous pipeline.
//!
//! The route table can be replaced at runtime with
//! [`Application::reload_routes`]. Readers never block: requests already in
//! flight finish against the table they started with.

use crate::config::FrameworkConfig;
use crate::controller::Params;
use crate::dispatcher::{DispatchContext, DispatchEntity, Dispatcher};
use crate::error::{FrameworkError, RouteError};
use crate::handler_spec::ParseOptions;
use crate::project::Project;
use crate::registry::Registry;
use crate::request::Request;
use crate::response::{Response, ResponseRouter};
use crate::router::{CliInvocation, CliRouter, MatchParams, Router};
use crate::routes::{load_routes, RouteTable, CONTROLLER_KEY, ROUTE_KEY};
use crate::view::{Renderer, TemplateDirectory};
use anyhow::Context;
use arc_swap::ArcSwap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, info_span};

/// Route name reported when the not-found handler stands in for a match.
pub const NOT_FOUND_ROUTE_NAME: &str = "not_found";

/// A configured application.
pub struct Application {
    router: ArcSwap<Router>,
    dispatcher: Dispatcher,
    project: Arc<Project>,
    responses: ResponseRouter,
    cli: CliRouter,
    options: ParseOptions,
    not_found_handler: Option<String>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("project", &self.project)
            .field("routes", &self.router.load().table().len())
            .field("controllers", &self.dispatcher.registry().len())
            .field("not_found_handler", &self.not_found_handler)
            .finish()
    }
}

impl Application {
    /// Build from a configuration, an already loaded table and a registry.
    ///
    /// A renderer over `templates_dir` is installed when the configuration
    /// names one.
    #[must_use]
    pub fn new(config: FrameworkConfig, table: RouteTable, registry: Registry) -> Self {
        let options = config.parse_options();
        let mut responses = ResponseRouter::new(config.dev);
        if let Some(dir) = &config.templates_dir {
            responses = responses.with_renderer(Arc::new(TemplateDirectory::new(dir)));
        }
        let cli = CliRouter::new(config.default_handler.clone(), options.clone());
        let not_found_handler = config.not_found_handler.clone();
        let project = Project::new(config.name.clone(), Arc::new(config));

        info!(
            project = %project.name(),
            routes_count = table.len(),
            controllers = registry.len(),
            dev = project.is_dev(),
            "Application created"
        );

        Self {
            router: ArcSwap::from_pointee(Router::new(table)),
            dispatcher: Dispatcher::new(registry),
            project: Arc::new(project),
            responses,
            cli,
            options,
            not_found_handler,
        }
    }

    /// Build from a configuration, loading `routes_file` when set
    pub fn from_config(config: FrameworkConfig, registry: Registry) -> anyhow::Result<Self> {
        let table = match &config.routes_file {
            Some(path) => load_routes(path)
                .with_context(|| format!("Failed to load routes from {}", path.display()))?,
            None => RouteTable::new(),
        };
        Ok(Self::new(config, table, registry))
    }

    /// Replace the project context handed to controllers
    #[must_use]
    pub fn with_project(mut self, project: Project) -> Self {
        self.project = Arc::new(project);
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.responses = self.responses.with_renderer(renderer);
        self
    }

    #[must_use]
    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn responses(&self) -> &ResponseRouter {
        &self.responses
    }

    /// Current route table
    #[must_use]
    pub fn routes(&self) -> Arc<RouteTable> {
        Arc::clone(self.router.load().table())
    }

    /// Swap in a new route table
    pub fn reload_routes(&self, table: RouteTable) {
        let routes_count = table.len();
        self.router.store(Arc::new(Router::new(table)));
        info!(routes_count = routes_count, "Route table reloaded");
    }

    /// Full HTTP-style pipeline: every outcome becomes a response
    #[must_use]
    pub fn handle(&self, request: Request) -> Response {
        let request = Arc::new(request);
        match self.dispatch_request(&request) {
            Ok(mut entity) => self.responses.respond(&mut entity),
            Err(e) => self.responses.framework_error(&e),
        }
    }

    /// Match and dispatch a request, returning the dispatched entity.
    ///
    /// `NotFound` is recovered by dispatching the configured not-found
    /// handler, which receives the requested `path` as a parameter.
    pub fn dispatch_request(&self, request: &Arc<Request>) -> Result<DispatchEntity, FrameworkError> {
        let span = info_span!("request", request_id = %request.request_id);
        let _enter = span.enter();

        let context = request.match_context();
        let params = match self.router.load().match_context(&context) {
            Ok(params) => params,
            Err(RouteError::NotFound) => match &self.not_found_handler {
                Some(handler) => {
                    info!(path = %request.path, handler = %handler, "Dispatching not-found handler");
                    [
                        (CONTROLLER_KEY, handler.as_str()),
                        (ROUTE_KEY, NOT_FOUND_ROUTE_NAME),
                        ("path", request.path.as_str()),
                    ]
                    .into_iter()
                    .collect()
                }
                None => return Err(RouteError::NotFound.into()),
            },
            Err(e) => return Err(e.into()),
        };

        let ctx = DispatchContext::new()
            .with_project(Arc::clone(&self.project))
            .with_request(Arc::clone(request));
        self.dispatch_params(&params, Params::new(), &ctx)
    }

    /// Dispatch a command line (program name excluded)
    pub fn run_cli<I, S>(&self, args: I) -> Result<DispatchEntity, FrameworkError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let invocation = CliInvocation::parse(args);
        let params = self.cli.route(&invocation);
        let ctx = DispatchContext::new().with_project(Arc::clone(&self.project));
        self.dispatch_params(&params, Params::new(), &ctx)
    }

    /// Dispatch a match with explicit parameter overrides
    pub fn dispatch_params(
        &self,
        params: &MatchParams,
        overrides: Params,
        ctx: &DispatchContext,
    ) -> Result<DispatchEntity, FrameworkError> {
        let mut entity = DispatchEntity::from_match(params, &self.options)?;
        entity.extend_params(overrides);
        self.dispatcher.dispatch(&mut entity, ctx)?;
        Ok(entity)
    }

    /// Dispatch a handler notation directly, bypassing the router
    pub fn forward(
        &self,
        notation: &str,
        params: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<DispatchEntity, FrameworkError> {
        let mut entity = DispatchEntity::new();
        entity.configure(notation, &self.options).extend_params(params);
        let ctx = DispatchContext::new().with_project(Arc::clone(&self.project));
        self.dispatcher.dispatch(&mut entity, &ctx)?;
        Ok(entity)
    }
}
