use super::entity::{DispatchEntity, DispatchState};
use crate::controller::{ActionResult, Arguments};
use crate::error::DispatchError;
use crate::project::Project;
use crate::registry::Registry;
use crate::request::Request;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Per-dispatch collaborators handed to controllers that ask for them.
#[derive(Debug, Clone, Default)]
pub struct DispatchContext {
    /// Application context attached to [`ProjectAware`](crate::controller::ProjectAware) controllers
    pub project: Option<Arc<Project>>,
    /// Current request attached to [`RequestAware`](crate::controller::RequestAware) controllers
    pub request: Option<Arc<Request>>,
}

impl DispatchContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_project(mut self, project: Arc<Project>) -> Self {
        self.project = Some(project);
        self
    }

    #[must_use]
    pub fn with_request(mut self, request: Arc<Request>) -> Self {
        self.request = Some(request);
        self
    }
}

/// Validates, binds and invokes controller actions.
///
/// The dispatcher holds only the read-only registry; every dispatch creates
/// its own controller instance, so one dispatcher can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    #[must_use]
    pub fn from_shared(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run the configured handler and capture its result.
    ///
    /// On success the entity is `Dispatched` and carries the result and the
    /// published parameters. On error the entity is left `Configured`.
    pub fn dispatch(
        &self,
        entity: &mut DispatchEntity,
        ctx: &DispatchContext,
    ) -> Result<(), DispatchError> {
        let state = entity.state();
        let handler = match (state, entity.handler()) {
            (DispatchState::Configured, Some(handler)) => handler.clone(),
            _ => {
                warn!(dispatch_id = %entity.id(), state = ?state, "Dispatch rejected");
                return Err(DispatchError::InvalidState { state });
            }
        };
        let class_name = handler.class_name.as_str();
        let method_name = handler.method_name.as_str();

        debug!(
            dispatch_id = %entity.id(),
            class_name = %class_name,
            method_name = %method_name,
            available_controllers = self.registry.len(),
            "Controller lookup"
        );

        let Some(controller_entry) = self.registry.get(class_name) else {
            error!(
                dispatch_id = %entity.id(),
                class_name = %class_name,
                available_controllers = ?self.registry.class_names(),
                "Controller not found"
            );
            return Err(DispatchError::invalid_handler(
                class_name,
                "no such controller is registered",
            ));
        };

        let Some(action) = controller_entry.action(method_name) else {
            error!(
                dispatch_id = %entity.id(),
                class_name = %class_name,
                method_name = %method_name,
                "Action not found"
            );
            return Err(DispatchError::invalid_handler(
                class_name,
                format!("'{method_name}' is not a callable action"),
            ));
        };

        let mut values = Vec::with_capacity(action.params.len());
        let mut missing = Vec::new();
        for name in &action.params {
            match entity.params().get(name) {
                Some(value) => values.push(value.clone()),
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            warn!(
                dispatch_id = %entity.id(),
                class_name = %class_name,
                method_name = %method_name,
                missing = ?missing,
                "Action parameters not supplied"
            );
            return Err(DispatchError::ParameterCount {
                class_name: class_name.to_string(),
                method_name: method_name.to_string(),
                expected: action.params.len(),
                supplied: values.len(),
                missing,
            });
        }
        let args = Arguments::new(action.params.clone(), values);

        let mut controller = controller_entry.instantiate();
        if let (Some(project), Some(aware)) = (&ctx.project, controller.as_project_aware()) {
            aware.set_project(Arc::clone(project));
        }
        if let (Some(request), Some(aware)) = (&ctx.request, controller.as_request_aware()) {
            aware.set_request(Arc::clone(request));
        }

        if let Some(resolver) = controller.as_asset_resolver() {
            if let Some(asset) = resolver.resolve_asset(entity.params()) {
                debug!(
                    dispatch_id = %entity.id(),
                    class_name = %class_name,
                    asset = %asset.path.display(),
                    "Asset resolved before action"
                );
                entity.complete(ActionResult::Asset(asset));
                return Ok(());
            }
        }

        let start = Instant::now();
        let result = controller.call(method_name, args).map_err(|source| {
            warn!(
                dispatch_id = %entity.id(),
                class_name = %class_name,
                method_name = %method_name,
                error = %source,
                "Action failed"
            );
            DispatchError::ActionFailed {
                class_name: class_name.to_string(),
                method_name: method_name.to_string(),
                source,
            }
        })?;

        if let Some(publisher) = controller.as_publisher() {
            match publisher.published_params() {
                Ok(Value::Object(published)) => entity.publish(published),
                Ok(other) => {
                    return Err(DispatchError::invalid_handler(
                        class_name,
                        format!(
                            "published parameters must be a mapping, got {}",
                            json_kind(&other)
                        ),
                    ));
                }
                Err(e) => {
                    return Err(DispatchError::invalid_handler(
                        class_name,
                        format!("published parameters unavailable: {e}"),
                    ));
                }
            }
        }

        info!(
            dispatch_id = %entity.id(),
            class_name = %class_name,
            method_name = %method_name,
            execution_time_us = start.elapsed().as_micros() as u64,
            published = entity.published().len(),
            "Action complete"
        );
        entity.complete(result);
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{
        ActionDescriptor, AssetResolver, Controller, ControllerType, Params, ProjectAware,
        Publisher, RequestAware,
    };
    use crate::config::FrameworkConfig;
    use crate::handler_spec::ParseOptions;
    use crate::view::AssetDescriptor;
    use http::Method;
    use serde_json::json;

    #[derive(Default)]
    struct Calc {
        project: Option<String>,
        path: Option<String>,
        last: Option<i64>,
    }

    impl Controller for Calc {
        fn call(&mut self, action: &str, args: Arguments) -> anyhow::Result<ActionResult> {
            match action {
                "addAction" => {
                    let sum = args.parse::<i64>(0)? + args.parse::<i64>(1)?;
                    self.last = Some(sum);
                    Ok(sum.to_string().into())
                }
                "whoAction" => Ok(format!(
                    "{}@{}",
                    self.project.as_deref().unwrap_or("-"),
                    self.path.as_deref().unwrap_or("-")
                )
                .into()),
                "failAction" => anyhow::bail!("boom"),
                _ => unreachable!(),
            }
        }

        fn as_project_aware(&mut self) -> Option<&mut dyn ProjectAware> {
            Some(self)
        }

        fn as_request_aware(&mut self) -> Option<&mut dyn RequestAware> {
            Some(self)
        }

        fn as_publisher(&self) -> Option<&dyn Publisher> {
            Some(self)
        }
    }

    impl ProjectAware for Calc {
        fn set_project(&mut self, project: Arc<Project>) {
            self.project = Some(project.name().to_string());
        }
    }

    impl RequestAware for Calc {
        fn set_request(&mut self, request: Arc<Request>) {
            self.path = Some(request.path.clone());
        }
    }

    impl Publisher for Calc {
        fn published_params(&self) -> anyhow::Result<Value> {
            Ok(json!({ "last": self.last }))
        }
    }

    impl ControllerType for Calc {
        fn create() -> Self {
            Self::default()
        }

        fn actions() -> Vec<ActionDescriptor> {
            vec![
                ActionDescriptor::new("addAction", &["a", "b"]),
                ActionDescriptor::new("whoAction", &[]),
                ActionDescriptor::new("failAction", &[]),
            ]
        }
    }

    struct Smart;

    impl Controller for Smart {
        fn call(&mut self, _action: &str, _args: Arguments) -> anyhow::Result<ActionResult> {
            Ok("action ran".into())
        }

        fn as_asset_resolver(&mut self) -> Option<&mut dyn AssetResolver> {
            Some(self)
        }
    }

    impl AssetResolver for Smart {
        fn resolve_asset(&mut self, params: &Params) -> Option<AssetDescriptor> {
            params
                .get("file")
                .and_then(Value::as_str)
                .map(|f| AssetDescriptor::new(format!("/srv/{f}")))
        }
    }

    struct BadPublisher;

    impl Controller for BadPublisher {
        fn call(&mut self, _action: &str, _args: Arguments) -> anyhow::Result<ActionResult> {
            Ok(ActionResult::Empty)
        }

        fn as_publisher(&self) -> Option<&dyn Publisher> {
            Some(self)
        }
    }

    impl Publisher for BadPublisher {
        fn published_params(&self) -> anyhow::Result<Value> {
            Ok(json!([1, 2]))
        }
    }

    fn dispatcher() -> Dispatcher {
        let mut registry = Registry::new();
        registry
            .register::<Calc>("Calc")
            .register_with(
                "Smart",
                || Box::new(Smart) as Box<dyn Controller>,
                vec![ActionDescriptor::new("defaultAction", &[])],
            )
            .register_with(
                "Bad",
                || Box::new(BadPublisher) as Box<dyn Controller>,
                vec![ActionDescriptor::new("defaultAction", &[])],
            );
        Dispatcher::new(registry)
    }

    fn entity(notation: &str) -> DispatchEntity {
        let mut entity = DispatchEntity::new();
        entity.configure(notation, &ParseOptions::default());
        entity
    }

    #[test]
    fn test_binds_by_name_in_declaration_order() {
        let mut e = entity("Calc:add");
        e.set_param("b", "13").set_param("a", "7").set_param("extra", "x");
        dispatcher().dispatch(&mut e, &DispatchContext::new()).unwrap();
        assert_eq!(e.state(), DispatchState::Dispatched);
        assert_eq!(e.result(), Some(&ActionResult::Text("20".into())));
        assert_eq!(e.published_param("last"), Some(&json!(20)));
    }

    #[test]
    fn test_missing_parameter_is_parameter_count() {
        let mut e = entity("Calc:add");
        e.set_param("a", "7");
        let err = dispatcher()
            .dispatch(&mut e, &DispatchContext::new())
            .unwrap_err();
        match err {
            DispatchError::ParameterCount {
                expected,
                supplied,
                missing,
                ..
            } => {
                assert_eq!((expected, supplied), (2, 1));
                assert_eq!(missing, ["b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(e.state(), DispatchState::Configured);
    }

    #[test]
    fn test_unknown_class_and_action_are_invalid_handler() {
        let d = dispatcher();
        let mut e = entity("Nope:add");
        let err = d.dispatch(&mut e, &DispatchContext::new()).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidHandler { ref class_name, .. } if class_name == "Nope"));

        let mut e = entity("Calc:subtract");
        let err = d.dispatch(&mut e, &DispatchContext::new()).unwrap_err();
        assert!(err.to_string().contains("subtractAction"));
    }

    #[test]
    fn test_action_error_is_action_failed() {
        let mut e = entity("Calc:fail");
        let err = dispatcher()
            .dispatch(&mut e, &DispatchContext::new())
            .unwrap_err();
        assert!(matches!(err, DispatchError::ActionFailed { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_project_and_request_are_attached() {
        let ctx = DispatchContext::new()
            .with_project(Arc::new(Project::new(
                "shop",
                Arc::new(FrameworkConfig::default()),
            )))
            .with_request(Arc::new(Request::new(Method::GET, "/who?x=1")));
        let mut e = entity("Calc:who");
        dispatcher().dispatch(&mut e, &ctx).unwrap();
        assert_eq!(e.result(), Some(&ActionResult::Text("shop@/who".into())));
    }

    #[test]
    fn test_asset_resolver_short_circuits() {
        let d = dispatcher();
        let mut e = entity("Smart");
        e.set_param("file", "logo.png");
        d.dispatch(&mut e, &DispatchContext::new()).unwrap();
        match e.result() {
            Some(ActionResult::Asset(asset)) => {
                assert_eq!(asset.content_type, "image/png");
            }
            other => panic!("expected asset, got {other:?}"),
        }

        let mut e = entity("Smart");
        d.dispatch(&mut e, &DispatchContext::new()).unwrap();
        assert_eq!(e.result(), Some(&ActionResult::Text("action ran".into())));
    }

    #[test]
    fn test_non_mapping_published_params_name_the_class() {
        let mut e = entity("Bad");
        let err = dispatcher()
            .dispatch(&mut e, &DispatchContext::new())
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidHandler { ref class_name, .. } if class_name == "Bad"));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_redispatch_and_unconfigured_are_rejected() {
        let d = dispatcher();
        let mut e = DispatchEntity::new();
        assert!(matches!(
            d.dispatch(&mut e, &DispatchContext::new()),
            Err(DispatchError::InvalidState {
                state: DispatchState::Created
            })
        ));

        let mut e = entity("Calc:who");
        d.dispatch(&mut e, &DispatchContext::new()).unwrap();
        assert!(matches!(
            d.dispatch(&mut e, &DispatchContext::new()),
            Err(DispatchError::InvalidState {
                state: DispatchState::Dispatched
            })
        ));
    }
}
