#![allow(dead_code)]

use brrtmvc::app::Application;
use brrtmvc::config::FrameworkConfig;
use brrtmvc::registry::Registry;
use brrtmvc::routes::{load_routes_str, RouteFileFormat, RouteTable};
use std::path::{Path, PathBuf};

pub const ROUTES_YAML: &str = r#"
users_show:
  path: /users/{id}
  methods: [GET]
  controller: "Users:show"
  requirements: { id: '\d+' }
users_update:
  path: /users/{id}
  methods: [PUT]
  controller: "Users:update"
users_list:
  path: /users/list/{page}
  controller: "Users:list"
  defaults: { page: 1 }
  requirements: { page: '\d+' }
hello:
  path: /hello/{name}
  methods: [GET]
  controller: "Pages:hello"
assets:
  path: /assets/{*file}
  methods: [GET]
  controller: "Assets"
broken:
  path: /broken
  controller: "Broken"
ghost:
  path: /ghost
  controller: "Ghost:haunt"
"#;

pub fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn static_dir() -> PathBuf {
    manifest_dir().join("tests/staticdata")
}

pub fn templates_dir() -> PathBuf {
    manifest_dir().join("tests/templates")
}

pub fn routes() -> RouteTable {
    load_routes_str(ROUTES_YAML, RouteFileFormat::Yaml).unwrap()
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register::<controllers::Users>("Users")
        .register::<controllers::Pages>("Pages")
        .register::<controllers::Assets>("Assets")
        .register::<controllers::Errors>("Errors")
        .register::<controllers::Console>("Console")
        .register::<controllers::Broken>("Broken");
    registry
}

pub fn config() -> FrameworkConfig {
    FrameworkConfig {
        name: "test-app".to_string(),
        templates_dir: Some(templates_dir()),
        default_handler: "Console:help".to_string(),
        ..FrameworkConfig::default()
    }
}

pub fn app() -> Application {
    Application::new(config(), routes(), registry())
}

pub fn app_with(config: FrameworkConfig) -> Application {
    Application::new(config, routes(), registry())
}

pub mod controllers {
    use super::static_dir;
    use brrtmvc::controller::{
        ActionDescriptor, ActionResult, Arguments, AssetResolver, Controller, ControllerType,
        Params, ProjectAware, Publisher, RequestAware,
    };
    use brrtmvc::project::Project;
    use brrtmvc::request::Request;
    use brrtmvc::view::{AssetDescriptor, AssetDirectory, TemplateHandle};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[derive(Default)]
    pub struct Users {
        request: Option<Arc<Request>>,
    }

    impl Controller for Users {
        fn call(&mut self, action: &str, args: Arguments) -> anyhow::Result<ActionResult> {
            match action {
                "showAction" => Ok(format!("user {}", args.str(0)?).into()),
                "updateAction" => {
                    let body = self
                        .request
                        .as_ref()
                        .and_then(|r| r.body.as_ref())
                        .and_then(|b| b.get("name"))
                        .and_then(Value::as_str)
                        .unwrap_or("?")
                        .to_string();
                    Ok(format!("updated {} to {body}", args.str(0)?).into())
                }
                "listAction" => Ok(format!("page {}", args.parse::<u32>(0)?).into()),
                other => anyhow::bail!("unknown action {other}"),
            }
        }

        fn as_request_aware(&mut self) -> Option<&mut dyn RequestAware> {
            Some(self)
        }
    }

    impl RequestAware for Users {
        fn set_request(&mut self, request: Arc<Request>) {
            self.request = Some(request);
        }
    }

    impl ControllerType for Users {
        fn create() -> Self {
            Self::default()
        }

        fn actions() -> Vec<ActionDescriptor> {
            vec![
                ActionDescriptor::new("showAction", &["id"]),
                ActionDescriptor::new("updateAction", &["id"]),
                ActionDescriptor::new("listAction", &["page"]),
            ]
        }
    }

    #[derive(Default)]
    pub struct Pages {
        project: Option<String>,
    }

    impl Controller for Pages {
        fn call(&mut self, action: &str, args: Arguments) -> anyhow::Result<ActionResult> {
            match action {
                "helloAction" => {
                    Ok(TemplateHandle::new("hello.html").with("name", args.str(0)?).into())
                }
                other => anyhow::bail!("unknown action {other}"),
            }
        }

        fn as_project_aware(&mut self) -> Option<&mut dyn ProjectAware> {
            Some(self)
        }

        fn as_publisher(&self) -> Option<&dyn Publisher> {
            Some(self)
        }
    }

    impl ProjectAware for Pages {
        fn set_project(&mut self, project: Arc<Project>) {
            self.project = Some(project.name().to_string());
        }
    }

    impl Publisher for Pages {
        fn published_params(&self) -> anyhow::Result<Value> {
            Ok(json!({ "project": self.project }))
        }
    }

    impl ControllerType for Pages {
        fn create() -> Self {
            Self::default()
        }

        fn actions() -> Vec<ActionDescriptor> {
            vec![ActionDescriptor::new("helloAction", &["name"])]
        }
    }

    /// Serves files below `tests/staticdata` before any action runs
    pub struct Assets {
        dir: AssetDirectory,
    }

    impl Controller for Assets {
        fn call(&mut self, _action: &str, _args: Arguments) -> anyhow::Result<ActionResult> {
            Ok(ActionResult::Other(Value::Null))
        }

        fn as_asset_resolver(&mut self) -> Option<&mut dyn AssetResolver> {
            Some(self)
        }
    }

    impl AssetResolver for Assets {
        fn resolve_asset(&mut self, params: &Params) -> Option<AssetDescriptor> {
            let file = params.get("file")?.as_str()?;
            self.dir.resolve(file)
        }
    }

    impl ControllerType for Assets {
        fn create() -> Self {
            Self {
                dir: AssetDirectory::new(static_dir()),
            }
        }

        fn actions() -> Vec<ActionDescriptor> {
            vec![ActionDescriptor::new("defaultAction", &[])]
        }
    }

    pub struct Errors;

    impl Controller for Errors {
        fn call(&mut self, action: &str, args: Arguments) -> anyhow::Result<ActionResult> {
            match action {
                "notFoundAction" => Ok(format!("missing: {}", args.str(0)?).into()),
                other => anyhow::bail!("unknown action {other}"),
            }
        }
    }

    impl ControllerType for Errors {
        fn create() -> Self {
            Errors
        }

        fn actions() -> Vec<ActionDescriptor> {
            vec![ActionDescriptor::new("notFoundAction", &["path"])]
        }
    }

    pub struct Console;

    impl Controller for Console {
        fn call(&mut self, action: &str, args: Arguments) -> anyhow::Result<ActionResult> {
            match action {
                "helpAction" => Ok("usage: app <command>".into()),
                "greetAction" => Ok(format!("hello {}", args.str(0)?).into()),
                "sumAction" => {
                    let total = args.parse::<i64>(0)? + args.parse::<i64>(1)?;
                    Ok(total.to_string().into())
                }
                other => anyhow::bail!("unknown action {other}"),
            }
        }
    }

    impl ControllerType for Console {
        fn create() -> Self {
            Console
        }

        fn actions() -> Vec<ActionDescriptor> {
            vec![
                ActionDescriptor::new("helpAction", &[]),
                ActionDescriptor::new("greetAction", &["name"]),
                ActionDescriptor::new("sumAction", &["arg0", "arg1"]),
            ]
        }
    }

    /// Publishes a string instead of a mapping
    pub struct Broken;

    impl Controller for Broken {
        fn call(&mut self, _action: &str, _args: Arguments) -> anyhow::Result<ActionResult> {
            Ok("never delivered".into())
        }

        fn as_publisher(&self) -> Option<&dyn Publisher> {
            Some(self)
        }
    }

    impl Publisher for Broken {
        fn published_params(&self) -> anyhow::Result<Value> {
            Ok(json!("not a mapping"))
        }
    }

    impl ControllerType for Broken {
        fn create() -> Self {
            Broken
        }

        fn actions() -> Vec<ActionDescriptor> {
            vec![ActionDescriptor::new("defaultAction", &[])]
        }
    }
}

/// Captures `tracing` event messages for the current thread.
pub mod tracing_capture {
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, Registry};

    #[derive(Clone, Default)]
    struct Capture {
        messages: Arc<Mutex<Vec<String>>>,
    }

    struct MessageVisitor(Option<String>);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = Some(format!("{value:?}"));
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor(None);
            event.record(&mut visitor);
            if let Some(message) = visitor.0 {
                self.messages.lock().unwrap().push(message);
            }
        }
    }

    pub struct TestTracing {
        capture: Capture,
        _guard: tracing::subscriber::DefaultGuard,
    }

    impl TestTracing {
        pub fn init() -> Self {
            let capture = Capture::default();
            let subscriber = Registry::default().with(capture.clone());
            let guard = tracing::subscriber::set_default(subscriber);
            Self {
                capture,
                _guard: guard,
            }
        }

        pub fn messages(&self) -> Vec<String> {
            self.capture.messages.lock().unwrap().clone()
        }

        pub fn contains(&self, message: &str) -> bool {
            self.messages().iter().any(|m| m == message)
        }
    }
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
