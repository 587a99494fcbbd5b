//! Controller registry.
//!
//! Maps class names to a zero-argument factory and a static action table.
//! The registry is populated at startup and read-only afterwards; the
//! dispatcher looks classes up by the name a handler notation resolved to.
//!
//! ```rust
//! use brrtmvc::controller::{ActionDescriptor, ActionResult, Arguments, Controller, ControllerType};
//! use brrtmvc::registry::Registry;
//!
//! #[derive(Default)]
//! struct Users;
//!
//! impl Controller for Users {
//!     fn call(&mut self, action: &str, args: Arguments) -> anyhow::Result<ActionResult> {
//!         match action {
//!             "showAction" => Ok(format!("user {}", args.str(0)?).into()),
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
//! let mut registry = Registry::new();
//! registry.register::<Users>("App\\Users");
//! assert!(registry.get("App\\Users").is_some());
//! ```

use crate::controller::{ActionDescriptor, Controller, ControllerType};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Creates a fresh controller instance.
pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// One registered controller class.
#[derive(Clone)]
pub struct ControllerEntry {
    class_name: String,
    factory: ControllerFactory,
    actions: HashMap<String, ActionDescriptor>,
}

impl fmt::Debug for ControllerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<_> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("ControllerEntry")
            .field("class_name", &self.class_name)
            .field("actions", &actions)
            .finish()
    }
}

impl ControllerEntry {
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Descriptor of a callable action (case-sensitive)
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.get(name)
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.actions.values()
    }

    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Controller> {
        (self.factory)()
    }
}

/// Class name → controller entry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    controllers: HashMap<String, ControllerEntry>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller type under `class_name`
    pub fn register<T: ControllerType>(&mut self, class_name: &str) -> &mut Self {
        self.register_with(
            class_name,
            || Box::new(T::create()) as Box<dyn Controller>,
            T::actions(),
        )
    }

    /// Register a controller from a factory and an explicit action table.
    ///
    /// Registering the same class name twice replaces the earlier entry.
    pub fn register_with<F>(
        &mut self,
        class_name: &str,
        factory: F,
        actions: Vec<ActionDescriptor>,
    ) -> &mut Self
    where
        F: Fn() -> Box<dyn Controller> + Send + Sync + 'static,
    {
        let actions: HashMap<String, ActionDescriptor> =
            actions.into_iter().map(|a| (a.name.clone(), a)).collect();
        let entry = ControllerEntry {
            class_name: class_name.to_string(),
            factory: Arc::new(factory),
            actions,
        };

        if self.controllers.contains_key(class_name) {
            warn!(
                class_name = %class_name,
                "Replaced existing controller registration"
            );
        }
        info!(
            class_name = %class_name,
            actions = entry.actions.len(),
            total_controllers = self.controllers.len() + 1,
            "Controller registered"
        );
        self.controllers.insert(class_name.to_string(), entry);
        self
    }

    #[must_use]
    pub fn get(&self, class_name: &str) -> Option<&ControllerEntry> {
        self.controllers.get(class_name)
    }

    #[must_use]
    pub fn contains(&self, class_name: &str) -> bool {
        self.controllers.contains_key(class_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Registered class names, sorted
    #[must_use]
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
