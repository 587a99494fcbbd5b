//! Project context handed to controllers that ask for it.
//!
//! Replaces process-wide accessors: the application owns one [`Project`]
//! and passes it explicitly through every dispatch.

use crate::config::FrameworkConfig;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Application-wide context: name, configuration and typed services.
#[derive(Clone)]
pub struct Project {
    name: String,
    config: Arc<FrameworkConfig>,
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("name", &self.name)
            .field("dev", &self.config.dev)
            .field("services", &self.services.len())
            .finish()
    }
}

impl Project {
    pub fn new(name: impl Into<String>, config: Arc<FrameworkConfig>) -> Self {
        Self {
            name: name.into(),
            config,
            services: HashMap::new(),
        }
    }

    /// Register a service; a later service of the same type replaces it
    #[must_use]
    pub fn with_service<T: Any + Send + Sync>(mut self, service: T) -> Self {
        self.services.insert(TypeId::of::<T>(), Arc::new(service));
        self
    }

    #[must_use]
    pub fn service<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|s| Arc::clone(s).downcast::<T>().ok())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.config.dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Mailer(&'static str);

    #[test]
    fn test_typed_services() {
        let project = Project::new("shop", Arc::new(FrameworkConfig::default()))
            .with_service(Mailer("smtp"))
            .with_service(42u32);
        assert_eq!(project.service::<Mailer>().as_deref(), Some(&Mailer("smtp")));
        assert_eq!(project.service::<u32>().as_deref(), Some(&42));
        assert!(project.service::<String>().is_none());
        assert_eq!(project.name(), "shop");
        assert!(!project.is_dev());
    }
}
