use crate::backend_trait::ModelBackend;
use callintel_core::BackendError;
use std::collections::HashMap;

/// Plugin name to constructor. `[[backend]].plugin` is resolved here.
pub struct BackendRegistry {
    factories: HashMap<String, fn() -> Box<dyn ModelBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("ollama", || Box::new(crate::ollama::OllamaBackend::new()));
        registry.register("reasoning", || {
            Box::new(crate::reasoning::ReasoningBackend::new())
        });
        registry.register("scripted", || Box::new(crate::scripted::ScriptedBackend::default()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn ModelBackend>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn ModelBackend>, BackendError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| BackendError::PluginNotFound(name.to_string()))
    }

    pub fn list_plugins(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
