use crate::sink_trait::ReportSink;
use callintel_core::ReportError;
use std::collections::HashMap;

pub struct SinkRegistry {
    factories: HashMap<String, fn() -> Box<dyn ReportSink>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("json_file", || {
            Box::new(crate::json_file_sink::JsonFileSink::new())
        });
        registry.register("history", || Box::new(crate::history_sink::HistorySink::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn ReportSink>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn ReportSink>, ReportError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| ReportError::NotFound(name.to_string()))
    }

    pub fn list_sinks(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_builtin_sinks() {
        assert_eq!(SinkRegistry::new().list_sinks(), vec!["history", "json_file"]);
    }

    #[test]
    fn test_registry_create_unknown_returns_error() {
        match SinkRegistry::new().create("s3") {
            Err(ReportError::NotFound(name)) => assert_eq!(name, "s3"),
            _ => panic!("expected NotFound error"),
        }
    }

    #[test]
    fn test_registry_create_returns_correct_name() {
        let registry = SinkRegistry::new();
        assert_eq!(registry.create("history").unwrap().name(), "history");
        assert_eq!(registry.create("json_file").unwrap().name(), "json_file");
    }
}
