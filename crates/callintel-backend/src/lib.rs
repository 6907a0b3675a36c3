pub mod backend_trait;
pub mod invoker;
pub mod lifecycle;
pub mod ollama;
pub mod reasoning;
pub mod registry;
pub mod scripted;

pub use backend_trait::ModelBackend;
pub use invoker::ModelInvoker;
pub use lifecycle::{ModelLifecycle, ModelState};
pub use ollama::OllamaBackend;
pub use reasoning::ReasoningBackend;
pub use registry::BackendRegistry;
pub use scripted::ScriptedBackend;
