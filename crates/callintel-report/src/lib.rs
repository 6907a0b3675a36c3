pub mod emitter;
pub mod history_sink;
pub mod json_file_sink;
pub mod publisher;
pub mod registry;
pub mod sink_trait;

pub use emitter::{ComparisonReport, Recommendation, ReportEmitter, ReportSummary};
pub use history_sink::HistorySink;
pub use json_file_sink::JsonFileSink;
pub use publisher::ReportPublisher;
pub use registry::SinkRegistry;
pub use sink_trait::ReportSink;
