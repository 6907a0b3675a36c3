pub mod extractor;
pub mod heuristic;
pub mod payload;
pub mod validate;

pub use extractor::StructuredExtractor;
pub use heuristic::{FallbackStrategy, KeywordHeuristic};
