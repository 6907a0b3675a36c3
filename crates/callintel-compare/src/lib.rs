pub mod batch;
pub mod engine;
pub mod scoring;

pub use batch::BatchRunner;
pub use engine::ComparisonEngine;
pub use scoring::{BackendOutcome, Scorer};
