pub mod aggregator;
pub mod orchestrator;
pub mod pipeline;
pub mod priority;

pub use aggregator::{Aggregator, Section};
pub use orchestrator::MultiProjectOrchestrator;
pub use pipeline::{Failure, FailureKind, GeneratorPipeline};
pub use priority::ProjectPriority;
