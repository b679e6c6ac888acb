pub mod manager;
pub mod processor;
pub mod source;

pub use manager::{PipelineOrchestrator, PipelineRun};
pub use processor::CustomerProcessor;
pub use source::{DataSource, Dataset, InMemoryDataSource, StaticDataSource};
