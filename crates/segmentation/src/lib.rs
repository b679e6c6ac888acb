//! Behavioral segmentation: signal extraction over baseline/recent
//! transaction windows and an ordered rule list mapping signals to segments.

pub mod builder;
pub mod engine;
pub mod predicates;
pub mod signals;

pub use builder::SegmentRuleBuilder;
pub use engine::{BehaviorAnalysis, SegmentationEngine};
pub use signals::{classify_quality, extract, Extraction, WindowSplit};
