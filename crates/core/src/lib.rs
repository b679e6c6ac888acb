pub mod config;
pub mod domain;
pub mod error;
pub mod math;
pub mod types;

pub use config::AppConfig;
pub use domain::{DomainProfile, DomainRegistry, QualityTier};
pub use error::{InsightError, InsightResult};
