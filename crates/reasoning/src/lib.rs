//! Natural-language reasoning for segment assignments.
//!
//! The explanation text comes from a pluggable [`Explainer`]; confidence and
//! business risk are fixed lookups so the dashboard framing never depends on
//! model output.

pub mod agent;
pub mod error;
pub mod explainer;
pub mod groq;
pub mod prompt;

pub use agent::ReasoningAgent;
pub use error::ReasoningError;
pub use explainer::{Explainer, StaticExplainer};
pub use groq::GroqExplainer;
