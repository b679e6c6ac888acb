//! Loyalty campaign recommendation and economics estimation.

pub mod engine;

pub use engine::{CampaignPlay, CampaignRecommender};
