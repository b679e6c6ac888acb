//! Campaign recommender: maps a behavioral segment to a loyalty campaign
//! (type, channel, duration, message) and estimates participation, cost,
//! incremental revenue and ROI for an assumed audience size.

use insight_core::math::{round2, safe_divide};
use insight_core::types::{CampaignProposal, CampaignType, Channel, Segment};
use serde::Serialize;
use tracing::debug;

/// Static campaign playbook entry for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CampaignPlay {
    pub campaign_type: CampaignType,
    pub channel: Channel,
    pub duration_days: u32,
    pub message: &'static str,
    /// Share of the audience expected to take part.
    pub participation_rate: f64,
    /// Expected incremental revenue per participant.
    pub avg_incremental_revenue: f64,
}

impl CampaignPlay {
    /// Playbook lookup. No Activity and Monitor share the informational play.
    pub fn for_segment(segment: Segment) -> Self {
        match segment {
            Segment::DormantAtRisk => CampaignPlay {
                campaign_type: CampaignType::BonusPoints,
                channel: Channel::Sms,
                duration_days: 7,
                message: "We’ve missed you! Here’s a little something to welcome \
                          you back. Enjoy bonus rewards on your next visit.",
                participation_rate: 0.12,
                avg_incremental_revenue: 300.0,
            },
            Segment::PriceSensitiveDisengagers => CampaignPlay {
                campaign_type: CampaignType::ExtraPoints,
                channel: Channel::Push,
                duration_days: 10,
                message: "Great value awaits! Earn extra rewards when you shop \
                          with us this week.",
                participation_rate: 0.25,
                avg_incremental_revenue: 450.0,
            },
            Segment::ReEngaging => CampaignPlay {
                campaign_type: CampaignType::WelcomeBackReward,
                channel: Channel::Email,
                duration_days: 14,
                message: "Welcome back! We’re excited to have you again. \
                          Enjoy a special reward on us.",
                participation_rate: 0.35,
                avg_incremental_revenue: 600.0,
            },
            Segment::StableCore => CampaignPlay {
                campaign_type: CampaignType::AccessPerk,
                channel: Channel::Email,
                duration_days: 14,
                message: "Thanks for being a valued customer! Unlock exclusive \
                          benefits just for you.",
                participation_rate: 0.45,
                avg_incremental_revenue: 800.0,
            },
            Segment::NoActivity | Segment::Monitor => CampaignPlay {
                campaign_type: CampaignType::Informational,
                channel: Channel::Email,
                duration_days: 14,
                message: "Here’s an update on new offers and benefits available \
                          to you.",
                participation_rate: 0.15,
                avg_incremental_revenue: 350.0,
            },
        }
    }
}

/// Reward cost per participant for a campaign type.
pub fn cost_per_participant(campaign_type: CampaignType) -> f64 {
    match campaign_type {
        CampaignType::BonusPoints => 40.0,
        CampaignType::ExtraPoints => 30.0,
        CampaignType::WelcomeBackReward => 50.0,
        CampaignType::AccessPerk => 20.0,
        CampaignType::Informational => 5.0,
    }
}

/// Stateless campaign recommendation over the playbook.
#[derive(Debug, Clone, Default)]
pub struct CampaignRecommender;

impl CampaignRecommender {
    pub fn new() -> Self {
        Self
    }

    /// Recommend a campaign for `segment`, scaled to `audience_size`
    /// customers. Rates and currency figures are rounded to 2 decimals.
    pub fn recommend(&self, segment: Segment, audience_size: u32) -> CampaignProposal {
        let play = CampaignPlay::for_segment(segment);
        let participants = play.participation_rate * audience_size as f64;

        let cost = participants * cost_per_participant(play.campaign_type);
        let revenue = participants * play.avg_incremental_revenue;
        // Zero cost (empty audience) reports ROI 0.
        let roi = safe_divide(revenue - cost, cost);

        metrics::counter!("campaigns.recommended", "type" => play.campaign_type.as_str())
            .increment(1);
        debug!(
            segment = %segment,
            campaign_type = %play.campaign_type,
            audience_size,
            cost,
            revenue,
            roi,
            "Campaign recommended"
        );

        CampaignProposal {
            segment,
            campaign_type: play.campaign_type,
            channel: play.channel,
            duration_days: play.duration_days,
            message: play.message.to_string(),
            estimated_participation_rate: round2(play.participation_rate),
            estimated_cost: round2(cost),
            estimated_revenue: round2(revenue),
            estimated_roi: round2(roi),
        }
    }
}
