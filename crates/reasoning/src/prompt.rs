//! Prompt text for the explanation model.

use insight_core::types::{Segment, SignalSet};

pub const SYSTEM_PROMPT: &str = "You are a senior marketing intelligence analyst. \
You explain customer behavior and business risk clearly, \
without inferring sensitive personal attributes.";

/// Render signals for the prompt body; no-activity customers show `{}`.
pub fn render_signals(signals: &SignalSet) -> String {
    serde_json::to_string_pretty(signals).unwrap_or_else(|_| "{}".to_string())
}

/// User prompt asking for the segment rationale and the risk of inaction.
pub fn build_user_prompt(segment: Segment, signals: &SignalSet, domain: &str) -> String {
    format!(
        "You are a senior marketing intelligence analyst working on a loyalty platform.\n\
         \n\
         Domain: {domain}\n\
         \n\
         Customer Segment: {segment}\n\
         \n\
         Observed behavioral signals:\n\
         {signals}\n\
         \n\
         Your task:\n\
         1. Clearly explain WHY the customer is classified into this segment.\n\
         2. Describe the BUSINESS RISK if no action is taken.\n\
         3. Do NOT infer sensitive personal attributes.\n\
         4. Keep the explanation concise, professional, and suitable\n   \
         for a Marketing Manager dashboard.\n",
        signals = render_signals(signals),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::types::BehaviorSignals;

    #[test]
    fn test_prompt_names_domain_and_segment() {
        let signals = SignalSet::from(BehaviorSignals::placeholder("refuel_frequency"));
        let prompt = build_user_prompt(Segment::Monitor, &signals, "oil");
        assert!(prompt.contains("Domain: oil\n"));
        assert!(prompt.contains("Customer Segment: Monitor\n"));
        assert!(prompt.contains("\"velocity_unit\": \"refuel_frequency\""));
        assert!(prompt.contains("\n   for a Marketing Manager dashboard."));
    }

    #[test]
    fn test_empty_signals_render_as_braces() {
        assert_eq!(render_signals(&SignalSet::empty()), "{}");
    }
}
