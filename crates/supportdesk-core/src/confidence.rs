//! Answer confidence: derivation from citation scores and tier classification
//!
//! Every surface goes through [`derive_confidence`], so an answer with no
//! supporting context gets the same value on the chat screen and in the
//! agent console.

use crate::model::Citation;

/// Confidence assigned when there is no context to average over.
///
/// A heuristic placeholder, not a calibrated estimate.
pub const EMPTY_CONTEXT_CONFIDENCE: f64 = 0.5;

/// Mean relevance score of the citations, or [`EMPTY_CONTEXT_CONFIDENCE`] for none
pub fn derive_confidence(citations: &[Citation]) -> f64 {
    if citations.is_empty() {
        return EMPTY_CONTEXT_CONFIDENCE;
    }

    let sum: f64 = citations.iter().map(|c| c.score).sum();
    clamp(sum / citations.len() as f64)
}

/// Force a confidence into [0, 1]; NaN and infinities fall back to the empty default
pub fn clamp(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        EMPTY_CONTEXT_CONFIDENCE
    }
}

/// Rounded percentage used both for display and for tier boundaries
pub fn percentage(confidence: f64) -> i64 {
    (confidence * 100.0).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f64) -> Self {
        let pct = percentage(confidence);
        if pct >= 80 {
            ConfidenceTier::High
        } else if pct >= 50 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "Low Confidence",
            ConfidenceTier::Medium => "Medium Confidence",
            ConfidenceTier::High => "High Confidence",
        }
    }
}

/// Everything a view needs to draw a confidence badge
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBadge {
    pub tier: ConfidenceTier,
    pub percentage: i64,
}

impl ConfidenceBadge {
    pub fn new(confidence: f64) -> Self {
        let confidence = clamp(confidence);
        Self {
            tier: ConfidenceTier::from_confidence(confidence),
            percentage: percentage(confidence),
        }
    }

    pub fn tooltip(&self) -> String {
        format!(
            "{} - Answer based on {}% relevant context",
            self.tier.label(),
            self.percentage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[f64]) -> Vec<Citation> {
        values
            .iter()
            .map(|s| Citation::new("doc.md", "", *s))
            .collect()
    }

    #[test]
    fn test_tier_table() {
        let cases = [
            (0.0, ConfidenceTier::Low),
            (0.25, ConfidenceTier::Low),
            (0.49, ConfidenceTier::Low),
            (0.5, ConfidenceTier::Medium),
            (0.65, ConfidenceTier::Medium),
            (0.79, ConfidenceTier::Medium),
            (0.8, ConfidenceTier::High),
            (0.95, ConfidenceTier::High),
            (1.0, ConfidenceTier::High),
        ];
        for (confidence, expected) in cases {
            assert_eq!(
                ConfidenceTier::from_confidence(confidence),
                expected,
                "confidence {}",
                confidence
            );
        }
    }

    #[test]
    fn test_tier_uses_rounded_percentage() {
        // 0.495 rounds to 50%, 0.795 rounds to 80%
        assert_eq!(ConfidenceTier::from_confidence(0.4951), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_confidence(0.7951), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_confidence(0.494), ConfidenceTier::Low);
    }

    #[test]
    fn test_mean_of_scores() {
        assert_eq!(derive_confidence(&scores(&[0.9, 0.7])), 0.8);
        assert_eq!(derive_confidence(&scores(&[0.95])), 0.95);
    }

    #[test]
    fn test_empty_context_defaults_to_half() {
        assert_eq!(derive_confidence(&[]), EMPTY_CONTEXT_CONFIDENCE);
        assert_eq!(derive_confidence(&[]), 0.5);
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        assert_eq!(derive_confidence(&scores(&[1.5, 1.5])), 1.0);
        assert_eq!(derive_confidence(&scores(&[-0.4])), 0.0);
        assert_eq!(clamp(f64::NAN), EMPTY_CONTEXT_CONFIDENCE);
    }

    #[test]
    fn test_badge_tooltip() {
        let badge = ConfidenceBadge::new(0.95);
        assert_eq!(badge.tier, ConfidenceTier::High);
        assert_eq!(badge.percentage, 95);
        assert_eq!(
            badge.tooltip(),
            "High Confidence - Answer based on 95% relevant context"
        );
    }
}
