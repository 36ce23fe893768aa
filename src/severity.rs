// Severity tiers — shared score-to-tier classification.
//
// Both scoring instances (message moderation and fraud risk) reduce a
// continuous [0,1] score to the same ordered tier enum, but through
// different threshold ladders. The ladder is plain data rather than a
// hard-coded if-chain, so the two configurations stay side by side and
// the mapping stays monotonic by construction.

use serde::{Deserialize, Serialize};

/// Ordered risk tier. The derived `Ord` follows declaration order,
/// so `Severity::Minimal < Severity::Critical` holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minimal => "minimal",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ascending (threshold, tier) rungs that turn a [0,1] score into a Severity.
///
/// An exact boundary score classifies into the higher tier. Scores below the
/// lowest rung fall through to the floor tier — including NaN, which fails
/// every comparison.
#[derive(Debug, Clone)]
pub struct SeverityLadder {
    floor: Severity,
    rungs: &'static [(f64, Severity)],
}

impl SeverityLadder {
    /// Message moderation ladder: 0.8 critical / 0.6 high / 0.4 medium / 0.2 low.
    pub fn moderation() -> Self {
        Self {
            floor: Severity::Minimal,
            rungs: &[
                (0.2, Severity::Low),
                (0.4, Severity::Medium),
                (0.6, Severity::High),
                (0.8, Severity::Critical),
            ],
        }
    }

    /// Fraud risk ladder: 0.8 high / 0.6 medium / 0.3 low.
    ///
    /// The rungs differ from moderation because they were tuned against the
    /// weighted-sum aggregation, not max-of-categories. Don't unify them.
    pub fn fraud() -> Self {
        Self {
            floor: Severity::Minimal,
            rungs: &[
                (0.3, Severity::Low),
                (0.6, Severity::Medium),
                (0.8, Severity::High),
            ],
        }
    }

    /// Classify a score into its tier.
    pub fn classify(&self, score: f64) -> Severity {
        for &(threshold, tier) in self.rungs.iter().rev() {
            if score >= threshold {
                return tier;
            }
        }
        self.floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_boundaries_go_to_higher_tier() {
        let ladder = SeverityLadder::moderation();
        assert_eq!(ladder.classify(0.8), Severity::Critical);
        assert_eq!(ladder.classify(0.79), Severity::High);
        assert_eq!(ladder.classify(0.6), Severity::High);
        assert_eq!(ladder.classify(0.59), Severity::Medium);
        assert_eq!(ladder.classify(0.4), Severity::Medium);
        assert_eq!(ladder.classify(0.39), Severity::Low);
        assert_eq!(ladder.classify(0.2), Severity::Low);
        assert_eq!(ladder.classify(0.19), Severity::Minimal);
        assert_eq!(ladder.classify(0.0), Severity::Minimal);
        assert_eq!(ladder.classify(1.0), Severity::Critical);
    }

    #[test]
    fn test_fraud_boundaries() {
        let ladder = SeverityLadder::fraud();
        assert_eq!(ladder.classify(0.8), Severity::High);
        assert_eq!(ladder.classify(0.6), Severity::Medium);
        assert_eq!(ladder.classify(0.3), Severity::Low);
        assert_eq!(ladder.classify(0.29), Severity::Minimal);
        // The fraud ladder never produces Critical
        assert_eq!(ladder.classify(1.0), Severity::High);
    }

    #[test]
    fn test_classification_is_monotonic() {
        let ladder = SeverityLadder::moderation();
        let mut prev = ladder.classify(0.0);
        for step in 1..=100 {
            let tier = ladder.classify(step as f64 / 100.0);
            assert!(tier >= prev, "tier regressed at score {}", step as f64 / 100.0);
            prev = tier;
        }
    }

    #[test]
    fn test_nan_falls_through_to_floor() {
        let ladder = SeverityLadder::moderation();
        assert_eq!(ladder.classify(f64::NAN), Severity::Minimal);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Severity::Minimal < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let back: Severity = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(back, Severity::Medium);
    }
}
