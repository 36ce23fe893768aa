// Fraud assessment — four weighted sub-domains folded into one risk score.
//
// Unlike message moderation, aggregation here is a straight weighted sum:
// fraud evidence is cumulative across unrelated signal families, so a
// suspicious profile plus a suspicious network must outrank either alone.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::severity::{Severity, SeverityLadder};

use super::behavior::score_behavior;
use super::content::score_content;
use super::network::score_network;
use super::profile::score_profile;
use super::snapshot::{text_present, BehaviorSnapshot, ProfileSnapshot};

/// Sub-domain weights for the fraud aggregate.
///
/// Behavior carries the most weight: rate anomalies and duplicate blasts
/// are the hardest signals to fake away. The four weights sum to 1.0 so
/// the aggregate stays in [0, 1] without renormalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DomainWeights {
    pub profile: f64,
    pub behavior: f64,
    pub network: f64,
    pub content: f64,
}

impl Default for DomainWeights {
    fn default() -> Self {
        Self {
            profile: 0.25,
            behavior: 0.35,
            network: 0.20,
            content: 0.20,
        }
    }
}

/// Limits that decide when an activity signal counts as anomalous.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FraudThresholds {
    pub max_messages_per_hour: usize,
    pub max_likes_per_hour: usize,
    /// Report counts at or above this fire the report signal.
    pub max_reports: u32,
    /// Profile completion ratio below this is a profile signal.
    pub min_profile_completion: f64,
    pub max_login_locations: usize,
    pub max_devices: usize,
}

impl Default for FraudThresholds {
    fn default() -> Self {
        Self {
            max_messages_per_hour: 50,
            max_likes_per_hour: 100,
            max_reports: 3,
            min_profile_completion: 0.3,
            max_login_locations: 5,
            max_devices: 3,
        }
    }
}

/// The fraud verdict for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAssessment {
    /// Weighted aggregate in [0, 1].
    pub score: f64,
    pub risk_level: Severity,
    /// Operator-facing descriptions of every signal that fired, in
    /// profile, behavior, network, content order.
    pub indicators: Vec<String>,
    pub recommendations: Vec<String>,
    /// Data-availability confidence: how much of the expected input was
    /// actually supplied, not how certain the score is.
    pub confidence: f64,
}

impl FraudAssessment {
    /// Conservative verdict when assessment itself fails.
    pub fn fail_safe() -> Self {
        Self {
            score: 0.5,
            risk_level: Severity::Medium,
            indicators: vec!["error".to_string()],
            recommendations: vec!["Review the account manually".to_string()],
            confidence: 0.1,
        }
    }
}

/// The fraud-scoring engine.
///
/// Weights and thresholds are fixed at construction. All methods take
/// `&self`, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct FraudDetector {
    weights: DomainWeights,
    thresholds: FraudThresholds,
    ladder: SeverityLadder,
}

impl Default for FraudDetector {
    fn default() -> Self {
        Self::new(DomainWeights::default(), FraudThresholds::default())
    }
}

impl FraudDetector {
    pub fn new(weights: DomainWeights, thresholds: FraudThresholds) -> Self {
        Self {
            weights,
            thresholds,
            ladder: SeverityLadder::fraud(),
        }
    }

    /// Assess one account from its snapshots.
    ///
    /// Never fails: missing data lowers confidence or skips signals, and
    /// an unexpected fault reduces to the conservative fail-safe verdict.
    pub fn score_fraud(
        &self,
        profile: &ProfileSnapshot,
        behavior: &BehaviorSnapshot,
    ) -> FraudAssessment {
        match catch_unwind(AssertUnwindSafe(|| {
            self.score_fraud_inner(profile, behavior)
        })) {
            Ok(assessment) => assessment,
            Err(_) => {
                error!("fraud assessment failed, returning fail-safe verdict");
                FraudAssessment::fail_safe()
            }
        }
    }

    /// Assess a batch of accounts. Accounts are independent; this is a
    /// plain map over `score_fraud`.
    pub fn score_fraud_batch(
        &self,
        accounts: &[(ProfileSnapshot, BehaviorSnapshot)],
    ) -> Vec<FraudAssessment> {
        accounts
            .iter()
            .map(|(profile, behavior)| self.score_fraud(profile, behavior))
            .collect()
    }

    fn score_fraud_inner(
        &self,
        profile: &ProfileSnapshot,
        behavior: &BehaviorSnapshot,
    ) -> FraudAssessment {
        let (profile_score, mut indicators) =
            score_profile(profile, self.thresholds.min_profile_completion);
        let (behavior_score, behavior_indicators) = score_behavior(behavior, &self.thresholds);
        let (network_score, network_indicators) = score_network(behavior, &self.thresholds);
        let (content_score, content_indicators) = score_content(profile);

        indicators.extend(behavior_indicators);
        indicators.extend(network_indicators);
        indicators.extend(content_indicators);

        let score = (profile_score * self.weights.profile
            + behavior_score * self.weights.behavior
            + network_score * self.weights.network
            + content_score * self.weights.content)
            .clamp(0.0, 1.0);

        let risk_level = self.ladder.classify(score);
        let recommendations = recommendations_for(risk_level, &indicators);
        let confidence = data_confidence(profile, behavior);

        if risk_level >= Severity::Medium {
            warn!(
                score = format!("{score:.2}"),
                risk = %risk_level,
                indicators = indicators.len(),
                "account flagged for fraud risk"
            );
        } else {
            info!(
                score = format!("{score:.2}"),
                risk = %risk_level,
                confidence = format!("{confidence:.2}"),
                "fraud assessment completed"
            );
        }

        FraudAssessment {
            score,
            risk_level,
            indicators,
            recommendations,
            confidence,
        }
    }
}

/// Fixed recommendation lists per risk tier, plus indicator-driven extras.
fn recommendations_for(risk: Severity, indicators: &[String]) -> Vec<String> {
    let base: &[&str] = match risk {
        Severity::High | Severity::Critical => &[
            "Suspend the account pending review",
            "Manually review all profile data",
            "Require identity verification with official documents",
            "Investigate connections to other reported accounts",
        ],
        Severity::Medium => &[
            "Monitor activity closely",
            "Temporarily limit interactions",
            "Verify profile information",
            "Apply messaging restrictions",
        ],
        Severity::Low => &[
            "Increase supervision",
            "Verify profile photos",
            "Monitor messaging frequency",
            "Verify location and devices",
        ],
        Severity::Minimal => &[
            "Continue routine monitoring",
            "Re-check periodically",
            "Keep alerts active",
            "No action required",
        ],
    };
    let mut recommendations: Vec<String> = base.iter().map(|s| s.to_string()).collect();

    let fired = |needle: &str| indicators.iter().any(|i| i.contains(needle));
    if fired("disposable email") {
        recommendations.push("Request permanent email verification".to_string());
    }
    if fired("report count") {
        recommendations.push("Investigate prior reports".to_string());
    }
    if fired("vpn or proxy") {
        recommendations.push("Require a VPN-free session for verification".to_string());
    }

    recommendations
}

/// Data-availability confidence: the mean, over three buckets, of how much
/// of the expected input was actually supplied.
fn data_confidence(profile: &ProfileSnapshot, behavior: &BehaviorSnapshot) -> f64 {
    let profile_fields = [
        text_present(&profile.email),
        !profile.photos.is_empty(),
        text_present(&profile.bio),
        text_present(&profile.birth_date),
    ];
    let behavior_fields = [
        !behavior.messages.is_empty(),
        !behavior.likes.is_empty(),
        !behavior.login_sessions.is_empty(),
        behavior.reports_received.is_some(),
    ];
    let network_fields = [!behavior.devices.is_empty(), !behavior.connections.is_empty()];

    let bucket = |fields: &[bool]| {
        fields.iter().filter(|&&present| present).count() as f64 / fields.len() as f64
    };

    (bucket(&profile_fields) + bucket(&behavior_fields) + bucket(&network_fields)) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn empty_profile() -> ProfileSnapshot {
        ProfileSnapshot {
            captured_at: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
            email: None,
            display_name: None,
            birth_date: None,
            photos: Vec::new(),
            bio: None,
            location: None,
            interests: Vec::new(),
            occupation: None,
            education: None,
        }
    }

    fn empty_behavior() -> BehaviorSnapshot {
        BehaviorSnapshot {
            captured_at: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
            messages: Vec::new(),
            likes: Vec::new(),
            reports_received: None,
            login_sessions: Vec::new(),
            devices: Vec::new(),
            connections: Vec::new(),
        }
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = DomainWeights::default();
        assert!((w.profile + w.behavior + w.network + w.content - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_snapshots_have_zero_confidence() {
        let confidence = data_confidence(&empty_profile(), &empty_behavior());
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn test_confidence_averages_the_three_buckets() {
        let mut profile = empty_profile();
        profile.email = Some("a@example.com".to_string());
        profile.bio = Some("hola".to_string());
        let mut behavior = empty_behavior();
        behavior.reports_received = Some(0);
        behavior.devices = vec!["d1".to_string()];
        // Buckets: 2/4, 1/4, 1/2 -> mean 0.41666...
        let confidence = data_confidence(&profile, &behavior);
        assert!((confidence - (0.5 + 0.25 + 0.5) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_indicator_triggers_extend_the_recommendations() {
        let indicators = vec![
            "disposable email domain".to_string(),
            "report count: 4".to_string(),
        ];
        let recs = recommendations_for(Severity::Medium, &indicators);
        // 4 base Medium entries plus the two targeted ones.
        assert_eq!(recs.len(), 6);
        assert!(recs.contains(&"Request permanent email verification".to_string()));
        assert!(recs.contains(&"Investigate prior reports".to_string()));
        assert!(!recs.contains(&"Require a VPN-free session for verification".to_string()));
    }

    #[test]
    fn test_every_tier_has_four_base_recommendations() {
        for risk in [
            Severity::Minimal,
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            assert_eq!(recommendations_for(risk, &[]).len(), 4, "{risk}");
        }
    }

    #[test]
    fn test_fail_safe_assessment_lands_in_the_middle() {
        let assessment = FraudAssessment::fail_safe();
        assert_eq!(assessment.score, 0.5);
        assert_eq!(assessment.risk_level, Severity::Medium);
        assert_eq!(assessment.indicators, vec!["error".to_string()]);
        assert!((assessment.confidence - 0.1).abs() < 1e-12);
    }
}
