// Message moderation engine — one message in, one verdict out.
//
// Pipeline: normalize, score every category, take the maximum category
// score, add the context modifier, clamp, classify. Max-of-categories is
// deliberate: one severe category must dominate no matter how mild the
// rest of the message is.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::severity::{Severity, SeverityLadder};
use crate::text::normalize;

use super::category::{score_category, CategoryResult};
use super::context::{context_modifier, ConversationContext};
use super::rules::RuleSet;
use super::suggest;

/// Categories scoring above this are reported as relevant.
const RELEVANT_CATEGORY_THRESHOLD: f64 = 0.3;

/// Final scores above this trigger an alternative suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.5;

/// Evidence phrases kept in a verdict.
const MAX_EVIDENCE_PHRASES: usize = 5;

/// The verdict for a single message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    /// Final aggregate score in [0, 1].
    pub score: f64,
    pub severity: Severity,
    /// Deliverable (possibly logged): the final score sits below the
    /// Medium rung.
    pub is_safe: bool,
    /// Names of categories whose normalized score exceeded 0.3.
    pub categories: Vec<String>,
    pub confidence: f64,
    /// Evidence phrases, capped at five across all categories.
    pub flagged_phrases: Vec<String>,
    pub recommendation: String,
    pub alternative_suggestion: Option<String>,
}

impl ModerationResult {
    /// Conservative verdict returned when scoring itself fails: flag for
    /// review rather than silently letting the message through.
    pub fn fail_safe() -> Self {
        Self {
            score: 0.5,
            severity: Severity::Medium,
            is_safe: false,
            categories: vec!["error".to_string()],
            confidence: 0.1,
            flagged_phrases: Vec::new(),
            recommendation: suggest::FAIL_SAFE_RECOMMENDATION.to_string(),
            alternative_suggestion: None,
        }
    }

    /// Permissive verdict for empty or whitespace-only messages.
    fn empty_message() -> Self {
        Self {
            score: 0.0,
            severity: Severity::Low,
            is_safe: true,
            categories: Vec::new(),
            confidence: 1.0,
            flagged_phrases: Vec::new(),
            recommendation: suggest::EMPTY_MESSAGE_RECOMMENDATION.to_string(),
            alternative_suggestion: None,
        }
    }
}

/// The message-moderation engine.
///
/// Holds the validated rule set and the moderation severity ladder. All
/// methods take `&self`, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct MessageModerator {
    rules: RuleSet,
    ladder: SeverityLadder,
}

impl Default for MessageModerator {
    /// A moderator over the built-in Spanish rule set.
    fn default() -> Self {
        Self::new(RuleSet::builtin())
    }
}

impl MessageModerator {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            ladder: SeverityLadder::moderation(),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Score a single message.
    ///
    /// Never fails: empty input short-circuits to a permissive verdict,
    /// and an unexpected fault inside scoring reduces to the conservative
    /// fail-safe verdict instead of propagating.
    pub fn score_message(
        &self,
        text: &str,
        sender_id: &str,
        receiver_id: &str,
        context: Option<&ConversationContext>,
    ) -> ModerationResult {
        match catch_unwind(AssertUnwindSafe(|| self.score_message_inner(text, context))) {
            Ok(result) => {
                if result.is_safe {
                    info!(
                        sender = %sender_id,
                        receiver = %receiver_id,
                        score = format!("{:.2}", result.score),
                        severity = %result.severity,
                        "message scored"
                    );
                } else {
                    warn!(
                        sender = %sender_id,
                        receiver = %receiver_id,
                        score = format!("{:.2}", result.score),
                        severity = %result.severity,
                        categories = ?result.categories,
                        "message flagged"
                    );
                }
                result
            }
            Err(_) => {
                error!(sender = %sender_id, "message scoring failed, returning fail-safe verdict");
                ModerationResult::fail_safe()
            }
        }
    }

    pub(super) fn score_message_inner(
        &self,
        text: &str,
        context: Option<&ConversationContext>,
    ) -> ModerationResult {
        if text.trim().is_empty() {
            return ModerationResult::empty_message();
        }

        let normalized = normalize(text);
        let results: Vec<CategoryResult> = self
            .rules
            .categories()
            .iter()
            .map(|category| score_category(&normalized, category))
            .collect();

        let peak = results.iter().map(|r| r.score).fold(0.0, f64::max);
        let modifier = context.map(context_modifier).unwrap_or(0.0);
        let score = (peak + modifier).clamp(0.0, 1.0);

        let severity = self.ladder.classify(score);
        let is_safe = severity < Severity::Medium;

        let categories: Vec<String> = results
            .iter()
            .filter(|r| r.score > RELEVANT_CATEGORY_THRESHOLD)
            .map(|r| r.category.clone())
            .collect();

        let mut flagged_phrases: Vec<String> = results
            .into_iter()
            .flat_map(|r| r.matched_phrases)
            .collect();
        flagged_phrases.truncate(MAX_EVIDENCE_PHRASES);

        let alternative_suggestion = if score > SUGGESTION_THRESHOLD {
            suggest::suggest_alternative(text, &flagged_phrases)
        } else {
            None
        };

        // Confidence tracks the score: strong matches are more certain
        // calls than borderline ones.
        let confidence = (score + 0.2).clamp(0.0, 1.0);

        ModerationResult {
            score,
            severity,
            is_safe,
            categories,
            confidence,
            flagged_phrases,
            recommendation: suggest::recommendation_for(severity).to_string(),
            alternative_suggestion,
        }
    }
}
