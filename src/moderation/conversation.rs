// Conversation analysis — the per-message scorer folded over a sequence.
//
// Each item is scored with context built from the verdicts of the items
// before it, never after, so temporal causality is structural. On top of
// the fold, three cross-item detectors look for repetition, aggressive
// escalation, and personal-information solicitation.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::severity::Severity;
use crate::text::normalize;

use super::context::{ConversationContext, PriorMessage, RelationshipFlags};
use super::moderator::{MessageModerator, ModerationResult};

/// Cross-item detectors need at least this many items to say anything.
const MIN_ITEMS_FOR_PATTERNS: usize = 3;

/// Unique-content ratio below this marks the conversation repetitive.
const REPETITIVE_UNIQUE_RATIO: f64 = 0.7;

/// One conversation item as supplied by the caller, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationItem {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub relationship: RelationshipFlags,
}

/// A single item's verdict inside a conversation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageVerdict {
    pub message_id: String,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub result: ModerationResult,
}

/// Cross-item patterns detected over the whole sequence.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConversationPatterns {
    /// The unique-content ratio fell below 0.7.
    pub repetitive_messages: bool,
    /// An adjacent unsafe pair ending at High or Critical severity.
    pub aggressive_escalation: bool,
    /// Some item solicits personal information (address, phone, photos).
    pub personal_info_requests: bool,
}

impl ConversationPatterns {
    pub fn any(&self) -> bool {
        self.repetitive_messages || self.aggressive_escalation || self.personal_info_requests
    }
}

/// The verdict for a whole conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResult {
    pub overall_safe: bool,
    /// 1.0 when any item was unsafe, 0.0 otherwise.
    pub conversation_risk: f64,
    /// Per-item verdicts in conversation order.
    pub messages: Vec<MessageVerdict>,
    pub patterns: ConversationPatterns,
}

impl ConversationResult {
    /// Conservative result when conversation analysis itself fails.
    pub fn fail_safe() -> Self {
        Self {
            overall_safe: false,
            conversation_risk: 1.0,
            messages: Vec::new(),
            patterns: ConversationPatterns::default(),
        }
    }
}

impl MessageModerator {
    /// Analyze an ordered conversation.
    ///
    /// Items are folded in supplied order. Each item's context carries the
    /// verdicts of strictly earlier items, so changing a later item can
    /// never change an earlier verdict.
    pub fn score_conversation(
        &self,
        items: &[ConversationItem],
        user_id: &str,
    ) -> ConversationResult {
        match catch_unwind(AssertUnwindSafe(|| {
            self.score_conversation_inner(items, user_id)
        })) {
            Ok(result) => result,
            Err(_) => {
                error!(user = %user_id, "conversation analysis failed, returning fail-safe result");
                ConversationResult::fail_safe()
            }
        }
    }

    fn score_conversation_inner(
        &self,
        items: &[ConversationItem],
        user_id: &str,
    ) -> ConversationResult {
        let mut prior: Vec<PriorMessage> = Vec::with_capacity(items.len());
        let mut messages: Vec<MessageVerdict> = Vec::with_capacity(items.len());

        for item in items {
            let context = ConversationContext {
                prior_messages: prior.clone(),
                relationship: item.relationship,
                timestamp: item.timestamp,
            };

            // Per-item fail-safe: one faulting item must not take down the
            // rest of the fold.
            let result = match catch_unwind(AssertUnwindSafe(|| {
                self.score_message_inner(&item.content, Some(&context))
            })) {
                Ok(result) => result,
                Err(_) => {
                    error!(user = %user_id, message = %item.id, "item scoring failed inside conversation");
                    ModerationResult::fail_safe()
                }
            };

            prior.push(PriorMessage {
                flagged: !result.is_safe,
            });
            messages.push(MessageVerdict {
                message_id: item.id.clone(),
                timestamp: item.timestamp,
                result,
            });
        }

        let any_unsafe = messages.iter().any(|m| !m.result.is_safe);
        let conversation_risk = if any_unsafe { 1.0 } else { 0.0 };
        let overall_safe = conversation_risk < 0.5;

        let patterns = detect_patterns(items, &messages);
        if patterns.any() {
            warn!(
                user = %user_id,
                repetitive = patterns.repetitive_messages,
                escalation = patterns.aggressive_escalation,
                personal_info = patterns.personal_info_requests,
                "conversation patterns detected"
            );
        }
        info!(
            user = %user_id,
            items = items.len(),
            safe = overall_safe,
            "conversation analyzed"
        );

        ConversationResult {
            overall_safe,
            conversation_risk,
            messages,
            patterns,
        }
    }
}

/// Run the cross-item detectors over items and their fold verdicts.
/// Fewer than three items is not enough signal; everything stays false.
fn detect_patterns(items: &[ConversationItem], verdicts: &[MessageVerdict]) -> ConversationPatterns {
    let mut patterns = ConversationPatterns::default();
    if items.len() < MIN_ITEMS_FOR_PATTERNS {
        return patterns;
    }

    // Repetition: how much of the conversation is distinct content?
    let unique: HashSet<String> = items.iter().map(|i| i.content.to_lowercase()).collect();
    if (unique.len() as f64) < items.len() as f64 * REPETITIVE_UNIQUE_RATIO {
        patterns.repetitive_messages = true;
    }

    // Escalation: two unsafe verdicts in a row with the later one at High
    // or worse. Reuses the fold's verdicts, context included.
    patterns.aggressive_escalation = verdicts.windows(2).any(|pair| {
        !pair[0].result.is_safe
            && !pair[1].result.is_safe
            && pair[1].result.severity >= Severity::High
    });

    // Solicitation: any item asking for personal details.
    patterns.personal_info_requests = items.iter().any(|item| {
        let normalized = normalize(&item.content);
        solicitation_patterns()
            .iter()
            .any(|pattern| pattern.is_match(&normalized))
    });

    patterns
}

/// Fixed solicitation patterns, written for normalized text.
fn solicitation_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"\bdonde vives\b",
            r"\bcual es tu (nombre|telefono|direccion)\b",
            r"\b(mandame|enviame|pasame) (tu|una) (foto|numero|ubicacion|direccion)\b",
            r"\ben que (calle|barrio|zona) (vives|estas)\b",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("solicitation pattern compiles"))
        .collect()
    })
}
