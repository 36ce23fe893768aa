// Conversation context — the non-lexical signals behind the score adjustment.
//
// The modifier is additive and hard-capped at 0.5 so context alone can
// never carry a clean message all the way to the top of the scale.

use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

/// Hard cap on the additive context modifier.
pub const MAX_CONTEXT_MODIFIER: f64 = 0.5;

/// How many trailing prior items the flagged-history ratio looks at.
const HISTORY_WINDOW: usize = 10;

/// Hours considered ordinary messaging time; outside them is a signal.
const DAYTIME_HOURS: std::ops::RangeInclusive<u32> = 6..=23;

/// Relationship state between sender and receiver.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipFlags {
    /// First contact between the two users.
    pub is_new_contact: bool,
    /// The receiver has blocked this sender before.
    pub has_blocked_before: bool,
}

/// A prior item's verdict, as far as context cares about it.
#[derive(Debug, Clone, Copy)]
pub struct PriorMessage {
    pub flagged: bool,
}

/// Everything the context modifier consumes. Built by the caller or by the
/// conversation fold; scoring never mutates it.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    /// Prior items, oldest first.
    pub prior_messages: Vec<PriorMessage>,
    pub relationship: RelationshipFlags,
    /// Message timestamp in the sender's local offset, when known.
    pub timestamp: Option<DateTime<FixedOffset>>,
}

/// Compute the additive context adjustment, capped to [0, 0.5].
pub fn context_modifier(ctx: &ConversationContext) -> f64 {
    let mut modifier: f64 = 0.0;

    // Flagged history: at least half of the recent window was flagged.
    if !ctx.prior_messages.is_empty() {
        let start = ctx.prior_messages.len().saturating_sub(HISTORY_WINDOW);
        let window = &ctx.prior_messages[start..];
        let flagged = window.iter().filter(|m| m.flagged).count();
        if flagged as f64 / window.len() as f64 >= 0.5 {
            modifier += 0.2;
        }
    }

    if ctx.relationship.is_new_contact {
        modifier += 0.1;
    }
    if ctx.relationship.has_blocked_before {
        modifier += 0.3;
    }

    // Late-night messages carry a mild extra suspicion.
    if let Some(ts) = ctx.timestamp {
        if !DAYTIME_HOURS.contains(&ts.hour()) {
            modifier += 0.1;
        }
    }

    modifier.clamp(0.0, MAX_CONTEXT_MODIFIER)
}
