// Per-category scoring — pattern matches folded into one bounded score.
//
// Each match contributes clamp(match_chars / 50, 0, 1) * weight, so longer
// matched phrases count for more, saturating at 50 characters. The raw sum
// is then normalized by the theoretical maximum (every rule matching once
// at full length: rules * weight) and clamped, so repeated matches cannot
// push a category past 1.0.

use serde::{Deserialize, Serialize};

use super::rules::RiskCategory;

/// Matched-phrase length, in characters, that counts as a full match.
const FULL_MATCH_CHARS: f64 = 50.0;

/// One category's verdict for a single message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    /// Normalized category score in [0, 1].
    pub score: f64,
    /// Every matched phrase in rule order. Empty when nothing matched.
    pub matched_phrases: Vec<String>,
}

/// Score one category against already-normalized text.
pub fn score_category(normalized_text: &str, category: &RiskCategory) -> CategoryResult {
    let mut raw_total = 0.0;
    let mut matched_phrases = Vec::new();

    for rule in &category.rules {
        for phrase in rule.find_matches(normalized_text) {
            let length = phrase.chars().count() as f64;
            raw_total += (length / FULL_MATCH_CHARS).clamp(0.0, 1.0) * category.weight;
            matched_phrases.push(phrase);
        }
    }

    // Theoretical maximum: every rule matching once at full length. A
    // category without rules scores zero instead of dividing by zero.
    let max_possible = category.rules.len() as f64 * category.weight;
    let score = if max_possible > 0.0 {
        (raw_total / max_possible).clamp(0.0, 1.0)
    } else {
        0.0
    };

    CategoryResult {
        category: category.name.clone(),
        score,
        matched_phrases,
    }
}
