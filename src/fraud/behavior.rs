// Behavior sub-scorer — activity-rate and cadence fraud signals.
//
// Rates are measured against the snapshot's capture time, so the same
// snapshot always produces the same score no matter when it is evaluated.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use super::detector::FraudThresholds;
use super::snapshot::BehaviorSnapshot;

/// Trailing burst window for message and like rates.
const BURST_WINDOW_HOURS: i64 = 1;

/// How many trailing messages feed the duplicate-content ratio.
const DUPLICATE_WINDOW: usize = 20;

/// Duplicate ratio above this marks the account as blasting canned text.
const DUPLICATE_RATIO_LIMIT: f64 = 0.7;

/// Minimum recent messages before cadence is judged at all.
const CADENCE_MIN_MESSAGES: usize = 10;

/// Mean inter-message gap below this many minutes reads as bot-like.
const CADENCE_MIN_MINUTES: f64 = 2.0;

/// Score activity-rate signals. Returns the clamped sub-score plus the
/// indicators that fired, in evaluation order.
pub fn score_behavior(
    behavior: &BehaviorSnapshot,
    thresholds: &FraudThresholds,
) -> (f64, Vec<String>) {
    let mut score: f64 = 0.0;
    let mut indicators = Vec::new();

    let window_start = behavior.captured_at - Duration::hours(BURST_WINDOW_HOURS);

    let recent: Vec<DateTime<Utc>> = behavior
        .messages
        .iter()
        .filter(|m| m.sent_at > window_start)
        .map(|m| m.sent_at)
        .collect();
    if recent.len() > thresholds.max_messages_per_hour {
        score += 0.4;
        indicators.push(format!("message burst: {} in the last hour", recent.len()));
    }

    let recent_likes = behavior
        .likes
        .iter()
        .filter(|l| l.liked_at > window_start)
        .count();
    if recent_likes > thresholds.max_likes_per_hour {
        score += 0.3;
        indicators.push(format!("like burst: {recent_likes} in the last hour"));
    }

    if let Some(reports) = behavior.reports_received {
        if reports >= thresholds.max_reports {
            score += 0.5;
            indicators.push(format!("report count: {reports}"));
        }
    }

    if !behavior.messages.is_empty() {
        let start = behavior.messages.len().saturating_sub(DUPLICATE_WINDOW);
        let tail = &behavior.messages[start..];
        if duplicate_ratio(tail.iter().map(|m| m.content.as_str())) > DUPLICATE_RATIO_LIMIT {
            score += 0.35;
            indicators.push("frequent duplicate messages".to_string());
        }
    }

    if recent.len() >= CADENCE_MIN_MESSAGES {
        if let Some(mean_gap) = mean_gap_minutes(&recent) {
            if mean_gap < CADENCE_MIN_MINUTES {
                score += 0.25;
                indicators.push("bot-like response cadence".to_string());
            }
        }
    }

    (score.min(1.0), indicators)
}

/// 1 - unique/total over the given message texts. Empty input is 0.0.
pub fn duplicate_ratio<'a>(texts: impl Iterator<Item = &'a str>) -> f64 {
    let all: Vec<&str> = texts.collect();
    if all.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = all.iter().copied().collect();
    1.0 - unique.len() as f64 / all.len() as f64
}

/// Mean gap in minutes between consecutive timestamps. Sorts a copy first
/// so unordered input cannot produce negative gaps. None below two items.
fn mean_gap_minutes(times: &[DateTime<Utc>]) -> Option<f64> {
    if times.len() < 2 {
        return None;
    }
    let mut sorted = times.to_vec();
    sorted.sort();
    let total_minutes: f64 = sorted
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / 60.0)
        .sum();
    Some(total_minutes / (sorted.len() - 1) as f64)
}
