// Network sub-scorer — login geography, devices, and social-graph signals.

use std::collections::HashSet;

use chrono::Duration;

use super::detector::FraudThresholds;
use super::snapshot::BehaviorSnapshot;

/// Trailing window for login-location clustering.
const LOCATION_WINDOW_DAYS: i64 = 30;

/// How many trailing sessions are checked for VPN and proxy flags.
const VPN_WINDOW: usize = 10;

/// Fraction of reported connections above which the graph looks bad.
const REPORTED_CONNECTION_RATIO: f64 = 0.5;

/// Score network and graph signals. Returns the clamped sub-score plus
/// the indicators that fired, in evaluation order.
pub fn score_network(
    behavior: &BehaviorSnapshot,
    thresholds: &FraudThresholds,
) -> (f64, Vec<String>) {
    let mut score: f64 = 0.0;
    let mut indicators = Vec::new();

    let window_start = behavior.captured_at - Duration::days(LOCATION_WINDOW_DAYS);

    // Coordinates rounded to three decimals (about 110 m) form the
    // cluster key; sessions without a location are skipped.
    let locations: HashSet<String> = behavior
        .login_sessions
        .iter()
        .filter(|s| s.logged_in_at > window_start)
        .filter_map(|s| s.location)
        .map(|point| format!("{:.3},{:.3}", point.lat, point.lng))
        .collect();
    if locations.len() > thresholds.max_login_locations {
        score += 0.3;
        indicators.push(format!("login locations: {} distinct", locations.len()));
    }

    if behavior.devices.len() > thresholds.max_devices {
        score += 0.25;
        indicators.push(format!("devices in use: {}", behavior.devices.len()));
    }

    let vpn_start = behavior.login_sessions.len().saturating_sub(VPN_WINDOW);
    if behavior.login_sessions[vpn_start..]
        .iter()
        .any(|s| s.is_vpn || s.is_proxy)
    {
        score += 0.2;
        indicators.push("vpn or proxy sessions".to_string());
    }

    if !behavior.connections.is_empty() {
        let reported = behavior
            .connections
            .iter()
            .filter(|c| c.peer_reported)
            .count();
        if reported as f64 > behavior.connections.len() as f64 * REPORTED_CONNECTION_RATIO {
            score += 0.35;
            indicators.push("mostly reported connections".to_string());
        }
    }

    (score.min(1.0), indicators)
}
