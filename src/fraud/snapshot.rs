// Snapshot types — the caller-supplied inputs to fraud scoring.
//
// The engine never fetches anything. Profile and behavior data arrive as
// immutable snapshots, each stamped with its capture time, so trailing
// windows and ages are computed without ever reading a clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account profile data as captured at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// When this snapshot was taken. Ages are measured against this.
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Raw birth date string, parsed as `YYYY-MM-DD` during scoring. An
    /// unparseable value is itself a fraud signal, not an input error.
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
}

/// A profile photo reference with its content hash, when computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRef {
    #[serde(default)]
    pub hash: Option<String>,
}

/// Account activity as captured at one instant. Event lists arrive oldest
/// first, though scoring sorts where order matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorSnapshot {
    /// When this snapshot was taken. Trailing windows end here.
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
    #[serde(default)]
    pub likes: Vec<LikeRecord>,
    /// Lifetime count of reports received, None when unknown. Unknown
    /// also lowers confidence.
    #[serde(default)]
    pub reports_received: Option<u32>,
    #[serde(default)]
    pub login_sessions: Vec<LoginSession>,
    /// Distinct device identifiers seen on the account.
    #[serde(default)]
    pub devices: Vec<String>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeRecord {
    pub liked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoginSession {
    pub logged_in_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub is_vpn: bool,
    #[serde(default)]
    pub is_proxy: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A social connection and whether the peer account has been reported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectionRecord {
    #[serde(default)]
    pub peer_reported: bool,
}

/// Non-blank text check shared by completion and confidence accounting.
pub(crate) fn text_present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}
