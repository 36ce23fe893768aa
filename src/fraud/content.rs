// Content sub-scorer — profile text and photo fraud signals.
//
// Bio checks only run when a bio exists: a missing bio is a completeness
// signal for the profile scorer, not a content signal.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex_lite::Regex;

use super::snapshot::ProfileSnapshot;

/// Bio length range considered normal, in characters.
const BIO_CHARS: std::ops::RangeInclusive<usize> = 10..=500;

/// Interest keywords that say nothing in particular about a person.
const GENERIC_INTERESTS: &[&str] = &["music", "movies", "travel", "food", "sports"];

/// Fraction of unique photo hashes below which the gallery looks stuffed.
const UNIQUE_PHOTO_RATIO: f64 = 0.5;

fn generic_bio() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(looking for|seeking|want to meet|nice person|good heart)")
            .expect("generic bio pattern compiles")
    })
}

fn bio_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(http|www|\.com|\.net)").expect("bio link pattern compiles")
    })
}

/// Score profile-content signals. Returns the clamped sub-score plus the
/// indicators that fired, in evaluation order.
pub fn score_content(profile: &ProfileSnapshot) -> (f64, Vec<String>) {
    let mut score: f64 = 0.0;
    let mut indicators = Vec::new();

    if let Some(bio) = profile.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        if generic_bio().is_match(bio) {
            score += 0.2;
            indicators.push("generic bio phrasing".to_string());
        }
        if bio_link().is_match(bio) {
            score += 0.15;
            indicators.push("link in bio".to_string());
        }
        if !BIO_CHARS.contains(&bio.chars().count()) {
            score += 0.1;
            indicators.push("bio length out of range".to_string());
        }
    }

    if !profile.interests.is_empty() {
        let generic = profile
            .interests
            .iter()
            .filter(|interest| {
                let lower = interest.to_lowercase();
                GENERIC_INTERESTS.iter().any(|g| lower.contains(g))
            })
            .count();
        if generic == profile.interests.len() {
            score += 0.15;
            indicators.push("only generic interests".to_string());
        }
    }

    if !profile.photos.is_empty() {
        // Missing hashes collapse into one bucket, which is the right
        // bias: a gallery nobody hashed should not look diverse.
        let unique: HashSet<&str> = profile
            .photos
            .iter()
            .map(|p| p.hash.as_deref().unwrap_or(""))
            .collect();
        if (unique.len() as f64) < profile.photos.len() as f64 * UNIQUE_PHOTO_RATIO {
            score += 0.3;
            indicators.push("near-duplicate photos".to_string());
        }
    }

    (score.min(1.0), indicators)
}
