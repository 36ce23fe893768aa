// Profile sub-scorer — registration-time fraud signals.
//
// Additive indicator scoring: each signal that fires adds its fixed bump
// and the sum clamps at 1.0. Indicator strings are operator-facing, and
// stable phrases ("disposable email", "report count") double as triggers
// for targeted recommendations downstream.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex_lite::Regex;

use crate::text::char_runs;

use super::snapshot::{text_present, ProfileSnapshot};

/// Plausible account-holder age range; a birth date outside it is a signal.
const AGE_RANGE: std::ops::RangeInclusive<u32> = 18..=80;

/// Display-name length range considered normal, in characters.
const NAME_CHARS: std::ops::RangeInclusive<usize> = 2..=50;

/// Identical-character run length that marks a name as keyboard mash.
const NAME_RUN: usize = 3;

/// Fields counted toward the profile completion ratio.
const COMPLETION_FIELDS: f64 = 5.0;

fn disposable_email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)@(tempmail|10minutemail|mailinator|guerrillamail|throwaway)\.(com|net|org|co\.uk)",
        )
        .expect("disposable email pattern compiles")
    })
}

/// Score registration and profile-shape signals. Returns the clamped
/// sub-score plus the indicators that fired, in evaluation order.
pub fn score_profile(profile: &ProfileSnapshot, min_completion: f64) -> (f64, Vec<String>) {
    let mut score: f64 = 0.0;
    let mut indicators = Vec::new();

    if let Some(email) = &profile.email {
        if disposable_email().is_match(email) {
            score += 0.3;
            indicators.push("disposable email domain".to_string());
        }
    }

    // A missing display name counts as length zero, which is abnormal too.
    let name = profile.display_name.as_deref().unwrap_or("");
    if !NAME_CHARS.contains(&name.chars().count()) {
        score += 0.2;
        indicators.push("display name length out of range".to_string());
    }
    if !char_runs(name, NAME_RUN).is_empty() {
        score += 0.25;
        indicators.push("repeated characters in display name".to_string());
    }

    if let Some(raw) = &profile.birth_date {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(birth) => match profile.captured_at.date_naive().years_since(birth) {
                Some(age) if AGE_RANGE.contains(&age) => {}
                Some(age) => {
                    score += 0.3;
                    indicators.push(format!("implausible age: {age}"));
                }
                // years_since is None when the birth date lies in the future
                None => {
                    score += 0.3;
                    indicators.push("implausible age: birth date in the future".to_string());
                }
            },
            Err(_) => {
                score += 0.2;
                indicators.push("unparseable birth date".to_string());
            }
        }
    }

    if profile.photos.is_empty() {
        score += 0.15;
        indicators.push("no profile photos".to_string());
    }

    let completed = [
        text_present(&profile.bio),
        text_present(&profile.location),
        !profile.interests.is_empty(),
        text_present(&profile.occupation),
        text_present(&profile.education),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();
    if (completed as f64 / COMPLETION_FIELDS) < min_completion {
        score += 0.2;
        indicators.push("sparse profile".to_string());
    }

    (score.min(1.0), indicators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fraud::snapshot::PhotoRef;
    use chrono::{TimeZone, Utc};

    fn base_profile() -> ProfileSnapshot {
        ProfileSnapshot {
            captured_at: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
            email: Some("ana@example.com".to_string()),
            display_name: Some("Ana García".to_string()),
            birth_date: Some("1994-04-12".to_string()),
            photos: vec![PhotoRef {
                hash: Some("h1".to_string()),
            }],
            bio: Some("Me encanta escalar y cocinar platos nuevos.".to_string()),
            location: Some("Madrid".to_string()),
            interests: vec!["escalada".to_string(), "cocina".to_string()],
            occupation: Some("enfermera".to_string()),
            education: Some("universidad".to_string()),
        }
    }

    #[test]
    fn test_complete_profile_scores_zero() {
        let (score, indicators) = score_profile(&base_profile(), 0.3);
        assert_eq!(score, 0.0);
        assert!(indicators.is_empty());
    }

    #[test]
    fn test_disposable_email_fires() {
        let mut profile = base_profile();
        profile.email = Some("x@mailinator.com".to_string());
        let (score, indicators) = score_profile(&profile, 0.3);
        assert!((score - 0.3).abs() < 1e-12);
        assert_eq!(indicators, vec!["disposable email domain".to_string()]);
    }

    #[test]
    fn test_missing_name_counts_as_zero_length() {
        let mut profile = base_profile();
        profile.display_name = None;
        let (score, indicators) = score_profile(&profile, 0.3);
        assert!((score - 0.2).abs() < 1e-12);
        assert_eq!(indicators, vec!["display name length out of range".to_string()]);
    }

    #[test]
    fn test_mashed_name_fires_the_run_check() {
        let mut profile = base_profile();
        profile.display_name = Some("Juaaan".to_string());
        let (score, indicators) = score_profile(&profile, 0.3);
        assert!((score - 0.25).abs() < 1e-12);
        assert_eq!(
            indicators,
            vec!["repeated characters in display name".to_string()]
        );
    }

    #[test]
    fn test_implausible_ages_fire() {
        // Too young at capture time.
        let mut profile = base_profile();
        profile.birth_date = Some("2012-01-01".to_string());
        let (score, indicators) = score_profile(&profile, 0.3);
        assert!((score - 0.3).abs() < 1e-12);
        assert_eq!(indicators, vec!["implausible age: 14".to_string()]);

        // Future birth date.
        profile.birth_date = Some("2030-01-01".to_string());
        let (_, indicators) = score_profile(&profile, 0.3);
        assert_eq!(
            indicators,
            vec!["implausible age: birth date in the future".to_string()]
        );
    }

    #[test]
    fn test_unparseable_birth_date_is_its_own_signal() {
        let mut profile = base_profile();
        profile.birth_date = Some("12/04/1994".to_string());
        let (score, indicators) = score_profile(&profile, 0.3);
        assert!((score - 0.2).abs() < 1e-12);
        assert_eq!(indicators, vec!["unparseable birth date".to_string()]);
    }

    #[test]
    fn test_missing_birth_date_is_not_scored() {
        // Absence lowers confidence elsewhere; it is not a profile signal.
        let mut profile = base_profile();
        profile.birth_date = None;
        let (score, _) = score_profile(&profile, 0.3);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_sparse_profile_stacks_with_missing_photos() {
        let mut profile = base_profile();
        profile.photos = Vec::new();
        profile.bio = None;
        profile.location = None;
        profile.interests = Vec::new();
        profile.occupation = None;
        profile.education = None;
        // 0.15 (no photos) + 0.2 (completion 0/5 below 0.3) = 0.35.
        let (score, indicators) = score_profile(&profile, 0.3);
        assert!((score - 0.35).abs() < 1e-12);
        assert!(indicators.contains(&"no profile photos".to_string()));
        assert!(indicators.contains(&"sparse profile".to_string()));
    }

    #[test]
    fn test_age_is_measured_against_capture_time() {
        // Born 2008-07-01: 17 at a 2026-06-01 capture, 18 one year later.
        let mut profile = base_profile();
        profile.birth_date = Some("2008-07-01".to_string());
        let (score, _) = score_profile(&profile, 0.3);
        assert!((score - 0.3).abs() < 1e-12);

        profile.captured_at = Utc.with_ymd_and_hms(2027, 6, 1, 12, 0, 0).unwrap();
        let (score, _) = score_profile(&profile, 0.3);
        assert!(score < 0.3);
    }
}
