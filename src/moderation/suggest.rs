// Recommendations and alternative suggestions.
//
// Recommendations are operator-facing strings keyed on severity alone. The
// alternative suggestion is user-facing: a softened rewrite of the original
// Spanish text, produced only for clearly problematic messages.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::severity::Severity;

/// Operator recommendation for a moderation verdict.
pub fn recommendation_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "BLOCK: extremely inappropriate content, immediate review required",
        Severity::High => "REJECT: highly inappropriate content, do not deliver",
        Severity::Medium => "REVIEW: potentially problematic content, consider an edit",
        Severity::Low => "WARN: mildly problematic content, keep monitoring",
        Severity::Minimal => "APPROVE: safe content, deliver normally",
    }
}

/// Recommendation for the empty-message short-circuit.
pub const EMPTY_MESSAGE_RECOMMENDATION: &str = "Empty message, nothing to moderate";

/// Recommendation attached to the fail-safe verdict.
pub const FAIL_SAFE_RECOMMENDATION: &str = "Moderation failed, route to manual review";

/// Offered when the rewrite guts the message: at that point the text was
/// mostly problematic material, so propose a fresh start instead.
pub const GENERIC_STARTER: &str = "¿Te gustaría hablar de tus intereses o aficiones?";

/// Word-for-word softening substitutions, applied to the original text.
/// Keys are unaccented (matched case-insensitively); values keep their
/// Spanish accents.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("odio", "disgusto"),
    ("maldito", "problemático"),
    ("mueren", "desaparecen"),
    ("matar", "eliminar"),
    ("sexo", "intimidad"),
    ("follar", "estar juntos"),
    ("desnudo", "cómodo"),
    ("quitarte la ropa", "vernos"),
    ("acosar", "contactar"),
    ("molestar", "incomodar"),
    ("perseguir", "seguir"),
];

fn substitutions() -> &'static [(Regex, &'static str)] {
    static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        SUBSTITUTIONS
            .iter()
            .map(|&(phrase, replacement)| {
                let regex = Regex::new(&format!(r"(?i)\b{phrase}\b"))
                    .expect("substitution pattern compiles");
                (regex, replacement)
            })
            .collect()
    })
}

/// Rewrite a flagged message into a softer alternative.
///
/// Returns None when there is nothing to suggest: no evidence phrases, or
/// the substitutions left the text unchanged. A rewrite that shrinks the
/// text below half its original length means the message was mostly
/// problematic material, and the generic starter is returned instead.
pub fn suggest_alternative(original: &str, flagged_phrases: &[String]) -> Option<String> {
    if flagged_phrases.is_empty() {
        return None;
    }

    let mut alternative = original.to_string();
    for (regex, replacement) in substitutions() {
        alternative = regex.replace_all(&alternative, *replacement).into_owned();
    }

    let original_chars = original.chars().count() as f64;
    let edited_chars = alternative.chars().count() as f64;
    if edited_chars < original_chars * 0.5 {
        return Some(GENERIC_STARTER.to_string());
    }

    if alternative != original {
        Some(alternative)
    } else {
        None
    }
}
