// Text canonicalization for rule matching.
//
// Every built-in pattern is written against this normal form: lowercase,
// diacritics stripped, anything outside the word class folded to a single
// space. "¿DÓNDE Vives?" and "donde vives" hit the same rules, so the rules
// themselves never need case-insensitive or accented variants.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize raw message text before rule matching.
///
/// Lowercases, NFKD-decomposes and drops combining marks (á → a, ñ → n),
/// replaces every character outside the word class (alphanumeric or `_`)
/// with a space, then collapses whitespace runs and trims. Always returns
/// a string — empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    let folded: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find every maximal run of `min_run` or more identical characters.
///
/// Returns the run substrings in order of appearance ("holaaaaa" with
/// `min_run = 5` yields `["aaaaa"]`). Regular expressions without
/// backreference support cannot express "the same character repeated",
/// so repeated-character rules go through this scan instead.
pub fn char_runs(text: &str, min_run: usize) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current: Option<(char, usize)> = None;

    for c in text.chars() {
        match current {
            Some((prev, count)) if prev == c => current = Some((prev, count + 1)),
            Some((prev, count)) => {
                if count >= min_run {
                    runs.push(std::iter::repeat(prev).take(count).collect());
                }
                current = Some((c, 1));
            }
            None => current = Some((c, 1)),
        }
    }
    if let Some((prev, count)) = current {
        if count >= min_run {
            runs.push(std::iter::repeat(prev).take(count).collect());
        }
    }

    runs
}
