// Risk category rule sets — the data the moderation engine runs on.
//
// A rule set is validated once at construction and immutable afterwards.
// All patterns are written against normalized text (see crate::text):
// lowercase, unaccented, punctuation stripped, single spaces.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use regex_lite::Regex;
use serde::Deserialize;

use crate::text::char_runs;

/// A single matcher inside a risk category.
#[derive(Debug, Clone)]
pub enum PatternRule {
    /// A compiled regular expression, matched non-overlapping.
    Lexical(Regex),
    /// Matches every maximal run of `min_run` or more identical characters.
    /// Covers what a backreference pattern like `(.)\1{4,}` would express.
    RepeatedChars { min_run: usize },
}

impl PatternRule {
    /// Compile a lexical rule from its pattern source.
    pub fn lexical(pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).with_context(|| format!("invalid rule pattern: {pattern}"))?;
        Ok(PatternRule::Lexical(regex))
    }

    /// All non-overlapping matches of this rule in `text`.
    pub fn find_matches(&self, text: &str) -> Vec<String> {
        match self {
            PatternRule::Lexical(regex) => regex
                .find_iter(text)
                .map(|m| m.as_str().trim().to_string())
                .collect(),
            PatternRule::RepeatedChars { min_run } => char_runs(text, *min_run),
        }
    }
}

/// A named axis of risk with its own weight and pattern rules.
#[derive(Debug, Clone)]
pub struct RiskCategory {
    pub name: String,
    /// Category weight in (0, 1]. Cancels out of the normalized category
    /// score but still documents relative severity and orders the table.
    pub weight: f64,
    pub rules: Vec<PatternRule>,
}

impl RiskCategory {
    pub fn new(name: &str, weight: f64, rules: Vec<PatternRule>) -> Self {
        Self {
            name: name.to_string(),
            weight,
            rules,
        }
    }
}

/// A validated, immutable collection of risk categories.
#[derive(Debug, Clone)]
pub struct RuleSet {
    categories: Vec<RiskCategory>,
}

impl RuleSet {
    /// Validate and seal a category list.
    ///
    /// Configuration errors fail here, at load time, never at call time:
    /// an empty set, a blank or duplicate category name, or a weight
    /// outside (0, 1] all refuse to construct.
    pub fn new(categories: Vec<RiskCategory>) -> Result<Self> {
        if categories.is_empty() {
            bail!("rule set has no categories; scoring would be a no-op");
        }
        let mut seen = HashSet::new();
        for category in &categories {
            if category.name.trim().is_empty() {
                bail!("rule set contains a category with an empty name");
            }
            if !(category.weight > 0.0 && category.weight <= 1.0) {
                bail!(
                    "category '{}' has weight {}; weights must be in (0, 1]",
                    category.name,
                    category.weight
                );
            }
            if !seen.insert(category.name.as_str()) {
                bail!("duplicate category name '{}'", category.name);
            }
        }
        Ok(Self { categories })
    }

    /// The categories in scoring order.
    pub fn categories(&self) -> &[RiskCategory] {
        &self.categories
    }

    /// Load and validate a rule set from its JSON representation.
    ///
    /// Each rule is either a regex pattern string or a repeated-character
    /// marker object, e.g. `{"repeated_chars": 5}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: RuleSetFile =
            serde_json::from_str(json).context("rule file is not valid JSON")?;
        let mut categories = Vec::with_capacity(file.categories.len());
        for category in file.categories {
            let mut rules = Vec::with_capacity(category.rules.len());
            for entry in category.rules {
                let rule = match entry {
                    RuleEntry::Pattern(pattern) => PatternRule::lexical(&pattern)
                        .with_context(|| format!("in category '{}'", category.name))?,
                    RuleEntry::RepeatedChars { repeated_chars } => {
                        if repeated_chars < 2 {
                            bail!(
                                "category '{}': repeated_chars must be at least 2",
                                category.name
                            );
                        }
                        PatternRule::RepeatedChars {
                            min_run: repeated_chars,
                        }
                    }
                };
                rules.push(rule);
            }
            categories.push(RiskCategory {
                name: category.name,
                weight: category.weight,
                rules,
            });
        }
        Self::new(categories)
    }

    /// The built-in rule set for Spanish-language dating-app messages.
    ///
    /// Seven categories. Weights reflect per-category severity and are not
    /// renormalized against each other: aggregation takes the maximum
    /// category, so each weight only has to make sense on its own.
    pub fn builtin() -> Self {
        let lexical =
            |pattern: &str| PatternRule::lexical(pattern).expect("built-in pattern compiles");

        let categories = vec![
            RiskCategory::new(
                "hate_speech",
                0.90,
                vec![
                    // Direct threats, with an optional group target so the
                    // whole threat phrase lands in the evidence.
                    lexical(
                        r"\b(te voy a|te vamos a|les voy a|voy a) (matar|asesinar|golpear|destruir|exterminar)( (a )?(la |las |los )?(gente|personas|todos|todas|gays?|lesbianas?|trans|negr[oa]s?|judi[oa]s?|inmigrantes|extranjeros))?\b",
                    ),
                    // Group-directed hostility (hate verbs, death wishes,
                    // epithets at a target), slur vocabulary, and
                    // dehumanizing comparisons.
                    lexical(
                        r"\b(odio|odiar|matar|asesinar|exterminar|muer[ae]n|muerte a|maldit[oa]s?) (a )?(la |las |los )?(gente|personas|todos|todas|gays?|lesbianas?|trans|negr[oa]s?|judi[oa]s?|inmigrantes|extranjeros)\b|\b(racista|xenofob(ic)?[oa]|homofob(ic)?[oa]|transfob(ic)?[oa]|nazi|supremacista)\b|\b(inferior(es)?|basura|escoria) (raza|gente|personas)\b",
                    ),
                ],
            ),
            RiskCategory::new(
                "harassment",
                0.80,
                vec![
                    lexical(r"\b(acosar|hostigar|molestar|perseguir)\b"),
                    lexical(r"\b(voy a encontrar|te voy a) (danar|hacer dano)\b"),
                    lexical(r"\b(no te escaparas|te voy a coger)\b"),
                    lexical(r"\b(idiota|estupid[oa]|imbecil|retrasad[oa])\b"),
                ],
            ),
            RiskCategory::new(
                "sexual_explicit",
                0.70,
                vec![
                    lexical(r"\b(pene|vagina|cono|polla|verga|pija)\b"),
                    lexical(r"\b(follar|chupar|mamar) ?(polla|pene)?\b"),
                    lexical(r"\b(sexo (anal|oral|duro)|hacer el amor ya)\b"),
                    lexical(r"\b(desnud[oa]s?|desvestir(te|me)?|quitarte la ropa)\b"),
                ],
            ),
            RiskCategory::new(
                "drugs",
                0.60,
                vec![
                    lexical(r"\b(cocaina|marihuana|porro|extasis|mdma|anfetamina)\b"),
                    lexical(r"\b(vender|comprar|traficar|conseguir) (drogas|pastillas|coca)\b"),
                    lexical(r"\b(hierba|maria|costo|farlopa) (tengo|vendo|quiero|busco)\b"),
                ],
            ),
            RiskCategory::new(
                "scam",
                0.85,
                vec![
                    lexical(r"\b(envia|enviar|manda|mandar|presta|prestar) ?(me|nos)? (dinero|plata|efectivo|bitcoin)\b"),
                    lexical(r"\b(ayuda economica|necesito dinero|pedir un prestamo)\b"),
                    lexical(r"\b(inversion|negocio|oportunidad|ganar dinero) (rapid[oa]|facil|segur[oa])\b"),
                    lexical(r"\b(urgente|emergencia|hospital|medicina) .{0,20}(dinero|transferencia)\b"),
                ],
            ),
            RiskCategory::new(
                "personal_info",
                0.75,
                vec![
                    lexical(r"\b(dni|nif|pasaporte) ?\d{8}[a-z]?\b"),
                    lexical(r"\b(cuenta bancaria|iban|tarjeta (de )?credito)\b"),
                    lexical(r"\b(direccion|calle|avenida) \w+ \d+\b"),
                    lexical(r"\b(telefono|movil|whatsapp) ?(es)? ?\d{9,}\b"),
                ],
            ),
            RiskCategory::new(
                "spam",
                0.50,
                vec![
                    lexical(r"\b(http|https|www)\b"),
                    lexical(r"\b(sigueme|follow|instagram|facebook|telegram|onlyfans)\b"),
                    lexical(r"\b(promocion|descuento|oferta|gratis) ?(especial|limitada?|hoy)?\b"),
                    PatternRule::RepeatedChars { min_run: 5 },
                ],
            ),
        ];

        Self::new(categories).expect("built-in rule set is valid")
    }
}

#[derive(Deserialize)]
struct RuleSetFile {
    categories: Vec<CategoryFile>,
}

#[derive(Deserialize)]
struct CategoryFile {
    name: String,
    weight: f64,
    rules: Vec<RuleEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleEntry {
    Pattern(String),
    RepeatedChars { repeated_chars: usize },
}
