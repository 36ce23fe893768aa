use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::moderation::rules::RuleSet;

/// Central configuration loaded from environment variables.
///
/// The scoring engines themselves have no environment footprint; this is
/// the CLI's surface. The .env file is loaded automatically at startup
/// via dotenvy.
pub struct Config {
    /// Optional path to a JSON rule-set file (CHAPERONE_RULES_PATH).
    /// When unset the built-in Spanish rule set is used.
    pub rules_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Ok(Self {
            rules_path: env::var("CHAPERONE_RULES_PATH").ok().map(PathBuf::from),
        })
    }

    /// Resolve the moderation rule set: the file CHAPERONE_RULES_PATH
    /// points at, or the built-in set when unset.
    ///
    /// A configured-but-broken rule file is a hard error rather than a
    /// silent fallback: a typo in the path must not quietly moderate with
    /// different rules than the operator intended.
    pub fn load_rule_set(&self) -> Result<RuleSet> {
        match &self.rules_path {
            Some(path) => {
                let json = fs::read_to_string(path).with_context(|| {
                    format!(
                        "failed to read rule file {}\n\
                         Check CHAPERONE_RULES_PATH, or unset it to use the built-in rules.",
                        path.display()
                    )
                })?;
                let rules = RuleSet::from_json_str(&json)
                    .with_context(|| format!("invalid rule file {}", path.display()))?;
                info!(
                    path = %path.display(),
                    categories = rules.categories().len(),
                    "loaded custom rule set"
                );
                Ok(rules)
            }
            None => Ok(RuleSet::builtin()),
        }
    }
}
