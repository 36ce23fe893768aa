use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};

use chaperone::config::Config;
use chaperone::fraud::detector::FraudDetector;
use chaperone::fraud::snapshot::{BehaviorSnapshot, ProfileSnapshot};
use chaperone::moderation::context::{ConversationContext, PriorMessage, RelationshipFlags};
use chaperone::moderation::conversation::ConversationItem;
use chaperone::moderation::moderator::MessageModerator;
use chaperone::output::terminal;

/// Chaperone: message moderation and fraud risk scoring for dating platforms.
///
/// Scores free-text messages against weighted risk categories, analyzes
/// whole conversations, and assesses account snapshots for fraud signals.
/// Deterministic rules — no network, no model downloads.
#[derive(Parser)]
#[command(name = "chaperone", version, about)]
struct Cli {
    /// Print results as JSON instead of the colored summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single message
    Moderate {
        /// The message text to score
        text: String,

        /// Sender identifier, used in logs only
        #[arg(long, default_value = "sender")]
        sender: String,

        /// Receiver identifier, used in logs only
        #[arg(long, default_value = "receiver")]
        receiver: String,

        /// Treat the pair as a first contact
        #[arg(long)]
        new_contact: bool,

        /// The receiver has blocked this sender before
        #[arg(long)]
        blocked_before: bool,

        /// How many of the sender's recent messages were flagged
        #[arg(long, default_value = "0")]
        prior_flagged: usize,

        /// Recent message count the flagged count is measured against
        #[arg(long, default_value = "0")]
        prior_total: usize,

        /// Message timestamp, RFC 3339 (e.g. 2026-03-01T02:15:00+01:00)
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Analyze an ordered conversation from a JSON file
    Conversation {
        /// Path to a JSON array of {id, content, timestamp?, relationship?}
        file: PathBuf,

        /// User identifier, used in logs only
        #[arg(long, default_value = "user")]
        user: String,
    },

    /// Assess an account for fraud risk from snapshot files
    Fraud {
        /// Path to the profile snapshot JSON
        profile: PathBuf,

        /// Path to the behavior snapshot JSON
        behavior: PathBuf,
    },

    /// Show the active moderation rule set
    Rules,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("chaperone=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Moderate {
            text,
            sender,
            receiver,
            new_contact,
            blocked_before,
            prior_flagged,
            prior_total,
            timestamp,
        } => {
            let moderator = MessageModerator::new(config.load_rule_set()?);
            let context = build_context(
                new_contact,
                blocked_before,
                prior_flagged,
                prior_total,
                timestamp.as_deref(),
            )?;

            let result = moderator.score_message(&text, &sender, &receiver, context.as_ref());

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::display_moderation(&result);
            }
        }

        Commands::Conversation { file, user } => {
            let moderator = MessageModerator::new(config.load_rule_set()?);
            let json = fs::read_to_string(&file)
                .with_context(|| format!("failed to read conversation file {}", file.display()))?;
            let items: Vec<ConversationItem> = serde_json::from_str(&json)
                .with_context(|| format!("invalid conversation file {}", file.display()))?;

            let result = moderator.score_conversation(&items, &user);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::display_conversation(&result);
            }
        }

        Commands::Fraud { profile, behavior } => {
            let detector = FraudDetector::default();
            let profile: ProfileSnapshot = read_snapshot(&profile)?;
            let behavior: BehaviorSnapshot = read_snapshot(&behavior)?;

            let assessment = detector.score_fraud(&profile, &behavior);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                terminal::display_fraud(&assessment);
            }
        }

        Commands::Rules => {
            let rules = config.load_rule_set()?;
            if cli.json {
                let summary: Vec<serde_json::Value> = rules
                    .categories()
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "name": c.name,
                            "weight": c.weight,
                            "rules": c.rules.len(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                terminal::display_rules(&rules);
            }
        }
    }

    Ok(())
}

/// Build the optional conversation context from CLI flags.
///
/// Returns None when no context flag was given, so a bare `moderate` run
/// scores with no context adjustment at all.
fn build_context(
    new_contact: bool,
    blocked_before: bool,
    prior_flagged: usize,
    prior_total: usize,
    timestamp: Option<&str>,
) -> Result<Option<ConversationContext>> {
    let parsed: Option<DateTime<FixedOffset>> = match timestamp {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("invalid --timestamp value: {raw}"))?,
        ),
        None => None,
    };

    if !new_contact && !blocked_before && prior_total == 0 && prior_flagged == 0 && parsed.is_none()
    {
        return Ok(None);
    }

    // Flagged entries first; the ratio only cares about counts.
    let total = prior_total.max(prior_flagged);
    let mut prior_messages = vec![PriorMessage { flagged: true }; prior_flagged];
    prior_messages.extend(vec![PriorMessage { flagged: false }; total - prior_flagged]);

    Ok(Some(ConversationContext {
        prior_messages,
        relationship: RelationshipFlags {
            is_new_contact: new_contact,
            has_blocked_before: blocked_before,
        },
        timestamp: parsed,
    }))
}

fn read_snapshot<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("invalid snapshot file {}", path.display()))
}
