// Colored terminal output for moderation verdicts and fraud assessments.
//
// This module handles all terminal-specific formatting: colors, tables,
// summary markers. The main.rs display paths delegate here.

use colored::Colorize;

use crate::fraud::detector::FraudAssessment;
use crate::moderation::conversation::ConversationResult;
use crate::moderation::moderator::ModerationResult;
use crate::moderation::rules::RuleSet;
use crate::severity::Severity;

/// Display a single message verdict.
pub fn display_moderation(result: &ModerationResult) {
    println!("\n{}", "=== Moderation Verdict ===".bold());
    println!();

    let safe_str = if result.is_safe {
        "yes".green().to_string()
    } else {
        "no".red().bold().to_string()
    };
    println!("  Deliverable: {safe_str}");
    println!("  Severity: {}", colorize_severity(result.severity));
    println!(
        "  Score: {:.2}  Confidence: {:.2}",
        result.score, result.confidence
    );

    if !result.categories.is_empty() {
        println!("  Categories: {}", result.categories.join(", ").yellow());
    }

    if !result.flagged_phrases.is_empty() {
        println!("\n  Flagged phrases (evidence):");
        for (i, phrase) in result.flagged_phrases.iter().enumerate() {
            let preview = super::truncate_chars(phrase, 60);
            println!("    {}. \"{}\"", i + 1, preview.dimmed());
        }
    }

    println!("\n  {}", result.recommendation.bold());
    if let Some(alternative) = &result.alternative_suggestion {
        println!("  Suggested rewrite: {}", alternative.italic());
    }
    println!();
}

/// Display a conversation analysis: one line per message plus pattern flags.
pub fn display_conversation(result: &ConversationResult) {
    println!(
        "\n{}",
        format!(
            "=== Conversation Analysis ({} messages) ===",
            result.messages.len()
        )
        .bold()
    );
    println!();

    let safe_str = if result.overall_safe {
        "yes".green().to_string()
    } else {
        "no".red().bold().to_string()
    };
    println!(
        "  Overall safe: {safe_str}  Conversation risk: {:.1}",
        result.conversation_risk
    );
    println!();

    println!(
        "  {:<4} {:<16} {:<10} {:>6}",
        "".dimmed(),
        "Message".dimmed(),
        "Severity".dimmed(),
        "Score".dimmed(),
    );
    println!("  {}", "-".repeat(40).dimmed());
    for verdict in &result.messages {
        let marker = if verdict.result.is_safe {
            "ok".green().to_string()
        } else {
            "!!".red().bold().to_string()
        };
        println!(
            "  {:<4} {:<16} {:<10} {:>6.2}",
            marker,
            super::truncate_chars(&verdict.message_id, 14),
            colorize_severity(verdict.result.severity),
            verdict.result.score,
        );
    }

    let patterns = &result.patterns;
    if patterns.any() {
        println!();
        if patterns.repetitive_messages {
            println!("  {} repetitive messages", "~".yellow());
        }
        if patterns.aggressive_escalation {
            println!("  {} aggressive escalation", "!!".red().bold());
        }
        if patterns.personal_info_requests {
            println!("  {} personal info solicitation", "!".bright_red());
        }
    }
    println!();
}

/// Display a fraud assessment with its indicators and recommendations.
pub fn display_fraud(assessment: &FraudAssessment) {
    println!("\n{}", "=== Fraud Risk Assessment ===".bold());
    println!();

    println!("  Risk level: {}", colorize_severity(assessment.risk_level));
    println!(
        "  Score: {:.2}  Data confidence: {:.2}",
        assessment.score, assessment.confidence
    );

    if !assessment.indicators.is_empty() {
        println!("\n  Indicators ({}):", assessment.indicators.len());
        for indicator in &assessment.indicators {
            println!("    - {}", indicator.yellow());
        }
    }

    println!("\n  Recommendations:");
    for recommendation in &assessment.recommendations {
        println!("    - {recommendation}");
    }
    println!();
}

/// Display a rule-set summary table.
pub fn display_rules(rules: &RuleSet) {
    println!(
        "\n{}",
        format!("=== Rule Set ({} categories) ===", rules.categories().len()).bold()
    );
    println!();

    println!(
        "  {:<18} {:>6}  {:>5}",
        "Category".dimmed(),
        "Weight".dimmed(),
        "Rules".dimmed(),
    );
    println!("  {}", "-".repeat(33).dimmed());
    for category in rules.categories() {
        println!(
            "  {:<18} {:>6.2}  {:>5}",
            category.name,
            category.weight,
            category.rules.len()
        );
    }
    println!();
}

/// Colorize a severity tier by how much attention it demands.
fn colorize_severity(severity: Severity) -> colored::ColoredString {
    let tier = severity.as_str();
    match severity {
        Severity::Critical => tier.red().bold(),
        Severity::High => tier.bright_red(),
        Severity::Medium => tier.yellow(),
        Severity::Low => tier.green(),
        Severity::Minimal => tier.dimmed(),
    }
}
