// Message moderation — rule sets, per-category scoring, context, and
// conversation analysis.

pub mod category;
pub mod context;
pub mod conversation;
pub mod moderator;
pub mod rules;
pub mod suggest;
