// Chaperone: message moderation and fraud risk scoring for dating platforms
//
// This is the library root. Each module corresponds to a major subsystem
// of the risk-scoring engine.

pub mod config;
pub mod fraud;
pub mod moderation;
pub mod output;
pub mod severity;
pub mod text;
