// Fraud detection — account snapshots scored across four signal domains.

pub mod behavior;
pub mod content;
pub mod detector;
pub mod network;
pub mod profile;
pub mod snapshot;
