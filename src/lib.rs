// Outreach: cold-email pipeline with scheduled follow-ups
//
// This is the library root. Each module corresponds to a major subsystem
// of the outreach pipeline.

pub mod advisor;
pub mod config;
pub mod dispatch;
pub mod events;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod store;
pub mod templates;
