//! Orchestrator modules: configuration, turn types, and the pass itself.

pub mod config;
#[allow(clippy::module_inception)]
pub mod orchestrator;
pub mod turn;
