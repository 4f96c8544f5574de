//! # helm-runtime
//!
//! One orchestration pass per inbound request.
//!
//! - **Logging**: install the subscriber named by the settings
//! - **Sanitize**: drop blank messages before anything else sees them
//! - **Session registry**: per-session sticky flags (planning disabled)
//! - **Orchestrator**: sanitize → compact → decide → plan → evaluate → inject → submit,
//!   failing open at every step

#![deny(unsafe_code)]

pub mod logging;
pub mod orchestrator;
pub mod sanitize;
pub mod session;

pub use logging::init_logging;
pub use orchestrator::config::OrchestratorConfig;
pub use orchestrator::orchestrator::{Orchestrator, PLANNING_DISABLED_NOTICE};
pub use orchestrator::turn::{
    DecisionRecord, OrchestrationRequest, PreparedTurn, TurnOutcome, TurnResult,
};
pub use session::SessionRegistry;
