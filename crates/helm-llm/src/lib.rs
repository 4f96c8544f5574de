//! # helm-llm
//!
//! The language-model capability as the orchestrator sees it: an ordered
//! message sequence in, text or structured JSON out.
//!
//! - **Provider**: [`ModelClient`] trait, [`ModelOutput`], [`ModelError`]
//! - **Timeout**: [`TimeoutModel`], the only cancellation boundary in a pass
//! - **Scripted**: [`scripted::ScriptedModel`], a recording test double

#![deny(unsafe_code)]

pub mod provider;
pub mod scripted;

pub use provider::{ModelClient, ModelError, ModelOutput, ModelResult, TimeoutModel};
