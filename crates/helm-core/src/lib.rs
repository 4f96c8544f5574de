//! # helm-core
//!
//! Foundation types, markers, errors, and logging for the Helm orchestrator.
//!
//! This crate provides the shared vocabulary that all other Helm crates depend on:
//!
//! - **Branded IDs**: `SessionId`, `AgentId` as newtypes for type safety
//! - **Messages**: `Message` with a closed `Role` (system, user, assistant)
//! - **Plans**: `Plan`, `PlanStep`, and the `StepStatus` sum type with its transition predicate
//! - **State entries**: the append-only `StateEntry` log records written by the host application
//! - **Coworkers**: the read-only delegate directory
//! - **Errors**: `StoreError` shared by the plan and context stores
//! - **Logging**: `tracing` subscriber setup and log capture for tests

#![deny(unsafe_code)]

pub mod constants;
pub mod coworkers;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod messages;
pub mod plan;
pub mod state;
pub mod text;
