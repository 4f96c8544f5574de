//! # helm-context
//!
//! Bounded context for every model call.
//!
//! - **Signature cache**: process-local FIFO memo of chunk summaries, shared across sessions
//! - **Summarizer**: compresses a chunk of older assistant messages via the model
//! - **Compactor**: keeps a recent window verbatim and collapses older full chunks
//! - **Projections**: past / new / last-output views over the state-entry log
//! - **Store**: read-only access to each session's state-entry log

#![deny(unsafe_code)]

pub mod compactor;
pub mod constants;
pub mod projections;
pub mod signature_cache;
pub mod store;
pub mod summarizer;

pub use compactor::{Compaction, ContextCompactor};
pub use projections::Projections;
pub use signature_cache::{SignatureCache, chunk_signature};
pub use store::{ContextStore, FileContextStore, MemoryContextStore};
pub use summarizer::{CachedSummarizer, Summarizer, SummarizerError};
