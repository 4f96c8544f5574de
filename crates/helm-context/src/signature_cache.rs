//! Bounded memo cache of chunk summaries.
//!
//! Keys are content signatures ([`chunk_signature`]); values are the tagged
//! summaries the model produced. The cache is process-local and never
//! persisted. One instance is normally shared by every session through an
//! `Arc`, which is the only cross-session state in the orchestrator.
//!
//! ## Eviction
//!
//! Insertion-order FIFO. Putting a new key at capacity evicts the oldest
//! inserted key. Re-putting an existing key replaces its value but keeps its
//! original position in the eviction order. There is no TTL.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use helm_core::messages::Message;

use crate::constants::DEFAULT_CACHE_CAPACITY;

/// Stable content digest for a chunk owned by `agent_id`.
///
/// SHA-256 over the canonical JSON of the chunk's `{role, content}` list
/// (object keys sorted), followed by the agent id, hex-encoded. Including the
/// agent id keeps summaries from bleeding across agents.
pub fn chunk_signature(chunk: &[Message], agent_id: &str) -> String {
    let canonical: Vec<Value> = chunk
        .iter()
        .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
        .collect();
    let body = Value::Array(canonical).to_string();

    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hasher.update(agent_id.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, String>,
    order: VecDeque<String>,
}

/// Capacity-bounded FIFO cache from signature to summary.
///
/// All operations take one short lock, so concurrent sessions serialize on
/// the eviction path.
pub struct SignatureCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl SignatureCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Look up a summary.
    pub fn get(&self, signature: &str) -> Option<String> {
        self.inner.lock().entries.get(signature).cloned()
    }

    /// Store a summary, evicting the oldest inserted entry if at capacity.
    pub fn put(&self, signature: impl Into<String>, value: impl Into<String>) {
        let signature = signature.into();
        let value = value.into();
        let mut inner = self.inner.lock();

        if let Some(existing) = inner.entries.get_mut(&signature) {
            *existing = value;
            return;
        }

        while inner.entries.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            let _ = inner.entries.remove(&oldest);
            tracing::trace!(signature = %oldest, "evicted cached summary");
        }

        inner.order.push_back(signature.clone());
        let _ = inner.entries.insert(signature, value);
    }

    /// Whether a signature is cached.
    pub fn contains(&self, signature: &str) -> bool {
        self.inner.lock().entries.contains_key(signature)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SignatureCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
