//! Context compaction.
//!
//! Bounds the number of raw assistant messages sent to the model. The most
//! recent `window` countable assistant messages are always kept verbatim;
//! older ones are grouped into consecutive chunks of exactly `window` and
//! each chunk collapses into a single summary message at the position of its
//! first member. A remainder that does not fill a chunk stays verbatim.
//!
//! Synthetic state-context messages are never counted or summarized, and
//! non-assistant messages always pass through in place.
//!
//! Compaction is fail-open: if any chunk cannot be summarized the original
//! sequence is returned untouched and [`Compaction::fell_back`] is set.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use helm_core::constants::{CHUNK_SUMMARY_MARKER, STATE_CONTEXT_MARKER};
use helm_core::messages::Message;

use crate::constants::DEFAULT_COMPACTION_WINDOW;
use crate::summarizer::Summarizer;

/// Result of a compaction pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Compaction {
    /// The (possibly) compacted sequence.
    pub messages: Vec<Message>,
    /// Number of chunks replaced by a summary.
    pub chunks_summarized: usize,
    /// Whether summarization failed and the input was returned unchanged.
    pub fell_back: bool,
}

impl Compaction {
    fn unchanged(messages: &[Message], fell_back: bool) -> Self {
        Self {
            messages: messages.to_vec(),
            chunks_summarized: 0,
            fell_back,
        }
    }
}

/// Keeps a recent window verbatim and summarizes older full chunks.
#[derive(Clone, Copy, Debug)]
pub struct ContextCompactor {
    window: usize,
}

impl ContextCompactor {
    /// Create a compactor with the given window (minimum 1).
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    /// Window size.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Whether `message` counts toward the window.
    pub fn is_countable(message: &Message) -> bool {
        message.is_assistant() && !message.has_marker(STATE_CONTEXT_MARKER)
    }

    /// Indices of countable assistant messages, in order.
    pub fn countable_indices(messages: &[Message]) -> Vec<usize> {
        messages
            .iter()
            .enumerate()
            .filter(|(_, m)| Self::is_countable(m))
            .map(|(i, _)| i)
            .collect()
    }

    /// Index groups that would be summarized, oldest first.
    ///
    /// Empty when the countable count does not exceed the window.
    pub fn plan_chunks(&self, messages: &[Message]) -> Vec<Vec<usize>> {
        let indices = Self::countable_indices(messages);
        if indices.len() <= self.window {
            return Vec::new();
        }
        let older = &indices[..indices.len() - self.window];
        older
            .chunks_exact(self.window)
            .map(<[usize]>::to_vec)
            .collect()
    }

    /// Compact `messages` owned by `agent_id`.
    pub async fn compact(
        &self,
        messages: &[Message],
        agent_id: &str,
        summarizer: &dyn Summarizer,
    ) -> Compaction {
        let chunks = self.plan_chunks(messages);
        if chunks.is_empty() {
            return Compaction::unchanged(messages, false);
        }

        let mut summaries: HashMap<usize, String> = HashMap::with_capacity(chunks.len());
        let mut dropped: HashSet<usize> = HashSet::new();

        for (n, chunk) in chunks.iter().enumerate() {
            let members: Vec<Message> = chunk.iter().map(|&i| messages[i].clone()).collect();
            match summarizer.summarize(&members, agent_id).await {
                Ok(summary) => {
                    tracing::trace!(chunk = n, first_index = chunk[0], "chunk summarized");
                    let summary = if summary.trim_start().starts_with(CHUNK_SUMMARY_MARKER) {
                        summary
                    } else {
                        format!("{CHUNK_SUMMARY_MARKER} {summary}")
                    };
                    let _ = summaries.insert(chunk[0], summary);
                    dropped.extend(chunk.iter().skip(1).copied());
                }
                Err(error) => {
                    warn!(
                        agent_id,
                        chunk = n,
                        error = %error,
                        "chunk summarization failed, sending uncompacted context"
                    );
                    return Compaction::unchanged(messages, true);
                }
            }
        }

        let mut out = Vec::with_capacity(messages.len() - dropped.len());
        for (i, message) in messages.iter().enumerate() {
            if dropped.contains(&i) {
                continue;
            }
            match summaries.remove(&i) {
                Some(summary) => out.push(Message::assistant(summary)),
                None => out.push(message.clone()),
            }
        }

        debug!(
            agent_id,
            chunks = chunks.len(),
            before = messages.len(),
            after = out.len(),
            "context compacted"
        );
        Compaction {
            messages: out,
            chunks_summarized: chunks.len(),
            fell_back: false,
        }
    }
}

impl Default for ContextCompactor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPACTION_WINDOW)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
