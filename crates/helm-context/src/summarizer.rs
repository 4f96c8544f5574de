//! Chunk summarization.
//!
//! A [`Summarizer`] turns a chunk of older assistant messages into one short
//! factual record. [`CachedSummarizer`] is the production implementation: it
//! memoizes by [`chunk_signature`] so the same chunk is only ever summarized
//! once per process, and tags fresh summaries with
//! [`CHUNK_SUMMARY_MARKER`] before caching them.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use helm_core::constants::CHUNK_SUMMARY_MARKER;
use helm_core::messages::Message;
use helm_llm::{ModelClient, ModelError};

use crate::constants::SUMMARIZATION_INSTRUCTION;
use crate::signature_cache::{SignatureCache, chunk_signature};

/// Summarization failure.
#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
    /// The model call failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The model returned only whitespace.
    #[error("model returned an empty summary")]
    Empty,
}

/// Turns a chunk of messages into a summary string.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `chunk`, which belongs to `agent_id`.
    ///
    /// The returned text is used as-is for the summary message content.
    async fn summarize(
        &self,
        chunk: &[Message],
        agent_id: &str,
    ) -> Result<String, SummarizerError>;
}

/// Model-backed summarizer with a shared signature cache.
pub struct CachedSummarizer {
    model: Arc<dyn ModelClient>,
    cache: Arc<SignatureCache>,
}

impl CachedSummarizer {
    /// Create a summarizer over `model`, memoizing into `cache`.
    pub fn new(model: Arc<dyn ModelClient>, cache: Arc<SignatureCache>) -> Self {
        Self { model, cache }
    }

    /// The shared cache.
    pub fn cache(&self) -> &Arc<SignatureCache> {
        &self.cache
    }
}

#[async_trait]
impl Summarizer for CachedSummarizer {
    async fn summarize(
        &self,
        chunk: &[Message],
        agent_id: &str,
    ) -> Result<String, SummarizerError> {
        let signature = chunk_signature(chunk, agent_id);
        if let Some(hit) = self.cache.get(&signature) {
            debug!(signature = %signature, "chunk summary cache hit");
            return Ok(hit);
        }

        let mut request = chunk.to_vec();
        request.push(Message::user(SUMMARIZATION_INSTRUCTION));
        let text = self.model.call(&request).await?.into_text();
        let text = text.trim();
        if text.is_empty() {
            return Err(SummarizerError::Empty);
        }

        let summary = if text.starts_with(CHUNK_SUMMARY_MARKER) {
            text.to_owned()
        } else {
            format!("{CHUNK_SUMMARY_MARKER} {text}")
        };
        self.cache.put(signature.clone(), summary.clone());
        debug!(signature = %signature, chunk_len = chunk.len(), "chunk summarized");
        Ok(summary)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use helm_llm::scripted::ScriptedModel;

    fn chunk() -> Vec<Message> {
        vec![
            Message::assistant("Ran SELECT count(*) FROM sales"),
            Message::assistant("Wrote report.csv"),
        ]
    }

    fn summarizer(model: &Arc<ScriptedModel>) -> CachedSummarizer {
        CachedSummarizer::new(model.clone(), Arc::new(SignatureCache::new(8)))
    }

    #[tokio::test]
    async fn tags_and_caches_summary() {
        let model = Arc::new(ScriptedModel::with_texts(["Actions performed:\n- counted sales"]));
        let s = summarizer(&model);

        let out = s.summarize(&chunk(), "agent").await.unwrap();
        assert!(out.starts_with(CHUNK_SUMMARY_MARKER));
        assert!(out.contains("counted sales"));
        assert_eq!(s.cache().len(), 1);
    }

    #[tokio::test]
    async fn request_is_chunk_plus_instruction() {
        let model = Arc::new(ScriptedModel::with_texts(["summary"]));
        let s = summarizer(&model);
        let _ = s.summarize(&chunk(), "agent").await.unwrap();

        let call = model.last_call().unwrap();
        assert_eq!(call.len(), 3);
        assert_eq!(&call[..2], chunk().as_slice());
        assert!(call[2].is_user());
        assert!(call[2].content.contains("Actions performed"));
    }

    #[tokio::test]
    async fn cache_hit_skips_model() {
        let model = Arc::new(ScriptedModel::with_texts(["first"]));
        let s = summarizer(&model);

        let a = s.summarize(&chunk(), "agent").await.unwrap();
        let b = s.summarize(&chunk(), "agent").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn different_agent_misses_cache() {
        let model = Arc::new(ScriptedModel::with_texts(["one", "two"]));
        let s = summarizer(&model);

        let _ = s.summarize(&chunk(), "a1").await.unwrap();
        let _ = s.summarize(&chunk(), "a2").await.unwrap();
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn already_tagged_summary_is_not_retagged() {
        let tagged = format!("{CHUNK_SUMMARY_MARKER} done");
        let model = Arc::new(ScriptedModel::with_texts([tagged.clone()]));
        let out = summarizer(&model).summarize(&chunk(), "a").await.unwrap();
        assert_eq!(out, tagged);
    }

    #[tokio::test]
    async fn blank_reply_is_error_and_not_cached() {
        let model = Arc::new(ScriptedModel::with_texts(["   "]));
        let s = summarizer(&model);
        let err = s.summarize(&chunk(), "a").await.unwrap_err();
        assert!(matches!(err, SummarizerError::Empty));
        assert!(s.cache().is_empty());
    }

    #[tokio::test]
    async fn model_failure_propagates() {
        let model = Arc::new(ScriptedModel::new());
        model.push_error("boom");
        let err = summarizer(&model).summarize(&chunk(), "a").await.unwrap_err();
        assert!(matches!(err, SummarizerError::Model(_)));
    }
}
