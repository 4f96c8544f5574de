//! # Model capability
//!
//! Core abstraction over whatever actually talks to the language model.
//! Implementations perform no retry or backoff of their own; bounded retries
//! live in the planner.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use helm_core::messages::Message;

/// Result type alias for model calls.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors a model call can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The call did not finish in time.
    #[error("model call timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The call failed for any other reason.
    #[error("model call failed: {message}")]
    CallFailed {
        /// Error description.
        message: String,
    },
}

impl ModelError {
    /// Convenience constructor for [`ModelError::CallFailed`].
    pub fn call_failed(message: impl Into<String>) -> Self {
        Self::CallFailed {
            message: message.into(),
        }
    }

    /// Error category string for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::CallFailed { .. } => "call_failed",
        }
    }
}

/// What a model call produced.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelOutput {
    /// Free-form text.
    Text(String),
    /// Already-parsed JSON (structured-output capable backends).
    Structured(Value),
}

impl ModelOutput {
    /// Text form of the output. Structured output is serialized compactly.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Structured(value) => value.to_string(),
        }
    }
}

impl From<&str> for ModelOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for ModelOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for ModelOutput {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Core language-model capability.
///
/// Implementors must be `Send + Sync`; one client is shared by every session.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send an ordered message sequence and wait for the reply.
    async fn call(&self, messages: &[Message]) -> ModelResult<ModelOutput>;
}

#[async_trait]
impl<M: ModelClient + ?Sized> ModelClient for Arc<M> {
    async fn call(&self, messages: &[Message]) -> ModelResult<ModelOutput> {
        (**self).call(messages).await
    }
}

/// Wraps a client with a per-call timeout.
pub struct TimeoutModel<M> {
    inner: M,
    timeout: Duration,
}

impl<M: ModelClient> TimeoutModel<M> {
    /// Create a timeout wrapper.
    pub fn new(inner: M, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<M: ModelClient> ModelClient for TimeoutModel<M> {
    async fn call(&self, messages: &[Message]) -> ModelResult<ModelOutput> {
        match tokio::time::timeout(self.timeout, self.inner.call(messages)).await {
            Ok(result) => result,
            Err(_) => {
                #[allow(clippy::cast_possible_truncation)]
                let timeout_ms = self.timeout.as_millis() as u64;
                tracing::warn!(timeout_ms, "model call timed out");
                Err(ModelError::Timeout { timeout_ms })
            }
        }
    }
}
