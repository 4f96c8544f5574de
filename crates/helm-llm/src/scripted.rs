//! A recording, scripted [`ModelClient`] for tests.
//!
//! Replies are served from a FIFO queue first; once the queue is empty an
//! optional responder closure decides, and without one the call fails. Every
//! call's message sequence is recorded for assertions.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use helm_core::messages::Message;

use crate::provider::{ModelClient, ModelError, ModelOutput, ModelResult};

type Responder = Box<dyn Fn(&[Message]) -> ModelResult<ModelOutput> + Send + Sync>;

/// Scripted reply: an output or a failure message.
pub type ScriptedReply = Result<ModelOutput, String>;

/// Test double that replays scripted replies and records calls.
#[derive(Default)]
pub struct ScriptedModel {
    queue: Mutex<VecDeque<ScriptedReply>>,
    responder: Option<Responder>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    /// Create a model with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model that replies with each text in order.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::new();
        for text in texts {
            model.push_text(text);
        }
        model
    }

    /// Create a model whose replies are computed from the request.
    pub fn with_responder(
        responder: impl Fn(&[Message]) -> ModelResult<ModelOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    /// Queue a text reply.
    pub fn push_text(&self, text: impl Into<String>) {
        self.queue.lock().push_back(Ok(ModelOutput::Text(text.into())));
    }

    /// Queue an arbitrary reply.
    pub fn push_output(&self, output: ModelOutput) {
        self.queue.lock().push_back(Ok(output));
    }

    /// Queue a failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.queue.lock().push_back(Err(message.into()));
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Message sequences of every call so far.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().clone()
    }

    /// Message sequence of the most recent call.
    pub fn last_call(&self) -> Option<Vec<Message>> {
        self.calls.lock().last().cloned()
    }

    /// Number of calls whose last message contains `needle`.
    pub fn calls_ending_with(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.last().is_some_and(|m| m.content.contains(needle)))
            .count()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn call(&self, messages: &[Message]) -> ModelResult<ModelOutput> {
        self.calls.lock().push(messages.to_vec());

        let queued = self.queue.lock().pop_front();
        match queued {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(ModelError::CallFailed { message }),
            None => match &self.responder {
                Some(responder) => responder(messages),
                None => Err(ModelError::call_failed("script exhausted")),
            },
        }
    }
}
