//! Testing utilities.
//!
//! `MockNarrator` returns scripted model responses in order and records
//! every call, for deterministic integration tests without API calls.

use crate::model::NarratorModel;
use async_trait::async_trait;
use gemini::{BlockReason, Candidate, Content, FinishReason, PromptFeedback, Response};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A scripted narrator model.
pub struct MockNarrator {
    responses: Mutex<VecDeque<Result<Response, gemini::Error>>>,
    calls: Mutex<Vec<Vec<Content>>>,
}

impl MockNarrator {
    /// Create a mock with no scripted responses. Unscripted calls get a
    /// fixed filler reply.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a plain text reply.
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.queue_response(text_response(text));
    }

    /// Queue a full response.
    pub fn queue_response(&self, response: Response) {
        self.responses
            .lock()
            .expect("mock state poisoned")
            .push_back(Ok(response));
    }

    /// Queue a model-layer error.
    pub fn queue_error(&self, error: gemini::Error) {
        self.responses
            .lock()
            .expect("mock state poisoned")
            .push_back(Err(error));
    }

    /// Every conversation this mock has been called with, in order.
    pub fn calls(&self) -> Vec<Vec<Content>> {
        self.calls.lock().expect("mock state poisoned").clone()
    }

    /// The conversation of the most recent call.
    pub fn last_call(&self) -> Option<Vec<Content>> {
        self.calls
            .lock()
            .expect("mock state poisoned")
            .last()
            .cloned()
    }

    /// Number of model calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock state poisoned").len()
    }
}

impl Default for MockNarrator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NarratorModel for MockNarrator {
    async fn narrate(&self, contents: Vec<Content>) -> Result<Response, gemini::Error> {
        self.calls
            .lock()
            .expect("mock state poisoned")
            .push(contents);
        self.responses
            .lock()
            .expect("mock state poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(text_response("Le narrateur n'a plus de réponses scriptées.")))
    }
}

/// A well-formed text response that stopped normally.
pub fn text_response(text: impl Into<String>) -> Response {
    Response {
        candidates: vec![Candidate {
            content: Some(Content::model(text)),
            finish_reason: Some(FinishReason::Stop),
        }],
        prompt_feedback: None,
        usage: None,
    }
}

/// A degenerate response exposing only a finish reason and no text.
pub fn finish_only_response(finish_reason: FinishReason) -> Response {
    Response {
        candidates: vec![Candidate {
            content: None,
            finish_reason: Some(finish_reason),
        }],
        prompt_feedback: None,
        usage: None,
    }
}

/// A response whose prompt was rejected upstream.
pub fn blocked_prompt_response() -> Response {
    Response {
        candidates: Vec::new(),
        prompt_feedback: Some(PromptFeedback {
            block_reason: Some(BlockReason::Safety),
        }),
        usage: None,
    }
}

/// A structurally empty response: no candidates, no feedback.
pub fn empty_response() -> Response {
    Response {
        candidates: Vec::new(),
        prompt_feedback: None,
        usage: None,
    }
}
