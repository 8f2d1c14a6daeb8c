//! Test support: a scripted [`LlmClient`] for driving agents and crews
//! without a network.
//!
//! `ScriptedLlm` hands out canned responses in order and records every
//! request so tests can assert on prompts, tools and tool results.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::CrewError;
use crate::llm::{ChatRequest, ChatResponse, LlmClient, Role};

#[derive(Default)]
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Responses not yet handed out.
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The first user message of each request that opened a conversation.
    pub fn task_prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|r| r.messages.len() == 2)
            .filter_map(|r| {
                r.messages
                    .iter()
                    .find(|m| m.role == Role::User)
                    .and_then(|m| m.content.clone())
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, CrewError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| CrewError::InvalidResponse("scripted LLM ran out of responses".to_string()))
    }
}

/// An [`LlmClient`] that always fails, for error-path tests.
pub struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, CrewError> {
        Err(CrewError::Api {
            status: 503,
            message: "upstream unavailable".to_string(),
        })
    }
}
