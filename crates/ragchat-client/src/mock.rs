// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::{Answer, DispatchError};

/// Deterministic dispatcher for offline use.  Echoes the question back as
/// the answer.
#[derive(Default)]
pub struct MockDispatcher;

#[async_trait]
impl crate::QueryDispatcher for MockDispatcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn dispatch(&self, query: &str) -> Result<Answer, DispatchError> {
        Ok(Answer::text(format!("MOCK: {query}")))
    }
}

/// A pre-scripted dispatcher.  Each call to `dispatch` pops the next result
/// from the front of the queue; an exhausted script yields an error.
pub struct ScriptedDispatcher {
    script: Mutex<VecDeque<Result<Answer, DispatchError>>>,
    delay: Option<Duration>,
    /// Every query seen, in call order.
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl ScriptedDispatcher {
    pub fn new(script: Vec<Result<Answer, DispatchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            delay: None,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience: dispatcher that answers once with `reply`.
    pub fn always_text(reply: impl Into<String>) -> Self {
        Self::new(vec![Ok(Answer::text(reply))])
    }

    /// Convenience: dispatcher whose single call fails.
    pub fn failing(detail: impl Into<String>) -> Self {
        Self::new(vec![Err(DispatchError::new(detail))])
    }

    /// Sleep before settling each call, so tests can observe the busy state.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().map(|q| q.len()).unwrap_or(0)
    }
}

#[async_trait]
impl crate::QueryDispatcher for ScriptedDispatcher {
    fn name(&self) -> &str {
        "scripted-mock"
    }

    async fn dispatch(&self, query: &str) -> Result<Answer, DispatchError> {
        if let Ok(mut q) = self.queries.lock() {
            q.push(query.to_string());
        }
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or_else(|| Err(DispatchError::new("scripted dispatcher exhausted")))
    }
}
