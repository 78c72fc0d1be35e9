//! Deterministic `DocumentModel` for tests: replays canned replies in order and
//! repeats the last one once the script runs out.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{DocumentModel, LlmError};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    ApiError(u16, String),
}

pub struct ScriptedModel {
    script: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<I: IntoIterator<Item = Reply>>(replies: I) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replies with each text in turn.
    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| Reply::Text(t.into())))
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentModel for ScriptedModel {
    async fn complete_with_document(
        &self,
        _system: &str,
        prompt: &str,
        _pdf: &[u8],
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let next = self.script.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or(LlmError::EmptyContent)?,
        };

        match reply {
            Reply::Text(text) => Ok(text),
            Reply::ApiError(status, message) => Err(LlmError::Api { status, message }),
        }
    }
}
