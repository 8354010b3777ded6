//! Confirmation Port
//!
//! A blocking yes/no decision put to the operator. The caller computes the
//! default; implementations only present it.
//!
//! Implementations:
//! - `InteractiveConfirm` (infrastructure): dialoguer prompt on the terminal
//! - `ScriptedConfirm`: canned answers for tests and dry runs

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::RolloutResult;

pub trait Confirm: Send + Sync {
    /// Ask `message`; `default` is what an empty answer means
    fn confirm(&self, message: &str, default: bool) -> RolloutResult<bool>;
}

/// A prompt as seen by `ScriptedConfirm`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
    pub message: String,
    pub default: bool,
}

/// Confirm that replays a queue of answers.
///
/// Once the queue is exhausted every prompt takes its default, the same as
/// an operator pressing enter.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<RecordedPrompt>>,
}

impl ScriptedConfirm {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Accept every default
    pub fn defaults() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, message: &str, default: bool) -> RolloutResult<bool> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(RecordedPrompt {
                message: message.to_string(),
                default,
            });
        }
        let answer = self
            .answers
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or(default);
        Ok(answer)
    }
}
