//! Confirmation gates with a forced mode
//!
//! In forced mode no prompt is shown; each call site supplies the answer it
//! stands for.

use crate::domain::ports::Confirm;
use crate::error::RolloutResult;

#[derive(Clone, Copy)]
pub struct Gate<'a> {
    confirm: &'a dyn Confirm,
    bypass: bool,
}

impl<'a> Gate<'a> {
    pub fn new(confirm: &'a dyn Confirm, bypass: bool) -> Self {
        Self { confirm, bypass }
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Ask the operator, or take `forced` without prompting in forced mode
    pub fn ask(&self, message: &str, default: bool, forced: bool) -> RolloutResult<bool> {
        if self.bypass {
            tracing::debug!(message, answer = forced, "gate bypassed");
            return Ok(forced);
        }
        self.confirm.confirm(message, default)
    }
}
