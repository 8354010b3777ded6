//! Interactive Confirm
//!
//! Terminal yes/no prompts via dialoguer. All prompts share one console lock
//! so concurrently running targets never interleave their questions.

use std::sync::Mutex;

use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};
use is_terminal::IsTerminal;

use crate::domain::ports::Confirm;
use crate::error::{RolloutError, RolloutResult};

static CONSOLE: Mutex<()> = Mutex::new(());

/// `Confirm` backed by the operator's terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractiveConfirm {
    color: bool,
}

impl InteractiveConfirm {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn ask(&self, theme: &dyn Theme, message: &str, default: bool) -> RolloutResult<bool> {
        dialoguer::Confirm::with_theme(theme)
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(|e| RolloutError::Prompt(e.to_string()))
    }
}

impl Confirm for InteractiveConfirm {
    fn confirm(&self, message: &str, default: bool) -> RolloutResult<bool> {
        if !std::io::stdin().is_terminal() {
            return Err(RolloutError::Prompt(format!(
                "cannot ask \"{message}\": stdin is not a terminal (use -f for unattended runs)"
            )));
        }

        // recover from a prompt that panicked while holding the lock
        let _guard = CONSOLE.lock().unwrap_or_else(|e| e.into_inner());
        if self.color {
            self.ask(&ColorfulTheme::default(), message, default)
        } else {
            self.ask(&SimpleTheme, message, default)
        }
    }
}
