//! Yes/no confirmation prompt
//!
//! Pushed on the handler stack before destructive commands. The next line
//! answers it: `y` or `yes` runs the callback, anything else cancels.

use super::{HandlerAction, LineHandler};
use crate::state::AppState;
use crate::Result;
use log::debug;

/// Callback run when the user confirms
type OnConfirmFn = Box<dyn FnOnce(&mut AppState) -> Result<()>>;

pub struct ConfirmHandler {
    on_confirm: Option<OnConfirmFn>,
}

impl ConfirmHandler {
    pub fn new(on_confirm: OnConfirmFn) -> Self {
        Self {
            on_confirm: Some(on_confirm),
        }
    }

    /// Print `question` and push a confirmation handler
    pub fn ask(state: &mut AppState, question: &str, on_confirm: OnConfirmFn) {
        state.print(format!("{} [y/N]", question));
        state.handlers.push(Box::new(Self::new(on_confirm)));
    }
}

impl LineHandler for ConfirmHandler {
    fn process(&mut self, line: &str, state: &mut AppState) -> Result<HandlerAction> {
        let answer = line.trim().to_lowercase();
        if answer == "y" || answer == "yes" {
            debug!("Confirmed");
            if let Some(callback) = self.on_confirm.take() {
                callback(state)?;
            }
        } else {
            debug!("Confirmation declined");
            state.print("Cancelled");
        }
        Ok(HandlerAction::Remove)
    }
}
