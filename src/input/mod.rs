//! Console input handling
//!
//! The input system uses a stack-based handler architecture: modal handlers
//! (such as a yes/no prompt) are pushed on `AppState::handlers` and see each
//! line first. With no modal handler active, the command handler runs.

pub mod commands;
pub mod confirm_handler;
pub mod default_handler;
pub mod handler;

pub use commands::{parse_command, Command};
pub use confirm_handler::ConfirmHandler;
pub use default_handler::CommandHandler;
pub use handler::{HandlerAction, HandlerStack, LineHandler};

use crate::state::AppState;
use crate::Result;

/// Feed one line of input through the handler stack
pub fn process_line(
    line: &str,
    state: &mut AppState,
    commands: &mut CommandHandler,
) -> Result<HandlerAction> {
    // Pop the modal handler so it can borrow the state mutably
    if let Some(mut handler) = state.handlers.pop() {
        let action = handler.process(line, state)?;
        match action {
            HandlerAction::Passthrough => {
                state.handlers.push(handler);
            }
            HandlerAction::Handled => {
                state.handlers.push(handler);
                return Ok(action);
            }
            HandlerAction::Remove => return Ok(action),
        }
    }

    commands.process(line, state)
}
