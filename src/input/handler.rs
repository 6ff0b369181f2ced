//! Line handler system with modal input support

use crate::state::AppState;
use crate::Result;

/// Action to take after processing a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerAction {
    /// Let the command handler interpret the line
    Passthrough,
    /// Remove this handler from the stack
    Remove,
    /// Line was handled, do nothing more
    Handled,
}

/// A line handler processes one line of console input
pub trait LineHandler {
    fn process(&mut self, line: &str, state: &mut AppState) -> Result<HandlerAction>;
}

/// Stack of line handlers (last one processes input first)
pub struct HandlerStack {
    handlers: Vec<Box<dyn LineHandler>>,
}

impl HandlerStack {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn push(&mut self, handler: Box<dyn LineHandler>) {
        self.handlers.push(handler);
    }

    pub fn pop(&mut self) -> Option<Box<dyn LineHandler>> {
        self.handlers.pop()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerStack {
    fn default() -> Self {
        Self::new()
    }
}
