//! Strudel - speak saved phrases from the terminal
//!
//! Keeps a fixed list of editable text rows and speaks any of them on demand
//! through an external command-line synthesizer such as espeak.

pub mod error;
pub mod input;
pub mod paths;
pub mod speech;
pub mod state;
pub mod ui;

pub use error::{Result, StrudelError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "strudel";
