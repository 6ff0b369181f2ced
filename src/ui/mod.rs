//! Console user interface plumbing

pub mod dispatch;
pub mod notifier;
pub mod view;

pub use dispatch::{channel, Dispatcher, TaskQueue};
pub use notifier::{ConsoleNotifier, Notifier};
