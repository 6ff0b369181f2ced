//! User-facing error reports
//!
//! Only the foreground thread calls a notifier. Background work reaches it
//! through the dispatcher.

use log::error;
use std::io::Write;

/// Surfaces errors to the user
pub trait Notifier {
    fn report_error(&mut self, title: &str, message: &str);
}

/// Prints errors to the terminal
pub struct ConsoleNotifier<W: Write> {
    out: W,
}

impl ConsoleNotifier<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn report_error(&mut self, title: &str, message: &str) {
        error!("{}: {}", title, message);
        if let Err(e) = writeln!(self.out, "[{}] {}", title, message) {
            error!("Failed to display error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_notifier_format() {
        let mut notifier = ConsoleNotifier::new(Vec::new());
        notifier.report_error("Speech Error", "Failed to speak: boom");
        let out = String::from_utf8(notifier.into_inner()).unwrap();
        assert_eq!(out, "[Speech Error] Failed to speak: boom\n");
    }
}
