//! Input system tests
//!
//! Tests the line handler stack, the confirmation prompt and command
//! dispatch against a state in a temporary directory.

use std::fs;
use strudel::input::{
    parse_command, process_line, Command, CommandHandler, HandlerAction, HandlerStack,
    LineHandler,
};
use strudel::paths::DataPaths;
use strudel::state::AppState;
use strudel::ui::{channel, ConsoleNotifier};
use strudel::Result;
use tempfile::TempDir;

struct TestHandler {
    handled: bool,
}

impl LineHandler for TestHandler {
    fn process(&mut self, line: &str, _state: &mut AppState) -> Result<HandlerAction> {
        if line.trim() == "x" {
            self.handled = true;
            Ok(HandlerAction::Remove)
        } else {
            Ok(HandlerAction::Passthrough)
        }
    }
}

fn state(dir: &TempDir, speech: &str) -> AppState {
    fs::write(dir.path().join("settings.txt"), "num_items=3\ndefault_text=Hi").unwrap();
    fs::write(dir.path().join("speech.txt"), speech).unwrap();
    fs::write(dir.path().join("voices.txt"), "en-a\nen-b\n").unwrap();

    let (dispatcher, _queue) = channel::<AppState>();
    AppState::new(
        DataPaths::in_dir(dir.path()),
        Box::new(ConsoleNotifier::new(Vec::new())),
        dispatcher,
    )
}

#[test]
fn test_handler_stack() {
    let mut stack = HandlerStack::new();
    assert_eq!(stack.len(), 0);
    assert!(stack.is_empty());

    stack.push(Box::new(TestHandler { handled: false }));
    assert_eq!(stack.len(), 1);

    assert!(stack.pop().is_some());
    assert!(stack.pop().is_none());
}

#[test]
fn test_modal_handler_passthrough_and_remove() {
    let dir = TempDir::new().unwrap();
    let mut state = state(&dir, "one\ntwo\nthree");
    let mut commands = CommandHandler::new();
    state.handlers.push(Box::new(TestHandler { handled: false }));

    // Not for the modal handler, so the command handler runs it
    let action = process_line("filter two\n", &mut state, &mut commands).unwrap();
    assert_eq!(action, HandlerAction::Handled);
    assert_eq!(state.handlers.len(), 1);
    assert!(state.filter.is_active());

    let action = process_line("x\n", &mut state, &mut commands).unwrap();
    assert_eq!(action, HandlerAction::Remove);
    assert!(state.handlers.is_empty());
}

#[test]
fn test_reset_asks_first() {
    let dir = TempDir::new().unwrap();
    let mut state = state(&dir, "one\ntwo\nthree");
    let mut commands = CommandHandler::new();

    process_line("reset", &mut state, &mut commands).unwrap();
    assert_eq!(state.handlers.len(), 1);
    let output = state.take_output();
    assert!(output.last().unwrap().ends_with("[y/N]"));

    process_line("n", &mut state, &mut commands).unwrap();
    assert!(state.handlers.is_empty());
    assert_eq!(state.take_output(), vec!["Cancelled"]);
    assert_eq!(state.rows.get(0), Some("one"));

    process_line("reset", &mut state, &mut commands).unwrap();
    process_line("yes", &mut state, &mut commands).unwrap();
    assert!(state.handlers.is_empty());
    assert_eq!(state.rows.iter().collect::<Vec<_>>(), vec!["Hi", "Hi", "Hi"]);
}

#[test]
fn test_edit_and_move_commands() {
    let dir = TempDir::new().unwrap();
    let mut state = state(&dir, "one\ntwo\nthree");
    let mut commands = CommandHandler::new();

    process_line("edit 2 Hello, again!", &mut state, &mut commands).unwrap();
    assert_eq!(state.rows.get(1), Some("Hello, again!"));

    process_line("up 2", &mut state, &mut commands).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("speech.txt")).unwrap(),
        "Hello, again!\none\nthree"
    );

    assert!(process_line("down 9", &mut state, &mut commands).is_err());
}

#[test]
fn test_preference_commands() {
    let dir = TempDir::new().unwrap();
    let mut state = state(&dir, "");
    let mut commands = CommandHandler::new();

    process_line("speed 1.5×", &mut state, &mut commands).unwrap();
    process_line("volume 40%", &mut state, &mut commands).unwrap();
    process_line("voice en-b", &mut state, &mut commands).unwrap();

    assert_eq!(state.settings.speed(), "1.5");
    assert_eq!(state.settings.volume(), "0.4");
    assert_eq!(state.voice, "en-b");

    state.take_output();
    process_line("voice zz", &mut state, &mut commands).unwrap();
    let output = state.take_output();
    assert!(output[0].contains("not in the voice list"));
    assert_eq!(state.voice, "zz");
}

#[test]
fn test_quit_saves() {
    let dir = TempDir::new().unwrap();
    let mut state = state(&dir, "one");
    let mut commands = CommandHandler::new();

    process_line("edit 3 last", &mut state, &mut commands).unwrap();
    process_line("quit", &mut state, &mut commands).unwrap();

    assert!(!state.is_running());
    assert_eq!(
        fs::read_to_string(dir.path().join("speech.txt")).unwrap(),
        "one\nHi\nlast"
    );
}

#[test]
fn test_parse_command_aliases() {
    assert_eq!(parse_command("").unwrap(), Command::SpeakDefault);
    assert_eq!(parse_command("3").unwrap(), Command::Speak(2));
    assert_eq!(parse_command("say 1").unwrap(), Command::Speak(0));
    assert_eq!(parse_command("q").unwrap(), Command::Quit);
    assert_eq!(parse_command("exit").unwrap(), Command::Quit);
    assert!(parse_command("say 0").is_err());
    assert!(parse_command("bogus").is_err());
}
