//! Default command handler
//!
//! Interprets console commands against the application state when no modal
//! handler is active.

use super::commands::{parse_command, Command};
use super::confirm_handler::ConfirmHandler;
use super::{HandlerAction, LineHandler};
use crate::state::settings::{SPEED_CHOICES, VOLUME_CHOICES};
use crate::state::AppState;
use crate::ui::view;
use crate::Result;
use log::debug;

pub struct CommandHandler;

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHandler {
    pub fn new() -> Self {
        Self
    }

    /// Run a parsed command
    pub fn execute(&mut self, command: Command, state: &mut AppState) -> Result<()> {
        debug!("Command: {:?}", command);

        match command {
            Command::Speak(index) => state.speak_row(index)?,
            Command::SpeakDefault => {
                if state.speak_default()?.is_none() {
                    state.print("Nothing to speak");
                }
            }
            Command::Edit(index, text) => {
                state.edit_row(index, &text)?;
                Self::show_rows(state);
            }
            Command::Up(index) => {
                if state.move_up(index)? {
                    Self::show_rows(state);
                }
            }
            Command::Down(index) => {
                if state.move_down(index)? {
                    Self::show_rows(state);
                }
            }
            Command::Filter(query) => {
                state.apply_filter(&query);
                Self::show_rows(state);
            }
            Command::ClearFilter => {
                state.clear_filter();
                Self::show_rows(state);
            }
            Command::Voice(Some(voice)) => {
                if !state.voices.is_empty() && !state.voices.iter().any(|v| *v == voice) {
                    state.print(format!("Note: '{}' is not in the voice list", voice));
                }
                state.set_voice(&voice);
                Self::show_status(state);
            }
            Command::Voice(None) => {
                let lines = view::voice_lines(&state.voices, &state.voice);
                lines.into_iter().for_each(|line| state.print(line));
            }
            Command::Speed(Some(speed)) => {
                state.set_speed(&speed);
                Self::show_status(state);
            }
            Command::Speed(None) => {
                let line = view::choice_line(&SPEED_CHOICES, state.settings.speed());
                state.print(line);
            }
            Command::Volume(Some(volume)) => {
                state.set_volume(&volume);
                Self::show_status(state);
            }
            Command::Volume(None) => {
                let line = view::choice_line(&VOLUME_CHOICES, state.settings.volume());
                state.print(line);
            }
            Command::List => Self::show_rows(state),
            Command::Stop => state.stop_speech(),
            Command::Save => {
                if state.save_all() {
                    state.print("Saved");
                }
            }
            Command::Reset => ConfirmHandler::ask(
                state,
                "Are you sure you want to reset all inputs to default?",
                Box::new(|state: &mut AppState| {
                    state.reset();
                    Self::show_rows(state);
                    Ok(())
                }),
            ),
            Command::Help => view::HELP.iter().for_each(|line| state.print(*line)),
            Command::Quit => state.shutdown(),
        }

        Ok(())
    }

    fn show_status(state: &mut AppState) {
        let line = view::status_line(&state.settings, &state.voice, &state.filter);
        state.print(line);
    }

    fn show_rows(state: &mut AppState) {
        Self::show_status(state);
        let lines = view::row_lines(&state.rows, &state.filter, state.focused);
        lines.into_iter().for_each(|line| state.print(line));
    }
}

impl LineHandler for CommandHandler {
    fn process(&mut self, line: &str, state: &mut AppState) -> Result<HandlerAction> {
        let command = parse_command(line)?;
        self.execute(command, state)?;
        Ok(HandlerAction::Handled)
    }
}
