//! Application state management
//!
//! `AppState` owns everything the foreground thread works with: preferences,
//! rows, voices, the filter and the playback session. It is built in a fixed
//! order (settings, rows, voices, session) and torn down through
//! [`AppState::shutdown`].

pub mod filter;
pub mod rows;
pub mod settings;

use crate::input::HandlerStack;
use crate::paths::DataPaths;
use crate::speech::{load_voices, PlaybackSession, SpeechListener, Utterance};
use crate::ui::dispatch::Dispatcher;
use crate::ui::notifier::Notifier;
use crate::Result;
use filter::RowFilter;
use log::{debug, info};
use rows::RowList;
use settings::{choice_value, Setting, Settings, SPEED_CHOICES, VOLUME_CHOICES};

/// Main application state
pub struct AppState {
    pub paths: DataPaths,

    /// Preferences from settings.txt
    pub settings: Settings,

    /// Speakable rows from speech.txt
    pub rows: RowList,

    /// Voices offered to the user
    pub voices: Vec<String>,

    /// Voice chosen for the next utterance. It is stored in the settings
    /// once an utterance with it completes.
    pub voice: String,

    /// Active substring filter
    pub filter: RowFilter,

    /// Modal line handlers (confirmation prompts)
    pub handlers: HandlerStack,

    /// Row the user last spoke or edited
    pub focused: Option<usize>,

    session: PlaybackSession<AppState>,
    notifier: Box<dyn Notifier>,
    output: Vec<String>,
    running: bool,
}

impl AppState {
    /// Load everything from `paths` and start an idle playback session
    pub fn new(
        paths: DataPaths,
        notifier: Box<dyn Notifier>,
        dispatcher: Dispatcher<AppState>,
    ) -> Self {
        let mut settings = Settings::load(&paths.settings);
        let rows = RowList::load(&paths.speech, settings.num_items(), settings.default_text());
        let voices = load_voices(&paths.voices, settings.synth());

        if let Some(first) = voices.first() {
            settings.set_default_voice(first.clone());
        }

        info!("Synthesizer: {}", settings.synth());
        info!("Voices available: {}", voices.len());
        info!("Rows: {}", rows.len());

        let voice = settings.voice().to_string();
        let session = PlaybackSession::new(settings.synth(), dispatcher);

        Self {
            paths,
            settings,
            rows,
            voices,
            voice,
            filter: RowFilter::new(),
            handlers: HandlerStack::new(),
            focused: None,
            session,
            notifier,
            output: Vec::new(),
            running: true,
        }
    }

    pub fn session(&self) -> &PlaybackSession<AppState> {
        &self.session
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Queue a line of console output
    pub fn print(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    /// Take queued console output
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    pub fn report_error(&mut self, title: &str, message: &str) {
        self.notifier.report_error(title, message);
    }

    /// Speak one row. Blank rows are silently skipped.
    pub fn speak_row(&mut self, index: usize) -> Result<()> {
        let text = self
            .rows
            .text(index)
            .ok_or(crate::StrudelError::RowOutOfRange {
                index,
                len: self.rows.len(),
            })?
            .to_string();

        self.focused = Some(index);

        if text.is_empty() {
            debug!("Row {} is empty, nothing to speak", index);
            return Ok(());
        }

        let utterance = Utterance::new(
            text,
            self.voice.as_str(),
            self.settings.speed(),
            self.settings.volume(),
        );
        self.session.speak(utterance);
        Ok(())
    }

    /// Speak the focused row, or else the first visible row with text
    ///
    /// Returns the row that was chosen, if any.
    pub fn speak_default(&mut self) -> Result<Option<usize>> {
        if let Some(index) = self.focused.filter(|&i| self.filter.is_visible(i)) {
            self.speak_row(index)?;
            return Ok(Some(index));
        }

        let first = self
            .filter
            .visible(self.rows.len())
            .into_iter()
            .find(|&i| self.rows.text(i).is_some_and(|t| !t.is_empty()));

        match first {
            Some(index) => {
                self.speak_row(index)?;
                Ok(Some(index))
            }
            None => Ok(None),
        }
    }

    pub fn stop_speech(&self) {
        self.session.stop();
    }

    pub fn edit_row(&mut self, index: usize, text: &str) -> Result<()> {
        self.rows.set_text(index, text)?;
        self.focused = Some(index);
        self.filter.reapply(&self.rows);
        Ok(())
    }

    /// Swap a row with the one above. Rows are saved before and after.
    pub fn move_up(&mut self, index: usize) -> Result<bool> {
        self.save_rows();
        let moved = self.rows.move_up(index)?;
        if moved {
            self.focused = Some(index - 1);
            self.save_rows();
        }
        self.filter.reapply(&self.rows);
        Ok(moved)
    }

    /// Swap a row with the one below. Rows are saved before and after.
    pub fn move_down(&mut self, index: usize) -> Result<bool> {
        self.save_rows();
        let moved = self.rows.move_down(index)?;
        if moved {
            self.focused = Some(index + 1);
            self.save_rows();
        }
        self.filter.reapply(&self.rows);
        Ok(moved)
    }

    pub fn apply_filter(&mut self, query: &str) {
        self.filter.apply(query, &self.rows);
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    /// Select the voice for the next utterance
    pub fn set_voice(&mut self, voice: &str) {
        self.voice = voice.trim().to_string();
    }

    /// Accepts a preset label ("1.5×") or a raw factor
    pub fn set_speed(&mut self, speed: &str) {
        let value = choice_value(&SPEED_CHOICES, speed.trim());
        self.settings.set(Setting::Speed, value);
    }

    /// Accepts a preset label ("50%") or a raw factor
    pub fn set_volume(&mut self, volume: &str) {
        let value = choice_value(&VOLUME_CHOICES, volume.trim());
        self.settings.set(Setting::Volume, value);
    }

    /// Save rows, reporting failures to the user
    pub fn save_rows(&mut self) -> bool {
        match self.rows.save() {
            Ok(()) => true,
            Err(e) => {
                self.report_error("Error", &format!("Failed to save speech: {}", e));
                false
            }
        }
    }

    /// Save settings, reporting failures to the user
    pub fn save_settings(&mut self) -> bool {
        match self.settings.save() {
            Ok(()) => true,
            Err(e) => {
                self.report_error("Error", &format!("Failed to save settings: {}", e));
                false
            }
        }
    }

    pub fn save_all(&mut self) -> bool {
        let rows = self.save_rows();
        let settings = self.save_settings();
        rows && settings
    }

    /// Put rows and preferences back to their defaults and save
    pub fn reset(&mut self) {
        info!("Resetting rows and preferences");
        let default_text = self.settings.default_text().to_string();
        self.rows.reset(&default_text);
        self.focused = None;

        if let Some(first) = self.voices.first().cloned() {
            self.settings.set(Setting::Voice, first.as_str());
            self.voice = first;
        }
        if self.settings.contains(Setting::Speed) {
            self.settings.set(Setting::Speed, "1.0");
        }
        if self.settings.contains(Setting::Volume) {
            self.settings.set(Setting::Volume, "1.0");
        }

        self.clear_filter();
        self.save_all();
    }

    /// Stop playback, then flush rows and settings
    pub fn shutdown(&mut self) {
        info!("Shutting down");
        self.session.stop();
        self.clear_filter();
        self.save_rows();
        self.save_settings();
        self.running = false;
    }
}

impl SpeechListener for AppState {
    fn on_speech_error(&mut self, title: &str, message: &str) {
        self.report_error(title, message);
    }

    fn on_voice_used(&mut self, voice: &str) {
        if self.settings.voice() != voice {
            info!("Remembering voice '{}'", voice);
            self.settings.set(Setting::Voice, voice);
            self.save_settings();
        }
    }
}
