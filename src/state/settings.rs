//! Preferences store
//!
//! Settings live in a flat `settings.txt`, one `key=value` per line. Keys are
//! split on the first `=` only, so values may contain `=`. Unknown keys are
//! preserved and written back unchanged.

use crate::Result;
use log::{debug, info, warn};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Recognized preference keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Voice,
    Speed,
    Volume,
    Synth,
    DefaultText,
    NumItems,
    Width,
    Height,
    Background,
    Title,
}

impl Setting {
    pub const ALL: [Setting; 10] = [
        Setting::Voice,
        Setting::Speed,
        Setting::Volume,
        Setting::Synth,
        Setting::DefaultText,
        Setting::NumItems,
        Setting::Width,
        Setting::Height,
        Setting::Background,
        Setting::Title,
    ];

    /// Key as written in `settings.txt`
    pub fn key(self) -> &'static str {
        match self {
            Setting::Voice => "voice",
            Setting::Speed => "speed",
            Setting::Volume => "volume",
            Setting::Synth => "synth",
            Setting::DefaultText => "default_text",
            Setting::NumItems => "num_items",
            Setting::Width => "width",
            Setting::Height => "height",
            Setting::Background => "background",
            Setting::Title => "title",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Built-in default. The voice default depends on the voice list and
    /// is resolved by [`Settings`].
    fn default_value(self) -> &'static str {
        match self {
            Setting::Voice => "",
            Setting::Speed => "1.0",
            Setting::Volume => "1.0",
            Setting::Synth => "espeak",
            Setting::DefaultText => "",
            Setting::NumItems => "50",
            Setting::Width => "660",
            Setting::Height => "700",
            Setting::Background => "#2d2d2d",
            Setting::Title => "Strudel",
        }
    }
}

pub const DEFAULT_NUM_ITEMS: usize = 50;
pub const DEFAULT_WIDTH: u32 = 660;
pub const DEFAULT_HEIGHT: u32 = 700;

/// Speed presets as (label, stored value), fastest first
pub const SPEED_CHOICES: [(&str, &str); 8] = [
    ("2.0×", "2.0"),
    ("1.75×", "1.75"),
    ("1.5×", "1.5"),
    ("1.25×", "1.25"),
    ("1.0×", "1.0"),
    ("0.75×", "0.75"),
    ("0.5×", "0.5"),
    ("0.25×", "0.25"),
];

/// Volume presets as (label, stored value), loudest first
pub const VOLUME_CHOICES: [(&str, &str); 10] = [
    ("100%", "1.0"),
    ("90%", "0.9"),
    ("80%", "0.8"),
    ("70%", "0.7"),
    ("60%", "0.6"),
    ("50%", "0.5"),
    ("40%", "0.4"),
    ("30%", "0.3"),
    ("20%", "0.2"),
    ("10%", "0.1"),
];

/// Map a preset label to its stored value; anything else passes through
pub fn choice_value<'a>(choices: &[(&'a str, &'a str)], input: &'a str) -> &'a str {
    choices
        .iter()
        .find(|(label, _)| *label == input)
        .map(|(_, value)| *value)
        .unwrap_or(input)
}

/// Label for a stored value, if it is one of the presets
pub fn choice_label<'a>(choices: &[(&'a str, &'a str)], value: &str) -> Option<&'a str> {
    choices
        .iter()
        .find(|(_, v)| *v == value)
        .map(|(label, _)| *label)
}

/// Parse settings text into ordered key/value pairs
///
/// Lines are trimmed and blank lines dropped. Lines without `=` are
/// reported and skipped.
pub fn parse_settings(text: &str) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = Vec::new();

    for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
        match line.split_once('=') {
            Some((key, value)) => upsert(&mut entries, key, value),
            None => warn!("Ignored malformed setting: {}", line),
        }
    }

    entries
}

fn upsert(entries: &mut Vec<(String, String)>, key: &str, value: &str) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value.to_string(),
        None => entries.push((key.to_string(), value.to_string())),
    }
}

/// User preferences backed by `settings.txt`
#[derive(Debug, Clone)]
pub struct Settings {
    path: PathBuf,
    /// Stored pairs in file order
    entries: Vec<(String, String)>,
    /// First available voice, used when no voice is stored
    default_voice: String,
}

impl Settings {
    /// Load settings from `path`, creating the file if needed
    ///
    /// Read failures are logged and leave every setting at its default.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!("Loading settings from {:?}", path);

        let entries = match read_or_create(&path) {
            Ok(text) => parse_settings(&text),
            Err(e) => {
                warn!("Error loading settings: {}", e);
                Vec::new()
            }
        };

        info!("Loaded {} settings", entries.len());

        Self {
            path,
            entries,
            default_voice: String::new(),
        }
    }

    /// In-memory settings that save to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            default_voice: String::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Voice used when none is stored
    pub fn set_default_voice(&mut self, voice: impl Into<String>) {
        self.default_voice = voice.into();
    }

    /// Raw stored value, without defaults
    pub fn stored(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, setting: Setting) -> bool {
        self.stored(setting.key()).is_some()
    }

    /// Current value, falling back to the default
    pub fn get(&self, setting: Setting) -> &str {
        match self.stored(setting.key()) {
            Some(value) => value,
            None if setting == Setting::Voice => &self.default_voice,
            None => setting.default_value(),
        }
    }

    pub fn set(&mut self, setting: Setting, value: impl Into<String>) {
        self.set_raw(setting.key(), value);
    }

    /// Set any key, recognized or not
    pub fn set_raw(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        debug!("Setting {}={}", key, value);
        upsert(&mut self.entries, key, &value);
    }

    pub fn voice(&self) -> &str {
        self.get(Setting::Voice)
    }

    pub fn speed(&self) -> &str {
        self.get(Setting::Speed)
    }

    pub fn volume(&self) -> &str {
        self.get(Setting::Volume)
    }

    pub fn synth(&self) -> &str {
        self.get(Setting::Synth)
    }

    pub fn default_text(&self) -> &str {
        self.get(Setting::DefaultText)
    }

    pub fn title(&self) -> &str {
        self.get(Setting::Title)
    }

    pub fn background(&self) -> &str {
        self.get(Setting::Background)
    }

    /// Number of rows; unparsable values fall back to 50
    pub fn num_items(&self) -> usize {
        self.get(Setting::NumItems)
            .trim()
            .parse()
            .unwrap_or(DEFAULT_NUM_ITEMS)
    }

    pub fn width(&self) -> u32 {
        self.get(Setting::Width).trim().parse().unwrap_or(DEFAULT_WIDTH)
    }

    pub fn height(&self) -> u32 {
        self.get(Setting::Height).trim().parse().unwrap_or(DEFAULT_HEIGHT)
    }

    /// Settings text as written to disk
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Write all stored pairs to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving settings to {:?}", self.path);
        fs::write(&self.path, self.to_text())?;
        Ok(())
    }
}

/// Read a text file, creating it empty when it does not exist
pub(crate) fn read_or_create(path: &Path) -> std::io::Result<String> {
    OpenOptions::new().create(true).append(true).open(path)?;
    fs::read_to_string(path)
}
