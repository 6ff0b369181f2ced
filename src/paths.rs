//! Data directory and file locations

use crate::{Result, StrudelError, APP_NAME};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.txt";
pub const SPEECH_FILE: &str = "speech.txt";
pub const VOICES_FILE: &str = "voices.txt";

/// Files the application reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub dir: PathBuf,
    pub settings: PathBuf,
    pub speech: PathBuf,
    pub voices: PathBuf,
}

impl DataPaths {
    /// Paths inside `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            settings: dir.join(SETTINGS_FILE),
            speech: dir.join(SPEECH_FILE),
            voices: dir.join(VOICES_FILE),
            dir,
        }
    }

    /// Default location (~/.config/strudel on Linux)
    pub fn default_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or_else(|| StrudelError::Config("Could not find config directory".to_string()))
    }

    /// Make sure the directory exists
    pub fn ensure(&self) -> Result<()> {
        debug!("Using data directory {:?}", self.dir);
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
