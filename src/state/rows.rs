//! Speakable rows backed by `speech.txt`
//!
//! One row per line. Empty lines are real rows and survive load and save.
//! Only rows past the end of the file are padded with the default text.

use super::settings::read_or_create;
use crate::{Result, StrudelError};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed-size list of editable rows
#[derive(Debug, Clone)]
pub struct RowList {
    path: PathBuf,
    /// Stored rows. May be longer than `num_items`; the tail is kept on save.
    rows: Vec<String>,
    num_items: usize,
}

impl RowList {
    /// Load rows from `path`, padding with `default_text` up to `num_items`
    pub fn load(path: impl Into<PathBuf>, num_items: usize, default_text: &str) -> Self {
        let path = path.into();
        debug!("Loading speech rows from {:?}", path);

        let rows = match read_or_create(&path) {
            Ok(text) => {
                let mut rows = parse_rows(&text);
                if rows.len() < num_items {
                    rows.resize(num_items, default_text.to_string());
                }
                rows
            }
            Err(e) => {
                warn!("Error loading speech: {}", e);
                vec![default_text.to_string(); num_items]
            }
        };

        info!("Loaded {} speech rows", rows.len());
        Self {
            path,
            rows,
            num_items,
        }
    }

    /// Rows held in memory only until saved
    pub fn from_rows(path: impl Into<PathBuf>, rows: Vec<String>, num_items: usize) -> Self {
        let mut rows = rows;
        if rows.len() < num_items {
            rows.resize(num_items, String::new());
        }
        Self {
            path: path.into(),
            rows,
            num_items,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows presented to the user
    pub fn len(&self) -> usize {
        self.num_items
    }

    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    /// Raw row text as stored
    pub fn get(&self, index: usize) -> Option<&str> {
        if index < self.num_items {
            self.rows.get(index).map(String::as_str)
        } else {
            None
        }
    }

    /// Row text with surrounding whitespace removed
    pub fn text(&self, index: usize) -> Option<&str> {
        self.get(index).map(str::trim)
    }

    /// Visible rows in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().take(self.num_items).map(String::as_str)
    }

    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        self.check(index)?;
        self.rows[index] = text.into();
        Ok(())
    }

    /// Swap a row with the one above it. Returns false for the first row.
    pub fn move_up(&mut self, index: usize) -> Result<bool> {
        self.check(index)?;
        if index == 0 {
            return Ok(false);
        }
        self.rows.swap(index, index - 1);
        Ok(true)
    }

    /// Swap a row with the one below it. Returns false for the last row.
    pub fn move_down(&mut self, index: usize) -> Result<bool> {
        self.check(index)?;
        if index + 1 >= self.num_items {
            return Ok(false);
        }
        self.rows.swap(index, index + 1);
        Ok(true)
    }

    /// Set every visible row to `default_text`
    pub fn reset(&mut self, default_text: &str) {
        for row in self.rows.iter_mut().take(self.num_items) {
            *row = default_text.to_string();
        }
    }

    /// Text as written to `speech.txt`
    pub fn to_text(&self) -> String {
        self.rows.join("\n")
    }

    pub fn save(&self) -> Result<()> {
        debug!("Saving {} speech rows to {:?}", self.rows.len(), self.path);
        fs::write(&self.path, self.to_text())?;
        Ok(())
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.num_items {
            Ok(())
        } else {
            Err(StrudelError::RowOutOfRange {
                index,
                len: self.num_items,
            })
        }
    }
}

/// Split stored text into rows, trimming each but keeping empty ones
pub fn parse_rows(text: &str) -> Vec<String> {
    text.split('\n').map(|line| line.trim().to_string()).collect()
}
