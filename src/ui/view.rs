//! Text rendering for the console

use crate::state::filter::RowFilter;
use crate::state::rows::RowList;
use crate::state::settings::{choice_label, Settings, SPEED_CHOICES, VOLUME_CHOICES};

pub const HELP: &[&str] = &[
    "Commands:",
    "  <n> | say <n>       speak row n",
    "  <Enter>             speak the current row, or the first row with text",
    "  edit <n> <text>     replace the text of row n",
    "  up <n> | down <n>   move row n",
    "  filter <text>       show only rows containing text",
    "  clear               show all rows",
    "  voice [name]        choose a voice, or list voices",
    "  speed [value]       choose a speed (e.g. 1.25 or 1.25×)",
    "  volume [value]      choose a volume (e.g. 0.5 or 50%)",
    "  list                show the rows",
    "  stop                stop speaking",
    "  save                save rows and settings",
    "  reset               restore defaults",
    "  quit                save and exit",
];

/// One-line summary of the current preferences
pub fn status_line(settings: &Settings, voice: &str, filter: &RowFilter) -> String {
    let speed = choice_label(&SPEED_CHOICES, settings.speed()).unwrap_or(settings.speed());
    let volume = choice_label(&VOLUME_CHOICES, settings.volume()).unwrap_or(settings.volume());
    let voice = if voice.is_empty() { "(none)" } else { voice };

    let mut line = format!(
        "{} | voice: {} | speed: {} | volume: {}",
        settings.title(),
        voice,
        speed,
        volume
    );
    if filter.is_active() {
        line.push_str(&format!(" | filter: \"{}\"", filter.query()));
    }
    line
}

/// Visible rows, numbered from 1, with the focused row marked
pub fn row_lines(rows: &RowList, filter: &RowFilter, focused: Option<usize>) -> Vec<String> {
    let visible = filter.visible(rows.len());
    if visible.is_empty() {
        return vec!["(no matching rows)".to_string()];
    }

    let width = rows.len().to_string().len();
    visible
        .into_iter()
        .map(|i| {
            let marker = if focused == Some(i) { '>' } else { ' ' };
            let text = rows.get(i).unwrap_or("");
            format!("{}{:>width$}  {}", marker, i + 1, text, width = width)
                .trim_end()
                .to_string()
        })
        .collect()
}

/// Voice list with the current voice marked
pub fn voice_lines(voices: &[String], current: &str) -> Vec<String> {
    if voices.is_empty() {
        return vec!["(no voices found)".to_string()];
    }
    voices
        .iter()
        .map(|v| {
            let marker = if v == current { '*' } else { ' ' };
            format!("{} {}", marker, v)
        })
        .collect()
}

/// Preset labels with the current value marked
pub fn choice_line(choices: &[(&str, &str)], current: &str) -> String {
    choices
        .iter()
        .map(|(label, value)| {
            if *value == current {
                format!("[{}]", label)
            } else {
                label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
