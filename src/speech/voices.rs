//! Available synthesizer voices
//!
//! Voices come from `voices.txt` when it lists any; otherwise the
//! synthesizer is asked directly with `--voices=en`.

use crate::state::settings::read_or_create;
use log::{debug, info, warn};
use std::path::Path;
use std::process::{Command, Stdio};

/// Voice offered when the voice list itself cannot be read
pub const FALLBACK_VOICE: &str = "default";

/// Load the voice list from `path`, querying `synth` when the file is empty
pub fn load_voices(path: &Path, synth: &str) -> Vec<String> {
    let contents = match read_or_create(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Error loading voices from {:?}: {}", path, e);
            return vec![FALLBACK_VOICE.to_string()];
        }
    };

    let voices = parse_voice_file(&contents);
    if !voices.is_empty() {
        debug!("Loaded {} voices from {:?}", voices.len(), path);
        return voices;
    }

    let voices = query_synth_voices(synth);
    info!("Synthesizer '{}' reported {} voices", synth, voices.len());
    voices
}

/// One voice per line, blank lines ignored
pub fn parse_voice_file(contents: &str) -> Vec<String> {
    contents
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ask the synthesizer for its English voices
pub fn query_synth_voices(synth: &str) -> Vec<String> {
    let output = Command::new(synth)
        .arg("--voices=en")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(output) => parse_voice_listing(&String::from_utf8_lossy(&output.stdout)),
        Err(e) => {
            warn!("Error getting synth voices from '{}': {}", synth, e);
            Vec::new()
        }
    }
}

/// Parse `--voices` output: skip the header, take the 4th column
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  2  en-gb           M  english              en             (en 2)
/// ```
pub fn parse_voice_listing(listing: &str) -> Vec<String> {
    listing
        .split('\n')
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(3))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_voice_file() {
        let voices = parse_voice_file("en-us\n\n  en-gb  \nfr\n");
        assert_eq!(voices, vec!["en-us", "en-gb", "fr"]);
        assert!(parse_voice_file("\n \n").is_empty());
    }

    #[test]
    fn test_parse_voice_listing() {
        let listing = "Pty Language Age/Gender VoiceName File Other Languages\n \
                        5  en-029 --/M English_(Caribbean) gmw/en-029 (en 10)\n \
                        2  en-gb  --/M English_(Great_Britain) gmw/en (en 2)\n\
                        \n \
                        short line\n";
        assert_eq!(
            parse_voice_listing(listing),
            vec!["English_(Caribbean)", "English_(Great_Britain)"]
        );
    }

    #[test]
    fn test_missing_synth_yields_no_voices() {
        assert!(query_synth_voices("/nonexistent/strudel-synth").is_empty());
    }
}
