//! Speech requests and synthesizer parameter translation
//!
//! Preferences store speed and volume as factors ("1.25", "0.5"). The
//! synthesizer wants words per minute and an amplitude percentage, so the
//! translation lives here next to the request it applies to.

/// Synthesizer speed at a factor of 1.0
pub const BASE_WPM: i64 = 175;

/// Amplitude used when the volume factor is unusable
pub const DEFAULT_AMPLITUDE: i64 = 100;

/// Convert a speed factor into words per minute
///
/// Anything that is not a finite, positive number falls back to [`BASE_WPM`].
pub fn words_per_minute(speed_factor: &str) -> i64 {
    match speed_factor.trim().parse::<f64>() {
        Ok(factor) if factor.is_finite() && factor > 0.0 => {
            (BASE_WPM as f64 * factor).round() as i64
        }
        _ => BASE_WPM,
    }
}

/// Convert a volume factor (0.1 - 1.0) into an amplitude percentage
///
/// Anything that is not a finite number falls back to [`DEFAULT_AMPLITUDE`].
pub fn amplitude(volume_factor: &str) -> i64 {
    match volume_factor.trim().parse::<f64>() {
        Ok(factor) if factor.is_finite() => (factor * 100.0).round() as i64,
        _ => DEFAULT_AMPLITUDE,
    }
}

/// One text-to-speech request
///
/// Immutable once built. The caller is expected to drop empty text before
/// building a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
    voice: String,
    speed_factor: String,
    volume_factor: String,
}

impl Utterance {
    pub fn new(
        text: impl Into<String>,
        voice: impl Into<String>,
        speed_factor: impl Into<String>,
        volume_factor: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            speed_factor: speed_factor.into(),
            volume_factor: volume_factor.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn speed_factor(&self) -> &str {
        &self.speed_factor
    }

    pub fn volume_factor(&self) -> &str {
        &self.volume_factor
    }

    pub fn words_per_minute(&self) -> i64 {
        words_per_minute(&self.speed_factor)
    }

    pub fn amplitude(&self) -> i64 {
        amplitude(&self.volume_factor)
    }

    /// Arguments passed to the synthesizer, in order
    ///
    /// `-v <voice> -s <wpm> -a <amplitude> <text>`
    pub fn synth_args(&self) -> Vec<String> {
        vec![
            "-v".to_string(),
            self.voice.clone(),
            "-s".to_string(),
            self.words_per_minute().to_string(),
            "-a".to_string(),
            self.amplitude().to_string(),
            self.text.clone(),
        ]
    }
}
