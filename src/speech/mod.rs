//! Speech synthesis through an external synthesizer process

pub mod session;
pub mod utterance;
pub mod voices;

pub use session::{PlaybackSession, SpeechListener, DEFAULT_GRACE_PERIOD};
pub use utterance::{amplitude, words_per_minute, Utterance, BASE_WPM, DEFAULT_AMPLITUDE};
pub use voices::load_voices;
