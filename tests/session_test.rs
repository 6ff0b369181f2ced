//! Playback session tests
//!
//! Runs the session against small shell scripts standing in for the
//! synthesizer. Each script logs how it was invoked so the tests can see
//! which processes were started and whether they are still alive.

#![cfg(unix)]

use nix::sys::signal;
use nix::unistd::Pid;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use strudel::speech::{PlaybackSession, SpeechListener, Utterance};
use strudel::ui::{channel, TaskQueue};
use tempfile::TempDir;

/// Scripts are written and then executed; keep that from racing a fork in
/// another test thread.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Recorder {
    errors: Vec<(String, String)>,
    voices: Vec<String>,
}

impl SpeechListener for Recorder {
    fn on_speech_error(&mut self, title: &str, message: &str) {
        self.errors.push((title.to_string(), message.to_string()));
    }

    fn on_voice_used(&mut self, voice: &str) {
        self.voices.push(voice.to_string());
    }
}

fn write_synth(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("synth.sh");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn session(synth: &Path) -> (PlaybackSession<Recorder>, TaskQueue<Recorder>) {
    let (dispatcher, queue) = channel::<Recorder>();
    let session = PlaybackSession::new(synth.to_str().unwrap(), dispatcher);
    (session, queue)
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

fn is_alive(pid: i32) -> bool {
    signal::kill(Pid::from_raw(pid), None).is_ok()
}

/// (pid, words per minute) for every logged launch
fn launches(log: &Path) -> Vec<(i32, String)> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let pid = parts.next()?.parse().ok()?;
            let wpm = parts.next()?.to_string();
            Some((pid, wpm))
        })
        .collect()
}

#[test]
fn test_passes_arguments_in_order() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("args.log");
    let synth = write_synth(dir.path(), &format!("printf '%s\\n' \"$@\" > {:?}", log));

    let (session, queue) = session(&synth);
    session.speak(Utterance::new("Hello, world", "en-us", "1.25", "0.5"));

    let mut recorder = Recorder::default();
    assert!(queue.run_next(&mut recorder, Duration::from_secs(5)));

    let args = fs::read_to_string(&log).unwrap();
    assert_eq!(
        args.lines().collect::<Vec<_>>(),
        vec!["-v", "en-us", "-s", "219", "-a", "50", "Hello, world"]
    );
}

#[test]
fn test_clean_exit_reports_voice() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let synth = write_synth(dir.path(), "exit 0");

    let (session, queue) = session(&synth);
    session.speak(Utterance::new("hi", "en-gb", "1.0", "1.0"));

    let mut recorder = Recorder::default();
    assert!(queue.run_next(&mut recorder, Duration::from_secs(5)));
    assert!(recorder.errors.is_empty());
    assert_eq!(recorder.voices, vec!["en-gb"]);
    assert!(wait_until(|| !session.is_speaking()));
}

#[test]
fn test_failure_with_diagnostic_reports_error() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let synth = write_synth(dir.path(), "echo 'voice not found' >&2\nexit 1");

    let (session, queue) = session(&synth);
    session.speak(Utterance::new("hi", "xx", "1.0", "1.0"));

    let mut recorder = Recorder::default();
    assert!(queue.run_next(&mut recorder, Duration::from_secs(5)));
    assert_eq!(
        recorder.errors,
        vec![(
            "Speech Error".to_string(),
            "Failed to speak: voice not found".to_string()
        )]
    );
    assert!(recorder.voices.is_empty());

    thread::sleep(Duration::from_millis(100));
    assert_eq!(queue.run_pending(&mut recorder), 0);
}

#[test]
fn test_silent_failure_is_not_an_error() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let synth = write_synth(dir.path(), "exit 3");

    let (session, queue) = session(&synth);
    session.speak(Utterance::new("hi", "en", "1.0", "1.0"));

    let mut recorder = Recorder::default();
    assert!(queue.run_next(&mut recorder, Duration::from_secs(5)));
    assert!(recorder.errors.is_empty());
    assert_eq!(recorder.voices, vec!["en"]);
}

#[test]
fn test_diagnostic_on_success_is_ignored() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let synth = write_synth(dir.path(), "echo 'just a warning' >&2\nexit 0");

    let (session, queue) = session(&synth);
    session.speak(Utterance::new("hi", "en", "1.0", "1.0"));

    let mut recorder = Recorder::default();
    assert!(queue.run_next(&mut recorder, Duration::from_secs(5)));
    assert!(recorder.errors.is_empty());
    assert_eq!(recorder.voices, vec!["en"]);
}

#[test]
fn test_speak_returns_before_playback_ends() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let synth = write_synth(dir.path(), "exec sleep 5");

    let (session, _queue) = session(&synth);
    let started = Instant::now();
    session.speak(Utterance::new("a long sentence", "en", "1.0", "1.0"));
    assert!(started.elapsed() < Duration::from_secs(1));

    assert!(wait_until(|| session.is_speaking()));
    session.stop();
    assert!(!session.is_speaking());
}

#[test]
fn test_new_utterance_replaces_current() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("launch.log");
    let synth = write_synth(
        dir.path(),
        &format!("echo \"$$ $4\" >> {:?}\nexec sleep 5", log),
    );

    let (session, queue) = session(&synth);
    session.speak(Utterance::new("first", "en", "1.0", "1.0"));
    session.speak(Utterance::new("second", "en", "2.0", "1.0"));

    assert!(wait_until(|| launches(&log).iter().any(|(_, wpm)| wpm == "350")));
    assert!(wait_until(|| session.current_pid().is_some()));

    let all = launches(&log);
    let current = session.current_pid().unwrap() as i32;
    let (_, wpm) = all.iter().find(|(pid, _)| *pid == current).unwrap();
    assert_eq!(wpm, "350");

    // The first utterance either never started or has been stopped
    for (pid, wpm) in &all {
        if wpm == "175" {
            assert!(!is_alive(*pid), "first synthesizer {} still running", pid);
        }
    }
    assert_eq!(all.iter().filter(|(pid, _)| is_alive(*pid)).count(), 1);

    session.stop();
    assert!(!session.is_speaking());
    assert!(!is_alive(current));

    // Stopped utterances report nothing
    thread::sleep(Duration::from_millis(200));
    let mut recorder = Recorder::default();
    assert_eq!(queue.run_pending(&mut recorder), 0);
}

#[test]
fn test_stop_kills_after_grace_period() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let ready = dir.path().join("ready");
    let synth = write_synth(
        dir.path(),
        &format!(
            "trap '' TERM\ntouch {:?}\nwhile :; do sleep 0.05; done",
            ready
        ),
    );

    let (dispatcher, queue) = channel::<Recorder>();
    let session = PlaybackSession::new(synth.to_str().unwrap(), dispatcher)
        .with_grace_period(Duration::from_millis(200));
    session.speak(Utterance::new("stubborn", "en", "1.0", "1.0"));

    assert!(wait_until(|| ready.exists()));
    let pid = session.current_pid().unwrap() as i32;

    let started = Instant::now();
    session.stop();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(3));
    assert!(!is_alive(pid));

    thread::sleep(Duration::from_millis(200));
    let mut recorder = Recorder::default();
    assert_eq!(queue.run_pending(&mut recorder), 0);
}

#[test]
fn test_stop_when_idle_is_harmless() {
    let (dispatcher, queue) = channel::<Recorder>();
    let session = PlaybackSession::new("espeak", dispatcher);

    session.stop();
    assert!(!session.is_speaking());

    let mut recorder = Recorder::default();
    assert_eq!(queue.run_pending(&mut recorder), 0);
}
