//! Playback session for the external speech synthesizer
//!
//! At most one synthesizer process is alive under a session. Every
//! [`PlaybackSession::speak`] first stops the previous utterance, then hands
//! the new one to a one-shot worker thread that launches the synthesizer,
//! waits for it and reports back to the foreground through a [`Dispatcher`].
//!
//! Two locks are involved:
//! - the slot lock guards the "current process" handle and the launch
//!   generation, and is only held to read or replace them;
//! - each process has its own child lock, held while polling or signalling,
//!   so a signal is never delivered to a pid that has already been reaped.

use super::utterance::Utterance;
use crate::ui::dispatch::Dispatcher;
use log::{debug, error, info, warn};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::io::{self, Read};
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// How long `stop()` waits after SIGTERM before killing
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Exit polling interval for workers and `stop()`
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Receives the outcome of an utterance on the foreground thread
pub trait SpeechListener: 'static {
    /// The synthesizer failed; surface it to the user
    fn on_speech_error(&mut self, title: &str, message: &str);

    /// The synthesizer finished without a reportable error using `voice`
    fn on_voice_used(&mut self, voice: &str);
}

/// A launched synthesizer process
struct LiveProcess {
    child: Mutex<Child>,
    pid: u32,
    /// Set by `stop()`; the worker stays quiet for cancelled utterances
    cancelled: AtomicBool,
}

impl LiveProcess {
    fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child: Mutex::new(child),
            pid,
            cancelled: AtomicBool::new(false),
        }
    }

    fn lock_child(&self) -> MutexGuard<'_, Child> {
        lock(&self.child)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Poll until the process exits, releasing the child lock between polls
    fn wait(&self) -> io::Result<ExitStatus> {
        loop {
            if let Some(status) = self.lock_child().try_wait()? {
                return Ok(status);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// SIGTERM, bounded wait, then SIGKILL. Failures are logged and dropped.
    fn terminate(&self, grace: Duration) {
        self.cancelled.store(true, Ordering::SeqCst);

        {
            let mut child = self.lock_child();
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!("Synthesizer pid {} already exited ({})", self.pid, status);
                    return;
                }
                Ok(None) => {}
                Err(e) => debug!("Failed to poll synthesizer pid {}: {}", self.pid, e),
            }

            debug!("Sending SIGTERM to synthesizer pid {}", self.pid);
            if let Err(e) = signal::kill(Pid::from_raw(self.pid as i32), Signal::SIGTERM) {
                debug!("SIGTERM to pid {} failed: {}", self.pid, e);
            }
        }

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            thread::sleep(POLL_INTERVAL);
            if let Ok(Some(_)) = self.lock_child().try_wait() {
                debug!("Synthesizer pid {} stopped", self.pid);
                return;
            }
        }

        debug!("Synthesizer pid {} ignored SIGTERM, killing", self.pid);
        let mut child = self.lock_child();
        if let Err(e) = child.kill() {
            debug!("Failed to kill synthesizer pid {}: {}", self.pid, e);
        }
        if let Err(e) = child.wait() {
            debug!("Failed to reap synthesizer pid {}: {}", self.pid, e);
        }
    }
}

#[derive(Default)]
struct Slot {
    /// Bumped on every stop; a worker only launches if its generation is current
    generation: u64,
    current: Option<Arc<LiveProcess>>,
}

/// Serialized access to a single synthesizer process
///
/// `T` is the foreground state that receives outcomes.
pub struct PlaybackSession<T> {
    synth: String,
    grace: Duration,
    slot: Arc<Mutex<Slot>>,
    dispatcher: Dispatcher<T>,
}

impl<T> PlaybackSession<T> {
    /// Create a session that runs `synth` for every utterance
    pub fn new(synth: impl Into<String>, dispatcher: Dispatcher<T>) -> Self {
        Self {
            synth: synth.into(),
            grace: DEFAULT_GRACE_PERIOD,
            slot: Arc::new(Mutex::new(Slot::default())),
            dispatcher,
        }
    }

    /// Override how long `stop()` waits before killing
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Synthesizer executable in use
    pub fn synth(&self) -> &str {
        &self.synth
    }

    /// Is a synthesizer process currently tracked?
    pub fn is_speaking(&self) -> bool {
        lock(&self.slot).current.is_some()
    }

    /// Pid of the tracked synthesizer process, if any
    pub fn current_pid(&self) -> Option<u32> {
        lock(&self.slot).current.as_ref().map(|live| live.pid)
    }

    /// Stop the current utterance, if any
    ///
    /// The slot lock is only held while taking the handle; the graceful
    /// wait and the kill happen outside it. Calling this while idle does
    /// nothing observable.
    pub fn stop(&self) {
        let live = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.current.take()
        };

        if let Some(live) = live {
            debug!("Stopping synthesizer pid {}", live.pid);
            live.terminate(self.grace);
        }
    }
}

impl<T: SpeechListener> PlaybackSession<T> {
    /// Speak `utterance`, replacing whatever is playing
    ///
    /// Returns as soon as the worker thread is started.
    pub fn speak(&self, utterance: Utterance) {
        self.stop();

        let generation = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.generation
        };

        let worker = Worker {
            synth: self.synth.clone(),
            slot: Arc::clone(&self.slot),
            dispatcher: self.dispatcher.clone(),
            generation,
        };

        info!(
            "Speaking {} chars with voice '{}'",
            utterance.text().chars().count(),
            utterance.voice()
        );

        let spawned = thread::Builder::new()
            .name("speech".to_string())
            .spawn(move || worker.run(utterance));

        if let Err(e) = spawned {
            error!("Failed to start speech worker: {}", e);
            let message = format!("Failed to run synth: {}", e);
            self.dispatcher
                .post(move |host: &mut T| host.on_speech_error("Error", &message));
        }
    }
}

impl<T> Drop for PlaybackSession<T> {
    fn drop(&mut self) {
        debug!("Shutting down playback session");
        self.stop();
    }
}

/// State moved into the one-shot worker thread
struct Worker<T> {
    synth: String,
    slot: Arc<Mutex<Slot>>,
    dispatcher: Dispatcher<T>,
    generation: u64,
}

impl<T: SpeechListener> Worker<T> {
    fn run(self, utterance: Utterance) {
        let (live, stderr) = match self.launch(&utterance) {
            Ok(Some(launched)) => launched,
            Ok(None) => {
                debug!("Utterance superseded before launch");
                return;
            }
            Err(e) => {
                error!("Failed to spawn synthesizer '{}': {}", self.synth, e);
                let message = format!("Failed to run synth: {}", e);
                self.dispatcher
                    .post(move |host: &mut T| host.on_speech_error("Error", &message));
                return;
            }
        };

        let diagnostic = stderr.map(read_diagnostic).unwrap_or_default();
        let status = live.wait();

        {
            let mut slot = lock(&self.slot);
            if slot
                .current
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &live))
            {
                slot.current = None;
            }
        }

        if live.is_cancelled() {
            debug!("Synthesizer pid {} was stopped", live.pid);
            return;
        }

        match status {
            Ok(status) if !status.success() && !diagnostic.is_empty() => {
                warn!("Synth error ({}): {}", status, diagnostic);
                let message = format!("Failed to speak: {}", diagnostic);
                self.dispatcher
                    .post(move |host: &mut T| host.on_speech_error("Speech Error", &message));
            }
            Ok(status) => {
                debug!("Synthesizer pid {} finished ({})", live.pid, status);
                let voice = utterance.voice().to_string();
                self.dispatcher
                    .post(move |host: &mut T| host.on_voice_used(&voice));
            }
            Err(e) => {
                error!("Failed waiting for synthesizer pid {}: {}", live.pid, e);
                let message = format!("Failed to run synth: {}", e);
                self.dispatcher
                    .post(move |host: &mut T| host.on_speech_error("Error", &message));
            }
        }
    }

    /// Spawn the synthesizer and record it, unless a newer request exists
    fn launch(
        &self,
        utterance: &Utterance,
    ) -> io::Result<Option<(Arc<LiveProcess>, Option<ChildStderr>)>> {
        let mut slot = lock(&self.slot);
        if slot.generation != self.generation {
            return Ok(None);
        }

        let mut child = Command::new(&self.synth)
            .args(utterance.synth_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child.stderr.take();
        let live = Arc::new(LiveProcess::new(child));
        debug!("Synthesizer started with pid {}", live.pid);
        slot.current = Some(Arc::clone(&live));

        Ok(Some((live, stderr)))
    }
}

/// Drain the diagnostic stream until the process closes it
fn read_diagnostic(mut stderr: ChildStderr) -> String {
    let mut buf = Vec::new();
    if let Err(e) = stderr.read_to_end(&mut buf) {
        warn!("Failed to read synthesizer diagnostics: {}", e);
    }
    String::from_utf8_lossy(&buf).trim().to_string()
}

fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
