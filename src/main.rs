//! Strudel main entry point
//!
//! The foreground loop owns the application state and waits on two sources:
//! 1. stdin (one console command per line)
//! 2. a waker, fired when a speech worker posts work for the foreground
//!
//! SIGINT and SIGTERM interrupt the poll and take the normal shutdown path,
//! so rows and settings are saved on the way out.

use anyhow::Context;
use log::{debug, error, info};
use mio::{Events, Interest, Poll, Token, Waker};
use nix::libc;
use nix::sys::signal::{self, SigHandler, Signal};
use std::io::{self, IsTerminal, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strudel::input::{process_line, Command, CommandHandler};
use strudel::paths::DataPaths;
use strudel::state::AppState;
use strudel::ui::{self, ConsoleNotifier};

/// Token for stdin in mio poll
const STDIN: Token = Token(0);
/// Token for the dispatcher waker
const WAKER: Token = Token(1);

/// Set by the SIGINT/SIGTERM handler
static QUIT_PENDING: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_quit(_: libc::c_int) {
    QUIT_PENDING.store(true, Ordering::Relaxed);
}

struct Options {
    debug: bool,
    dir: Option<PathBuf>,
}

fn parse_args() -> Options {
    let mut options = Options {
        debug: false,
        dir: None,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" | "-d" => options.debug = true,
            "--dir" => options.dir = args.next().map(PathBuf::from),
            "--version" | "-V" => {
                println!("{} {}", strudel::APP_NAME, strudel::VERSION);
                process::exit(0);
            }
            "--help" | "-h" => {
                println!("Usage: strudel [--debug] [--dir <data directory>]");
                process::exit(0);
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
    }

    options
}

fn main() {
    let options = parse_args();

    // Initialize logger
    if options.debug {
        // Debug mode: write to strudel.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("strudel.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open strudel.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "Strudel version {} starting (debug mode, logging to strudel.log)",
            strudel::VERSION
        );
    } else {
        // Normal mode: warnings and errors to stderr unless RUST_LOG says otherwise
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Warn)
            .parse_default_env()
            .init();
    }

    if let Err(e) = run(options) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    debug!("Initializing Strudel");

    if !io::stdin().is_terminal() {
        eprintln!("Error: Strudel requires an interactive terminal (stdin is not a TTY)");
        process::exit(1);
    }

    let dir = match options.dir {
        Some(dir) => dir,
        None => DataPaths::default_dir()?,
    };
    let paths = DataPaths::in_dir(dir);
    paths
        .ensure()
        .with_context(|| format!("Failed to create data directory {:?}", paths.dir()))?;

    let mut poll = Poll::new().context("Failed to create poll")?;
    let waker = Arc::new(Waker::new(poll.registry(), WAKER).context("Failed to create waker")?);

    let (dispatcher, queue) = ui::channel::<AppState>();
    let dispatcher = dispatcher.with_waker(waker);

    // Load preferences, rows and voices, then start an idle session
    let notifier = Box::new(ConsoleNotifier::stderr());
    let mut state = AppState::new(paths, notifier, dispatcher);
    info!("State initialized from {:?}", state.paths.dir());

    let stdin_fd = io::stdin().as_raw_fd();
    let mut stdin_source = mio::unix::SourceFd(&stdin_fd);
    poll.registry()
        .register(&mut stdin_source, STDIN, Interest::READABLE)
        .context("Failed to watch stdin")?;

    unsafe {
        signal::signal(Signal::SIGINT, SigHandler::Handler(handle_quit))
            .context("Failed to set SIGINT handler")?;
        signal::signal(Signal::SIGTERM, SigHandler::Handler(handle_quit))
            .context("Failed to set SIGTERM handler")?;
    }

    let mut commands = CommandHandler::new();
    println!("{} {} - type 'help' for commands", state.settings.title(), strudel::VERSION);
    commands.execute(Command::List, &mut state)?;
    flush_output(&mut state, true)?;

    let mut events = Events::with_capacity(16);
    let mut pending = String::new();

    info!("Strudel ready - entering event loop");

    while state.is_running() {
        if QUIT_PENDING.swap(false, Ordering::Relaxed) {
            info!("Quit signal received");
            state.shutdown();
            break;
        }

        if let Err(e) = poll.poll(&mut events, None) {
            if e.kind() == io::ErrorKind::Interrupted {
                debug!("poll() interrupted by signal");
                continue;
            }
            return Err(e).context("poll() failed");
        }

        let mut prompt = false;
        for event in events.iter() {
            match event.token() {
                STDIN => {
                    prompt = true;
                    if !read_stdin(&mut pending)? {
                        info!("stdin closed");
                        state.shutdown();
                        break;
                    }

                    while let Some(end) = pending.find('\n') {
                        let line: String = pending.drain(..=end).collect();
                        if let Err(e) = process_line(&line, &mut state, &mut commands) {
                            state.print(format!("Error: {}", e));
                        }
                        if !state.is_running() {
                            break;
                        }
                    }
                }
                WAKER => debug!("Woken by speech worker"),
                _ => {}
            }
        }

        // Outcomes posted by speech workers run here, on this thread
        let ran = queue.run_pending(&mut state);
        if ran > 0 {
            debug!("Ran {} foreground tasks", ran);
        }

        flush_output(&mut state, prompt)?;
    }

    flush_output(&mut state, false)?;
    Ok(())
}

/// Read whatever is available on stdin. Returns false at end of input.
fn read_stdin(pending: &mut String) -> io::Result<bool> {
    let mut buf = [0u8; 4096];
    let n = io::stdin().read(&mut buf)?;
    if n == 0 {
        return Ok(false);
    }
    pending.push_str(&String::from_utf8_lossy(&buf[..n]));
    Ok(true)
}

/// Print queued output, then the prompt if anything was shown or asked for
fn flush_output(state: &mut AppState, prompt: bool) -> io::Result<()> {
    let lines = state.take_output();
    let mut stdout = io::stdout().lock();
    for line in &lines {
        writeln!(stdout, "{}", line)?;
    }
    if state.is_running() && (prompt || !lines.is_empty()) {
        write!(stdout, "> ")?;
    }
    stdout.flush()
}
