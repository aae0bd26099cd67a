//! Logging for the scanner crates.
//!
//! Scan cycles run on a named worker thread, so every stderr line carries the
//! thread name next to the record target:
//!
//! ```text
//! [  1.204s  WARN dotscan-worker dotscan_scan::scheduler] detector panicked
//! ```
//!
//! [`init_with_level`] installs the plain `log` backend. With the `tracing`
//! feature, [`init_tracing`] installs a `tracing` subscriber scoped to the
//! dotscan crates instead.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::thread;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose records the tracing filter lets through at the chosen level.
#[cfg(feature = "tracing")]
const DOTSCAN_TARGETS: [&str; 4] = ["dotscan", "dotscan_core", "dotscan_scan", "dotscan_projection"];

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

fn write_record<W: Write>(out: &mut W, uptime: f64, thread: &str, record: &Record) -> io::Result<()> {
    writeln!(
        out,
        "[{:7.3}s {:>5} {} {}] {}",
        uptime,
        record.level(),
        thread,
        record.target(),
        record.args()
    )
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let current = thread::current();
        let thread = current.name().unwrap_or("unnamed");
        let uptime = self.started.elapsed().as_secs_f64();
        let _ = write_record(&mut io::stderr().lock(), uptime, thread, record);
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the given level filter.
///
/// Idempotent: the first level wins.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StderrLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Filter directives: other crates stay at `warn`, dotscan crates at `level`.
#[cfg(feature = "tracing")]
fn tracing_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_ascii_lowercase();
    let mut directives = String::from("warn");
    for target in DOTSCAN_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

/// Install a `tracing` subscriber. `RUST_LOG` takes precedence over `level`.
///
/// Returns `false` if a global subscriber was already set.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(tracing_directives(level)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_thread_names(true)
        .with_span_events(FmtSpan::CLOSE);
    let installed = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
    installed.is_ok()
}
