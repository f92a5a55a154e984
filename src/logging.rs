//! Logging setup: stdout plus a size-rotated log file.
//!
//! The file lives at `<config dir>/tabtimer/tabtimer.log` and rotates at
//! 10 MB, keeping one old copy. `DEBUG_LOGGING=1` turns on debug output for
//! the tabtimer crates.

use std::path::PathBuf;

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_FILE: &str = "tabtimer.log";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Install the global subscriber.
///
/// Hold the returned guard until exit or buffered file output is lost.
/// Returns `None` when only stdout logging could be set up.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let Some(log_dir) = log_dir() else {
        init_stdout_only(debug_logging);
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber isn't installed yet
        eprintln!("Failed to create log directory {:?}: {}, using stdout only", log_dir, e);
        init_stdout_only(debug_logging);
        return None;
    }

    let log_path = log_dir.join(LOG_FILE);
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(MAX_LOG_BYTES),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stdout_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "TabTimer logging initialized");

    Some(guard)
}

/// `~/.config/tabtimer` on Linux, `%APPDATA%\tabtimer` on Windows
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join("tabtimer"))
}

fn filter(debug_logging: bool) -> EnvFilter {
    if debug_logging {
        EnvFilter::new("info,tabtimer=debug,tabtimer_core=debug")
    } else {
        EnvFilter::new("info")
    }
}

fn init_stdout_only(debug_logging: bool) {
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(debug_logging, "TabTimer logging initialized (stdout only)");
}
