//! Rolling file logs for the terminal front-end.
//!
//! The TUI owns stdout while in raw mode, so every diagnostic goes to files
//! under the log directory. Lines are metadata only
//! (`event=... module=... status=...`); item text never reaches a log.

use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "daily-outline";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    dir: PathBuf,
    _handle: LoggerHandle,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    Level(String),
    #[error("log directory must be an absolute path, got `{0}`")]
    RelativeDir(PathBuf),
    #[error("failed to create log directory `{path}`: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already runs with {active}; refusing to switch to {requested}")]
    Conflict { active: String, requested: String },
}

/// Starts file logging once per process.
///
/// Repeating the call with the same level and directory is a no-op; any other
/// combination is rejected with [`LoggingError::Conflict`]. Never panics.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;
    if !log_dir.is_absolute() {
        return Err(LoggingError::RelativeDir(log_dir.to_path_buf()));
    }

    let active = ACTIVE.get_or_try_init(|| start(level, log_dir))?;
    if active.dir != log_dir {
        return Err(LoggingError::Conflict {
            active: format!("directory `{}`", active.dir.display()),
            requested: format!("`{}`", log_dir.display()),
        });
    }
    if active.level != level {
        return Err(LoggingError::Conflict {
            active: format!("level `{}`", active.level),
            requested: format!("`{level}`"),
        });
    }
    Ok(())
}

fn start(level: &'static str, dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level)?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    install_panic_hook();
    info!(
        "event=app_start module=logging status=ok platform={} version={} level={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        level
    );

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

/// Level and directory of the running logger, `None` before [`init_logging`].
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE.get().map(|active| (active.level, active.dir.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::Level(other.to_string())),
    }
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        error!(
            "event=panic module=logging status=error location={} payload={}",
            location,
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous(panic_info);
    }));
}

/// Single-line, length-capped rendition of a message that may carry user text.
fn sanitize_message(value: &str, max_chars: usize) -> String {
    let single_line = value.replace(['\n', '\r'], " ");
    let mut truncated: String = single_line.chars().take(max_chars).collect();
    if single_line.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
