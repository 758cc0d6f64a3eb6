//! Debug log kept in the temp dir so diagnostics never land on the supervised screen.

use crate::config::AppConfig;
use std::{
    env, fs,
    io::{self, Write},
    panic,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_CONTENT_ENABLED: AtomicBool = AtomicBool::new(false);
static CRASH_LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_STATE: OnceLock<Mutex<LogState>> = OnceLock::new();
/// Debug lines are stamped relative to this, like the transcript itself.
static SESSION_START: OnceLock<Instant> = OnceLock::new();
/// Program under supervision, named in crash entries.
static SUPERVISED_PROGRAM: OnceLock<String> = OnceLock::new();
static TRANSCRIPT_FAILURE_LOGGED: AtomicBool = AtomicBool::new(false);

/// Path to the debug log file, rotated once it grows past the cap.
pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("stampterm_debug.log")
}

/// Path to the crash log file (metadata only).
fn crash_log_path() -> PathBuf {
    env::temp_dir().join("stampterm_crash.log")
}

struct DebugLogFile {
    path: PathBuf,
    file: fs::File,
    max_bytes: u64,
    bytes_written: u64,
}

impl DebugLogFile {
    fn new(path: PathBuf, max_bytes: u64) -> Option<Self> {
        let mut bytes_written = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if bytes_written > max_bytes {
            let _ = fs::remove_file(&path);
            bytes_written = 0;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        Some(Self {
            path,
            file,
            max_bytes,
            bytes_written,
        })
    }

    fn rotate_if_needed(&mut self, next_len: usize) {
        if self.bytes_written.saturating_add(next_len as u64) <= self.max_bytes {
            return;
        }
        if let Ok(file) = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
        {
            self.file = file;
            self.bytes_written = 0;
        }
    }

    fn write_line(&mut self, line: &str) {
        self.rotate_if_needed(line.len());
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.bytes_written = self.bytes_written.saturating_add(line.len() as u64);
        }
    }
}

#[derive(Default)]
struct LogState {
    writer: Option<DebugLogFile>,
}

fn log_state() -> &'static Mutex<LogState> {
    LOG_STATE.get_or_init(|| Mutex::new(LogState::default()))
}

/// Configure debug logging from CLI flags or environment.
pub fn init_logging(config: &AppConfig) {
    let enabled = config.logs && !config.no_logs;
    let content_enabled = enabled && config.log_content;
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    LOG_CONTENT_ENABLED.store(content_enabled, Ordering::Relaxed);
    CRASH_LOG_ENABLED.store(enabled, Ordering::Relaxed);
    SESSION_START.get_or_init(Instant::now);
    SUPERVISED_PROGRAM.get_or_init(|| config.program().to_string());

    let mut state = log_state()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if enabled {
        state.writer = DebugLogFile::new(log_file_path(), LOG_MAX_BYTES);
    } else {
        state.writer = None;
    }
    drop(state);
    crate::telemetry::init_tracing(config);
}

/// `[+S.mmms] msg`, with the offset measured from session start.
fn format_debug_line(elapsed: Duration, msg: &str) -> String {
    format!(
        "[+{}.{:03}s] {msg}\n",
        elapsed.as_secs(),
        elapsed.subsec_millis()
    )
}

pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let elapsed = SESSION_START.get_or_init(Instant::now).elapsed();
    let line = format_debug_line(elapsed, msg);
    let mut state = log_state()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(writer) = state.writer.as_mut() {
        writer.write_line(&line);
    }
}

/// Write logs that may contain child output.
pub fn log_debug_content(msg: &str) {
    if !LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    log_debug(msg);
}

fn transcript_failure_message(path: &Path, stream: &str, err: &io::Error) -> String {
    format!(
        "transcript {} rejected a {stream} line: {err}; later failures are only counted",
        path.display()
    )
}

/// Note the first failed transcript append of the session, naming the log file.
///
/// Returns `true` only for the call that wrote the entry.
pub fn log_transcript_failure(path: &Path, stream: &str, err: &io::Error) -> bool {
    if TRANSCRIPT_FAILURE_LOGGED.swap(true, Ordering::SeqCst) {
        return false;
    }
    log_debug(&transcript_failure_message(path, stream, err));
    true
}

/// Write a minimal crash log entry, omitting the payload unless content logging is on.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !CRASH_LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());

    let payload = if LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        if let Some(text) = info.payload().downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = info.payload().downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        }
    } else {
        "panic payload omitted (log-content disabled)".to_string()
    };

    let program = SUPERVISED_PROGRAM
        .get()
        .map(String::as_str)
        .unwrap_or("unknown");
    let line = format!(
        "[{timestamp}] panic at {location} while supervising `{program}`: {payload} (v{})\n",
        env!("CARGO_PKG_VERSION")
    );
    let path = crash_log_path();
    let bytes_written = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let truncate = bytes_written.saturating_add(line.len() as u64) > CRASH_LOG_MAX_BYTES;
    let mut options = fs::OpenOptions::new();
    options.create(true);
    if truncate {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    if let Ok(mut file) = options.open(&path) {
        let _ = file.write_all(line.as_bytes());
    }
}
