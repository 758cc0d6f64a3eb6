//! JSON trace of run milestones (child start and exit, toggles, stream closes).

use crate::config::AppConfig;
use std::env;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

const TRACE_LOG_ENV: &str = "STAMPTERM_TRACE_LOG";

/// An explicit, non-empty override wins; otherwise the trace sits beside the debug log.
fn resolve_trace_log(override_path: Option<OsString>) -> PathBuf {
    match override_path {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => env::temp_dir().join("stampterm_trace.jsonl"),
    }
}

pub(crate) fn tracing_log_path() -> PathBuf {
    resolve_trace_log(env::var_os(TRACE_LOG_ENV))
}

pub(crate) fn init_tracing(config: &AppConfig) {
    let enabled = config.logs && !config.no_logs;
    if !enabled {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let path = tracing_log_path();
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(err) => {
                crate::log_debug(&format!("trace log {} unavailable: {err}", path.display()));
                return;
            }
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(Mutex::new(file))
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            return;
        }
        let display_cfg = config.display_config();
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            program = config.program(),
            transcript = %config.log_path().display(),
            millis = display_cfg.use_millis,
            truncate = display_cfg.truncate,
            absolute = display_cfg.absolute_timestamps,
            "session start"
        );
    });
}
