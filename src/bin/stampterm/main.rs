//! Stampterm entrypoint: run one command under a live, timestamped transcript view.
//!
//! # Architecture
//!
//! - Reader threads: one per child stream, stamp each line, append it to the log
//! - Writer thread: sole owner of the terminal (scroll region, log lines, status row)
//! - Supervisor loop: status ticks, operator keys, resize, interrupt, child exit

mod event_loop;
mod event_state;
mod input;
mod pager;
mod session_stats;
mod status_line;
mod supervisor;
mod terminal;
#[cfg(test)]
mod test_support;
mod writer;

use anyhow::Result;
use std::env;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use stampterm::config::AppConfig;
use stampterm::geometry::ScreenGeometry;
use stampterm::process::exit_code_for;
use stampterm::terminal_restore::TerminalRestoreGuard;
use stampterm::transcript::TranscriptLog;
use stampterm::{init_logging, log_debug, log_file_path};

use crate::event_state::RunState;
use crate::input::TerminalEvents;
use crate::pager::run_pager;
use crate::session_stats::format_run_summary;
use crate::supervisor::{supervise, RunPlan};
use crate::terminal::install_interrupt_handlers;

/// Conventional exit code for a run stopped by SIGINT / Ctrl-C.
const CANCELLED_EXIT_CODE: u8 = 130;

/// Only called once the terminal is back in cooked mode, so the messages are readable.
fn report_terminal_failures<E: std::fmt::Display>(failures: &[E]) {
    for err in failures {
        log_debug(&format!("terminal restore failed: {err}"));
        eprintln!("stampterm: failed to restore terminal: {err}");
    }
}

fn main() -> Result<ExitCode> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    log_debug("=== Stampterm Started ===");
    log_debug(&format!("Debug log: {:?}", log_file_path()));

    let log = Arc::new(TranscriptLog::create(config.log_path())?);
    install_interrupt_handlers()?;

    let cwd = env::current_dir()
        .map(|dir| dir.to_string_lossy().to_string())
        .unwrap_or_else(|_| ".".to_string());
    let display = config.display_config();
    let interactive = io::stdout().is_terminal() && io::stdin().is_terminal();

    let guard = TerminalRestoreGuard::new();
    if interactive {
        if let Err(err) = guard.enable_raw_mode() {
            log_debug(&format!("raw mode unavailable, keys will not work: {err}"));
        }
    } else {
        log_debug("not attached to a terminal; keys disabled");
    }
    if let Err(err) = guard.hide_cursor(&mut io::stdout()) {
        log_debug(&format!("failed to hide cursor: {err}"));
    }
    let geometry = ScreenGeometry::detect();
    log_debug(&format!("terminal size {}x{}", geometry.cols, geometry.rows));

    let plan = RunPlan {
        program: config.program(),
        args: config.program_args(),
        cwd,
        display,
        geometry,
        log: Arc::clone(&log),
        has_pager: !config.no_pager && interactive,
    };
    let report = match supervise(plan, TerminalEvents::new(interactive), io::stdout()) {
        Ok(report) => report,
        Err(err) => {
            report_terminal_failures(&guard.restore());
            return Err(err);
        }
    };
    report_terminal_failures(&guard.restore_and_clear());
    report_terminal_failures(&report.terminal_errors);

    let exit_code = match report.state {
        RunState::Finished(status) => {
            if report.acknowledged && !config.no_pager && interactive {
                match run_pager(&config.pager, log.path()) {
                    Ok(status) if !status.success() => {
                        log_debug(&format!("pager exited with {status}"));
                    }
                    Ok(_) => {}
                    Err(err) => eprintln!("stampterm: {err:#}"),
                }
            }
            exit_code_for(status)
        }
        RunState::Cancelled | RunState::Running => CANCELLED_EXIT_CODE,
    };
    eprintln!("{}", format_run_summary(&report, &display));
    log_debug("=== Stampterm Exiting ===");
    Ok(ExitCode::from(exit_code))
}
