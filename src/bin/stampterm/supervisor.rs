//! One supervised run from launch to acknowledgement, independent of the real terminal.

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use stampterm::display::{ConfigStore, DisplayConfig};
use stampterm::format::StreamOrigin;
use stampterm::geometry::{GeometryCell, ScreenGeometry};
use stampterm::log_debug;
use stampterm::process::{describe_exit, ChildProcess};
use stampterm::reader::{spawn_stream_reader, LineCounters, ReaderContext, ReaderReport};
use stampterm::transcript::TranscriptLog;

use crate::event_loop::{drain_readers, run_event_loop, wait_for_acknowledgement};
use crate::event_state::{EventLoopDeps, EventLoopState, EventLoopTimers, RunState};
use crate::input::EventSource;
use crate::status_line::format_finish_banner;
use crate::terminal::apply_layout;
use crate::writer::{spawn_writer_thread, WriterMessage, WriterSink};

const READER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub(crate) struct RunPlan<'a> {
    pub(crate) program: &'a str,
    pub(crate) args: &'a [String],
    pub(crate) cwd: String,
    pub(crate) display: DisplayConfig,
    pub(crate) geometry: ScreenGeometry,
    pub(crate) log: Arc<TranscriptLog>,
    /// Only changes the wording of the completion banner.
    pub(crate) has_pager: bool,
}

#[derive(Debug)]
pub(crate) struct RunReport {
    pub(crate) state: RunState,
    /// `false` if the operator cancelled at the completion banner.
    pub(crate) acknowledged: bool,
    pub(crate) command_line: String,
    pub(crate) elapsed: Duration,
    pub(crate) stdout_lines: u64,
    pub(crate) stderr_lines: u64,
    pub(crate) log_errors: u64,
    pub(crate) log_path: PathBuf,
    /// Screen writes that left the terminal in a bad state, for reporting once it is restored.
    pub(crate) terminal_errors: Vec<String>,
}

/// Launch the command, stream it through `stdout`, and drive `events` until the run ends.
///
/// On cancellation the child is sent SIGTERM and queued screen output is discarded. On a
/// normal finish the banner stays up until acknowledged. Either way the scroll region is
/// reset before this returns.
pub(crate) fn supervise<E, W>(plan: RunPlan<'_>, events: E, stdout: W) -> Result<RunReport>
where
    E: EventSource,
    W: Write + Send + 'static,
{
    let writer = spawn_writer_thread(stdout);
    let geometry = GeometryCell::new(plan.geometry);
    apply_layout(&geometry, &writer, plan.geometry, true);

    let mut child = match ChildProcess::spawn(plan.program, plan.args) {
        Ok(child) => child,
        Err(err) => {
            if let Err(reset) = writer.shutdown() {
                log_debug(&format!("scroll region reset failed after launch error: {reset}"));
            }
            return Err(err);
        }
    };
    let started_at = Instant::now();
    tracing::info!(pid = child.pid(), command = child.command_line(), "child started");
    let (child_stdout, child_stderr) = child.take_streams()?;

    let config = ConfigStore::new(plan.display);
    let counters = Arc::new(LineCounters::default());
    let ctx = ReaderContext {
        config: config.clone(),
        geometry: geometry.clone(),
        log: Arc::clone(&plan.log),
        sink: Arc::new(WriterSink::new(writer.sender())),
        counters: Arc::clone(&counters),
        started_at,
    };
    let readers = vec![
        spawn_stream_reader(StreamOrigin::Stdout, child_stdout, ctx.clone()),
        spawn_stream_reader(StreamOrigin::Stderr, child_stderr, ctx),
    ];

    let mut state = EventLoopState {
        run_state: RunState::Running,
        config,
        geometry,
        counters,
        started_at,
        cwd: plan.cwd,
        command_line: child.command_line().to_string(),
        blink: false,
        notice: None,
    };
    let mut timers = EventLoopTimers {
        next_tick: started_at,
        notice_deadline: None,
    };
    let mut deps = EventLoopDeps {
        child,
        writer,
        events,
    };
    let outcome = run_event_loop(&mut state, &mut timers, &mut deps);
    let EventLoopDeps {
        mut child,
        writer,
        mut events,
    } = deps;

    let mut report = RunReport {
        state: outcome,
        acknowledged: false,
        command_line: state.command_line.clone(),
        elapsed: started_at.elapsed(),
        stdout_lines: 0,
        stderr_lines: 0,
        log_errors: 0,
        log_path: plan.log.path().to_path_buf(),
        terminal_errors: Vec::new(),
    };

    match outcome {
        RunState::Finished(status) => {
            let reports = drain_readers(readers, READER_DRAIN_TIMEOUT);
            report.elapsed = started_at.elapsed();
            let banner = format_finish_banner(
                &describe_exit(status),
                status.success(),
                &state.config.get(),
                plan.has_pager,
            );
            writer.send(WriterMessage::Status(banner.clone()));
            writer.flush();
            report.acknowledged =
                wait_for_acknowledgement(&mut events, &state.geometry, &writer, &banner);
            if let Err(err) = writer.shutdown() {
                report.terminal_errors.push(err.to_string());
            }
            tally(&mut report, &reports, &state.counters);
        }
        RunState::Cancelled | RunState::Running => {
            child.terminate();
            if let Err(err) = writer.halt() {
                report.terminal_errors.push(err.to_string());
            }
            report.state = RunState::Cancelled;
            tally(&mut report, &[], &state.counters);
        }
    }
    if let Err(err) = plan.log.flush() {
        log_debug(&format!("transcript flush failed: {err}"));
    }
    tracing::info!(
        state = ?report.state,
        stdout_lines = report.stdout_lines,
        stderr_lines = report.stderr_lines,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "run ended"
    );
    Ok(report)
}

fn tally(report: &mut RunReport, reports: &[ReaderReport], counters: &LineCounters) {
    report.stdout_lines = counters.get(StreamOrigin::Stdout);
    report.stderr_lines = counters.get(StreamOrigin::Stderr);
    report.log_errors = reports.iter().map(|r| r.log_errors).sum();
}
