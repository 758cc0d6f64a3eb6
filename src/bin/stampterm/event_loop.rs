//! Supervisor loop: status ticks, live toggles, resize, cancellation, and child exit.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use stampterm::display::Toggle;
use stampterm::format::StreamOrigin;
use stampterm::geometry::{GeometryCell, ScreenGeometry};
use stampterm::log_debug;
use stampterm::process::ChildState;
use stampterm::reader::ReaderReport;

use crate::event_state::{EventLoopDeps, EventLoopState, EventLoopTimers, RunState};
use crate::input::{EventSource, InputEvent};
use crate::status_line::{format_status, StatusView};
use crate::terminal::apply_layout;
use crate::writer::{WriterHandle, WriterMessage};

pub(crate) const STATUS_TICK: Duration = Duration::from_secs(1);
/// How long a toggle confirmation stays on the status row.
const NOTICE_TTL: Duration = Duration::from_secs(2);
const READER_DRAIN_POLL_MS: u64 = 10;

fn draw_status(state: &EventLoopState, writer: &WriterHandle, now: Instant) {
    let view = StatusView {
        blink: state.blink,
        cwd: &state.cwd,
        command_line: &state.command_line,
        stdout_lines: state.counters.get(StreamOrigin::Stdout),
        stderr_lines: state.counters.get(StreamOrigin::Stderr),
        elapsed: now.saturating_duration_since(state.started_at),
        config: state.config.get(),
        notice: state.notice,
    };
    writer.send(WriterMessage::Status(format_status(&view)));
}

fn relayout(geometry: &GeometryCell, writer: &WriterHandle, rows: u16, cols: u16) {
    let next = ScreenGeometry::from_size(rows, cols);
    log_debug(&format!("resize to {}x{}", next.cols, next.rows));
    apply_layout(geometry, writer, next, false);
}

/// Blink, redraw the status row, and check whether the child has exited.
fn run_tick<E: EventSource>(
    state: &mut EventLoopState,
    timers: &mut EventLoopTimers,
    deps: &mut EventLoopDeps<E>,
    now: Instant,
) {
    state.blink = !state.blink;
    if timers.notice_deadline.is_some_and(|deadline| now >= deadline) {
        timers.notice_deadline = None;
        state.notice = None;
    }
    draw_status(state, &deps.writer, now);
    match deps.child.poll() {
        Ok(ChildState::Exited(status)) => {
            tracing::info!(status = %status, "child exited");
            state.run_state = RunState::Finished(status);
        }
        Ok(ChildState::Running) => {}
        Err(err) => log_debug(&format!("child status check failed: {err}")),
    }
    timers.next_tick = now + STATUS_TICK;
}

fn handle_input_event<E: EventSource>(
    state: &mut EventLoopState,
    timers: &mut EventLoopTimers,
    deps: &mut EventLoopDeps<E>,
    event: InputEvent,
) {
    let now = Instant::now();
    match event {
        InputEvent::Cancel => {
            tracing::info!("run cancelled by operator");
            state.run_state = RunState::Cancelled;
        }
        InputEvent::Key(key) => {
            let Some(toggle) = Toggle::from_key(key) else {
                return;
            };
            state.config.set(toggle);
            tracing::info!(toggle = toggle.label(), "display toggle");
            state.notice = Some(toggle.label());
            timers.notice_deadline = Some(now + NOTICE_TTL);
            draw_status(state, &deps.writer, now);
        }
        InputEvent::Resize { rows, cols } => {
            relayout(&state.geometry, &deps.writer, rows, cols);
            draw_status(state, &deps.writer, now);
        }
        InputEvent::OtherKey => {}
    }
}

/// Run until the child exits or the operator cancels. Returns the terminal state.
pub(crate) fn run_event_loop<E: EventSource>(
    state: &mut EventLoopState,
    timers: &mut EventLoopTimers,
    deps: &mut EventLoopDeps<E>,
) -> RunState {
    let mut reported_input_error = false;
    while state.run_state == RunState::Running {
        let now = Instant::now();
        if now >= timers.next_tick {
            run_tick(state, timers, deps, now);
            if state.run_state != RunState::Running {
                break;
            }
        }
        let wait = timers.next_tick.saturating_duration_since(Instant::now());
        match deps.events.next_event(wait) {
            Ok(Some(event)) => handle_input_event(state, timers, deps, event),
            Ok(None) => {}
            Err(err) => {
                if !reported_input_error {
                    reported_input_error = true;
                    log_debug(&format!("terminal input unavailable: {err}"));
                    tracing::warn!(error = %err, "terminal input unavailable");
                }
            }
        }
    }
    state.run_state
}

/// Join reader threads, giving them up to `timeout` to hit end-of-stream.
///
/// A grandchild holding the pipes open would keep a reader alive forever, so stragglers are
/// left detached rather than joined.
pub(crate) fn drain_readers(
    readers: Vec<JoinHandle<ReaderReport>>,
    timeout: Duration,
) -> Vec<ReaderReport> {
    let deadline = Instant::now() + timeout;
    let mut pending = readers;
    let mut reports = Vec::with_capacity(pending.len());
    loop {
        let (done, waiting): (Vec<_>, Vec<_>) =
            pending.into_iter().partition(|handle| handle.is_finished());
        for handle in done {
            match handle.join() {
                Ok(report) => reports.push(report),
                Err(_) => log_debug("reader thread panicked"),
            }
        }
        pending = waiting;
        if pending.is_empty() {
            break;
        }
        if Instant::now() >= deadline {
            log_debug(&format!(
                "{} reader(s) still open after child exit; leaving them behind",
                pending.len()
            ));
            break;
        }
        std::thread::sleep(Duration::from_millis(READER_DRAIN_POLL_MS));
    }
    reports
}

/// Hold the finished screen until any key. Returns `false` when cancelled instead.
pub(crate) fn wait_for_acknowledgement<E: EventSource>(
    events: &mut E,
    geometry: &GeometryCell,
    writer: &WriterHandle,
    banner: &str,
) -> bool {
    loop {
        if !events.is_interactive() {
            return true;
        }
        match events.next_event(STATUS_TICK) {
            Ok(Some(InputEvent::Cancel)) => return false,
            Ok(Some(InputEvent::Resize { rows, cols })) => {
                relayout(geometry, writer, rows, cols);
                writer.send(WriterMessage::Status(banner.to_string()));
            }
            Ok(Some(InputEvent::Key(_) | InputEvent::OtherKey)) => return true,
            Ok(None) => {}
            Err(err) => {
                log_debug(&format!("terminal input unavailable while finishing: {err}"));
                return true;
            }
        }
    }
}
