use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Instant;

use stampterm::display::ConfigStore;
use stampterm::geometry::GeometryCell;
use stampterm::process::ChildProcess;
use stampterm::reader::LineCounters;

use crate::input::EventSource;
use crate::writer::WriterHandle;

/// Lifecycle of one supervised run. `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    Running,
    Finished(ExitStatus),
    Cancelled,
}

pub(crate) struct EventLoopState {
    pub(crate) run_state: RunState,
    pub(crate) config: ConfigStore,
    pub(crate) geometry: GeometryCell,
    pub(crate) counters: Arc<LineCounters>,
    pub(crate) started_at: Instant,
    pub(crate) cwd: String,
    pub(crate) command_line: String,
    pub(crate) blink: bool,
    pub(crate) notice: Option<&'static str>,
}

pub(crate) struct EventLoopTimers {
    pub(crate) next_tick: Instant,
    pub(crate) notice_deadline: Option<Instant>,
}

pub(crate) struct EventLoopDeps<E: EventSource> {
    pub(crate) child: ChildProcess,
    pub(crate) writer: WriterHandle,
    pub(crate) events: E,
}
