use crossterm::event;
use std::io;
use std::thread;
use std::time::{Duration, Instant};

use super::event::{map_event, InputEvent};
use crate::terminal::take_interrupt;

/// Longest single wait inside a poll so interrupt signals are noticed quickly.
const EVENT_POLL_SLICE_MS: u64 = 50;

/// Where the supervisor gets operator input from.
pub(crate) trait EventSource {
    /// Wait up to `timeout` for one event. `Ok(None)` means the wait timed out.
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>>;

    /// `false` once no operator input can arrive, so nobody waits on a key forever.
    fn is_interactive(&self) -> bool {
        true
    }
}

/// Keyboard, resize, and interrupt-signal events from the controlling terminal.
#[derive(Debug)]
pub(crate) struct TerminalEvents {
    /// Set after the terminal refuses event polling (e.g. stdin is not a tty).
    degraded: bool,
}

impl TerminalEvents {
    /// Without a terminal on both ends only interrupt signals are delivered.
    pub(crate) fn new(interactive: bool) -> Self {
        Self {
            degraded: !interactive,
        }
    }

    fn poll_slice(&mut self, slice: Duration) -> io::Result<Option<InputEvent>> {
        if self.degraded {
            thread::sleep(slice);
            return Ok(None);
        }
        match event::poll(slice) {
            Ok(true) => Ok(map_event(event::read()?)),
            Ok(false) => Ok(None),
            Err(err) => {
                self.degraded = true;
                Err(err)
            }
        }
    }
}

impl EventSource for TerminalEvents {
    fn is_interactive(&self) -> bool {
        !self.degraded
    }

    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        let deadline = Instant::now() + timeout;
        loop {
            if take_interrupt() {
                return Ok(Some(InputEvent::Cancel));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let slice = (deadline - now).min(Duration::from_millis(EVENT_POLL_SLICE_MS));
            if let Some(event) = self.poll_slice(slice)? {
                return Ok(Some(event));
            }
        }
    }
}
