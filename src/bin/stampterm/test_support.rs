use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::input::{EventSource, InputEvent};

/// In-memory terminal that can be inspected while the writer thread owns a clone.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Terminal whose every write fails, as when the tty has gone away.
pub(crate) struct FailingTerminal;

impl Write for FailingTerminal {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
    }
}

/// Replays events; `None` entries simulate a poll timeout. Once the script runs out,
/// every poll waits briefly and yields `fallback`.
pub(crate) struct ScriptedEvents {
    script: VecDeque<Option<InputEvent>>,
    fallback: Option<InputEvent>,
}

impl ScriptedEvents {
    pub(crate) fn new(
        script: impl IntoIterator<Item = Option<InputEvent>>,
        fallback: Option<InputEvent>,
    ) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
        }
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        match self.script.pop_front() {
            Some(event) => Ok(event),
            None => {
                std::thread::sleep(timeout.min(Duration::from_millis(20)));
                Ok(self.fallback)
            }
        }
    }
}
