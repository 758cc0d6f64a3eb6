//! Single owner of the terminal: every byte on screen goes through this thread.

mod render;
mod state;

use crossbeam_channel::{bounded, Sender};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use stampterm::format::StreamOrigin;
use stampterm::geometry::ScreenGeometry;
use stampterm::log_debug;
use stampterm::reader::LineSink;

/// Max pending messages for the writer thread; readers block beyond this.
const WRITER_CHANNEL_CAPACITY: usize = 1024;
const FLUSH_ACK_TIMEOUT_MS: u64 = 2000;

#[derive(Debug)]
pub(crate) enum WriterMessage {
    /// Display text for one log line
    Line(String),
    /// Replace the status row
    Status(String),
    /// Establish the scroll region for a (new) screen size
    Layout {
        geometry: ScreenGeometry,
        initial: bool,
    },
    Flush(Sender<()>),
    Shutdown,
}

pub(crate) struct WriterHandle {
    tx: Sender<WriterMessage>,
    halted: Arc<AtomicBool>,
    join: Option<thread::JoinHandle<Option<io::Error>>>,
}

impl WriterHandle {
    pub(crate) fn sender(&self) -> Sender<WriterMessage> {
        self.tx.clone()
    }

    pub(crate) fn send(&self, message: WriterMessage) {
        if self.tx.send(message).is_err() {
            log_debug("writer thread is gone; dropping message");
        }
    }

    /// Block until everything queued so far has reached the terminal.
    pub(crate) fn flush(&self) {
        let (ack_tx, ack_rx) = bounded(1);
        self.send(WriterMessage::Flush(ack_tx));
        if ack_rx
            .recv_timeout(Duration::from_millis(FLUSH_ACK_TIMEOUT_MS))
            .is_err()
        {
            log_debug("writer flush timed out");
        }
    }

    /// Drop anything still queued and stop right away (cancellation path).
    ///
    /// Errors if the scroll region could not be reset on the way out.
    pub(crate) fn halt(mut self) -> io::Result<()> {
        self.halted.store(true, Ordering::SeqCst);
        self.stop()
    }

    /// Finish queued output, reset the scroll region, and stop.
    pub(crate) fn shutdown(mut self) -> io::Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> io::Result<()> {
        let _ = self.tx.send(WriterMessage::Shutdown);
        let Some(join) = self.join.take() else {
            return Ok(());
        };
        match join.join() {
            Ok(None) => Ok(()),
            Ok(Some(err)) => Err(err),
            Err(_) => {
                log_debug("writer thread panicked");
                Err(io::Error::new(io::ErrorKind::Other, "writer thread panicked"))
            }
        }
    }
}

impl Drop for WriterHandle {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.halted.store(true, Ordering::SeqCst);
            let _ = self.stop();
        }
    }
}

pub(crate) fn spawn_writer_thread<W>(stdout: W) -> WriterHandle
where
    W: Write + Send + 'static,
{
    let (tx, rx) = bounded(WRITER_CHANNEL_CAPACITY);
    let halted = Arc::new(AtomicBool::new(false));
    let thread_halted = Arc::clone(&halted);
    let join = thread::spawn(move || {
        let mut state = state::WriterState::new(stdout, thread_halted);
        for message in rx.iter() {
            if !state.handle_message(message) {
                break;
            }
        }
        state.into_reset_error()
    });
    WriterHandle {
        tx,
        halted,
        join: Some(join),
    }
}

/// Forwards reader output to the writer thread.
pub(crate) struct WriterSink {
    tx: Sender<WriterMessage>,
}

impl WriterSink {
    pub(crate) fn new(tx: Sender<WriterMessage>) -> Self {
        Self { tx }
    }
}

impl LineSink for WriterSink {
    fn emit(&self, _origin: StreamOrigin, display_text: String) {
        // A closed channel means the run is over; the transcript already has the line.
        let _ = self.tx.send(WriterMessage::Line(display_text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingTerminal, SharedBuffer};

    #[test]
    fn sink_lines_reach_the_terminal_in_order() {
        let buffer = SharedBuffer::default();
        let writer = spawn_writer_thread(buffer.clone());
        let sink = WriterSink::new(writer.sender());
        for idx in 0..50 {
            sink.emit(StreamOrigin::Stdout, format!("line {idx}"));
        }
        writer.flush();
        let output = buffer.contents();
        let mut last = 0;
        for idx in 0..50 {
            let pos = output.find(&format!("line {idx}\u{1b}")).expect("line present");
            assert!(pos >= last);
            last = pos;
        }
        writer.shutdown().expect("clean shutdown");
        assert!(buffer.contents().ends_with("\u{1b}[r"));
    }

    #[test]
    fn halt_still_resets_scroll_region() {
        let buffer = SharedBuffer::default();
        let writer = spawn_writer_thread(buffer.clone());
        writer.send(WriterMessage::Layout {
            geometry: ScreenGeometry { rows: 12, cols: 40 },
            initial: true,
        });
        writer.flush();
        writer.halt().expect("clean halt");
        assert!(buffer.contents().ends_with("\u{1b}[r"));
    }

    #[test]
    fn shutdown_reports_a_failed_reset() {
        let writer = spawn_writer_thread(FailingTerminal);
        let err = writer.shutdown().err().expect("reset failure surfaced");
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
