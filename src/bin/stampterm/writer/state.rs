//! Writer thread state so log lines, status redraws, and layout changes stay ordered.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use stampterm::geometry::ScreenGeometry;
use stampterm::log_debug;
use stampterm::terminal_restore::mark_scroll_region_set;

use super::render::{reset_scroll_region, write_layout, write_log_line, write_status_line};
use super::WriterMessage;
use crate::status_line::truncate_display;

pub(super) struct WriterState<W: Write> {
    stdout: W,
    geometry: ScreenGeometry,
    /// Last status text, redrawn after a re-layout wipes the status row.
    status: Option<String>,
    halted: Arc<AtomicBool>,
    /// Set when the writer stopped without managing to reset the scroll region.
    reset_error: Option<io::Error>,
}

impl<W: Write> WriterState<W> {
    pub(super) fn new(stdout: W, halted: Arc<AtomicBool>) -> Self {
        Self {
            stdout,
            geometry: ScreenGeometry::default(),
            status: None,
            halted,
            reset_error: None,
        }
    }

    /// Consume the state, handing back a failed scroll-region reset if there was one.
    pub(super) fn into_reset_error(self) -> Option<io::Error> {
        self.reset_error
    }

    /// Returns `false` once the writer should exit.
    pub(super) fn handle_message(&mut self, message: WriterMessage) -> bool {
        if self.halted.load(Ordering::SeqCst)
            && matches!(
                message,
                WriterMessage::Line(_) | WriterMessage::Status(_) | WriterMessage::Layout { .. }
            )
        {
            return true;
        }
        match message {
            WriterMessage::Line(text) => {
                if let Err(err) = write_log_line(&mut self.stdout, &text) {
                    log_debug(&format!("log line write failed: {err}"));
                    self.reset_error = Some(err);
                    return false;
                }
                self.flush();
            }
            WriterMessage::Status(text) => {
                self.draw_status(text);
                self.flush();
            }
            WriterMessage::Layout { geometry, initial } => {
                self.geometry = geometry;
                match write_layout(&mut self.stdout, geometry, initial) {
                    Ok(()) if geometry.has_status_row() => mark_scroll_region_set(),
                    Ok(()) => {}
                    Err(err) => log_debug(&format!("layout write failed: {err}")),
                }
                if let Some(text) = self.status.take() {
                    self.draw_status(text);
                }
                self.flush();
            }
            WriterMessage::Flush(ack) => {
                self.flush();
                let _ = ack.send(());
            }
            WriterMessage::Shutdown => {
                let reset = reset_scroll_region(&mut self.stdout)
                    .and_then(|()| self.stdout.flush());
                if let Err(err) = reset {
                    log_debug(&format!("scroll region reset failed: {err}"));
                    self.reset_error = Some(err);
                }
                return false;
            }
        }
        true
    }

    fn draw_status(&mut self, text: String) {
        let clipped = truncate_display(&text, self.geometry.cols as usize);
        if let Err(err) = write_status_line(&mut self.stdout, &clipped, self.geometry) {
            log_debug(&format!("status write failed: {err}"));
        }
        self.status = Some(text);
    }

    fn flush(&mut self) {
        if let Err(err) = self.stdout.flush() {
            log_debug(&format!("stdout flush failed: {err}"));
        }
    }

    #[cfg(test)]
    pub(super) fn output(&self) -> &W {
        &self.stdout
    }
}
