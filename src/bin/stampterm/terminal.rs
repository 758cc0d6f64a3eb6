//! Terminal session plumbing: interrupt signals and screen (re)layout.

use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use stampterm::geometry::{GeometryCell, ScreenGeometry};
use stampterm::log_debug;

use crate::writer::{WriterHandle, WriterMessage};

/// Flag set by SIGINT/SIGTERM/SIGHUP handlers to cancel the run.
static INTERRUPT_RECEIVED: AtomicBool = AtomicBool::new(false);

const INTERRUPT_SIGNALS: [libc::c_int; 3] = [libc::SIGINT, libc::SIGTERM, libc::SIGHUP];

/// Only flips an atomic flag (async-signal-safe); the event loop does the cleanup.
extern "C" fn handle_interrupt(_: libc::c_int) {
    INTERRUPT_RECEIVED.store(true, Ordering::SeqCst);
}

pub(crate) fn install_interrupt_handlers() -> Result<()> {
    for signal in INTERRUPT_SIGNALS {
        unsafe {
            // SAFETY: handle_interrupt is an extern "C" handler whose only effect is an
            // atomic store, which is async-signal-safe.
            let handler = handle_interrupt as *const () as libc::sighandler_t;
            if libc::signal(signal, handler) == libc::SIG_ERR {
                log_debug(&format!("failed to install handler for signal {signal}"));
                return Err(anyhow!("failed to install handler for signal {signal}"));
            }
        }
    }
    Ok(())
}

pub(crate) fn take_interrupt() -> bool {
    INTERRUPT_RECEIVED.swap(false, Ordering::SeqCst)
}

/// Record the new geometry and re-anchor the scroll region for it.
pub(crate) fn apply_layout(
    geometry_cell: &GeometryCell,
    writer: &WriterHandle,
    geometry: ScreenGeometry,
    initial: bool,
) {
    geometry_cell.set(geometry);
    writer.send(WriterMessage::Layout { geometry, initial });
}
