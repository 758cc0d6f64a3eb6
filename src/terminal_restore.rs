use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::ResetColor,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use std::{
    io::{self, Write},
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock,
    },
};

/// Resets DECSTBM margins back to the full screen.
pub const RESET_SCROLL_REGION: &[u8] = b"\x1b[r";

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static SCROLL_REGION_SET: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// RAII guard to restore terminal state on drop (and on panic via a shared hook).
pub struct TerminalRestoreGuard;

impl TerminalRestoreGuard {
    pub fn new() -> Self {
        install_terminal_panic_hook();
        TerminalRestoreGuard
    }

    pub fn enable_raw_mode(&self) -> io::Result<()> {
        enable_raw_mode()?;
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn hide_cursor(&self, stdout: &mut impl Write) -> io::Result<()> {
        execute!(stdout, Hide)
    }

    /// Restore the terminal. Returns whatever failed so the caller can report it once
    /// the screen is usable again.
    pub fn restore(&self) -> Vec<io::Error> {
        restore_terminal()
    }

    /// Restore and wipe the screen, used when leaving the live view for good.
    pub fn restore_and_clear(&self) -> Vec<io::Error> {
        let mut stdout = io::stdout();
        let mut failures = restore_terminal_to(&mut stdout);
        if let Err(err) = execute!(stdout, Clear(ClearType::All), MoveTo(0, 0)) {
            failures.push(err);
        }
        failures
    }
}

impl Default for TerminalRestoreGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalRestoreGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

/// Record that a scroll region is active so restore knows to reset it.
pub fn mark_scroll_region_set() {
    SCROLL_REGION_SET.store(true, Ordering::SeqCst);
}

/// Put the real terminal back to a usable state. Safe to call any number of times.
pub fn restore_terminal() -> Vec<io::Error> {
    restore_terminal_to(&mut io::stdout())
}

/// Reset the scroll region (once), colors, raw mode, and cursor visibility on `out`.
///
/// The cursor is shown on every call since a child or a panic may have hidden it again.
pub fn restore_terminal_to(out: &mut impl Write) -> Vec<io::Error> {
    let mut failures = Vec::new();
    if SCROLL_REGION_SET.swap(false, Ordering::SeqCst) {
        if let Err(err) = out.write_all(RESET_SCROLL_REGION) {
            failures.push(err);
        }
    }
    if let Err(err) = execute!(out, ResetColor) {
        failures.push(err);
    }
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        if let Err(err) = disable_raw_mode() {
            failures.push(err);
        }
    }
    if let Err(err) = execute!(out, Show) {
        failures.push(err);
    }
    if let Err(err) = out.flush() {
        failures.push(err);
    }
    failures
}

pub fn install_terminal_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            crate::log_panic(info);
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            crate::log_debug(&format!("panic at {location}"));
            crate::log_debug_content(&format!("panic: {info}"));
            previous(info);
        }));
    });
}
