use std::io::{self, Write};

use stampterm::geometry::ScreenGeometry;
use stampterm::terminal_restore::RESET_SCROLL_REGION;

const SAVE_CURSOR: &[u8] = b"\x1b[s\x1b7";
const RESTORE_CURSOR: &[u8] = b"\x1b[u\x1b8";
const CLEAR_LINE: &[u8] = b"\x1b[2K";
const CLEAR_SCREEN: &[u8] = b"\x1b[2J\x1b[H";
const RESET_ATTRS: &[u8] = b"\x1b[0m";

fn move_to(sequence: &mut Vec<u8>, row: u16, col: u16) {
    sequence.extend_from_slice(format!("\x1b[{row};{col}H").as_bytes());
}

/// Anchor the scroll region above the status row and park the log cursor.
///
/// The first layout starts from a clean screen with the cursor at the top. Later layouts
/// (after a resize) park the cursor on the last log row, since earlier content may have
/// moved anywhere. A screen too short for a status row scrolls as a whole.
pub(super) fn write_layout(
    stdout: &mut dyn Write,
    geometry: ScreenGeometry,
    initial: bool,
) -> io::Result<()> {
    let mut sequence = Vec::new();
    if initial {
        sequence.extend_from_slice(CLEAR_SCREEN);
    }
    if !geometry.has_status_row() {
        sequence.extend_from_slice(RESET_SCROLL_REGION);
        let park_row = if initial { 1 } else { geometry.rows.max(1) };
        move_to(&mut sequence, park_row, 1);
        sequence.extend_from_slice(SAVE_CURSOR);
        return stdout.write_all(&sequence);
    }
    let bottom = geometry.scroll_bottom();
    sequence.extend_from_slice(format!("\x1b[1;{bottom}r").as_bytes());
    for row in [bottom, geometry.rows] {
        move_to(&mut sequence, row, 1);
        sequence.extend_from_slice(CLEAR_LINE);
    }
    let park_row = if initial { 1 } else { bottom };
    move_to(&mut sequence, park_row, 1);
    sequence.extend_from_slice(SAVE_CURSOR);
    stdout.write_all(&sequence)
}

/// Append one log line inside the scroll region and remember where it ended.
pub(super) fn write_log_line(stdout: &mut dyn Write, text: &str) -> io::Result<()> {
    let mut sequence = Vec::with_capacity(text.len() + 24);
    sequence.extend_from_slice(RESTORE_CURSOR);
    sequence.extend_from_slice(text.as_bytes());
    sequence.extend_from_slice(RESET_ATTRS);
    sequence.extend_from_slice(b"\r\n");
    sequence.extend_from_slice(SAVE_CURSOR);
    stdout.write_all(&sequence)
}

/// Redraw the status row, then return to the saved log position.
pub(super) fn write_status_line(
    stdout: &mut dyn Write,
    text: &str,
    geometry: ScreenGeometry,
) -> io::Result<()> {
    if !geometry.has_status_row() || geometry.cols == 0 {
        return Ok(());
    }
    let mut sequence = Vec::with_capacity(text.len() + 24);
    move_to(&mut sequence, geometry.rows, 1);
    sequence.extend_from_slice(CLEAR_LINE);
    sequence.extend_from_slice(text.as_bytes());
    sequence.extend_from_slice(RESET_ATTRS);
    sequence.extend_from_slice(RESTORE_CURSOR);
    stdout.write_all(&sequence)
}

pub(super) fn reset_scroll_region(stdout: &mut dyn Write) -> io::Result<()> {
    stdout.write_all(RESET_SCROLL_REGION)
}
