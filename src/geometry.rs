use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub const DEFAULT_ROWS: u16 = 25;
pub const DEFAULT_COLS: u16 = 80;
/// Fewer rows than this leave no room for a log region above the status row.
pub const MIN_STATUS_ROWS: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub rows: u16,
    pub cols: u16,
}

impl ScreenGeometry {
    /// Current terminal size, or 80x25 when it cannot be determined.
    pub fn detect() -> Self {
        match crossterm::terminal::size() {
            Ok((cols, rows)) => Self::from_size(rows, cols),
            Err(err) => {
                crate::log_debug(&format!("terminal size unavailable: {err}"));
                Self::default()
            }
        }
    }

    /// Zero-sized reports (seen on some detached ptys) fall back to the defaults.
    pub fn from_size(rows: u16, cols: u16) -> Self {
        Self {
            rows: if rows == 0 { DEFAULT_ROWS } else { rows },
            cols: if cols == 0 { DEFAULT_COLS } else { cols },
        }
    }

    /// Last row of the scrolling log region; the row below it holds the status line.
    pub fn scroll_bottom(self) -> u16 {
        self.rows.saturating_sub(1).max(1)
    }

    /// Whether the screen is tall enough to pin a status row below the log.
    pub fn has_status_row(self) -> bool {
        self.rows >= MIN_STATUS_ROWS
    }

    fn pack(self) -> u32 {
        (u32::from(self.rows) << 16) | u32::from(self.cols)
    }

    fn unpack(bits: u32) -> Self {
        Self {
            rows: (bits >> 16) as u16,
            cols: (bits & 0xffff) as u16,
        }
    }
}

impl Default for ScreenGeometry {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

/// Lock-free shared geometry: rows and cols live in one word so readers never see a mix.
#[derive(Debug, Clone)]
pub struct GeometryCell {
    bits: Arc<AtomicU32>,
}

impl GeometryCell {
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(geometry.pack())),
        }
    }

    pub fn get(&self) -> ScreenGeometry {
        ScreenGeometry::unpack(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, geometry: ScreenGeometry) {
        self.bits.store(geometry.pack(), Ordering::Release);
    }
}

impl Default for GeometryCell {
    fn default() -> Self {
        Self::new(ScreenGeometry::default())
    }
}
