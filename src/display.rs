//! Live display options shared by the stream readers and the keypress handler.
//!
//! Readers take a [`DisplayConfig`] snapshot once per line; the supervisor is the only
//! writer and flips one option per keypress, so a snapshot is never half-updated.

use clap::ValueEnum;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::lock::{read_or_recover, write_or_recover};

pub const RESET: &str = "\x1b[0m";

/// Named foreground colors selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnsiColor {
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl AnsiColor {
    /// SGR sequence that selects this foreground color.
    pub fn fg(self) -> &'static str {
        match self {
            Self::Default => "\x1b[39m",
            Self::Black => "\x1b[30m",
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Blue => "\x1b[34m",
            Self::Magenta => "\x1b[35m",
            Self::Cyan => "\x1b[36m",
            Self::White => "\x1b[37m",
            Self::Gray => "\x1b[90m",
            Self::BrightRed => "\x1b[91m",
            Self::BrightGreen => "\x1b[92m",
            Self::BrightYellow => "\x1b[93m",
            Self::BrightBlue => "\x1b[94m",
            Self::BrightMagenta => "\x1b[95m",
            Self::BrightCyan => "\x1b[96m",
            Self::BrightWhite => "\x1b[97m",
        }
    }
}

impl fmt::Display for AnsiColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self
            .to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_else(|| format!("{self:?}"));
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Line content
    pub base: AnsiColor,
    /// Timestamp prefix
    pub timestamp: AnsiColor,
    /// Blinking status marker and completion banner
    pub flash: AnsiColor,
    /// Content of stderr lines when stderr marking is on
    pub stderr: AnsiColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            base: AnsiColor::Default,
            timestamp: AnsiColor::Cyan,
            flash: AnsiColor::BrightYellow,
            stderr: AnsiColor::BrightRed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub use_color: bool,
    pub use_millis: bool,
    pub truncate: bool,
    pub absolute_timestamps: bool,
    pub color_log_file: bool,
    pub mark_stderr: bool,
    pub colors: Palette,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            use_millis: false,
            truncate: false,
            absolute_timestamps: false,
            color_log_file: false,
            mark_stderr: true,
            colors: Palette::default(),
        }
    }
}

/// A single runtime toggle bound to an operator key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    TruncateOff,
    TruncateOn,
    MillisOff,
    MillisOn,
    RelativeTime,
    AbsoluteTime,
}

impl Toggle {
    /// Map an operator key to its toggle. Unknown keys map to `None`.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            't' => Some(Self::TruncateOff),
            'T' => Some(Self::TruncateOn),
            'm' => Some(Self::MillisOff),
            'M' => Some(Self::MillisOn),
            'a' => Some(Self::RelativeTime),
            'A' => Some(Self::AbsoluteTime),
            _ => None,
        }
    }

    pub fn apply(self, config: &mut DisplayConfig) {
        match self {
            Self::TruncateOff => config.truncate = false,
            Self::TruncateOn => config.truncate = true,
            Self::MillisOff => config.use_millis = false,
            Self::MillisOn => config.use_millis = true,
            Self::RelativeTime => config.absolute_timestamps = false,
            Self::AbsoluteTime => config.absolute_timestamps = true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TruncateOff => "truncate off",
            Self::TruncateOn => "truncate on",
            Self::MillisOff => "millis off",
            Self::MillisOn => "millis on",
            Self::RelativeTime => "relative time",
            Self::AbsoluteTime => "absolute time",
        }
    }
}

/// Shared, live-mutable [`DisplayConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<DisplayConfig>>,
}

impl ConfigStore {
    pub fn new(initial: DisplayConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn get(&self) -> DisplayConfig {
        *read_or_recover(&self.inner, "ConfigStore::get")
    }

    /// Apply one toggle and return the resulting snapshot.
    pub fn set(&self, toggle: Toggle) -> DisplayConfig {
        self.update(|config| toggle.apply(config))
    }

    pub fn update(&self, apply: impl FnOnce(&mut DisplayConfig)) -> DisplayConfig {
        let mut guard = write_or_recover(&self.inner, "ConfigStore::update");
        apply(&mut guard);
        *guard
    }
}
