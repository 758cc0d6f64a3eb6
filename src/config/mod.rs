//! Command-line parsing and validation helpers.

#[cfg(test)]
mod tests;
mod validation;

use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;

use crate::display::AnsiColor;

pub use validation::default_log_path;

pub const DEFAULT_PAGER: &str = "less -R";

/// CLI options for stampterm. Everything here is resolved before the live view starts.
#[derive(Debug, Parser, Clone)]
#[command(
    about = "Stampterm: run a command with a timestamped, stream-tagged live transcript",
    author,
    version,
    after_help = "Keys while running: t/T truncate off/on, m/M millis off/on, \
                  a/A relative/absolute time, Ctrl-C cancel"
)]
pub struct AppConfig {
    /// Disable colors on screen (also honored via NO_COLOR)
    #[arg(long = "no-color", default_value_t = false)]
    pub no_color: bool,

    /// Show milliseconds in relative timestamps
    #[arg(short = 'm', long = "millis", default_value_t = false)]
    pub millis: bool,

    /// Truncate long lines to the terminal width (the log keeps full lines)
    #[arg(short = 't', long = "truncate", default_value_t = false)]
    pub truncate: bool,

    /// Start with wall-clock timestamps instead of elapsed time
    #[arg(short = 'a', long = "absolute", default_value_t = false)]
    pub absolute: bool,

    /// Keep color codes in the log file
    #[arg(short = 'l', long = "color-log", default_value_t = false)]
    pub color_log: bool,

    /// Do not mark stderr lines with `^` and the stderr color
    #[arg(long = "no-mark-stderr", default_value_t = false)]
    pub no_mark_stderr: bool,

    /// Color of line content
    #[arg(long = "color-base", value_enum, default_value_t = AnsiColor::Default)]
    pub color_base: AnsiColor,

    /// Color of the timestamp prefix
    #[arg(long = "color-timestamp", value_enum, default_value_t = AnsiColor::Cyan)]
    pub color_timestamp: AnsiColor,

    /// Color of the blinking status marker
    #[arg(long = "color-flash", value_enum, default_value_t = AnsiColor::BrightYellow)]
    pub color_flash: AnsiColor,

    /// Color of stderr content
    #[arg(long = "color-stderr", value_enum, default_value_t = AnsiColor::BrightRed)]
    pub color_stderr: AnsiColor,

    /// Transcript log path (defaults to ~/.stampterm/last.log)
    #[arg(long = "log-file", env = "STAMPTERM_LOG", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Pager used to review the transcript after the command finishes
    #[arg(long = "pager", env = "STAMPTERM_PAGER", default_value = DEFAULT_PAGER)]
    pub pager: String,

    /// Skip the pager after the command finishes
    #[arg(long = "no-pager", default_value_t = false)]
    pub no_pager: bool,

    /// Enable debug logging to the temp dir
    #[arg(
        long = "logs",
        env = "STAMPTERM_LOGS",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    pub logs: bool,

    /// Disable all debug logging (overrides --logs)
    #[arg(
        long = "no-logs",
        env = "STAMPTERM_NO_LOGS",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    pub no_logs: bool,

    /// Allow child output snippets in the debug log
    #[arg(long = "log-content", default_value_t = false)]
    pub log_content: bool,

    /// Command to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}
