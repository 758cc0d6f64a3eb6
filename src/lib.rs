pub mod config;
pub mod display;
pub mod format;
pub mod geometry;
mod lock;
mod logging;
pub mod process;
pub mod reader;
mod telemetry;
pub mod terminal_restore;
pub mod transcript;

pub use logging::{
    init_logging, log_debug, log_debug_content, log_file_path, log_panic, log_transcript_failure,
};
