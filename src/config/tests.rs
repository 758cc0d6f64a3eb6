use super::{default_log_path, AppConfig};
use crate::display::AnsiColor;
use clap::Parser;

#[test]
fn trailing_command_keeps_its_own_flags() {
    let cfg = AppConfig::parse_from(["stampterm", "-m", "make", "-j8", "--keep-going"]);
    assert!(cfg.millis);
    assert_eq!(cfg.program(), "make");
    assert_eq!(cfg.program_args(), ["-j8", "--keep-going"]);
}

#[test]
fn command_is_required() {
    assert!(AppConfig::try_parse_from(["stampterm"]).is_err());
    assert!(AppConfig::try_parse_from(["stampterm", "--truncate"]).is_err());
}

#[test]
fn rejects_blank_command() {
    let mut cfg = AppConfig::parse_from(["stampterm", "  "]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_log_file_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cfg = AppConfig::parse_from([
        "stampterm",
        "--log-file",
        dir.path().to_str().expect("utf8 path"),
        "true",
    ]);
    assert!(cfg.validate().is_err());
}

#[test]
fn validate_resolves_log_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("run.log");
    let mut cfg = AppConfig::parse_from([
        "stampterm",
        "--log-file",
        path.to_str().expect("utf8 path"),
        "true",
    ]);
    cfg.validate().expect("valid config");
    assert_eq!(cfg.log_path(), path);
}

#[test]
fn default_log_path_ends_with_last_log() {
    assert!(default_log_path().ends_with("last.log"));
}

#[test]
fn display_config_reflects_flags() {
    let cfg = AppConfig::parse_from([
        "stampterm",
        "-t",
        "-a",
        "-l",
        "--no-mark-stderr",
        "--color-stderr",
        "magenta",
        "ls",
    ]);
    let display = cfg.display_config();
    assert!(display.truncate);
    assert!(display.absolute_timestamps);
    assert!(display.color_log_file);
    assert!(!display.mark_stderr);
    assert!(!display.use_millis);
    assert_eq!(display.colors.stderr, AnsiColor::Magenta);
    assert_eq!(display.colors.timestamp, AnsiColor::Cyan);
}

#[test]
fn no_color_flag_disables_screen_color() {
    let cfg = AppConfig::parse_from(["stampterm", "--no-color", "ls"]);
    assert!(!cfg.display_config().use_color);
}

#[test]
fn empty_pager_disables_paging() {
    let mut cfg = AppConfig::parse_from(["stampterm", "--pager", "", "ls"]);
    cfg.validate().expect("valid config");
    assert!(cfg.no_pager);
}

#[test]
fn debug_log_switches_accept_numeric_env_values() {
    // Only this test touches these variables.
    std::env::set_var("STAMPTERM_NO_LOGS", "1");
    std::env::set_var("STAMPTERM_LOGS", "yes");
    let parsed = AppConfig::try_parse_from(["stampterm", "ls"]);
    std::env::set_var("STAMPTERM_LOGS", "0");
    let off = AppConfig::try_parse_from(["stampterm", "ls"]);
    std::env::remove_var("STAMPTERM_NO_LOGS");
    std::env::remove_var("STAMPTERM_LOGS");

    let cfg = parsed.expect("numeric env values parse");
    assert!(cfg.no_logs);
    assert!(cfg.logs);
    assert!(!off.expect("falsey env value parses").logs);
}
