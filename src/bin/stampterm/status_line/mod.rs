//! Bottom-row status text: blinking marker, command identity, and live mode flags.

mod text;

use std::time::Duration;

use stampterm::display::{DisplayConfig, RESET};
use stampterm::format::format_elapsed;

pub(crate) use text::{sanitize_status, truncate_display};

const BLINK_ON: &str = "●";
const BLINK_OFF: &str = " ";

#[derive(Debug, Clone)]
pub(crate) struct StatusView<'a> {
    pub(crate) blink: bool,
    pub(crate) cwd: &'a str,
    pub(crate) command_line: &'a str,
    pub(crate) stdout_lines: u64,
    pub(crate) stderr_lines: u64,
    pub(crate) elapsed: Duration,
    pub(crate) config: DisplayConfig,
    /// Short-lived message, e.g. the toggle just applied
    pub(crate) notice: Option<&'a str>,
}

fn flag(on: bool, upper: char, lower: char) -> char {
    if on {
        upper
    } else {
        lower
    }
}

/// `T`/`t`, `M`/`m`, `A`/`a`: uppercase when the option is on, matching the keys.
pub(crate) fn mode_flags(config: &DisplayConfig) -> String {
    [
        flag(config.truncate, 'T', 't'),
        flag(config.use_millis, 'M', 'm'),
        flag(config.absolute_timestamps, 'A', 'a'),
    ]
    .iter()
    .collect()
}

fn paint(use_color: bool, color: &str, text: &str) -> String {
    if use_color {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub(crate) fn format_status(view: &StatusView<'_>) -> String {
    let config = &view.config;
    let marker = if view.blink { BLINK_ON } else { BLINK_OFF };
    let mut line = String::new();
    line.push_str(&paint(config.use_color, config.colors.flash.fg(), marker));
    line.push(' ');
    line.push_str(&paint(
        config.use_color,
        config.colors.timestamp.fg(),
        format_elapsed(view.elapsed, false).trim_start(),
    ));
    line.push(' ');
    line.push_str(&sanitize_status(view.cwd));
    line.push_str(" $ ");
    line.push_str(&sanitize_status(view.command_line));
    line.push_str(&format!(
        "  [out {} | err {}] [{}]",
        view.stdout_lines,
        view.stderr_lines,
        mode_flags(config)
    ));
    if let Some(notice) = view.notice {
        line.push_str("  ");
        line.push_str(&paint(config.use_color, config.colors.flash.fg(), notice));
    }
    line
}

/// Completion banner shown on the status row while waiting for acknowledgement.
pub(crate) fn format_finish_banner(
    outcome: &str,
    success: bool,
    config: &DisplayConfig,
    has_pager: bool,
) -> String {
    let (icon, color) = if success {
        ("✓", config.colors.flash.fg())
    } else {
        ("✗", config.colors.stderr.fg())
    };
    let next = if has_pager {
        "press any key to review the log"
    } else {
        "press any key to exit"
    };
    format!(
        "{} finished ({outcome}), {next}",
        paint(config.use_color, color, icon)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    fn view(config: DisplayConfig) -> StatusView<'static> {
        StatusView {
            blink: true,
            cwd: "/srv/build",
            command_line: "make -j8",
            stdout_lines: 12,
            stderr_lines: 3,
            elapsed: Duration::from_secs(65),
            config,
            notice: None,
        }
    }

    #[test]
    fn status_shows_identity_counts_and_flags() {
        let config = DisplayConfig {
            use_color: false,
            truncate: true,
            ..DisplayConfig::default()
        };
        let text = format_status(&view(config));
        assert_eq!(
            text,
            "● 0:01:05 /srv/build $ make -j8  [out 12 | err 3] [Tma]"
        );
    }

    #[test]
    fn blink_alternates_marker_only() {
        let config = DisplayConfig {
            use_color: false,
            ..DisplayConfig::default()
        };
        let on = format_status(&view(config));
        let mut off_view = view(config);
        off_view.blink = false;
        let off = format_status(&off_view);
        assert_ne!(on, off);
        assert_eq!(on[BLINK_ON.len()..], off[BLINK_OFF.len()..]);
        assert_eq!(on.as_str().width(), off.as_str().width());
    }

    #[test]
    fn colored_status_uses_flash_color_for_marker() {
        let config = DisplayConfig::default();
        let text = format_status(&view(config));
        assert!(text.starts_with(&format!("{}●", config.colors.flash.fg())));
    }

    #[test]
    fn notice_is_appended() {
        let config = DisplayConfig {
            use_color: false,
            ..DisplayConfig::default()
        };
        let mut with_notice = view(config);
        with_notice.notice = Some("millis on");
        assert!(format_status(&with_notice).ends_with("  millis on"));
    }

    #[test]
    fn finish_banner_reports_outcome() {
        let config = DisplayConfig {
            use_color: false,
            ..DisplayConfig::default()
        };
        assert_eq!(
            format_finish_banner("exit 0", true, &config, true),
            "✓ finished (exit 0), press any key to review the log"
        );
        assert_eq!(
            format_finish_banner("exit 2", false, &config, false),
            "✗ finished (exit 2), press any key to exit"
        );
    }
}
