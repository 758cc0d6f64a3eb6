//! Turns one captured child line into its on-screen and on-disk renderings.

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthChar;

use crate::display::{AnsiColor, DisplayConfig, RESET};
use crate::geometry::ScreenGeometry;

/// Columns reserved for `" H:MM:SS.mmm"` plus the marker column.
pub const MILLIS_PREFIX_RESERVE: usize = 13;
/// Columns reserved for `" H:MM:SS"` plus the marker column.
pub const PLAIN_PREFIX_RESERVE: usize = 9;

pub const STDERR_MARKER: char = '^';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOrigin {
    Stdout,
    Stderr,
}

impl StreamOrigin {
    pub fn label(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogLine {
    pub origin: StreamOrigin,
    pub raw: String,
    pub captured_at: Instant,
    pub wall_clock: DateTime<Local>,
}

impl LogLine {
    pub fn capture(origin: StreamOrigin, raw: String) -> Self {
        Self {
            origin,
            raw,
            captured_at: Instant::now(),
            wall_clock: Local::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine {
    pub display_text: String,
    pub log_text: String,
}

/// Render elapsed run time as `" H:MM:SS"` or `" H:MM:SS.mmm"`.
///
/// Milliseconds are truncated, never rounded, so a line never appears to be from the future.
pub fn format_elapsed(elapsed: Duration, millis: bool) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let seconds = total % 60;
    if millis {
        format!(
            "{hours:>2}:{minutes:02}:{seconds:02}.{:03}",
            elapsed.subsec_millis()
        )
    } else {
        format!("{hours:>2}:{minutes:02}:{seconds:02}")
    }
}

pub fn render_timestamp(line: &LogLine, config: &DisplayConfig, started_at: Instant) -> String {
    if config.absolute_timestamps {
        line.wall_clock.format("%H:%M:%S").to_string()
    } else {
        format_elapsed(
            line.captured_at.saturating_duration_since(started_at),
            config.use_millis,
        )
    }
}

/// Content width left once the timestamp prefix is reserved. Never below one column.
pub fn truncate_width(cols: u16, millis: bool) -> usize {
    let reserve = if millis {
        MILLIS_PREFIX_RESERVE
    } else {
        PLAIN_PREFIX_RESERVE
    };
    (cols as usize).saturating_sub(reserve).max(1)
}

/// Terminals advance a tab to the next multiple of this many columns.
const TAB_STOP: usize = 8;

/// Cut `content` to at most `max_width` display columns on a char boundary.
///
/// Tabs count up to the next tab stop, measured from the start of `content`.
pub fn cut_to_width(content: &str, max_width: usize) -> &str {
    let mut width = 0usize;
    for (idx, ch) in content.char_indices() {
        let ch_width = if ch == '\t' {
            TAB_STOP - width % TAB_STOP
        } else {
            UnicodeWidthChar::width(ch).unwrap_or(0)
        };
        if width.saturating_add(ch_width) > max_width {
            return &content[..idx];
        }
        width = width.saturating_add(ch_width);
    }
    content
}

fn push_colored(out: &mut String, color: Option<AnsiColor>, text: &str) {
    match color {
        Some(color) => {
            out.push_str(color.fg());
            out.push_str(text);
            out.push_str(RESET);
        }
        None => out.push_str(text),
    }
}

pub fn format_line(
    line: &LogLine,
    config: &DisplayConfig,
    geometry: ScreenGeometry,
    started_at: Instant,
) -> FormattedLine {
    let timestamp = render_timestamp(line, config, started_at);
    let flag_stderr = line.origin == StreamOrigin::Stderr && config.mark_stderr;
    let content_color = if flag_stderr {
        config.colors.stderr
    } else {
        config.colors.base
    };

    let shown = if config.truncate {
        cut_to_width(&line.raw, truncate_width(geometry.cols, config.use_millis))
    } else {
        line.raw.as_str()
    };
    let display_colors = config.use_color.then_some((config.colors.timestamp, content_color));
    let mut display_text = String::with_capacity(timestamp.len() + shown.len() + 24);
    push_colored(&mut display_text, display_colors.map(|c| c.0), &timestamp);
    display_text.push(' ');
    push_colored(&mut display_text, display_colors.map(|c| c.1), shown);

    let marker = if flag_stderr { STDERR_MARKER } else { ' ' };
    let log_colors = config
        .color_log_file
        .then_some((config.colors.timestamp, content_color));
    let mut log_text = String::with_capacity(timestamp.len() + line.raw.len() + 24);
    push_colored(&mut log_text, log_colors.map(|c| c.0), &timestamp);
    log_text.push(marker);
    log_text.push(' ');
    push_colored(&mut log_text, log_colors.map(|c| c.1), &line.raw);

    FormattedLine {
        display_text,
        log_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_at(origin: StreamOrigin, raw: &str, started_at: Instant, elapsed: Duration) -> LogLine {
        LogLine {
            origin,
            raw: raw.to_string(),
            captured_at: started_at + elapsed,
            wall_clock: Local::now(),
        }
    }

    fn plain() -> DisplayConfig {
        DisplayConfig {
            use_color: false,
            ..DisplayConfig::default()
        }
    }

    #[test]
    fn elapsed_timestamp_with_millis() {
        let elapsed = Duration::from_millis(3_725_042);
        assert_eq!(format_elapsed(elapsed, true), " 1:02:05.042");
        assert_eq!(format_elapsed(elapsed, false), " 1:02:05");
    }

    #[test]
    fn millis_are_truncated_not_rounded() {
        let elapsed = Duration::new(59, 999_999_999);
        assert_eq!(format_elapsed(elapsed, true), " 0:00:59.999");
        assert_eq!(format_elapsed(elapsed, false), " 0:00:59");
    }

    #[test]
    fn long_runs_widen_the_hour_field() {
        assert_eq!(format_elapsed(Duration::from_secs(100 * 3600), false), "100:00:00");
    }

    #[test]
    fn absolute_timestamps_use_wall_clock() {
        let start = Instant::now();
        let line = line_at(StreamOrigin::Stdout, "x", start, Duration::ZERO);
        let config = DisplayConfig {
            absolute_timestamps: true,
            use_millis: true,
            ..plain()
        };
        let expected = line.wall_clock.format("%H:%M:%S").to_string();
        assert_eq!(render_timestamp(&line, &config, start), expected);
    }

    #[test]
    fn log_text_is_prefix_marker_space_content() {
        let start = Instant::now();
        let line = line_at(StreamOrigin::Stdout, "hello world", start, Duration::from_secs(5));
        let formatted = format_line(&line, &plain(), ScreenGeometry::default(), start);
        assert_eq!(formatted.log_text, " 0:00:05  hello world");
        assert_eq!(formatted.display_text, " 0:00:05 hello world");
    }

    #[test]
    fn stderr_marker_follows_mark_stderr() {
        let start = Instant::now();
        let line = line_at(StreamOrigin::Stderr, "oops", start, Duration::from_secs(1));
        let marked = format_line(&line, &plain(), ScreenGeometry::default(), start);
        assert_eq!(marked.log_text, " 0:00:01^ oops");

        let unmarked_config = DisplayConfig {
            mark_stderr: false,
            ..plain()
        };
        let unmarked = format_line(&line, &unmarked_config, ScreenGeometry::default(), start);
        assert_eq!(unmarked.log_text, " 0:00:01  oops");
        assert_eq!(marked.display_text, unmarked.display_text);
    }

    #[test]
    fn stderr_display_differs_only_in_color() {
        let start = Instant::now();
        let line = line_at(StreamOrigin::Stderr, "oops", start, Duration::from_secs(1));
        let marked = format_line(&line, &DisplayConfig::default(), ScreenGeometry::default(), start);
        let unmarked_config = DisplayConfig {
            mark_stderr: false,
            ..DisplayConfig::default()
        };
        let unmarked = format_line(&line, &unmarked_config, ScreenGeometry::default(), start);
        assert_ne!(marked.display_text, unmarked.display_text);
        assert!(marked.display_text.contains(AnsiColor::BrightRed.fg()));
        let strip = |text: &str| String::from_utf8(strip_ansi_escapes::strip(text)).expect("utf8");
        assert_eq!(strip(&marked.display_text), strip(&unmarked.display_text));
    }

    #[test]
    fn truncation_only_touches_display_text() {
        let start = Instant::now();
        let raw = "x".repeat(200);
        let line = line_at(StreamOrigin::Stdout, &raw, start, Duration::ZERO);
        let config = DisplayConfig {
            truncate: true,
            ..plain()
        };
        let geometry = ScreenGeometry { rows: 24, cols: 40 };
        let formatted = format_line(&line, &config, geometry, start);
        assert_eq!(formatted.display_text, format!(" 0:00:00 {}", "x".repeat(31)));
        assert!(formatted.log_text.ends_with(&raw));

        let millis = DisplayConfig {
            use_millis: true,
            ..config
        };
        let formatted = format_line(&line, &millis, geometry, start);
        assert_eq!(formatted.display_text, format!(" 0:00:00.000 {}", "x".repeat(27)));
    }

    #[test]
    fn truncate_width_never_drops_below_one() {
        assert_eq!(truncate_width(0, true), 1);
        assert_eq!(truncate_width(9, false), 1);
        assert_eq!(truncate_width(80, false), 71);
        assert_eq!(truncate_width(80, true), 67);
    }

    #[test]
    fn cut_respects_wide_chars() {
        assert_eq!(cut_to_width("日本語", 5), "日本");
        assert_eq!(cut_to_width("abc", 10), "abc");
        assert_eq!(cut_to_width("abc", 0), "");
    }

    #[test]
    fn tabs_count_to_the_next_tab_stop() {
        assert_eq!(cut_to_width("a\tb", 8), "a\t");
        assert_eq!(cut_to_width("a\tb", 9), "a\tb");
        assert_eq!(cut_to_width("\t\tx", 12), "\t");
        assert_eq!(cut_to_width("abcdefg\tz", 7), "abcdefg");
    }

    #[test]
    fn empty_line_keeps_full_prefix() {
        let start = Instant::now();
        let line = line_at(StreamOrigin::Stdout, "", start, Duration::from_millis(1500));
        let config = DisplayConfig {
            use_millis: true,
            ..plain()
        };
        let formatted = format_line(&line, &config, ScreenGeometry::default(), start);
        assert_eq!(formatted.log_text, " 0:00:01.500  ");
        assert_eq!(formatted.display_text, " 0:00:01.500 ");
    }

    #[test]
    fn log_colors_only_when_enabled() {
        let start = Instant::now();
        let line = line_at(StreamOrigin::Stderr, "oops", start, Duration::ZERO);
        let formatted = format_line(&line, &DisplayConfig::default(), ScreenGeometry::default(), start);
        assert!(!formatted.log_text.contains('\x1b'));
        assert!(formatted.display_text.contains('\x1b'));

        let colored = DisplayConfig {
            color_log_file: true,
            ..DisplayConfig::default()
        };
        let formatted = format_line(&line, &colored, ScreenGeometry::default(), start);
        assert!(formatted.log_text.contains(AnsiColor::BrightRed.fg()));
        assert!(formatted.log_text.contains("^ "));
    }
}
