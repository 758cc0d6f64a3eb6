//! End-of-run summary printed after the live view is torn down.

use stampterm::display::{AnsiColor, DisplayConfig, RESET};
use stampterm::process::describe_exit;

use crate::event_state::RunState;
use crate::supervisor::RunReport;

fn format_header(config: &DisplayConfig) -> String {
    paint(config, config.colors.timestamp, "Run Summary")
}

fn format_separator() -> String {
    "───────────".to_string()
}

fn paint(config: &DisplayConfig, color: AnsiColor, text: &str) -> String {
    if config.use_color {
        format!("{}{text}{RESET}", color.fg())
    } else {
        text.to_string()
    }
}

fn format_stat_line(label: &str, value: &str) -> String {
    format!("{label:<10} {value}")
}

fn format_duration(secs: f32) -> String {
    if secs < 60.0 {
        format!("{secs:.1}s")
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        format!("{}m {:.0}s", mins as u32, secs % 60.0)
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs % 3600.0) / 60.0).floor();
        format!("{}h {}m", hours as u32, mins as u32)
    }
}

fn outcome_text(report: &RunReport, config: &DisplayConfig) -> String {
    match report.state {
        RunState::Finished(status) if status.success() => {
            paint(config, config.colors.flash, &describe_exit(status))
        }
        RunState::Finished(status) => paint(config, config.colors.stderr, &describe_exit(status)),
        RunState::Cancelled | RunState::Running => paint(config, config.colors.stderr, "cancelled"),
    }
}

pub(crate) fn format_run_summary(report: &RunReport, config: &DisplayConfig) -> String {
    let mut lines = vec![
        format_header(config),
        format_separator(),
        format_stat_line("Command", &report.command_line),
        format_stat_line("Outcome", &outcome_text(report, config)),
        format_stat_line("Duration", &format_duration(report.elapsed.as_secs_f32())),
        format_stat_line(
            "Lines",
            &format!("{} out, {} err", report.stdout_lines, report.stderr_lines),
        ),
    ];
    if report.log_errors > 0 {
        lines.push(format_stat_line(
            "Log errors",
            &paint(config, config.colors.stderr, &report.log_errors.to_string()),
        ));
    }
    lines.push(format_stat_line(
        "Log",
        &report.log_path.display().to_string(),
    ));
    lines.join("\n")
}
