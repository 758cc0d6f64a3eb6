//! Hand the finished transcript to a pager.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::{Command, ExitStatus};

/// Split a pager command line (`less -R`, `"my pager" --flag`) into program and args.
pub(crate) fn parse_pager(command: &str) -> Result<(String, Vec<String>)> {
    let mut words = shell_words::split(command)
        .with_context(|| format!("invalid pager command: {command}"))?;
    if words.is_empty() {
        bail!("pager command is empty");
    }
    let program = words.remove(0);
    Ok((program, words))
}

/// Run the pager on `log_path` in the foreground and wait for it.
pub(crate) fn run_pager(command: &str, log_path: &Path) -> Result<ExitStatus> {
    let (program, args) = parse_pager(command)?;
    Command::new(&program)
        .args(&args)
        .arg(log_path)
        .status()
        .with_context(|| format!("failed to start pager `{program}`"))
}
