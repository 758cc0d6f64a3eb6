use super::AppConfig;
use crate::display::{DisplayConfig, Palette};
use anyhow::{bail, Result};
use clap::Parser;
use std::{env, path::PathBuf};

const LOG_DIR_NAME: &str = ".stampterm";
const LOG_FILE_NAME: &str = "last.log";

/// `~/.stampterm/last.log`, or the temp dir when there is no home directory.
pub fn default_log_path() -> PathBuf {
    match env::var_os("HOME").filter(|home| !home.is_empty()) {
        Some(home) => PathBuf::from(home).join(LOG_DIR_NAME).join(LOG_FILE_NAME),
        None => env::temp_dir().join("stampterm").join(LOG_FILE_NAME),
    }
}

fn no_color_env() -> bool {
    env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and resolve the log path.
    pub fn validate(&mut self) -> Result<()> {
        match self.command.first() {
            None => bail!("no command given"),
            Some(program) if program.trim().is_empty() => bail!("command must not be empty"),
            Some(_) => {}
        }
        let log_path = self.log_file.clone().unwrap_or_else(default_log_path);
        if log_path.is_dir() {
            bail!("--log-file points at a directory: {}", log_path.display());
        }
        self.log_file = Some(log_path);
        if self.pager.trim().is_empty() {
            self.no_pager = true;
        }
        Ok(())
    }

    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    pub fn program_args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(default_log_path)
    }

    /// Initial live display options.
    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            use_color: !self.no_color && !no_color_env(),
            use_millis: self.millis,
            truncate: self.truncate,
            absolute_timestamps: self.absolute,
            color_log_file: self.color_log,
            mark_stderr: !self.no_mark_stderr,
            colors: Palette {
                base: self.color_base,
                timestamp: self.color_timestamp,
                flash: self.color_flash,
                stderr: self.color_stderr,
            },
        }
    }
}
