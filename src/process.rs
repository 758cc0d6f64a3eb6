//! The supervised child command: spawn with piped output, poll for exit, terminate on cancel.

use anyhow::{anyhow, Context, Result};
use std::io;
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};

use crate::log_debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Running,
    Exited(ExitStatus),
}

pub struct ChildProcess {
    child: Child,
    command_line: String,
}

impl ChildProcess {
    /// Launch `program` in the current directory with stdin detached and both outputs piped.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to launch `{program}`"))?;
        let mut words = Vec::with_capacity(args.len() + 1);
        words.push(program);
        words.extend(args.iter().map(String::as_str));
        let command_line = shell_words::join(words);
        log_debug(&format!("spawned pid {}: {command_line}", child.id()));
        Ok(Self {
            child,
            command_line,
        })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Hand over the output pipes. Only succeeds once.
    pub fn take_streams(&mut self) -> Result<(ChildStdout, ChildStderr)> {
        let stdout = self
            .child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("child stdout already taken"))?;
        let stderr = self
            .child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("child stderr already taken"))?;
        Ok((stdout, stderr))
    }

    pub fn poll(&mut self) -> io::Result<ChildState> {
        Ok(match self.child.try_wait()? {
            Some(status) => ChildState::Exited(status),
            None => ChildState::Running,
        })
    }

    /// Ask the child to stop with SIGTERM. Does not wait for it.
    pub fn terminate(&mut self) {
        if let Ok(ChildState::Exited(_)) = self.poll() {
            return;
        }
        #[cfg(unix)]
        unsafe {
            // SAFETY: kill(2) only takes plain integers; the pid belongs to our own child,
            // which has not been reaped yet so the id cannot have been recycled.
            if libc::kill(self.child.id() as libc::pid_t, libc::SIGTERM) != 0 {
                log_debug(&format!(
                    "failed to send SIGTERM to pid {}: {}",
                    self.child.id(),
                    io::Error::last_os_error()
                ));
            }
        }
        #[cfg(not(unix))]
        {
            if let Err(err) = self.child.kill() {
                log_debug(&format!("failed to kill child: {err}"));
            }
        }
    }
}

/// Human label for an exit status, used in the completion banner and summary.
pub fn describe_exit(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("killed by signal {signal}");
        }
    }
    "exited".to_string()
}

/// Process exit code that mirrors the child's outcome (128 + signal when killed).
pub fn exit_code_for(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return (code & 0xff) as u8;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return (128 + signal).min(255) as u8;
        }
    }
    1
}
