//! Persistent transcript log shared by both stream readers.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::lock::lock_or_recover;

/// One fresh file per run; appends are whole lines under a single lock.
#[derive(Debug)]
pub struct TranscriptLog {
    path: PathBuf,
    file: Mutex<BufWriter<File>>,
}

impl TranscriptLog {
    /// Create (or truncate) the transcript file, creating parent directories as needed.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        Ok(Self {
            path,
            file: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `text` plus a newline and flush before releasing the lock.
    pub fn append(&self, text: &str) -> io::Result<()> {
        let mut file = lock_or_recover(&self.file, "TranscriptLog::append");
        file.write_all(text.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()
    }

    pub fn flush(&self) -> io::Result<()> {
        lock_or_recover(&self.file, "TranscriptLog::flush").flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn create_truncates_previous_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.log");
        fs::write(&path, "stale line\n").expect("seed");
        let log = TranscriptLog::create(&path).expect("create");
        log.append("fresh").expect("append");
        assert_eq!(fs::read_to_string(&path).expect("read"), "fresh\n");
    }

    #[test]
    fn create_makes_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("deeper").join("run.log");
        let log = TranscriptLog::create(&path).expect("create");
        assert_eq!(log.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn create_fails_when_path_is_a_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(TranscriptLog::create(dir.path()).is_err());
    }

    #[test]
    fn concurrent_appends_never_split_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.log");
        let log = Arc::new(TranscriptLog::create(&path).expect("create"));
        let handles: Vec<_> = ['a', 'b']
            .into_iter()
            .map(|ch| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    let line = ch.to_string().repeat(512);
                    for _ in 0..200 {
                        log.append(&line).expect("append");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer");
        }
        let contents = fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            assert_eq!(line.len(), 512);
            let first = line.chars().next().expect("non-empty");
            assert!(line.chars().all(|ch| ch == first));
        }
    }
}
