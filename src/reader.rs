//! Per-stream reader threads: split child output into lines, stamp, and dispatch.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::display::ConfigStore;
use crate::format::{format_line, LogLine, StreamOrigin};
use crate::geometry::GeometryCell;
use crate::{log_debug, log_transcript_failure};
use crate::transcript::TranscriptLog;

/// Receives display text for the live screen.
pub trait LineSink: Send + Sync {
    fn emit(&self, origin: StreamOrigin, display_text: String);
}

/// Lines seen so far on each stream.
#[derive(Debug, Default)]
pub struct LineCounters {
    stdout: AtomicU64,
    stderr: AtomicU64,
}

impl LineCounters {
    pub fn record(&self, origin: StreamOrigin) {
        self.counter(origin).fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, origin: StreamOrigin) -> u64 {
        self.counter(origin).load(Ordering::Relaxed)
    }

    fn counter(&self, origin: StreamOrigin) -> &AtomicU64 {
        match origin {
            StreamOrigin::Stdout => &self.stdout,
            StreamOrigin::Stderr => &self.stderr,
        }
    }
}

/// Everything a reader needs to turn bytes into output; cheap to clone per stream.
#[derive(Clone)]
pub struct ReaderContext {
    pub config: ConfigStore,
    pub geometry: GeometryCell,
    pub log: Arc<TranscriptLog>,
    pub sink: Arc<dyn LineSink>,
    pub counters: Arc<LineCounters>,
    pub started_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderReport {
    pub origin: StreamOrigin,
    pub lines: u64,
    pub log_errors: u64,
}

pub fn spawn_stream_reader<R>(
    origin: StreamOrigin,
    source: R,
    ctx: ReaderContext,
) -> thread::JoinHandle<ReaderReport>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || read_stream(origin, source, &ctx))
}

/// Drop the line terminator (`\n` or `\r\n`) in place.
fn trim_line_ending(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
}

/// Read `source` to end-of-stream. Read errors end this stream only.
pub fn read_stream<R: Read>(origin: StreamOrigin, source: R, ctx: &ReaderContext) -> ReaderReport {
    let mut reader = BufReader::new(source);
    let mut buf = Vec::with_capacity(256);
    let mut report = ReaderReport {
        origin,
        lines: 0,
        log_errors: 0,
    };
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                log_debug(&format!("{} read error, closing stream: {err}", origin.label()));
                tracing::warn!(stream = origin.label(), error = %err, "stream read failed");
                break;
            }
        }
        trim_line_ending(&mut buf);
        let line = LogLine::capture(origin, String::from_utf8_lossy(&buf).into_owned());
        let formatted = format_line(&line, &ctx.config.get(), ctx.geometry.get(), ctx.started_at);
        if let Err(err) = ctx.log.append(&formatted.log_text) {
            if report.log_errors == 0
                && log_transcript_failure(ctx.log.path(), origin.label(), &err)
            {
                tracing::warn!(stream = origin.label(), error = %err, "transcript append failed");
            }
            report.log_errors += 1;
        }
        ctx.sink.emit(origin, formatted.display_text);
        ctx.counters.record(origin);
        report.lines += 1;
    }
    tracing::info!(
        stream = origin.label(),
        lines = report.lines,
        "stream closed"
    );
    report
}
