//! Session log persistence and session banners.

use super::buffer::OutputBuffer;
use crate::error::{Error, Result};
use chrono::{DateTime, Local, Utc};
use std::collections::VecDeque;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Prefix of every line the program prints.
pub const READING_CUE: &str = ":  ";

/// Read the most recent `capacity` lines of the session log.
///
/// A missing file is an empty session.
pub fn load_session_log(path: &Path, capacity: usize) -> Result<Vec<String>> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io("opening session log", path, e)),
    };

    let mut kept = VecDeque::with_capacity(capacity.min(16 * 1024));
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Error::io("reading session log", path, e))?;
        if kept.len() == capacity {
            kept.pop_front();
        }
        kept.push_back(line);
    }
    Ok(kept.into())
}

/// Restore previously saved lines into `buffer`. Returns the lines added.
pub fn restore_into(buffer: &mut OutputBuffer, lines: &[String]) -> usize {
    lines.iter().map(|line| buffer.append(line).added).sum()
}

/// Write every held line, trailing blanks trimmed, one per record.
pub fn save_session_log(path: &Path, buffer: &OutputBuffer) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| Error::io("writing session log", path, e))?;
    let mut writer = BufWriter::new(file);
    for line in buffer.lines() {
        writeln!(writer, "{}", line.trim_end()).map_err(|e| Error::io("writing session log", path, e))?;
    }
    writer
        .flush()
        .map_err(|e| Error::io("writing session log", path, e))?;
    tracing::debug!(lines = buffer.len(), path = %path.display(), "session log saved");
    Ok(())
}

/// A timestamp line such as
/// `:  New session started at 09:14:02 am on 19 Oct 2026 (computer reports 2026-10-19 16:14:02.117 UTC)`.
pub fn time_banner(prefix: &str, now: DateTime<Local>) -> String {
    let utc: DateTime<Utc> = now.with_timezone(&Utc);
    format!(
        "{READING_CUE}{prefix}{} on {} (computer reports {} UTC)",
        now.format("%I:%M:%S %P"),
        now.format("%-d %b %Y"),
        utc.format("%Y-%m-%d %H:%M:%S%.3f"),
    )
}
