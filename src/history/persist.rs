//! History file: one `<count> <text>` line per entry, oldest first.

use super::store::HistoryStore;
use crate::error::{Error, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Parse one history line.
pub fn parse_line(line: &str) -> Option<(u32, &str)> {
    let (count, text) = line.split_once(' ')?;
    let count = count.parse().ok()?;
    (!text.is_empty()).then_some((count, text))
}

/// Load a history file into a store of `capacity` entries.
///
/// A missing file gives an empty store. Malformed lines are skipped and
/// only the most recent `capacity` entries are kept.
pub fn load_history(path: &Path, capacity: usize) -> Result<HistoryStore> {
    let mut store = HistoryStore::new(capacity);
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(store),
        Err(e) => return Err(Error::io("reading history", path, e)),
    };

    let mut skipped = 0usize;
    for line in text.lines() {
        match parse_line(line) {
            Some((count, command)) => store.push_loaded(command.to_string(), count),
            None if line.trim().is_empty() => {}
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, path = %path.display(), "skipped malformed history lines");
    }
    tracing::debug!(entries = store.len(), "history loaded");
    Ok(store)
}

/// Write the whole store, oldest first.
pub fn save_history(path: &Path, store: &HistoryStore) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| Error::io("writing history", path, e))?;
    let mut writer = BufWriter::new(file);
    for entry in store.entries() {
        writeln!(writer, "{} {}", entry.times_recalled, entry.text)
            .map_err(|e| Error::io("writing history", path, e))?;
    }
    writer.flush().map_err(|e| Error::io("writing history", path, e))
}
