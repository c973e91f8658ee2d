//! HistoryStore: unique, recency-ordered command history.

/// One remembered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Command text.
    pub text: String,
    /// How many times it was entered (or recalled into a submitted line).
    pub times_recalled: u32,
}

/// Where the recall cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Not recalling.
    Pending,
    /// Showing the entry at this index.
    At(usize),
    /// Walked past the oldest entry.
    BeforeOldest,
}

/// Command history, oldest first, newest last.
///
/// Texts are unique: remembering a known command moves it to the newest
/// position and bumps its counter. At capacity the least recently used
/// entry (the oldest) is evicted.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Vec<Entry>,
    capacity: usize,
    cursor: Cursor,
}

impl HistoryStore {
    /// Empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
            cursor: Cursor::Pending,
        }
    }

    /// Maximum entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// True while a recall is in progress.
    pub const fn is_recalling(&self) -> bool {
        !matches!(self.cursor, Cursor::Pending)
    }

    /// Record `text` as the newest entry. Empty text is ignored.
    pub fn remember(&mut self, text: &str) {
        self.cursor = Cursor::Pending;
        if text.is_empty() {
            return;
        }
        if let Some(index) = self.entries.iter().position(|e| e.text == text) {
            let mut entry = self.entries.remove(index);
            entry.times_recalled = entry.times_recalled.saturating_add(1);
            self.entries.push(entry);
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.remove(0);
        }
        self.entries.push(Entry {
            text: text.to_string(),
            times_recalled: 1,
        });
    }

    /// Insert an entry with a known counter, as read from disk.
    pub(crate) fn push_loaded(&mut self, text: String, times_recalled: u32) {
        if text.is_empty() {
            return;
        }
        if let Some(index) = self.entries.iter().position(|e| e.text == text) {
            self.entries.remove(index);
        } else if self.entries.len() >= self.capacity {
            self.entries.remove(0);
        }
        self.entries.push(Entry {
            text,
            times_recalled: times_recalled.max(1),
        });
    }

    /// One step older. The first call returns the newest entry; after the
    /// oldest has been returned, further calls return `None`.
    pub fn recall_previous(&mut self) -> Option<&str> {
        let (cursor, index) = match self.cursor {
            Cursor::Pending if self.entries.is_empty() => return None,
            Cursor::Pending => {
                let i = self.entries.len() - 1;
                (Cursor::At(i), Some(i))
            }
            Cursor::At(0) | Cursor::BeforeOldest => (Cursor::BeforeOldest, None),
            Cursor::At(i) => (Cursor::At(i - 1), Some(i - 1)),
        };
        self.cursor = cursor;
        index.map(|i| self.entries[i].text.as_str())
    }

    /// One step newer. Walking past the newest entry ends the recall and
    /// returns `None`. After walking past the oldest entry, which is still
    /// on screen, the next step shows the one after it.
    pub fn recall_next(&mut self) -> Option<&str> {
        let (cursor, index) = match self.cursor {
            Cursor::Pending => (Cursor::Pending, None),
            Cursor::BeforeOldest if self.entries.len() < 2 => (Cursor::Pending, None),
            Cursor::BeforeOldest => (Cursor::At(1), Some(1)),
            Cursor::At(i) if i + 1 < self.entries.len() => (Cursor::At(i + 1), Some(i + 1)),
            Cursor::At(_) => (Cursor::Pending, None),
        };
        self.cursor = cursor;
        index.map(|i| self.entries[i].text.as_str())
    }

    /// Entry with the highest counter; the most recent one wins ties.
    /// The cursor moves onto it, so recall continues from there.
    pub fn recall_most_used(&mut self) -> Option<&str> {
        let mut best: Option<usize> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if best.map_or(true, |b| entry.times_recalled >= self.entries[b].times_recalled) {
                best = Some(i);
            }
        }
        let index = best?;
        self.cursor = Cursor::At(index);
        Some(self.entries[index].text.as_str())
    }

    /// Newest entry. The cursor is placed on it, so the next
    /// [`recall_previous`](Self::recall_previous) returns the one before.
    pub fn recall_most_recent(&mut self) -> Option<&str> {
        let last = self.entries.len().checked_sub(1)?;
        self.cursor = Cursor::At(last);
        Some(self.entries[last].text.as_str())
    }

    /// Newest entry starting with `prefix` (ASCII case-insensitive), looking
    /// strictly older than `older_than` when given. Returns the index too,
    /// so completion can cycle.
    pub fn complete_prefix(&self, prefix: &str, older_than: Option<usize>) -> Option<(usize, &str)> {
        let end = older_than.unwrap_or(self.entries.len()).min(self.entries.len());
        self.entries[..end]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, e)| starts_with_ignore_case(&e.text, prefix))
            .map(|(i, e)| (i, e.text.as_str()))
    }

    /// End any recall without touching the entries.
    pub fn rewind(&mut self) {
        self.cursor = Cursor::Pending;
    }

    /// Drop everything.
    pub fn forget_all(&mut self) {
        self.entries.clear();
        self.cursor = Cursor::Pending;
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recall_scenario() {
        let mut store = HistoryStore::new(10);
        store.remember("eo T:C,S:16,...");
        store.remember("ao T:C,S:16,...");
        assert_eq!(store.recall_previous(), Some("ao T:C,S:16,..."));
        assert_eq!(store.recall_previous(), Some("eo T:C,S:16,..."));
        assert_eq!(store.recall_previous(), None);
    }

    #[test]
    fn test_uniqueness_and_counter() {
        let mut store = HistoryStore::new(10);
        store.remember("x");
        store.remember("y");
        store.remember("z");
        store.remember("x");
        assert_eq!(store.len(), 3);
        let last = store.entries().last().unwrap();
        assert_eq!(last.text, "x");
        assert_eq!(last.times_recalled, 2);
        assert_eq!(store.entries().iter().filter(|e| e.text == "x").count(), 1);
    }

    #[test]
    fn test_empty_text_is_ignored() {
        let mut store = HistoryStore::new(10);
        store.remember("");
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let mut store = HistoryStore::new(3);
        store.remember("a");
        store.remember("b");
        store.remember("c");
        store.remember("a");
        store.remember("d");
        let texts: Vec<_> = store.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a", "d"]);
    }

    #[test]
    fn test_previous_next_symmetry() {
        let mut store = HistoryStore::new(10);
        for cmd in ["one", "two", "three", "four"] {
            store.remember(cmd);
        }
        for n in 0..=4 {
            let mut seen = Vec::new();
            for _ in 0..n {
                seen.push(store.recall_previous().map(String::from));
            }
            for _ in 0..n {
                store.recall_next();
            }
            assert!(!store.is_recalling(), "drift after {n} steps");
            assert_eq!(seen.iter().flatten().count(), n);
        }
    }

    #[test]
    fn test_alternating_never_repeats() {
        let mut store = HistoryStore::new(10);
        for cmd in ["one", "two", "three"] {
            store.remember(cmd);
        }
        assert_eq!(store.recall_previous(), Some("three"));
        assert_eq!(store.recall_previous(), Some("two"));
        assert_eq!(store.recall_next(), Some("three"));
        assert_eq!(store.recall_previous(), Some("two"));
        assert_eq!(store.recall_previous(), Some("one"));
        assert_eq!(store.recall_previous(), None);
        assert_eq!(store.recall_previous(), None);
        assert_eq!(store.recall_next(), Some("two"));
        assert_eq!(store.recall_next(), Some("three"));
        assert_eq!(store.recall_next(), None);
        assert_eq!(store.recall_next(), None);
    }

    #[test]
    fn test_next_after_oldest_with_single_entry_ends_recall() {
        let mut store = HistoryStore::new(10);
        store.remember("only");
        assert_eq!(store.recall_previous(), Some("only"));
        assert_eq!(store.recall_previous(), None);
        assert_eq!(store.recall_next(), None);
        assert!(!store.is_recalling());
    }

    #[test]
    fn test_most_used_tie_prefers_most_recent() {
        let mut store = HistoryStore::new(10);
        store.remember("a");
        store.remember("b");
        store.remember("a");
        store.remember("b");
        store.remember("c");
        // a and b both have 2; b is more recent.
        assert_eq!(store.recall_most_used(), Some("b"));

        store.remember("a");
        assert_eq!(store.recall_most_used(), Some("a"));
    }

    #[test]
    fn test_most_used_positions_cursor() {
        let mut store = HistoryStore::new(10);
        for cmd in ["a", "b", "a", "c", "d"] {
            store.remember(cmd);
        }
        // b, a, c, d with a used twice.
        assert_eq!(store.recall_most_used(), Some("a"));
        assert!(store.is_recalling());
        assert_eq!(store.recall_previous(), Some("b"));
        assert_eq!(store.recall_next(), Some("a"));
        assert_eq!(store.recall_next(), Some("c"));
    }

    #[test]
    fn test_most_used_single_counts() {
        let mut store = HistoryStore::new(10);
        assert_eq!(store.recall_most_used(), None);
        store.remember("first");
        store.remember("second");
        assert_eq!(store.recall_most_used(), Some("second"));
    }

    #[test]
    fn test_most_recent_positions_cursor() {
        let mut store = HistoryStore::new(10);
        store.remember("a");
        store.remember("b");
        assert_eq!(store.recall_most_recent(), Some("b"));
        assert_eq!(store.recall_previous(), Some("a"));
    }

    #[test]
    fn test_complete_prefix_cycles() {
        let mut store = HistoryStore::new(10);
        store.remember("Price AAPL");
        store.remember("help");
        store.remember("price msft");
        let (i, text) = store.complete_prefix("pri", None).unwrap();
        assert_eq!(text, "price msft");
        let (_, older) = store.complete_prefix("pri", Some(i)).unwrap();
        assert_eq!(older, "Price AAPL");
        assert!(store.complete_prefix("zzz", None).is_none());
    }

    #[test]
    fn test_remember_and_forget_reset_cursor() {
        let mut store = HistoryStore::new(10);
        store.remember("a");
        store.recall_previous();
        assert!(store.is_recalling());
        store.remember("b");
        assert!(!store.is_recalling());
        store.forget_all();
        assert!(store.is_empty());
        assert_eq!(store.recall_previous(), None);
    }
}
