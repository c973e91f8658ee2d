//! Incremental backward search over the scrollback.

use super::buffer::{Hit, OutputBuffer};

/// Result of one search step, ready for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The term was found; the viewport now starts at the hit.
    Found {
        /// Where it was found.
        hit: Hit,
        /// Text of the line from the match onwards.
        excerpt: String,
    },
    /// No earlier occurrence exists.
    NotFound,
    /// Nothing has been searched for yet.
    NoTerm,
}

impl SearchOutcome {
    /// One-line status text. Line and column are shown 1-based.
    pub fn status_text(&self) -> String {
        match self {
            Self::Found { hit, excerpt } => format!(
                "Options Numerics; found at line {}, column {}: {excerpt}",
                hit.line + 1,
                hit.column + 1
            ),
            Self::NotFound => String::from("Text not found"),
            Self::NoTerm => String::from("Nothing to search for"),
        }
    }
}

/// Remembers the last term and the last hit so a repeat continues
/// upwards from where the previous search stopped.
#[derive(Debug, Clone, Default)]
pub struct Search {
    term: Option<String>,
    last_hit: Option<u64>,
}

impl Search {
    /// No term yet.
    pub const fn new() -> Self {
        Self {
            term: None,
            last_hit: None,
        }
    }

    /// Current term.
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Start a new search from the newest line. An empty `term` repeats
    /// the previous search instead.
    pub fn start(&mut self, term: &str, buffer: &mut OutputBuffer) -> SearchOutcome {
        if term.is_empty() {
            return self.repeat(buffer);
        }
        self.term = Some(term.to_string());
        self.last_hit = None;
        self.step(buffer)
    }

    /// Search again, strictly above the previous hit.
    pub fn repeat(&mut self, buffer: &mut OutputBuffer) -> SearchOutcome {
        if self.term.is_none() {
            return SearchOutcome::NoTerm;
        }
        self.step(buffer)
    }

    fn step(&mut self, buffer: &mut OutputBuffer) -> SearchOutcome {
        let Some(term) = self.term.as_deref() else {
            return SearchOutcome::NoTerm;
        };
        let before = match self.last_hit {
            // The previous hit was evicted; nothing older remains.
            Some(line) if line < buffer.first_line_number() => return SearchOutcome::NotFound,
            other => other,
        };

        match buffer.find_backward(term, before) {
            Some(hit) => {
                self.last_hit = Some(hit.line);
                buffer.highlight(hit);
                buffer.scroll_to_line(hit.line);
                let excerpt = buffer
                    .line(hit.line)
                    .map(|l| l[hit.byte..].to_string())
                    .unwrap_or_default();
                tracing::debug!(line = hit.line, column = hit.column, "search hit");
                SearchOutcome::Found { hit, excerpt }
            }
            None => SearchOutcome::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> OutputBuffer {
        let mut buffer = OutputBuffer::new(100, 80).with_viewport_height(2);
        buffer.append(":  price 1.25\n:  other\n:  price 2.50\n:  tail\n:  end");
        buffer
    }

    #[test]
    fn test_start_and_repeat_walk_upwards() {
        let mut buffer = buffer();
        let mut search = Search::new();

        let first = search.start("price", &mut buffer);
        let SearchOutcome::Found { hit, excerpt } = &first else {
            panic!("expected a hit, got {first:?}");
        };
        assert_eq!(hit.line, 2);
        assert_eq!(excerpt, "price 2.50");
        assert_eq!(buffer.viewport_top(), 2);
        assert_eq!(
            first.status_text(),
            "Options Numerics; found at line 3, column 4: price 2.50"
        );

        let second = search.repeat(&mut buffer);
        assert!(matches!(second, SearchOutcome::Found { hit, .. } if hit.line == 0));
        assert_eq!(buffer.viewport_top(), 0);

        assert_eq!(search.repeat(&mut buffer), SearchOutcome::NotFound);
        assert_eq!(SearchOutcome::NotFound.status_text(), "Text not found");
    }

    #[test]
    fn test_repeat_without_term() {
        let mut buffer = buffer();
        let mut search = Search::new();
        assert_eq!(search.repeat(&mut buffer), SearchOutcome::NoTerm);
        assert_eq!(search.start("", &mut buffer), SearchOutcome::NoTerm);
    }

    #[test]
    fn test_new_term_restarts_from_bottom() {
        let mut buffer = buffer();
        let mut search = Search::new();
        search.start("price", &mut buffer);
        search.repeat(&mut buffer);
        let outcome = search.start("tail", &mut buffer);
        assert!(matches!(outcome, SearchOutcome::Found { hit, .. } if hit.line == 3));
        assert_eq!(search.term(), Some("tail"));
    }

    #[test]
    fn test_hits_are_highlighted() {
        let mut buffer = buffer();
        let mut search = Search::new();
        search.start("other", &mut buffer);
        assert_eq!(buffer.visible_highlights().collect::<Vec<_>>(), vec![(0, 3, 5)]);
    }
}
