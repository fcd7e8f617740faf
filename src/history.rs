use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

pub const HISTORY_LIMIT: usize = 50;

/// A text that was read aloud
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    /// Where the text came from (image URL), if known
    #[serde(default)]
    pub source: Option<String>,
    pub read_at: DateTime<Utc>,
}

/// Reading history, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        Self { entries }
    }

    pub fn record(&mut self, text: impl Into<String>, source: Option<String>) -> &HistoryEntry {
        self.entries.insert(
            0,
            HistoryEntry {
                text: text.into(),
                source,
                read_at: Utc::now(),
            },
        );
        self.entries.truncate(HISTORY_LIMIT);
        &self.entries[0]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<HistoryEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_entry_comes_first() {
        let mut history = History::default();
        history.record("first", None);
        history.record("second", Some("https://example.com/a.png".into()));

        assert_eq!(history.entries()[0].text, "second");
        assert_eq!(history.entries()[1].text, "first");
    }

    #[test]
    fn keeps_at_most_limit_entries() {
        let mut history = History::default();
        for i in 0..HISTORY_LIMIT + 5 {
            history.record(format!("text {}", i), None);
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries()[0].text, format!("text {}", HISTORY_LIMIT + 4));
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut history = History::default();
        history.record("only", None);

        assert!(history.remove(3).is_none());
        assert_eq!(history.remove(0).map(|e| e.text), Some("only".to_string()));
        assert!(history.is_empty());
    }
}
