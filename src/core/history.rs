use std::collections::VecDeque;
use tracing::warn;

use crate::core::lib::HistorySink;

pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded audit trail of executed command lines, oldest first.
pub struct CommandHistory {
    entries: VecDeque<String>,
    capacity: usize,
    sink: Option<Box<dyn HistorySink>>,
}

impl std::fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHistory")
            .field("entries", &self.entries)
            .field("capacity", &self.capacity)
            .field("persistent", &self.sink.is_some())
            .finish()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity.min(1024)), capacity, sink: None }
    }

    /// Seeds the history with previously saved entries, keeping the newest.
    pub fn with_entries(capacity: usize, entries: impl IntoIterator<Item = String>) -> Self {
        let mut history = Self::new(capacity);
        for entry in entries {
            history.insert(entry);
        }
        history
    }

    pub fn with_sink(mut self, sink: Box<dyn HistorySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Appends an entry, evicting the oldest when over capacity, and flushes
    /// to the sink. Sink failures are logged, never propagated.
    pub fn push(&mut self, entry: impl Into<String>) {
        self.insert(entry.into());
        self.flush();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.flush();
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the limit, evicting the oldest entries that no longer fit.
    /// Flushes only when something was evicted.
    pub fn set_capacity(&mut self, capacity: usize) {
        if capacity == self.capacity() {
            return;
        }
        self.capacity = capacity;
        if self.evict() > 0 {
            self.flush();
        }
    }

    fn insert(&mut self, entry: String) {
        self.entries.push_back(entry);
        self.evict();
    }

    fn evict(&mut self) -> usize {
        let excess = self.entries.len().saturating_sub(self.capacity);
        self.entries.drain(..excess);
        excess
    }

    fn flush(&self) {
        if let Some(sink) = &self.sink {
            let snapshot: Vec<String> = self.entries.iter().cloned().collect();
            if let Err(e) = sink.persist(&snapshot) {
                warn!("failed to persist command history: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lib::{WrenError, WrenResult};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSink {
        writes: Arc<Mutex<Vec<Vec<String>>>>,
        fail: bool,
    }

    impl HistorySink for RecordingSink {
        fn persist(&self, entries: &[String]) -> WrenResult<()> {
            if self.fail {
                return Err(WrenError::InputError("disk full".into()));
            }
            self.writes.lock().unwrap().push(entries.to_vec());
            Ok(())
        }
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut history = CommandHistory::new(3);
        for entry in ["a", "b", "c", "d"] {
            history.push(entry);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["b", "c", "d"]);
    }

    #[test]
    fn never_exceeds_default_capacity() {
        let mut history = CommandHistory::default();
        for i in 0..=DEFAULT_CAPACITY {
            history.push(format!("ping host{i}"));
        }
        assert_eq!(history.len(), DEFAULT_CAPACITY);
        assert_eq!(history.entries().next(), Some("ping host1"));
        assert_eq!(history.entries().last(), Some(format!("ping host{DEFAULT_CAPACITY}").as_str()));
    }

    #[test]
    fn seeding_keeps_newest_entries() {
        let history = CommandHistory::with_entries(2, ["old".to_string(), "mid".to_string(), "new".to_string()]);
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["mid", "new"]);
    }

    #[test]
    fn every_push_is_flushed() {
        let sink = RecordingSink::default();
        let mut history = CommandHistory::new(2).with_sink(Box::new(sink.clone()));
        history.push("whoami");
        history.push("hostname");
        history.push("ver");

        let writes = sink.writes.lock().unwrap();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[2], vec!["hostname".to_string(), "ver".to_string()]);
    }

    #[test]
    fn sink_failure_keeps_entry_in_memory() {
        let sink = RecordingSink { fail: true, ..Default::default() };
        let mut history = CommandHistory::new(5).with_sink(Box::new(sink));
        history.push("date");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn shrinking_capacity_evicts_and_flushes() {
        let sink = RecordingSink::default();
        let mut history = CommandHistory::new(5).with_sink(Box::new(sink.clone()));
        for entry in ["whoami", "hostname", "ver", "date"] {
            history.push(entry);
        }

        history.set_capacity(2);
        assert_eq!(history.capacity(), 2);
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["ver", "date"]);
        assert_eq!(sink.writes.lock().unwrap().last(), Some(&vec!["ver".to_string(), "date".to_string()]));

        for entry in ["time", "echo", "dir"] {
            history.push(entry);
        }
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["echo", "dir"]);
    }

    #[test]
    fn growing_capacity_keeps_entries_without_flush() {
        let sink = RecordingSink::default();
        let mut history = CommandHistory::new(2).with_sink(Box::new(sink.clone()));
        history.push("ping");
        history.set_capacity(10);
        assert_eq!(history.len(), 1);
        assert_eq!(sink.writes.lock().unwrap().len(), 1);
    }

    #[test]
    fn clear_empties_and_flushes() {
        let sink = RecordingSink::default();
        let mut history = CommandHistory::new(5).with_sink(Box::new(sink.clone()));
        history.push("time");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(sink.writes.lock().unwrap().last(), Some(&Vec::new()));
    }
}
