//! In-memory, process-lifetime search log.

use chrono::Utc;
use std::collections::VecDeque;

use weather_core::SearchLogEntry;

/// Insertion-ordered list capped at `capacity`; the oldest entry goes first.
#[derive(Debug)]
pub struct SearchLogStore {
    entries: VecDeque<SearchLogEntry>,
    capacity: usize,
}

impl SearchLogStore {
    pub fn new(capacity: usize) -> Self {
        Self { entries: VecDeque::new(), capacity: capacity.max(1) }
    }

    pub fn push(&mut self, city: &str) -> SearchLogEntry {
        let entry = SearchLogEntry { city: city.to_string(), timestamp: Utc::now() };
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.clone());
        entry
    }

    pub fn snapshot(&self) -> Vec<SearchLogEntry> {
        self.entries.iter().cloned().collect()
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

    fn cities(store: &SearchLogStore) -> Vec<String> {
        store.snapshot().into_iter().map(|e| e.city).collect()
    }

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let mut store = SearchLogStore::new(10);
        store.push("Lon");
        store.push("Paris");
        store.push("Lon");

        assert_eq!(cities(&store), ["Lon", "Paris", "Lon"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut store = SearchLogStore::new(2);
        store.push("a");
        store.push("b");
        store.push("c");

        assert_eq!(cities(&store), ["b", "c"]);
    }

    #[test]
    fn zero_capacity_keeps_latest_entry() {
        let mut store = SearchLogStore::new(0);
        assert!(store.is_empty());
        store.push("a");
        store.push("b");

        assert_eq!(cities(&store), ["b"]);
    }

    #[test]
    fn huge_capacity_does_not_preallocate() {
        let mut store = SearchLogStore::new(usize::MAX);
        store.push("Lon");

        assert_eq!(cities(&store), ["Lon"]);
        assert!(store.entries.capacity() < 1024);
    }

    #[test]
    fn timestamps_do_not_go_backwards() {
        let mut store = SearchLogStore::new(5);
        let first = store.push("a");
        let second = store.push("b");
        assert!(second.timestamp >= first.timestamp);
    }
}
