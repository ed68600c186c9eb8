//! Recency Index Module
//!
//! Doubly-linked recency ordering kept in an arena of slots. Links are slot
//! indices rather than references, so move-to-front and removal are O(1)
//! without shared mutable pointers.

use crate::cache::Entry;

/// Null link marker.
const NIL: usize = usize::MAX;

// == Slot Id ==
/// Stable handle to an entry inside the [`RecencyIndex`].
///
/// A handle stays valid until its entry is removed; after that the slot may
/// be recycled for a different entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

#[derive(Debug)]
struct Node {
    entry: Option<Entry>,
    prev: usize,
    next: usize,
}

// == Recency Index ==
/// Orders entries from most recently used (front) to least recently used
/// (back).
#[derive(Debug)]
pub struct RecencyIndex {
    nodes: Vec<Node>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl Default for RecencyIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RecencyIndex {
    // == Constructor ==
    /// Creates an empty index. Slots are allocated as entries arrive.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an entry as the most recently used one.
    pub fn push_front(&mut self, entry: Entry) -> SlotId {
        let node = Node {
            entry: Some(entry),
            prev: NIL,
            next: NIL,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        self.link_front(idx);
        self.len += 1;
        SlotId(idx)
    }

    // == Move To Front ==
    /// Marks an entry as most recently used.
    pub fn move_to_front(&mut self, slot: SlotId) {
        if !self.is_live(slot) || self.head == slot.0 {
            return;
        }
        self.unlink(slot.0);
        self.link_front(slot.0);
    }

    // == Remove ==
    /// Unlinks an entry and frees its slot.
    pub fn remove(&mut self, slot: SlotId) -> Option<Entry> {
        if !self.is_live(slot) {
            return None;
        }
        self.unlink(slot.0);
        self.len -= 1;
        self.free.push(slot.0);
        self.nodes[slot.0].entry.take()
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    pub fn pop_back(&mut self) -> Option<Entry> {
        if self.tail == NIL {
            return None;
        }
        self.remove(SlotId(self.tail))
    }

    /// Returns the least recently used entry without removing it.
    #[cfg(test)]
    pub fn peek_back(&self) -> Option<&Entry> {
        self.get(SlotId(self.tail))
    }

    /// Returns the most recently used entry without touching it.
    #[cfg(test)]
    pub fn peek_front(&self) -> Option<&Entry> {
        self.get(SlotId(self.head))
    }

    // == Access ==
    /// Borrows the entry in `slot`.
    pub fn get(&self, slot: SlotId) -> Option<&Entry> {
        self.nodes.get(slot.0).and_then(|node| node.entry.as_ref())
    }

    /// Swaps the entry in `slot` for `entry`, keeping its position.
    ///
    /// Returns the previous entry, or hands `entry` back if the slot is free.
    pub fn replace(&mut self, slot: SlotId, entry: Entry) -> Result<Entry, Entry> {
        match self.nodes.get_mut(slot.0).and_then(|node| node.entry.as_mut()) {
            Some(current) => Ok(std::mem::replace(current, entry)),
            None => Err(entry),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            current: self.head,
            remaining: self.len,
        }
    }

    // --- list plumbing ---

    fn is_live(&self, slot: SlotId) -> bool {
        self.nodes
            .get(slot.0)
            .map_or(false, |node| node.entry.is_some())
    }

    fn link_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;

        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;

        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;

        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }
}

// == Iterator ==
/// Front-to-back iterator over `(slot, entry)` pairs.
pub struct Iter<'a> {
    index: &'a RecencyIndex,
    current: usize,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (SlotId, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NIL || self.remaining == 0 {
            return None;
        }
        let idx = self.current;
        let node = &self.index.nodes[idx];
        self.current = node.next;
        self.remaining -= 1;
        node.entry.as_ref().map(|entry| (SlotId(idx), entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(key: &str) -> Entry {
        Entry::new(key.to_string(), format!("value_{key}"), Duration::from_secs(60))
    }

    fn keys(index: &RecencyIndex) -> Vec<String> {
        index.iter().map(|(_, e)| e.key.clone()).collect()
    }

    #[test]
    fn test_index_new() {
        let index = RecencyIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.peek_back().is_none());
    }

    #[test]
    fn test_push_front_orders_most_recent_first() {
        let mut index = RecencyIndex::new();
        index.push_front(entry("a"));
        index.push_front(entry("b"));
        index.push_front(entry("c"));

        assert_eq!(index.len(), 3);
        assert_eq!(keys(&index), vec!["c", "b", "a"]);
        assert_eq!(index.peek_back().map(|e| e.key.as_str()), Some("a"));
        assert_eq!(index.peek_front().map(|e| e.key.as_str()), Some("c"));
    }

    #[test]
    fn test_move_to_front() {
        let mut index = RecencyIndex::new();
        let a = index.push_front(entry("a"));
        index.push_front(entry("b"));
        index.push_front(entry("c"));

        index.move_to_front(a);

        assert_eq!(keys(&index), vec!["a", "c", "b"]);
        assert_eq!(index.peek_back().map(|e| e.key.as_str()), Some("b"));
    }

    #[test]
    fn test_move_head_to_front_is_noop() {
        let mut index = RecencyIndex::new();
        index.push_front(entry("a"));
        let b = index.push_front(entry("b"));

        index.move_to_front(b);
        assert_eq!(keys(&index), vec!["b", "a"]);
    }

    #[test]
    fn test_pop_back_evicts_in_lru_order() {
        let mut index = RecencyIndex::new();
        let a = index.push_front(entry("a"));
        index.push_front(entry("b"));
        let c = index.push_front(entry("c"));

        index.move_to_front(a);
        index.move_to_front(c);

        assert_eq!(index.pop_back().map(|e| e.key), Some("b".to_string()));
        assert_eq!(index.pop_back().map(|e| e.key), Some("a".to_string()));
        assert_eq!(index.pop_back().map(|e| e.key), Some("c".to_string()));
        assert!(index.pop_back().is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_middle() {
        let mut index = RecencyIndex::new();
        index.push_front(entry("a"));
        let b = index.push_front(entry("b"));
        index.push_front(entry("c"));

        let removed = index.remove(b).unwrap();
        assert_eq!(removed.key, "b");
        assert_eq!(keys(&index), vec!["c", "a"]);

        // A stale handle is ignored
        assert!(index.remove(b).is_none());
        assert!(index.get(b).is_none());
        index.move_to_front(b);
        assert_eq!(keys(&index), vec!["c", "a"]);
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut index = RecencyIndex::new();
        let a = index.push_front(entry("a"));
        index.remove(a);

        let b = index.push_front(entry("b"));
        assert_eq!(a, b, "Freed slot should be reused");
        assert_eq!(index.get(b).map(|e| e.key.as_str()), Some("b"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut index = RecencyIndex::new();
        let a = index.push_front(entry("a"));
        index.push_front(entry("b"));

        let old = index
            .replace(a, Entry::new("a".into(), "new".into(), Duration::from_secs(1)))
            .unwrap();
        assert_eq!(old.value, "value_a");
        assert_eq!(index.get(a).map(|e| e.value.as_str()), Some("new"));
        assert_eq!(keys(&index), vec!["b", "a"]);

        index.remove(a);
        assert!(index.replace(a, entry("x")).is_err());
    }
}
