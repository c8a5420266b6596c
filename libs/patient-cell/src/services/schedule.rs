// libs/patient-cell/src/services/schedule.rs
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use chrono::NaiveDateTime;

/// Heap entry. Ordering is by time, then arrival sequence, so equal
/// appointment times keep registration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slot {
    pub at: NaiveDateTime,
    pub seq: u64,
    pub id: String,
}

/// Min-heap of appointment slots with tombstoned removal.
///
/// Removing a patient only records its sequence number; the dead slot stays
/// in the heap until it reaches the top or the heap is compacted. Readers
/// never see tombstoned slots.
#[derive(Debug, Default)]
pub struct AppointmentQueue {
    heap: BinaryHeap<Reverse<Slot>>,
    tombstones: HashSet<u64>,
}

impl AppointmentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: NaiveDateTime, seq: u64, id: impl Into<String>) {
        self.heap.push(Reverse(Slot { at, seq, id: id.into() }));
    }

    pub fn remove(&mut self, seq: u64) {
        self.tombstones.insert(seq);
        if self.tombstones.len() * 2 > self.heap.len() {
            self.compact();
        }
    }

    /// Earliest live slot, discarding dead slots found on top.
    pub fn peek(&mut self) -> Option<&Slot> {
        while let Some(Reverse(top)) = self.heap.peek() {
            if !self.tombstones.contains(&top.seq) {
                break;
            }
            let seq = top.seq;
            self.heap.pop();
            self.tombstones.remove(&seq);
        }
        self.heap.peek().map(|Reverse(slot)| slot)
    }

    /// Live slots, earliest first.
    pub fn ordered(&self) -> Vec<&Slot> {
        let mut live: Vec<&Slot> = self
            .heap
            .iter()
            .map(|Reverse(slot)| slot)
            .filter(|slot| !self.tombstones.contains(&slot.seq))
            .collect();
        live.sort_unstable();
        live
    }

    pub fn len(&self) -> usize {
        self.heap.len().saturating_sub(self.tombstones.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dead slots still held by the heap.
    pub fn stale(&self) -> usize {
        self.tombstones.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.tombstones.clear();
    }

    fn compact(&mut self) {
        let tombstones = std::mem::take(&mut self.tombstones);
        self.heap.retain(|Reverse(slot)| !tombstones.contains(&slot.seq));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").unwrap()
    }

    fn ids(queue: &AppointmentQueue) -> Vec<&str> {
        queue.ordered().iter().map(|slot| slot.id.as_str()).collect()
    }

    #[test]
    fn test_ordered_by_time_then_arrival() {
        let mut queue = AppointmentQueue::new();
        queue.push(at("2025-03-01T11:00"), 0, "late");
        queue.push(at("2025-03-01T09:00"), 1, "early-a");
        queue.push(at("2025-03-01T09:00"), 2, "early-b");

        assert_eq!(ids(&queue), vec!["early-a", "early-b", "late"]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_removed_slots_are_hidden() {
        let mut queue = AppointmentQueue::new();
        for (seq, hour) in ["08", "09", "10", "11"].iter().enumerate() {
            queue.push(at(&format!("2025-03-01T{}:00", hour)), seq as u64, format!("p{}", seq));
        }

        queue.remove(1);

        assert_eq!(ids(&queue), vec!["p0", "p2", "p3"]);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.stale(), 1);
    }

    #[test]
    fn test_compaction_drops_dead_slots() {
        let mut queue = AppointmentQueue::new();
        for seq in 0..4u64 {
            queue.push(at("2025-03-01T09:00"), seq, format!("p{}", seq));
        }

        queue.remove(0);
        queue.remove(1);
        queue.remove(2);

        assert_eq!(queue.stale(), 0);
        assert_eq!(ids(&queue), vec!["p3"]);
    }

    #[test]
    fn test_peek_skips_tombstoned_top() {
        let mut queue = AppointmentQueue::new();
        queue.push(at("2025-03-01T08:00"), 0, "first");
        queue.push(at("2025-03-01T09:00"), 1, "second");
        queue.push(at("2025-03-01T10:00"), 2, "third");
        queue.push(at("2025-03-01T11:00"), 3, "fourth");

        queue.remove(0);

        assert_eq!(queue.peek().map(|slot| slot.id.as_str()), Some("second"));
        assert_eq!(queue.stale(), 0);
    }

    #[test]
    fn test_clear() {
        let mut queue = AppointmentQueue::new();
        queue.push(at("2025-03-01T08:00"), 0, "only");
        queue.clear();

        assert!(queue.is_empty());
        assert!(queue.ordered().is_empty());
    }
}
