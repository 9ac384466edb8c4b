//! Slot resolution for open addressing.
//!
//! `get`, `set` and `remove` all resolve keys through [`find_slot`], so the
//! slot an insert would use is the one a later remove tombstones, and a
//! lookup stops at the same empty slot an insert would have filled.

use crate::bucket::Slot;
use serde::Serialize;

/// Iterator over the slot indices visited from `initial` with `step`.
///
/// Yields exactly `table_size` indices: `(initial + i * step) mod table_size`.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    current: usize,
    step: usize,
    table_size: usize,
    remaining: usize,
}

impl ProbeSequence {
    /// Create a probe sequence. `step` is reduced modulo `table_size`.
    pub fn new(initial: usize, step: usize, table_size: usize) -> Self {
        debug_assert!(table_size > 0);
        Self {
            current: initial % table_size,
            step: step % table_size,
            table_size,
            remaining: table_size,
        }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let index = self.current;
        self.current = (self.current + self.step) % self.table_size;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProbeSequence {}

/// Outcome of resolving a key against open addressing slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSearch {
    /// Whether a live entry with the key was found.
    pub found: bool,
    /// The matching slot when `found`; otherwise the first available insertion
    /// point (earliest tombstone, else the terminating empty slot). `None`
    /// means the sequence holds no room at all.
    pub index: Option<usize>,
    /// Number of slots examined.
    pub probes: usize,
    /// Slots examined, in order.
    pub probe_sequence: Vec<usize>,
}

/// Resolve `key` starting at `initial`, advancing by `step`.
pub fn find_slot(slots: &[Slot], key: &str, initial: usize, step: usize) -> SlotSearch {
    let mut probe_sequence = Vec::new();
    let mut first_tombstone = None;

    for index in ProbeSequence::new(initial, step, slots.len()) {
        probe_sequence.push(index);

        match &slots[index] {
            Slot::Empty => {
                return SlotSearch {
                    found: false,
                    index: Some(first_tombstone.unwrap_or(index)),
                    probes: probe_sequence.len(),
                    probe_sequence,
                };
            }
            Slot::Tombstone => {
                if first_tombstone.is_none() {
                    first_tombstone = Some(index);
                }
            }
            slot if slot.holds(key) => {
                return SlotSearch {
                    found: true,
                    index: Some(index),
                    probes: probe_sequence.len(),
                    probe_sequence,
                };
            }
            Slot::Occupied(_) => {}
        }
    }

    SlotSearch {
        found: false,
        index: first_tombstone,
        probes: probe_sequence.len(),
        probe_sequence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Entry;
    use std::collections::HashSet;

    fn occupied(key: &str) -> Slot {
        Slot::Occupied(Entry::new(key, "v"))
    }

    #[test]
    fn test_probe_sequence_linear() {
        let seq: Vec<_> = ProbeSequence::new(5, 1, 7).collect();
        assert_eq!(seq, vec![5, 6, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_probe_sequence_full_cycle() {
        // prime table size and any step in [1, R] with R < table size
        for table_size in [5usize, 7, 11, 13, 101] {
            let r = crate::prime::prev_prime(table_size as u64) as usize;
            for step in 1..=r {
                for initial in 0..table_size {
                    let visited: HashSet<_> =
                        ProbeSequence::new(initial, step, table_size).collect();
                    assert_eq!(visited.len(), table_size);
                }
            }
        }
    }

    #[test]
    fn test_find_slot_empty_table() {
        let slots = vec![Slot::Empty; 5];
        let search = find_slot(&slots, "a", 3, 1);
        assert!(!search.found);
        assert_eq!(search.index, Some(3));
        assert_eq!(search.probes, 1);
        assert_eq!(search.probe_sequence, vec![3]);
    }

    #[test]
    fn test_find_slot_match_after_collision() {
        let slots = vec![Slot::Empty, occupied("x"), occupied("y"), Slot::Empty];
        let search = find_slot(&slots, "y", 1, 1);
        assert!(search.found);
        assert_eq!(search.index, Some(2));
        assert_eq!(search.probe_sequence, vec![1, 2]);
    }

    #[test]
    fn test_find_slot_prefers_first_tombstone() {
        let slots = vec![
            Slot::Tombstone,
            occupied("x"),
            Slot::Tombstone,
            Slot::Empty,
            Slot::Empty,
        ];
        let search = find_slot(&slots, "z", 0, 1);
        assert!(!search.found);
        assert_eq!(search.index, Some(0));
        assert_eq!(search.probe_sequence, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_find_slot_continues_past_tombstone() {
        let slots = vec![Slot::Tombstone, occupied("b"), Slot::Empty];
        let search = find_slot(&slots, "b", 0, 1);
        assert!(search.found);
        assert_eq!(search.index, Some(1));
    }

    #[test]
    fn test_find_slot_full_table() {
        let slots = vec![occupied("a"), occupied("b"), occupied("c")];
        let search = find_slot(&slots, "d", 1, 1);
        assert!(!search.found);
        assert_eq!(search.index, None);
        assert_eq!(search.probes, 3);
        assert_eq!(search.probe_sequence, vec![1, 2, 0]);
    }

    #[test]
    fn test_find_slot_only_tombstones_and_entries() {
        let slots = vec![occupied("a"), Slot::Tombstone, occupied("c")];
        let search = find_slot(&slots, "d", 2, 1);
        assert!(!search.found);
        assert_eq!(search.index, Some(1));
        assert_eq!(search.probes, 3);
    }

    #[test]
    fn test_find_slot_with_step() {
        let slots = vec![
            Slot::Empty,
            Slot::Empty,
            occupied("a"),
            Slot::Empty,
            occupied("b"),
        ];
        // 2 -> 4 -> 1
        let search = find_slot(&slots, "c", 2, 2);
        assert_eq!(search.index, Some(1));
        assert_eq!(search.probe_sequence, vec![2, 4, 1]);
    }
}
