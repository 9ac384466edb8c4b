//! Bucket storage for both collision policy families.

use crate::hashing::CollisionResolution;
use serde::Serialize;

/// A key-value pair owned by the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Unique among live entries.
    pub key: String,
    /// Associated value.
    pub value: String,
}

impl Entry {
    /// Create a new entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// State of a single open addressing slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Slot {
    /// Never used. Terminates a search.
    #[default]
    Empty,
    /// Logically deleted. Searches continue past it; inserts may reuse it.
    Tombstone,
    /// Holds a live entry.
    Occupied(Entry),
}

impl Slot {
    /// The live entry in this slot, if any.
    #[inline]
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Self::Occupied(entry) => Some(entry),
            _ => None,
        }
    }

    /// Returns `true` if this slot holds a live entry with `key`.
    #[inline]
    pub fn holds(&self, key: &str) -> bool {
        self.entry().is_some_and(|e| e.key == key)
    }
}

/// Bucket storage; its shape depends on the collision policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "buckets", rename_all = "lowercase")]
pub enum Buckets {
    /// One ordered chain per bucket.
    Chained(Vec<Vec<Entry>>),
    /// One slot per index.
    Open(Vec<Slot>),
}

impl Buckets {
    /// Fresh, empty storage of `len` buckets for `policy`.
    pub fn fresh(policy: CollisionResolution, len: usize) -> Self {
        if policy.is_open_addressing() {
            Self::Open(vec![Slot::Empty; len])
        } else {
            Self::Chained(vec![Vec::new(); len])
        }
    }

    /// Number of buckets (the effective array length).
    pub fn len(&self) -> usize {
        match self {
            Self::Chained(chains) => chains.len(),
            Self::Open(slots) => slots.len(),
        }
    }

    /// Returns `true` if there are no buckets at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Owned copies of every live entry, in bucket order.
    pub fn live_entries(&self) -> Vec<Entry> {
        match self {
            Self::Chained(chains) => chains.iter().flatten().cloned().collect(),
            Self::Open(slots) => slots.iter().filter_map(Slot::entry).cloned().collect(),
        }
    }

    /// Number of tombstones (always zero for chaining).
    pub fn tombstones(&self) -> usize {
        match self {
            Self::Chained(_) => 0,
            Self::Open(slots) => slots
                .iter()
                .filter(|s| matches!(s, Slot::Tombstone))
                .count(),
        }
    }
}
