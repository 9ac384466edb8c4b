//! Skip list backed by an index arena.
//!
//! Node 0 is the head sentinel and carries a forward link for every level.
//! Removed nodes are recycled through a free list.

use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

/// Maximum tower height.
pub const MAX_LEVEL: usize = 16;

const HEAD: usize = 0;

struct SkipNode<K> {
    key: Option<K>,
    forward: Vec<Option<usize>>,
}

/// One comparison made while descending the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipStep<K> {
    /// Level the comparison happened on (0 is the bottom list).
    pub level: usize,
    /// Key compared against.
    pub key: K,
}

/// Result of a skip list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipVisit<K> {
    /// Inserted, found, or removed.
    pub hit: bool,
    /// Tower height of the inserted node; zero otherwise.
    pub height: usize,
    /// Comparisons made, top level first.
    pub path: Vec<SkipStep<K>>,
}

/// Ordered set with expected logarithmic search.
pub struct SkipList<K> {
    nodes: Vec<SkipNode<K>>,
    free: Vec<usize>,
    level: usize,
    len: usize,
    rng: Xoshiro256PlusPlus,
}

impl<K: Ord + Clone> SkipList<K> {
    /// Create an empty list with a random seed.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create an empty list whose tower heights are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            nodes: vec![SkipNode {
                key: None,
                forward: vec![None; MAX_LEVEL],
            }],
            free: Vec::new(),
            level: 1,
            len: 0,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels currently in use.
    pub fn levels(&self) -> usize {
        self.level
    }

    /// Search for `key`.
    pub fn search(&self, key: &K) -> SkipVisit<K> {
        let (update, path) = self.descend(key);
        SkipVisit {
            hit: self.successor_matches(update[0], key).is_some(),
            height: 0,
            path,
        }
    }

    /// Insert `key`. `hit` is `false` if it was already present.
    pub fn insert(&mut self, key: K) -> SkipVisit<K> {
        let (mut update, path) = self.descend(&key);
        if self.successor_matches(update[0], &key).is_some() {
            return SkipVisit {
                hit: false,
                height: 0,
                path,
            };
        }

        let height = self.random_level();
        if height > self.level {
            for slot in update.iter_mut().take(height).skip(self.level) {
                *slot = HEAD;
            }
            self.level = height;
        }

        let node = SkipNode {
            key: Some(key),
            forward: vec![None; height],
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = node;
                index
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        for (lvl, &prev) in update.iter().enumerate().take(height) {
            self.nodes[index].forward[lvl] = self.nodes[prev].forward[lvl];
            self.nodes[prev].forward[lvl] = Some(index);
        }
        self.len += 1;

        SkipVisit {
            hit: true,
            height,
            path,
        }
    }

    /// Remove `key`.
    pub fn remove(&mut self, key: &K) -> SkipVisit<K> {
        let (update, path) = self.descend(key);
        let Some(index) = self.successor_matches(update[0], key) else {
            return SkipVisit {
                hit: false,
                height: 0,
                path,
            };
        };

        let height = self.nodes[index].forward.len();
        for (lvl, &prev) in update.iter().enumerate().take(height) {
            if self.nodes[prev].forward[lvl] == Some(index) {
                self.nodes[prev].forward[lvl] = self.nodes[index].forward[lvl];
            }
        }

        self.nodes[index].key = None;
        self.nodes[index].forward.clear();
        self.free.push(index);
        self.len -= 1;

        while self.level > 1 && self.nodes[HEAD].forward[self.level - 1].is_none() {
            self.level -= 1;
        }

        SkipVisit {
            hit: true,
            height: 0,
            path,
        }
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len);
        let mut cursor = self.nodes[HEAD].forward[0];
        while let Some(index) = cursor {
            if let Some(key) = &self.nodes[index].key {
                keys.push(key);
            }
            cursor = self.nodes[index].forward[0];
        }
        keys
    }

    /// Walk down from the top level, recording the rightmost node before
    /// `key` on each level.
    fn descend(&self, key: &K) -> ([usize; MAX_LEVEL], Vec<SkipStep<K>>) {
        let mut update = [HEAD; MAX_LEVEL];
        let mut path = Vec::new();
        let mut current = HEAD;

        for lvl in (0..self.level).rev() {
            while let Some(next) = self.nodes[current].forward[lvl] {
                let Some(next_key) = &self.nodes[next].key else {
                    break;
                };
                path.push(SkipStep {
                    level: lvl,
                    key: next_key.clone(),
                });
                if next_key < key {
                    current = next;
                } else {
                    break;
                }
            }
            update[lvl] = current;
        }

        (update, path)
    }

    fn successor_matches(&self, prev: usize, key: &K) -> Option<usize> {
        let next = self.nodes[prev].forward[0]?;
        match &self.nodes[next].key {
            Some(k) if k == key => Some(next),
            _ => None,
        }
    }

    fn random_level(&mut self) -> usize {
        let mut level = 1;
        while level < MAX_LEVEL && self.rng.random_bool(0.5) {
            level += 1;
        }
        level
    }
}

impl<K: Ord + Clone> Default for SkipList<K> {
    fn default() -> Self {
        Self::new()
    }
}
