//! Singly linked list with move-to-front search.
//!
//! A successful search unlinks the matching node and reinserts it at the
//! head, so frequently accessed keys migrate toward the front and later
//! searches for them need fewer comparisons.

use serde::Serialize;

struct Node<K, V> {
    key: K,
    value: V,
    next: Option<Box<Node<K, V>>>,
}

/// Result of a list search or removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListVisit<V> {
    /// The value found (search) or removed (remove).
    pub value: Option<V>,
    /// Number of keys compared.
    pub comparisons: usize,
    /// Position of the match before the operation, 0-based.
    pub position: Option<usize>,
}

/// Self-organizing singly linked list.
pub struct SelfOrganizingList<K, V> {
    head: Option<Box<Node<K, V>>>,
    len: usize,
}

impl<K, V> Default for SelfOrganizingList<K, V> {
    fn default() -> Self {
        Self { head: None, len: 0 }
    }
}

impl<K: PartialEq, V: Clone> SelfOrganizingList<K, V> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert at the front, or update in place if `key` exists.
    ///
    /// Returns `true` if a new node was created.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut cursor = self.head.as_deref_mut();
        while let Some(node) = cursor {
            if node.key == key {
                node.value = value;
                return false;
            }
            cursor = node.next.as_deref_mut();
        }

        let next = self.head.take();
        self.head = Some(Box::new(Node { key, value, next }));
        self.len += 1;
        true
    }

    /// Search for `key`, moving a match to the front of the list.
    pub fn search(&mut self, key: &K) -> ListVisit<V> {
        let (position, comparisons) = self.locate(key);

        let value = match position {
            Some(0) => self.head.as_ref().map(|n| n.value.clone()),
            Some(pos) => self.unlink_at(pos).map(|mut node| {
                let value = node.value.clone();
                node.next = self.head.take();
                self.head = Some(node);
                value
            }),
            None => None,
        };

        ListVisit {
            value,
            comparisons,
            position,
        }
    }

    /// Remove `key`.
    pub fn remove(&mut self, key: &K) -> ListVisit<V> {
        let (position, comparisons) = self.locate(key);

        let value = position.and_then(|pos| self.unlink_at(pos)).map(|node| {
            self.len -= 1;
            node.value
        });

        ListVisit {
            value,
            comparisons,
            position,
        }
    }

    /// Keys from head to tail.
    pub fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            keys.push(&node.key);
            cursor = node.next.as_deref();
        }
        keys
    }

    /// Position of `key` and the number of comparisons made to find it.
    fn locate(&self, key: &K) -> (Option<usize>, usize) {
        let mut comparisons = 0;
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            comparisons += 1;
            if node.key == *key {
                return (Some(comparisons - 1), comparisons);
            }
            cursor = node.next.as_deref();
        }
        (None, comparisons)
    }

    fn unlink_at(&mut self, pos: usize) -> Option<Box<Node<K, V>>> {
        let mut cursor = &mut self.head;
        for _ in 0..pos {
            cursor = &mut cursor.as_mut()?.next;
        }
        let mut node = cursor.take()?;
        *cursor = node.next.take();
        Some(node)
    }
}
