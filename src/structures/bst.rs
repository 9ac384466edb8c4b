//! Unbalanced binary search tree.

use serde::Serialize;
use std::cmp::Ordering;

struct Node<K> {
    key: K,
    left: Option<Box<Node<K>>>,
    right: Option<Box<Node<K>>>,
}

impl<K> Node<K> {
    fn leaf(key: K) -> Box<Self> {
        Box::new(Self {
            key,
            left: None,
            right: None,
        })
    }
}

/// Result of a tree operation: whether it took effect, and the keys compared
/// on the way down from the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeVisit<K> {
    /// Inserted, found, or removed.
    pub hit: bool,
    /// Keys visited, root first.
    pub path: Vec<K>,
}

/// Binary search tree over ordered keys. Duplicate inserts are ignored.
pub struct Bst<K> {
    root: Option<Box<Node<K>>>,
    len: usize,
}

impl<K> Default for Bst<K> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<K: Ord + Clone> Bst<K> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `key`. `hit` is `false` if it was already present.
    pub fn insert(&mut self, key: K) -> TreeVisit<K> {
        let mut path = Vec::new();
        let mut cursor = &mut self.root;

        while let Some(node) = cursor {
            path.push(node.key.clone());
            cursor = match key.cmp(&node.key) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return TreeVisit { hit: false, path },
            };
        }

        *cursor = Some(Node::leaf(key));
        self.len += 1;
        TreeVisit { hit: true, path }
    }

    /// Search for `key`.
    pub fn search(&self, key: &K) -> TreeVisit<K> {
        let mut path = Vec::new();
        let mut cursor = self.root.as_deref();

        while let Some(node) = cursor {
            path.push(node.key.clone());
            cursor = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return TreeVisit { hit: true, path },
            };
        }

        TreeVisit { hit: false, path }
    }

    /// Remove `key`. A node with two children takes its in-order successor's key.
    pub fn remove(&mut self, key: &K) -> TreeVisit<K> {
        let mut path = Vec::new();
        let hit = Self::remove_from(&mut self.root, key, &mut path);
        if hit {
            self.len -= 1;
        }
        TreeVisit { hit, path }
    }

    fn remove_from(slot: &mut Option<Box<Node<K>>>, key: &K, path: &mut Vec<K>) -> bool {
        let Some(node) = slot else {
            return false;
        };
        path.push(node.key.clone());

        match key.cmp(&node.key) {
            Ordering::Less => Self::remove_from(&mut node.left, key, path),
            Ordering::Greater => Self::remove_from(&mut node.right, key, path),
            Ordering::Equal => {
                match (node.left.take(), node.right.take()) {
                    (None, None) => *slot = None,
                    (Some(child), None) | (None, Some(child)) => *slot = Some(child),
                    (Some(left), Some(right)) => {
                        let mut right = Some(right);
                        if let Some(successor) = Self::take_min(&mut right) {
                            node.key = successor;
                        }
                        node.left = Some(left);
                        node.right = right;
                    }
                }
                true
            }
        }
    }

    /// Detach the minimum node of a subtree and return its key.
    fn take_min(slot: &mut Option<Box<Node<K>>>) -> Option<K> {
        if slot.as_ref()?.left.is_some() {
            return Self::take_min(&mut slot.as_mut()?.left);
        }
        let mut node = slot.take()?;
        *slot = node.right.take();
        Some(node.key)
    }

    /// Keys in ascending order.
    pub fn in_order(&self) -> Vec<&K> {
        fn walk<'a, K>(node: Option<&'a Node<K>>, out: &mut Vec<&'a K>) {
            if let Some(node) = node {
                walk(node.left.as_deref(), out);
                out.push(&node.key);
                walk(node.right.as_deref(), out);
            }
        }

        let mut out = Vec::with_capacity(self.len);
        walk(self.root.as_deref(), &mut out);
        out
    }

    /// Number of levels; zero for an empty tree.
    pub fn height(&self) -> usize {
        fn height<K>(node: Option<&Node<K>>) -> usize {
            match node {
                Some(n) => 1 + height(n.left.as_deref()).max(height(n.right.as_deref())),
                None => 0,
            }
        }

        height(self.root.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(keys: &[i32]) -> Bst<i32> {
        let mut bst = Bst::new();
        for &k in keys {
            bst.insert(k);
        }
        bst
    }

    #[test]
    fn test_insert_and_search() {
        let bst = tree(&[50, 30, 70, 20, 40, 60, 80]);
        assert_eq!(bst.len(), 7);
        assert_eq!(bst.height(), 3);

        let visit = bst.search(&40);
        assert!(visit.hit);
        assert_eq!(visit.path, vec![50, 30, 40]);

        let visit = bst.search(&65);
        assert!(!visit.hit);
        assert_eq!(visit.path, vec![50, 70, 60]);
    }

    #[test]
    fn test_duplicate_insert() {
        let mut bst = tree(&[5, 3]);
        let visit = bst.insert(3);
        assert!(!visit.hit);
        assert_eq!(visit.path, vec![5, 3]);
        assert_eq!(bst.len(), 2);
    }

    #[test]
    fn test_remove_leaf_and_single_child() {
        let mut bst = tree(&[50, 30, 20]);
        assert!(bst.remove(&20).hit);
        assert_eq!(bst.in_order(), vec![&30, &50]);

        assert!(bst.remove(&50).hit);
        assert_eq!(bst.in_order(), vec![&30]);
        assert_eq!(bst.height(), 1);
    }

    #[test]
    fn test_remove_two_children() {
        let mut bst = tree(&[50, 30, 70, 60, 80, 65]);
        let visit = bst.remove(&50);
        assert!(visit.hit);
        assert_eq!(visit.path, vec![50]);
        assert_eq!(bst.in_order(), vec![&30, &60, &65, &70, &80]);

        // successor 60 moved to the root
        assert_eq!(bst.search(&60).path, vec![60]);
        assert_eq!(bst.len(), 5);
    }

    #[test]
    fn test_remove_missing() {
        let mut bst = tree(&[2, 1, 3]);
        let visit = bst.remove(&4);
        assert!(!visit.hit);
        assert_eq!(visit.path, vec![2, 3]);
        assert_eq!(bst.len(), 3);
    }

    #[test]
    fn test_empty_tree() {
        let mut bst: Bst<String> = Bst::new();
        assert!(bst.is_empty());
        assert_eq!(bst.height(), 0);
        assert!(!bst.search(&"x".to_string()).hit);
        assert!(!bst.remove(&"x".to_string()).hit);
    }
}
