//! Self-balancing binary search tree keyed by entity id.
//!
//! [`AvlTree`] is the index behind every
//! [`ComponentStore`](crate::ComponentStore). Nodes are owned top-down
//! through `Box`; the path back to the root during rebalancing is the
//! recursion stack, so no parent pointers are stored.
//!
//! ## Rotation rule
//!
//! A node is out of balance when the heights of its two subtrees differ by
//! two. The heavy child's own balance factor selects the case:
//!
//! ```text
//! heavy side   child leans        rotation
//! left         left or even       single right      (LL)
//! left         right              left, then right  (LR)
//! right        right or even      single left       (RR)
//! right        left               right, then left  (RL)
//! ```
//!
//! For insertion with distinct keys this is the same decision as comparing
//! the new key against the heavy child's key. Using the balance factor lets
//! deletion share the rule, where no "new key" exists.
//!
//! Deletion rebalances every node on the affected path, so the height bound
//! holds after any mix of inserts and removals.

use std::cmp::Ordering;
use std::fmt::Debug;

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    /// Height of the subtree rooted here. A leaf is 0, an empty link is -1.
    height: i32,
    left: Link<K, V>,
    right: Link<K, V>,
}

fn height<K, V>(link: &Link<K, V>) -> i32 {
    link.as_ref().map_or(-1, |node| node.height)
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            height: 0,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }

    /// Positive when the right subtree is taller.
    fn balance(&self) -> i32 {
        height(&self.right) - height(&self.left)
    }
}

/// Lifts the left child into `node`'s place.
fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

/// Lifts the right child into `node`'s place.
fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

/// Refreshes `node`'s height and restores `|balance| <= 1` at this level.
fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update_height();
    match node.balance() {
        b if b < -1 => {
            if let Some(left) = node.left.take() {
                node.left = Some(if left.balance() > 0 {
                    rotate_left(left)
                } else {
                    left
                });
            }
            rotate_right(node)
        }
        b if b > 1 => {
            if let Some(right) = node.right.take() {
                node.right = Some(if right.balance() < 0 {
                    rotate_right(right)
                } else {
                    right
                });
            }
            rotate_left(node)
        }
        _ => node,
    }
}

fn insert_into<K: Ord, V>(
    link: Link<K, V>,
    key: K,
    value: V,
    inserted: &mut bool,
) -> Box<Node<K, V>> {
    let Some(mut node) = link else {
        *inserted = true;
        return Node::leaf(key, value);
    };

    match key.cmp(&node.key) {
        Ordering::Less => node.left = Some(insert_into(node.left.take(), key, value, inserted)),
        Ordering::Greater => {
            node.right = Some(insert_into(node.right.take(), key, value, inserted));
        }
        // Duplicate key: keep what is stored.
        Ordering::Equal => return node,
    }

    rebalance(node)
}

/// Detaches the maximum node of the subtree. Returns the remaining subtree
/// and the detached node with both child links cleared.
fn take_max<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.right.take() {
        None => {
            let rest = node.left.take();
            (rest, node)
        }
        Some(right) => {
            let (rest, max) = take_max(right);
            node.right = rest;
            (Some(rebalance(node)), max)
        }
    }
}

fn remove_from<K: Ord, V>(link: Link<K, V>, key: &K) -> (Link<K, V>, Option<V>) {
    let Some(mut node) = link else {
        return (None, None);
    };

    let removed = match key.cmp(&node.key) {
        Ordering::Less => {
            let (rest, removed) = remove_from(node.left.take(), key);
            node.left = rest;
            removed
        }
        Ordering::Greater => {
            let (rest, removed) = remove_from(node.right.take(), key);
            node.right = rest;
            removed
        }
        Ordering::Equal => {
            let Node {
                value, left, right, ..
            } = *node;
            return match (left, right) {
                (None, child) | (child, None) => (child, Some(value)),
                (Some(left), right) => {
                    // Two children: the in-order predecessor takes this slot.
                    let (rest, mut replacement) = take_max(left);
                    replacement.left = rest;
                    replacement.right = right;
                    (Some(rebalance(replacement)), Some(value))
                }
            };
        }
    };

    if removed.is_none() {
        return (Some(node), None);
    }
    (Some(rebalance(node)), removed)
}

/// An AVL tree mapping keys to values.
///
/// `find`, `insert` and `remove` are `O(log n)`. Inserting an existing key is
/// a no-op.
#[derive(Debug, Clone)]
pub struct AvlTree<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree: -1 when empty, 0 for a single node.
    #[must_use]
    pub fn height(&self) -> i32 {
        height(&self.root)
    }

    /// Looks up the value stored under `key`.
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&V> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    /// Mutable lookup. Keys cannot be changed through this, so the tree shape
    /// is unaffected.
    #[must_use]
    pub fn find_mut(&mut self, key: &K) -> Option<&mut V> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            }
        }
        None
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts `value` under `key` and rebalances.
    ///
    /// Returns `false`, dropping `value`, if the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut inserted = false;
        self.root = Some(insert_into(self.root.take(), key, value, &mut inserted));
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (root, removed) = remove_from(self.root.take(), key);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Collects all entries root first, then the left subtree, then the right.
    ///
    /// This is not key order. Use [`AvlTree::iter`] for sorted output.
    #[must_use]
    pub fn preorder(&self) -> Vec<(&K, &V)> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node<K, V>> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            out.push((&node.key, &node.value));
            if let Some(right) = node.right.as_deref() {
                stack.push(right);
            }
            if let Some(left) = node.left.as_deref() {
                stack.push(left);
            }
        }
        out
    }

    /// Iterates entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }
}

impl<K: Ord + Debug, V> AvlTree<K, V> {
    /// Walks the whole tree verifying key order, cached heights, the AVL
    /// balance bound and the entry count.
    ///
    /// Intended for tests and debug assertions.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut count = 0;
        check_subtree(&self.root, None, None, &mut count)?;
        if count != self.len {
            return Err(format!("len is {} but tree holds {count} nodes", self.len));
        }
        Ok(())
    }
}

fn check_subtree<K: Ord + Debug, V>(
    link: &Link<K, V>,
    lower: Option<&K>,
    upper: Option<&K>,
    count: &mut usize,
) -> Result<i32, String> {
    let Some(node) = link else {
        return Ok(-1);
    };
    *count += 1;

    if lower.is_some_and(|lo| node.key <= *lo) || upper.is_some_and(|hi| node.key >= *hi) {
        return Err(format!("key {:?} is out of order", node.key));
    }

    let left = check_subtree(&node.left, lower, Some(&node.key), count)?;
    let right = check_subtree(&node.right, Some(&node.key), upper, count)?;

    let actual = left.max(right) + 1;
    if actual != node.height {
        return Err(format!(
            "key {:?} caches height {} but measures {actual}",
            node.key, node.height
        ));
    }
    if (left - right).abs() > 1 {
        return Err(format!(
            "key {:?} is unbalanced: left {left}, right {right}",
            node.key
        ));
    }
    Ok(actual)
}

/// In-order iterator over an [`AvlTree`].
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some((&node.key, &node.value))
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
