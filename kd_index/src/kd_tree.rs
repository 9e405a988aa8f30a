//! SpatialIndex: incremental 3D k-d tree over caller-owned items.
//!
//! Nodes live in a flat arena and are addressed by index. Each node carries
//! two independent sets of links:
//! - `left` / `right`: tree partition, split axis = `level % 3` (x, y, z)
//! - `next`: insertion-order chain, used for enumeration and rebuilds
//!
//! The tree is never rebalanced. Positions may change behind the index's
//! back; the partition only matches current positions right after
//! [`SpatialIndex::update_positions`] (or [`SpatialIndex::remove_all`]).
//! Between rebuilds, nearest queries are approximate.

use glam::Vec3;
use std::iter::FusedIterator;
use crate::config::IndexConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::log::LogSeverity;
use crate::positioned::Positioned;
use crate::{kd_debug, kd_error, kd_trace};

/// A single node in the arena.
#[derive(Debug, Clone)]
struct KdNode<T> {
    /// Caller-owned handle
    item: T,
    /// Depth in the tree at insertion time (root = 0)
    level: u32,
    /// Child with a smaller split coordinate
    left: Option<usize>,
    /// Child with an equal or greater split coordinate
    right: Option<usize>,
    /// Next node in insertion order
    next: Option<usize>,
}

impl<T> KdNode<T> {
    fn new(item: T) -> Self {
        Self {
            item,
            level: 0,
            left: None,
            right: None,
            next: None,
        }
    }

    /// Detach from both the tree and the chain
    fn unlink(&mut self) {
        self.level = 0;
        self.left = None;
        self.right = None;
        self.next = None;
    }
}

/// Coordinate of `position` on the split axis of a node at `level`.
#[inline]
fn split_value(level: u32, position: Vec3) -> f32 {
    match level % 3 {
        0 => position.x,
        1 => position.y,
        _ => position.z,
    }
}

/// Running query metrics.
///
/// Both averages are exponential moving averages updated after every
/// non-empty nearest query. They are observational only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    /// Smoothed number of nodes visited per query
    pub average_search_length: f32,
    /// Smoothed tree depth of the returned node
    pub average_search_depth: f32,
    /// Nodes visited by the most recent query
    pub last_search_length: usize,
    /// Non-empty nearest queries answered
    pub queries: u64,
    /// Full relinks performed (`update_positions` and `remove_all`)
    pub rebuilds: u64,
}

impl SearchStats {
    fn record(&mut self, smoothing: f32, visited: usize, depth: u32) {
        let weight = 1.0 - smoothing;
        self.average_search_length =
            smoothing * self.average_search_length + weight * visited as f32;
        self.average_search_depth = smoothing * self.average_search_depth + weight * depth as f32;
        self.last_search_length = visited;
        self.queries += 1;
    }
}

/// Result of a nearest query with traversal details.
#[derive(Debug, Clone, Copy)]
pub struct Nearest<'a, T> {
    /// Closest item found
    pub item: &'a T,
    /// Squared distance from the query position to `item`
    pub distance_squared: f32,
    /// Tree depth of the node holding `item`
    pub level: u32,
    /// Nodes visited by the query
    pub visited: usize,
}

/// Incremental k-d tree over items exposing a 3D position.
///
/// Owned by the caller and passed explicitly to whoever needs it. Not
/// thread-safe; every operation runs to completion on the caller's thread.
///
/// # Example
///
/// ```
/// use kd_index::glam::Vec3;
/// use kd_index::kd3d::SpatialIndex;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let a = Rc::new(Cell::new(Vec3::new(0.0, 0.0, 0.0)));
/// let b = Rc::new(Cell::new(Vec3::new(1.0, 0.0, 0.0)));
///
/// let mut index = SpatialIndex::new();
/// index.add(Rc::clone(&a));
/// index.add(Rc::clone(&b));
///
/// let hit = index.find_closest(Vec3::new(0.1, 0.0, 0.0)).unwrap();
/// assert!(Rc::ptr_eq(hit, &a));
///
/// // Move `a` away, then tell the index.
/// a.set(Vec3::splat(10.0));
/// index.update_positions();
///
/// let hit = index.find_closest(Vec3::new(0.1, 0.0, 0.0)).unwrap();
/// assert!(Rc::ptr_eq(hit, &b));
/// ```
#[derive(Debug)]
pub struct SpatialIndex<T> {
    /// Node arena. Arena order always equals insertion order: `add` pushes
    /// at the end and `remove_all` compacts with an order-preserving retain.
    nodes: Vec<KdNode<T>>,
    /// Tree entry point
    root: Option<usize>,
    /// First node of the insertion-order chain
    head: Option<usize>,
    /// Chain append point
    tail: Option<usize>,
    /// Nodes currently linked into the tree and the chain
    count: usize,
    /// Query scratch buffer; capacity only grows
    open: Vec<usize>,
    stats: SearchStats,
    config: IndexConfig,
}

impl<T: Positioned> SpatialIndex<T> {
    /// Create an empty index with the default configuration
    pub fn new() -> Self {
        Self::from_valid_config(IndexConfig::default())
    }

    /// Create an empty index with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the configuration does not validate.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|error| log_and_return_error(&config.label, error))?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: IndexConfig) -> Self {
        Self {
            nodes: Vec::with_capacity(config.initial_capacity),
            root: None,
            head: None,
            tail: None,
            count: 0,
            open: Vec::with_capacity(config.initial_capacity),
            stats: SearchStats::default(),
            config,
        }
    }

    // ===== INSERTION =====

    /// Insert an item at its current position
    pub fn add(&mut self, item: T) {
        let idx = self.nodes.len();
        self.nodes.push(KdNode::new(item));
        self.link(idx);
    }

    /// Insert items one by one, in iteration order
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.add(item);
        }
    }

    /// Attach an unlinked arena node to the tree and the end of the chain.
    fn link(&mut self, idx: usize) {
        let position = self.nodes[idx].item.position();
        self.nodes[idx].unlink();

        match self.find_parent(position) {
            None => self.root = Some(idx),
            Some(parent) => {
                let parent_node = &mut self.nodes[parent];
                let level = parent_node.level;
                let goes_left =
                    split_value(level, position) < split_value(level, parent_node.item.position());
                if goes_left {
                    parent_node.left = Some(idx);
                } else {
                    parent_node.right = Some(idx);
                }
                self.nodes[idx].level = level + 1;
            }
        }

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.count += 1;
    }

    /// Descend from the root to the node whose empty child slot `position` falls into.
    fn find_parent(&self, position: Vec3) -> Option<usize> {
        let mut current = self.root;
        let mut parent = None;

        while let Some(idx) = current {
            let node = &self.nodes[idx];
            parent = Some(idx);
            current = if split_value(node.level, position)
                < split_value(node.level, node.item.position())
            {
                node.left
            } else {
                node.right
            };
        }

        parent
    }

    // ===== REBUILD / REMOVAL =====

    /// Rebuild the tree from current item positions.
    ///
    /// Call after moving any indexed item. Insertion order is unchanged;
    /// only left/right attachments may change. O(n).
    pub fn update_positions(&mut self) {
        // Snapshot the chain into the scratch buffer, then relink in that order.
        let mut order = std::mem::take(&mut self.open);
        order.clear();
        let mut current = self.head;
        while let Some(idx) = current {
            order.push(idx);
            current = self.nodes[idx].next;
        }
        debug_assert_eq!(order.len(), self.count);

        self.relink(order.iter().copied());
        self.open = order;

        if Diagnostics::enabled(LogSeverity::Debug) {
            kd_debug!(&self.config.label, "Rebuilt tree with {} nodes (depth {})", self.count, self.tree_depth());
        }
    }

    /// Remove every item matching `predicate`.
    ///
    /// Survivors keep their relative insertion order and the tree is rebuilt
    /// from their current positions. Returns the number of removed items.
    pub fn remove_all<F: FnMut(&T) -> bool>(&mut self, mut predicate: F) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node| !predicate(&node.item));
        let removed = before - self.nodes.len();

        self.relink(0..self.nodes.len());

        kd_debug!(&self.config.label, "Removed {} items, {} remain", removed, self.count);
        removed
    }

    /// Reset root, chain and count, then link `order` one node at a time.
    fn relink<I: Iterator<Item = usize>>(&mut self, order: I) {
        self.reset_links();
        for idx in order {
            self.link(idx);
        }
        self.stats.rebuilds += 1;
    }

    fn reset_links(&mut self) {
        self.root = None;
        self.head = None;
        self.tail = None;
        self.count = 0;
    }

    /// Drop every item handle held by the index
    pub fn clear(&mut self) {
        let dropped = self.nodes.len();
        self.nodes.clear();
        self.reset_links();
        kd_trace!(&self.config.label, "Cleared {} nodes", dropped);
    }

    // ===== QUERIES =====

    /// Item closest to `position` by squared Euclidean distance.
    ///
    /// Returns `None` on an empty index. Exact right after a rebuild;
    /// approximate if items moved since.
    pub fn find_closest(&mut self, position: Vec3) -> Option<&T> {
        self.search(position, |_| {}).map(|nearest| nearest.item)
    }

    /// Like [`find_closest`](Self::find_closest), with distance, depth and visit count.
    pub fn find_closest_entry(&mut self, position: Vec3) -> Option<Nearest<'_, T>> {
        self.search(position, |_| {})
    }

    /// Like [`find_closest`](Self::find_closest), calling `visit` on every
    /// node the traversal inspects, in visit order.
    pub fn find_closest_traced<V: FnMut(&T)>(&mut self, position: Vec3, visit: V) -> Option<&T> {
        self.search(position, visit).map(|nearest| nearest.item)
    }

    /// Iterative nearest search over the scratch buffer.
    ///
    /// Every node has exactly one parent, so each is pushed at most once and
    /// the buffer never holds more than `count` entries.
    fn search<V: FnMut(&T)>(&mut self, position: Vec3, mut visit: V) -> Option<Nearest<'_, T>> {
        let root = self.root?;
        let Self {
            nodes,
            open,
            stats,
            config,
            count,
            ..
        } = self;
        let nodes = &*nodes;

        open.clear();
        open.reserve(*count);
        open.push(root);

        let mut nearest = root;
        let mut nearest_dist = f32::MAX;
        let mut cursor = 0;

        while cursor < open.len() {
            let node = &nodes[open[cursor]];
            let node_idx = open[cursor];
            cursor += 1;
            visit(&node.item);

            let node_position = node.item.position();
            let dist = position.distance_squared(node_position);
            if dist < nearest_dist {
                nearest_dist = dist;
                nearest = node_idx;
            }

            let split_node = split_value(node.level, node_position);
            let split_search = split_value(node.level, position);
            let gap = split_node - split_search;

            let (near_side, far_side) = if split_search < split_node {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };

            if let Some(child) = near_side {
                open.push(child);
            }
            if gap * gap < nearest_dist {
                if let Some(child) = far_side {
                    open.push(child);
                }
            }
        }

        let hit = &nodes[nearest];
        stats.record(config.smoothing, cursor, hit.level);

        Some(Nearest {
            item: &hit.item,
            distance_squared: nearest_dist,
            level: hit.level,
            visited: cursor,
        })
    }

    /// First item in insertion order matching `predicate`
    pub fn find<F: FnMut(&T) -> bool>(&self, mut predicate: F) -> Option<&T> {
        self.iter().find(|item| predicate(item))
    }

    /// Item at insertion-order position `index`
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfRange` if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&T> {
        if index >= self.count {
            return Err(log_and_return_error(
                &self.config.label,
                Error::IndexOutOfRange {
                    index,
                    count: self.count,
                },
            ));
        }
        self.iter()
            .nth(index)
            .ok_or(Error::IndexOutOfRange {
                index,
                count: self.count,
            })
    }

    // ===== METRICS =====

    /// Smoothed number of nodes visited per nearest query
    pub fn average_search_length(&self) -> f32 {
        self.stats.average_search_length
    }

    /// Smoothed tree depth of nearest query results
    pub fn average_search_depth(&self) -> f32 {
        self.stats.average_search_depth
    }

    /// Snapshot of all query metrics
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Deepest `level` currently in the tree (0 when empty)
    pub fn tree_depth(&self) -> u32 {
        self.nodes.iter().map(|node| node.level).max().unwrap_or(0)
    }

    /// Active configuration
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }
}

impl<T> SpatialIndex<T> {
    /// Number of items
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the index holds no items
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Items in insertion order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            current: self.head,
            remaining: self.count,
        }
    }
}

fn log_and_return_error(source: &str, error: Error) -> Error {
    kd_error!(source, "{}", error);
    error
}

impl<T: Positioned> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Positioned> Extend<T> for SpatialIndex<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<T: Positioned> FromIterator<T> for SpatialIndex<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut index = Self::new();
        index.add_all(iter);
        index
    }
}

impl<'a, T> IntoIterator for &'a SpatialIndex<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ===== ENUMERATION =====

/// Insertion-order iterator over a [`SpatialIndex`].
///
/// Follows the `next` chain, independent of tree shape. Cloning restarts
/// from the clone point.
#[derive(Debug)]
pub struct Iter<'a, T> {
    nodes: &'a [KdNode<T>],
    current: Option<usize>,
    remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            current: self.current,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.current?;
        let node = &self.nodes[idx];
        self.current = node.next;
        self.remaining -= 1;
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
#[path = "kd_tree_tests.rs"]
mod tests;
