//! In-order iteration and key-bounded range queries.

use std::iter::FusedIterator;

use crate::key::Key;
use crate::node::NodeId;
use crate::tree::RankTree;

impl<P, S, V> RankTree<P, S, V> {
    /// Every entry in key order, walking the sibling chain.
    pub fn iter(&self) -> Iter<'_, P, S, V> {
        let front = self.arena.leaf(self.left_sentinel).next;
        let back = self.arena.leaf(self.right_sentinel).prev;
        Iter {
            tree: self,
            front,
            back,
            remaining: self.len,
        }
    }

    /// Leaf handles in key order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut cursor = self.arena.leaf(self.left_sentinel).next;
        std::iter::from_fn(move || {
            let leaf = cursor.filter(|&l| l != self.right_sentinel)?;
            cursor = self.arena.leaf(leaf).next;
            Some(leaf)
        })
    }
}

impl<P: Ord, S: Ord, V> RankTree<P, S, V> {
    /// Number of entries with `lo <= key <= hi`.
    ///
    /// Primary-only bounds cover every secondary, so `(10, _)..=(30, _)`
    /// counts all entries whose primary lies in `[10, 30]`. Computed from two
    /// ranks, without visiting the entries in between.
    pub fn range_count(&self, lo: &Key<P, S>, hi: &Key<P, S>) -> usize {
        self.range_bounds(lo, hi).map_or(0, |(_, _, count)| count)
    }

    /// Entries with `lo <= key <= hi`, in key order.
    pub fn range(&self, lo: &Key<P, S>, hi: &Key<P, S>) -> Iter<'_, P, S, V> {
        match self.range_bounds(lo, hi) {
            Some((first, last, count)) => Iter {
                tree: self,
                front: Some(first),
                back: Some(last),
                remaining: count,
            },
            None => Iter {
                tree: self,
                front: None,
                back: None,
                remaining: 0,
            },
        }
    }

    /// First and last leaf inside `[lo, hi]` plus the number of entries
    /// between them, or `None` for an empty window.
    fn range_bounds(&self, lo: &Key<P, S>, hi: &Key<P, S>) -> Option<(NodeId, NodeId, usize)> {
        if hi.less_than(lo) {
            return None;
        }

        let mut first = self.search(lo);
        if first == self.left_sentinel {
            first = self.arena.leaf(first).next?;
        }
        if first == self.right_sentinel {
            return None;
        }

        let upper = self.search_larger(hi);
        let last = self.arena.leaf(upper).prev?;
        if last == self.left_sentinel {
            return None;
        }

        let (rf, rl) = (self.rank(first).ok()?, self.rank(last).ok()?);
        (rf <= rl).then(|| (first, last, rl - rf + 1))
    }
}

/// Iterator over `(key, value)` pairs in key order.
pub struct Iter<'a, P, S, V> {
    tree: &'a RankTree<P, S, V>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, P, S, V> Iterator for Iter<'a, P, S, V> {
    type Item = (&'a Key<P, S>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let leaf = self.tree.arena.leaf(self.front?);
        self.front = leaf.next;
        self.remaining -= 1;
        Some((&leaf.key, leaf.value.as_ref()?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, P, S, V> DoubleEndedIterator for Iter<'a, P, S, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let leaf = self.tree.arena.leaf(self.back?);
        self.back = leaf.prev;
        self.remaining -= 1;
        Some((&leaf.key, leaf.value.as_ref()?))
    }
}

impl<P, S, V> ExactSizeIterator for Iter<'_, P, S, V> {}

impl<P, S, V> FusedIterator for Iter<'_, P, S, V> {}

impl<'a, P, S, V> IntoIterator for &'a RankTree<P, S, V> {
    type Item = (&'a Key<P, S>, &'a V);
    type IntoIter = Iter<'a, P, S, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
