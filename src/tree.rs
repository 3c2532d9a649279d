//! The tree container: root, the two sentinel leaves, and the node arena.

use std::fmt;

use crate::error::TreeError;
use crate::key::Key;
use crate::node::{Branch, Leaf, Node, NodeArena, NodeId};

/// A rank-augmented 2-3 tree over composite keys.
///
/// All entries live in leaves at equal depth. Two permanent sentinel leaves
/// holding `-inf` and `+inf` bound the tree on both sides, and every leaf is
/// threaded into a doubly-linked sibling chain in key order. Branches cache
/// their maximum leaf and the number of real leaves beneath them, which gives
/// O(log n) rank and range counts.
///
/// Uniqueness of keys is the caller's responsibility: check with
/// [`RankTree::exists`] before inserting.
#[derive(Clone)]
pub struct RankTree<P, S, V> {
    pub(crate) arena: NodeArena<P, S, V>,
    pub(crate) root: NodeId,
    pub(crate) left_sentinel: NodeId,
    pub(crate) right_sentinel: NodeId,
    pub(crate) len: usize,
}

impl<P, S, V> RankTree<P, S, V> {
    /// An empty tree: a root branch over the two linked sentinels.
    pub fn new() -> Self {
        let mut arena = NodeArena::new();
        let left_sentinel = arena.alloc(Node::Leaf(Leaf::new(Key::MinusInfinity, None)));
        let right_sentinel = arena.alloc(Node::Leaf(Leaf::new(Key::PlusInfinity, None)));
        let root = arena.alloc(Node::Branch(Branch::new()));

        let mut tree = Self {
            arena,
            root,
            left_sentinel,
            right_sentinel,
            len: 0,
        };
        tree.set_children(root, &[left_sentinel, right_sentinel]);
        tree.link(left_sentinel, right_sentinel);
        tree
    }

    /// Number of real (non-sentinel) leaves linked into the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn left_sentinel(&self) -> NodeId {
        self.left_sentinel
    }

    #[inline]
    pub fn right_sentinel(&self) -> NodeId {
        self.right_sentinel
    }

    /// Levels from the root down to the leaves, counting both ends.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self.root;
        while let Node::Branch(branch) = &self.arena[node] {
            node = branch.first();
            height += 1;
        }
        height
    }

    /// Drops every entry, and any detached leaves, and returns to the
    /// two-sentinel state. The sentinels keep their handles; every other
    /// handle goes stale.
    pub fn clear(&mut self) {
        let (left, right) = (self.left_sentinel, self.right_sentinel);
        self.arena.free_all_except(&[left, right]);
        for sentinel in [left, right] {
            let leaf = self.arena.leaf_mut(sentinel);
            leaf.parent = None;
            leaf.prev = None;
            leaf.next = None;
        }
        self.root = self.arena.alloc(Node::Branch(Branch::new()));
        self.set_children(self.root, &[left, right]);
        self.link(left, right);
        self.len = 0;
    }

    /// Approximate heap bytes held by the node arena.
    pub fn memory_usage(&self) -> usize {
        self.arena.capacity()
    }

    pub fn shrink_to_fit(&mut self) {
        self.arena.shrink_to_fit();
    }

    /// Builds a detached leaf, ready for [`RankTree::insert`].
    pub fn new_leaf(&mut self, primary: P, secondary: S, value: V) -> NodeId {
        self.arena.alloc(Node::Leaf(Leaf::new(
            Key::new(primary, secondary),
            Some(value),
        )))
    }

    /// Discards a detached leaf that was never inserted.
    pub fn discard_leaf(&mut self, leaf: NodeId) -> Result<(Key<P, S>, V), TreeError> {
        match self.arena.get(leaf) {
            None => return Err(TreeError::StaleHandle(leaf)),
            Some(Node::Branch(_)) => return Err(TreeError::NotALeaf(leaf)),
            Some(Node::Leaf(l)) if l.parent.is_some() => {
                return Err(TreeError::AlreadyLinked(leaf))
            }
            Some(Node::Leaf(_)) => {}
        }
        match self.arena.free(leaf) {
            Some(Node::Leaf(Leaf {
                key,
                value: Some(value),
                ..
            })) => Ok((key, value)),
            _ => Err(TreeError::StaleHandle(leaf)),
        }
    }

    // === Node accessors ===
    //
    // Every accessor returns `None` for handles that are stale or were issued
    // by another tree.

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    /// Key of a leaf, or the representative (maximum) key of a branch.
    pub fn key(&self, id: NodeId) -> Option<&Key<P, S>> {
        self.arena.get(id).map(|_| self.key_of(id))
    }

    /// Stored value of a real leaf.
    pub fn value(&self, id: NodeId) -> Option<&V> {
        match self.arena.get(id)? {
            Node::Leaf(leaf) => leaf.value.as_ref(),
            Node::Branch(_) => None,
        }
    }

    /// Mutable access to a leaf's value. Keys are immutable in place: to
    /// re-key an entry, delete it and insert a fresh leaf.
    pub fn value_mut(&mut self, id: NodeId) -> Option<&mut V> {
        match self.arena.get_mut(id)? {
            Node::Leaf(leaf) => leaf.value.as_mut(),
            Node::Branch(_) => None,
        }
    }

    pub fn is_leaf(&self, id: NodeId) -> Option<bool> {
        self.arena.get(id).map(Node::is_leaf)
    }

    pub fn is_sentinel(&self, id: NodeId) -> bool {
        id == self.left_sentinel || id == self.right_sentinel
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?.parent()
    }

    /// Children of a branch, in key order. Empty for leaves.
    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.arena.get(id)? {
            Node::Leaf(_) => Some(&[]),
            Node::Branch(branch) => Some(branch.children()),
        }
    }

    /// Cached count of real leaves beneath `id` (1 for a real leaf, 0 for a
    /// sentinel).
    pub fn size(&self, id: NodeId) -> Option<usize> {
        self.arena.get(id).map(Node::size)
    }

    /// Left neighbour in the sibling chain.
    pub fn left_sibling(&self, id: NodeId) -> Option<NodeId> {
        match self.arena.get(id)? {
            Node::Leaf(leaf) => leaf.prev,
            Node::Branch(_) => None,
        }
    }

    /// Right neighbour in the sibling chain.
    pub fn right_sibling(&self, id: NodeId) -> Option<NodeId> {
        match self.arena.get(id)? {
            Node::Leaf(leaf) => leaf.next,
            Node::Branch(_) => None,
        }
    }

    /// 1-based position of `leaf` among the real leaves.
    ///
    /// Walks from the leaf to the root, adding the cached sizes of the
    /// siblings left of the current node at every level. The left sentinel
    /// ranks 1, the right sentinel `len() + 1`.
    pub fn rank(&self, leaf: NodeId) -> Result<usize, TreeError> {
        match self.arena.get(leaf) {
            None => return Err(TreeError::StaleHandle(leaf)),
            Some(Node::Branch(_)) => return Err(TreeError::NotALeaf(leaf)),
            Some(Node::Leaf(l)) if l.parent.is_none() => return Err(TreeError::NotLinked(leaf)),
            Some(Node::Leaf(_)) => {}
        }

        let mut rank = 1;
        let mut node = leaf;
        while let Some(parent) = self.arena[node].parent() {
            for &child in self.arena.branch(parent).children() {
                if child == node {
                    break;
                }
                rank += self.arena[child].size();
            }
            node = parent;
        }
        Ok(rank)
    }

    // === Internal structure helpers ===

    /// Key of a leaf or representative key of a branch. `id` must be live.
    #[inline]
    pub(crate) fn key_of(&self, id: NodeId) -> &Key<P, S> {
        match &self.arena[id] {
            Node::Leaf(leaf) => &leaf.key,
            Node::Branch(branch) => &self.arena.leaf(branch.max).key,
        }
    }

    /// Replaces the children of `parent`, re-parents them and refreshes the
    /// parent's cached fields.
    pub(crate) fn set_children(&mut self, parent: NodeId, children: &[NodeId]) {
        self.arena.branch_mut(parent).set_children(children);
        for &child in children {
            self.arena[child].set_parent(Some(parent));
        }
        self.recompute(parent);
    }

    /// Drops `child` from `parent`'s children.
    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let mut rest = [NodeId::DANGLING; 3];
        let mut n = 0;
        for &c in self.arena.branch(parent).children() {
            if c != child {
                rest[n] = c;
                n += 1;
            }
        }
        debug_assert_eq!(n + 1, self.arena.branch(parent).len());
        self.set_children(parent, &rest[..n]);
    }

    /// Refreshes a branch's representative leaf and size from its children.
    /// Only this node changes; callers propagate upward.
    pub(crate) fn recompute(&mut self, id: NodeId) {
        let branch = self.arena.branch(id);
        let last = branch.last();
        let max = match &self.arena[last] {
            Node::Leaf(_) => last,
            Node::Branch(child) => child.max,
        };
        let size = branch
            .children()
            .iter()
            .map(|&child| self.arena[child].size())
            .sum();

        let branch = self.arena.branch_mut(id);
        branch.max = max;
        branch.size = size;
    }

    /// Makes `left` and `right` direct neighbours in the sibling chain.
    #[inline]
    pub(crate) fn link(&mut self, left: NodeId, right: NodeId) {
        self.arena.leaf_mut(left).next = Some(right);
        self.arena.leaf_mut(right).prev = Some(left);
    }
}

impl<P, S, V> Default for RankTree<P, S, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: fmt::Debug, S: fmt::Debug, V: fmt::Debug> fmt::Debug for RankTree<P, S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
