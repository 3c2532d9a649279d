//! Read-only algorithms: key-directed descent and structural navigation.

use crate::error::TreeError;
use crate::key::Key;
use crate::node::{Node, NodeId};
use crate::tree::RankTree;

impl<P: Ord, S: Ord, V> RankTree<P, S, V> {
    /// Ceiling search from the root: the smallest leaf whose key is `>= key`,
    /// or the right sentinel when `key` exceeds every entry.
    #[inline]
    pub fn search(&self, key: &Key<P, S>) -> NodeId {
        self.descend(self.root, key, false)
    }

    /// Smallest leaf whose key is strictly greater than `key`.
    #[inline]
    pub fn search_larger(&self, key: &Key<P, S>) -> NodeId {
        self.descend(self.root, key, true)
    }

    /// [`RankTree::search`] starting from an arbitrary node.
    pub fn search_from(&self, node: NodeId, key: &Key<P, S>) -> Option<NodeId> {
        self.arena.get(node)?;
        Some(self.descend(node, key, false))
    }

    /// [`RankTree::search_larger`] starting from an arbitrary node.
    pub fn search_larger_from(&self, node: NodeId, key: &Key<P, S>) -> Option<NodeId> {
        self.arena.get(node)?;
        Some(self.descend(node, key, true))
    }

    /// Whether a real leaf matches `key` under the tree order. A primary-only
    /// key matches any entry sharing its primary.
    pub fn exists(&self, key: &Key<P, S>) -> bool {
        self.find(key).is_some()
    }

    /// The first leaf matching `key`, if any.
    pub fn find(&self, key: &Key<P, S>) -> Option<NodeId> {
        let leaf = self.search(key);
        (!self.is_sentinel(leaf) && self.key_of(leaf).matches(key)).then_some(leaf)
    }

    pub fn get(&self, key: &Key<P, S>) -> Option<&V> {
        self.find(key).and_then(|leaf| self.value(leaf))
    }

    pub fn get_mut(&mut self, key: &Key<P, S>) -> Option<&mut V> {
        let leaf = self.find(key)?;
        self.value_mut(leaf)
    }

    /// Walks down from `node` to a leaf, at each branch entering the first
    /// child whose representative key is `>= key` (or `> key` when `strict`).
    /// The last child absorbs keys beyond every representative key.
    pub(crate) fn descend(&self, mut node: NodeId, key: &Key<P, S>, strict: bool) -> NodeId {
        while let Node::Branch(branch) = &self.arena[node] {
            node = branch
                .children()
                .iter()
                .copied()
                .find(|&child| {
                    let bound = self.key_of(child);
                    if strict {
                        key.less_than(bound)
                    } else {
                        key.less_or_equal(bound)
                    }
                })
                .unwrap_or_else(|| branch.last());
        }
        node
    }
}

impl<P, S, V> RankTree<P, S, V> {
    /// The leaf holding the smallest real key.
    pub fn minimum(&self) -> Result<NodeId, TreeError> {
        self.successor(self.left_sentinel).ok_or(TreeError::Empty)
    }

    /// The leaf holding the largest real key.
    pub fn maximum(&self) -> Result<NodeId, TreeError> {
        self.predecessor(self.right_sentinel).ok_or(TreeError::Empty)
    }

    /// In-order predecessor found through parent links: climb while `node`
    /// is the first child of its parent, step to the adjacent left subtree
    /// and descend to its rightmost leaf.
    ///
    /// `None` when the predecessor would be the left sentinel, when `node` is
    /// the left sentinel itself, or when the handle is not live.
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        let mut node = node;
        let mut parent = self.arena.get(node)?.parent()?;
        let mut index = self.arena.branch(parent).position(node)?;
        while index == 0 {
            node = parent;
            parent = self.arena[node].parent()?;
            index = self.arena.branch(parent).position(node)?;
        }

        let mut leaf = self.arena.branch(parent).children()[index - 1];
        while let Node::Branch(branch) = &self.arena[leaf] {
            leaf = branch.last();
        }
        (leaf != self.left_sentinel).then_some(leaf)
    }

    /// In-order successor; mirror image of [`RankTree::predecessor`].
    pub fn successor(&self, node: NodeId) -> Option<NodeId> {
        let mut node = node;
        let mut parent = self.arena.get(node)?.parent()?;
        let mut index = self.arena.branch(parent).position(node)?;
        while index + 1 == self.arena.branch(parent).len() {
            node = parent;
            parent = self.arena[node].parent()?;
            index = self.arena.branch(parent).position(node)?;
        }

        let mut leaf = self.arena.branch(parent).children()[index + 1];
        while let Node::Branch(branch) = &self.arena[leaf] {
            leaf = branch.first();
        }
        (leaf != self.right_sentinel).then_some(leaf)
    }
}
