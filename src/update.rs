//! Structural updates: insertion with split propagation and deletion with
//! borrow/merge repair.
//!
//! Both operations restore, before returning, every invariant the tree
//! relies on: branches hold 2 or 3 children, all leaves sit at the same depth,
//! cached maxima and sizes are exact, and the sibling chain lists every leaf
//! in key order between the two sentinels.

use crate::error::TreeError;
use crate::key::Key;
use crate::node::{Branch, Leaf, Node, NodeId};
use crate::tree::RankTree;

impl<P: Ord, S: Ord, V> RankTree<P, S, V> {
    /// Builds a leaf for `(primary, secondary)` and inserts it.
    pub fn insert_entry(&mut self, primary: P, secondary: S, value: V) -> NodeId {
        let leaf = self.new_leaf(primary, secondary, value);
        self.link_leaf(leaf);
        leaf
    }

    /// Links a detached leaf (from [`RankTree::new_leaf`]) into the tree.
    ///
    /// Duplicate keys are not rejected: callers check [`RankTree::exists`]
    /// first when keys must be unique.
    pub fn insert(&mut self, leaf: NodeId) -> Result<(), TreeError> {
        match self.arena.get(leaf) {
            None => return Err(TreeError::StaleHandle(leaf)),
            Some(Node::Branch(_)) => return Err(TreeError::NotALeaf(leaf)),
            Some(Node::Leaf(l)) if l.parent.is_some() => {
                return Err(TreeError::AlreadyLinked(leaf))
            }
            Some(Node::Leaf(_)) => {}
        }
        self.link_leaf(leaf);
        Ok(())
    }

    /// Unlinks `leaf`, frees its slot and hands back its entry.
    pub fn delete(&mut self, leaf: NodeId) -> Result<(Key<P, S>, V), TreeError> {
        let (parent, prev, next) = match self.arena.get(leaf) {
            None => return Err(TreeError::StaleHandle(leaf)),
            Some(Node::Branch(_)) => return Err(TreeError::NotALeaf(leaf)),
            Some(Node::Leaf(l)) if l.key.is_infinite() => {
                return Err(TreeError::SentinelLeaf(leaf))
            }
            Some(Node::Leaf(l)) => match (l.parent, l.prev, l.next) {
                (Some(parent), Some(prev), Some(next)) => (parent, prev, next),
                _ => return Err(TreeError::NotLinked(leaf)),
            },
        };

        self.link(prev, next);
        self.remove_child(parent, leaf);
        self.rebalance_from(parent);
        self.len -= 1;

        match self.arena.free(leaf) {
            Some(Node::Leaf(Leaf {
                key,
                value: Some(value),
                ..
            })) => Ok((key, value)),
            _ => Err(TreeError::StaleHandle(leaf)),
        }
    }

    /// Deletes the first entry matching `key`.
    pub fn remove(&mut self, key: &Key<P, S>) -> Option<(Key<P, S>, V)> {
        let leaf = self.find(key)?;
        self.delete(leaf).ok()
    }

    fn link_leaf(&mut self, leaf: NodeId) {
        // Strict descent so that equal keys land after the existing ones.
        let target = self.descend(self.root, &self.arena.leaf(leaf).key, true);
        let mut node = match self.arena[target].parent() {
            Some(parent) => parent,
            None => self.root,
        };

        let mut carry = self.insert_child(node, leaf);
        while node != self.root {
            node = match self.arena[node].parent() {
                Some(parent) => parent,
                None => break,
            };
            carry = match carry {
                Some(split) => self.insert_child(node, split),
                None => {
                    self.recompute(node);
                    None
                }
            };
        }

        if let Some(split) = carry {
            let old_root = self.root;
            let root = self.arena.alloc(Node::Branch(Branch::new()));
            self.set_children(root, &[old_root, split]);
            self.root = root;
            tracing::trace!(?root, "root split, tree grew a level");
        }

        let prev = self.predecessor(leaf).unwrap_or(self.left_sentinel);
        let next = self.successor(leaf).unwrap_or(self.right_sentinel);
        self.link(prev, leaf);
        self.link(leaf, next);
        self.len += 1;
    }

    /// Adds `child` to `parent` in key order. A parent that would hold four
    /// children keeps the lower two and hands the upper two to a new sibling
    /// branch, which is returned for insertion one level up.
    fn insert_child(&mut self, parent: NodeId, child: NodeId) -> Option<NodeId> {
        let existing = self.arena.branch(parent).children();
        let key = self.key_of(child);
        let at = existing
            .iter()
            .position(|&c| key.less_than(self.key_of(c)))
            .unwrap_or(existing.len());

        let mut all = [NodeId::DANGLING; 4];
        all[..at].copy_from_slice(&existing[..at]);
        all[at] = child;
        all[at + 1..=existing.len()].copy_from_slice(&existing[at..]);
        let n = existing.len() + 1;

        if n <= 3 {
            self.set_children(parent, &all[..n]);
            return None;
        }

        self.set_children(parent, &all[..2]);
        let sibling = self.arena.alloc(Node::Branch(Branch::new()));
        self.set_children(sibling, &all[2..]);
        tracing::trace!(?parent, ?sibling, "split branch");
        Some(sibling)
    }

    /// Walks from `node` to the root repairing underflow and refreshing
    /// cached fields.
    fn rebalance_from(&mut self, node: NodeId) {
        let mut cursor = Some(node);
        while let Some(node) = cursor {
            if self.arena.branch(node).len() >= 2 {
                self.recompute(node);
                cursor = self.arena[node].parent();
            } else if node != self.root {
                cursor = self.borrow_or_merge(node);
            } else {
                let child = self.arena.branch(node).first();
                self.arena[child].set_parent(None);
                self.root = child;
                self.arena.free(node);
                tracing::trace!(root = ?child, "root collapsed, tree shrank a level");
                break;
            }
        }
    }

    /// Repairs a non-root branch left with a single child, using an adjacent
    /// sibling: borrow one child when the sibling has three, otherwise merge
    /// into it and drop `node`. Returns the parent, which may now underflow.
    fn borrow_or_merge(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.arena[node].parent()?;
        let only = self.arena.branch(node).first();
        let siblings = self.arena.branch(parent);
        let index = siblings.position(node)?;

        if index == 0 {
            let right = siblings.children()[1];
            let mut grand = [NodeId::DANGLING; 3];
            let n = self.copy_children(right, &mut grand);
            if n == 3 {
                self.set_children(node, &[only, grand[0]]);
                self.set_children(right, &[grand[1], grand[2]]);
                tracing::trace!(?node, from = ?right, "borrowed from right sibling");
            } else {
                self.set_children(right, &[only, grand[0], grand[1]]);
                self.remove_child(parent, node);
                self.arena.free(node);
                tracing::trace!(?node, into = ?right, "merged into right sibling");
            }
        } else {
            let left = siblings.children()[index - 1];
            let mut grand = [NodeId::DANGLING; 3];
            let n = self.copy_children(left, &mut grand);
            if n == 3 {
                self.set_children(node, &[grand[2], only]);
                self.set_children(left, &[grand[0], grand[1]]);
                tracing::trace!(?node, from = ?left, "borrowed from left sibling");
            } else {
                self.set_children(left, &[grand[0], grand[1], only]);
                self.remove_child(parent, node);
                self.arena.free(node);
                tracing::trace!(?node, into = ?left, "merged into left sibling");
            }
        }
        Some(parent)
    }

    fn copy_children(&self, branch: NodeId, out: &mut [NodeId; 3]) -> usize {
        let children = self.arena.branch(branch).children();
        out[..children.len()].copy_from_slice(children);
        children.len()
    }
}
