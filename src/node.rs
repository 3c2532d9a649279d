//! Arena-resident tree nodes.
//!
//! Nodes never own each other. Every parent, child and sibling reference is a
//! [`NodeId`] into the [`NodeArena`], which is the sole owner of node storage.
//! Freed slots are recycled through a free list; each slot carries a
//! generation so handles to a freed node are detected instead of silently
//! aliasing whatever reuses the slot. Every arena is also stamped with its own
//! id, so a handle taken from one tree never resolves in another.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::key::Key;

// =============================================================================
// Handles
// =============================================================================

/// Generational handle to a node in a [`crate::RankTree`].
///
/// A handle only resolves in the tree that issued it, or in clones of that
/// tree taken after it was issued.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    arena: u32,
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Placeholder for unused child slots. Never resolves to a node.
    pub(crate) const DANGLING: NodeId = NodeId {
        arena: u32::MAX,
        index: u32::MAX,
        generation: u32::MAX,
    };

    #[inline]
    fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}v{}", self.arena, self.index, self.generation)
    }
}

// =============================================================================
// Node variants
// =============================================================================

/// A leaf: one entry of the tree, or one of the two sentinels.
#[derive(Clone, Debug)]
pub(crate) struct Leaf<P, S, V> {
    pub(crate) key: Key<P, S>,
    /// `None` only for sentinels.
    pub(crate) value: Option<V>,
    /// `None` while the leaf is detached (built but not inserted).
    pub(crate) parent: Option<NodeId>,
    /// Left neighbour in the sibling chain.
    pub(crate) prev: Option<NodeId>,
    /// Right neighbour in the sibling chain.
    pub(crate) next: Option<NodeId>,
}

impl<P, S, V> Leaf<P, S, V> {
    pub(crate) fn new(key: Key<P, S>, value: Option<V>) -> Self {
        Self {
            key,
            value,
            parent: None,
            prev: None,
            next: None,
        }
    }

    /// Real leaves count 1 towards subtree sizes, sentinels 0.
    #[inline]
    pub(crate) fn size(&self) -> usize {
        usize::from(!self.key.is_infinite())
    }
}

/// An internal node with 2 or 3 ordered children.
///
/// A branch holds a single child only transiently, between a deletion and the
/// borrow/merge step that repairs it.
#[derive(Clone, Debug)]
pub(crate) struct Branch {
    children: [NodeId; 3],
    len: u8,
    pub(crate) parent: Option<NodeId>,
    /// Maximum leaf of the subtree; its key is the branch's representative key.
    pub(crate) max: NodeId,
    /// Number of real leaves in the subtree.
    pub(crate) size: usize,
}

impl Branch {
    pub(crate) fn new() -> Self {
        Self {
            children: [NodeId::DANGLING; 3],
            len: 0,
            parent: None,
            max: NodeId::DANGLING,
            size: 0,
        }
    }

    #[inline]
    pub(crate) fn children(&self) -> &[NodeId] {
        &self.children[..self.len as usize]
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub(crate) fn first(&self) -> NodeId {
        self.children[0]
    }

    #[inline]
    pub(crate) fn last(&self) -> NodeId {
        self.children[self.len as usize - 1]
    }

    /// Position of `child` among this branch's children.
    #[inline]
    pub(crate) fn position(&self, child: NodeId) -> Option<usize> {
        self.children().iter().position(|&c| c == child)
    }

    pub(crate) fn set_children(&mut self, children: &[NodeId]) {
        debug_assert!(
            (1..=3).contains(&children.len()),
            "branch must hold 1..=3 children, got {}",
            children.len()
        );
        self.children = [NodeId::DANGLING; 3];
        self.children[..children.len()].copy_from_slice(children);
        self.len = children.len() as u8;
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Node<P, S, V> {
    Leaf(Leaf<P, S, V>),
    Branch(Branch),
}

impl<P, S, V> Node<P, S, V> {
    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Leaf(leaf) => leaf.parent,
            Node::Branch(branch) => branch.parent,
        }
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Leaf(leaf) => leaf.parent = parent,
            Node::Branch(branch) => branch.parent = parent,
        }
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.size(),
            Node::Branch(branch) => branch.size,
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Clone, Debug)]
struct Slot<P, S, V> {
    generation: u32,
    node: Option<Node<P, S, V>>,
}

/// Source of arena ids. `u32::MAX` is reserved for [`NodeId::DANGLING`].
static NEXT_ARENA_ID: AtomicU32 = AtomicU32::new(0);

fn next_arena_id() -> u32 {
    loop {
        let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);
        if id != u32::MAX {
            return id;
        }
    }
}

/// Slot storage for all nodes of one tree, with a free list of vacated slots.
///
/// Clones keep the id, so handles issued before a clone resolve in both.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<P, S, V> {
    id: u32,
    slots: Vec<Slot<P, S, V>>,
    free: Vec<u32>,
    live: usize,
}

impl<P, S, V> NodeArena<P, S, V> {
    pub(crate) fn new() -> Self {
        Self {
            id: next_arena_id(),
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<P, S, V>) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.node.is_none());
            slot.node = Some(node);
            return NodeId {
                arena: self.id,
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            arena: self.id,
            index,
            generation: 0,
        }
    }

    /// The slot behind `id`, if `id` was issued by this arena.
    #[inline]
    fn slot(&self, id: NodeId) -> Option<&Slot<P, S, V>> {
        if id.arena != self.id {
            return None;
        }
        self.slots
            .get(id.slot())
            .filter(|slot| slot.generation == id.generation)
    }

    #[inline]
    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot<P, S, V>> {
        if id.arena != self.id {
            return None;
        }
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation)
    }

    /// Vacates the slot behind `id`, returning its node. Later lookups with
    /// `id` fail.
    pub(crate) fn free(&mut self, id: NodeId) -> Option<Node<P, S, V>> {
        let slot = self.slot_mut(id)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(node)
    }

    /// Vacates every occupied slot except those in `keep`. Handles to the
    /// vacated nodes go stale exactly as with [`NodeArena::free`].
    pub(crate) fn free_all_except(&mut self, keep: &[NodeId]) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let kept = keep
                .iter()
                .any(|id| id.slot() == index && id.generation == slot.generation);
            if kept || slot.node.take().is_none() {
                continue;
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index as u32);
            self.live -= 1;
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<P, S, V>> {
        self.slot(id).and_then(|slot| slot.node.as_ref())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<P, S, V>> {
        self.slot_mut(id).and_then(|slot| slot.node.as_mut())
    }

    #[inline]
    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Slot<P, S, V>>()
            + self.free.capacity() * std::mem::size_of::<u32>()
    }

    /// Vacated slots are kept (their generations must survive), only spare
    /// capacity is released.
    pub(crate) fn shrink_to_fit(&mut self) {
        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    #[inline]
    pub(crate) fn leaf(&self, id: NodeId) -> &Leaf<P, S, V> {
        match &self[id] {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => panic!("node {id:?} is a branch, expected a leaf"),
        }
    }

    #[inline]
    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> &mut Leaf<P, S, V> {
        match &mut self[id] {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => panic!("node {id:?} is a branch, expected a leaf"),
        }
    }

    #[inline]
    pub(crate) fn branch(&self, id: NodeId) -> &Branch {
        match &self[id] {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => panic!("node {id:?} is a leaf, expected a branch"),
        }
    }

    #[inline]
    pub(crate) fn branch_mut(&mut self, id: NodeId) -> &mut Branch {
        match &mut self[id] {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => panic!("node {id:?} is a leaf, expected a branch"),
        }
    }
}

impl<P, S, V> Index<NodeId> for NodeArena<P, S, V> {
    type Output = Node<P, S, V>;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        match self.get(id) {
            Some(node) => node,
            None => panic!("dangling node handle {id:?}"),
        }
    }
}

impl<P, S, V> IndexMut<NodeId> for NodeArena<P, S, V> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("dangling node handle {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(k: u32) -> Node<u32, u32, u32> {
        Node::Leaf(Leaf::new(Key::new(k, k), Some(k)))
    }

    #[test]
    fn test_alloc_and_get() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(leaf(1));
        let b = arena.alloc(leaf(2));
        assert_ne!(a, b);
        assert_eq!(arena.live(), 2);
        assert_eq!(arena.leaf(a).value, Some(1));
        assert_eq!(arena.leaf(b).value, Some(2));
    }

    #[test]
    fn test_freed_handle_is_stale() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(leaf(1));
        assert!(arena.free(a).is_some());
        assert!(!arena.contains(a));
        assert!(arena.free(a).is_none());

        // The slot is reused under a new generation.
        let b = arena.alloc(leaf(2));
        assert_eq!(a.index, b.index);
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.leaf(b).value, Some(2));
        assert_eq!(arena.live(), 1);
    }

    #[test]
    fn test_dangling_never_resolves() {
        let mut arena: NodeArena<u32, u32, u32> = NodeArena::new();
        arena.alloc(leaf(1));
        assert!(arena.get(NodeId::DANGLING).is_none());
    }

    #[test]
    fn test_shrink_keeps_stale_handles_stale() {
        let mut arena = NodeArena::new();
        let ids: Vec<_> = (0..8).map(|k| arena.alloc(leaf(k))).collect();
        for &id in &ids[4..] {
            arena.free(id);
        }
        arena.shrink_to_fit();
        assert_eq!(arena.live(), 4);
        let reused = arena.alloc(leaf(9));
        for &id in &ids[4..] {
            assert!(arena.get(id).is_none());
        }
        assert_eq!(arena.leaf(reused).value, Some(9));
    }

    #[test]
    fn test_handles_are_bound_to_their_arena() {
        let mut a = NodeArena::new();
        let mut b = NodeArena::new();
        let in_a = a.alloc(leaf(1));
        let in_b = b.alloc(leaf(2));
        assert_eq!(in_a.index, in_b.index);
        assert!(b.get(in_a).is_none());
        assert!(b.free(in_a).is_none());
        assert_eq!(b.live(), 1);

        let copy = a.clone();
        assert_eq!(copy.leaf(in_a).value, Some(1));
    }

    #[test]
    fn test_free_all_except() {
        let mut arena = NodeArena::new();
        let ids: Vec<_> = (0..6).map(|k| arena.alloc(leaf(k))).collect();
        arena.free(ids[5]);
        arena.free_all_except(&[ids[0], ids[3]]);
        assert_eq!(arena.live(), 2);
        assert_eq!(arena.leaf(ids[0]).value, Some(0));
        assert_eq!(arena.leaf(ids[3]).value, Some(3));
        for &id in &[ids[1], ids[2], ids[4], ids[5]] {
            assert!(arena.get(id).is_none());
        }

        let fresh: Vec<_> = (0..4).map(|k| arena.alloc(leaf(10 + k))).collect();
        for &old in &[ids[1], ids[2], ids[4]] {
            assert!(arena.get(old).is_none());
            assert!(!fresh.contains(&old));
        }
        assert_eq!(arena.live(), 6);
    }

    #[test]
    fn test_branch_children() {
        let mut arena: NodeArena<u32, u32, u32> = NodeArena::new();
        let a = arena.alloc(leaf(1));
        let b = arena.alloc(leaf(2));
        let mut branch = Branch::new();
        branch.set_children(&[a, b]);
        assert_eq!(branch.children(), &[a, b]);
        assert_eq!(branch.len(), 2);
        assert_eq!(branch.first(), a);
        assert_eq!(branch.last(), b);
        assert_eq!(branch.position(b), Some(1));
        assert_eq!(branch.position(NodeId::DANGLING), None);
    }
}
