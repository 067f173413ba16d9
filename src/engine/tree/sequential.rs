/*
 * Created on Sun Jan 22 2023
 *
 * This file is a part of Skytable
 * Skytable (formerly known as TerrabaseDB or Skybase) is a free and open-source
 * NoSQL database written by Sayan Nandan ("the Author") with the
 * vision to provide flexibility in data modelling without compromising
 * on performance, queryability or scalability.
 *
 * Copyright (c) 2023, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! The single-producer rooted tree (§4.D). A thin wrapper over a
//! [`SeqVmVec`] of [`SeqNode`]s: slot 0 is the sentinel (all-invalid hook,
//! never a payload), slot 1 becomes the root on the first `parent =
//! NodeId::INVALID` insert, and every later insert links the new slot as the
//! head of its parent's reverse-insertion sibling list.

use crate::engine::{
    config::VmConfig,
    error::{self, PreconditionViolation, VmResult},
    hook::{Hook, SeqHook},
    id::NodeId,
    mem::SeqVmVec,
    node::SeqNode,
    ops,
    tree::{HookedStore, HookedStoreMut},
};

pub struct SeqTree<T> {
    nodes: SeqVmVec<SeqNode<T>>,
}

impl<T> SeqTree<T> {
    /// Design constant from §4.D.
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> VmResult<Self> {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> VmResult<Self> {
        Self::with_capacity_and_config(capacity, VmConfig::default())
    }

    /// Construct with an explicit [`VmConfig`] in place of the crate-wide
    /// default chunk size (§10.C).
    pub fn with_capacity_and_config(capacity: usize, config: VmConfig) -> VmResult<Self> {
        let nodes = SeqVmVec::with_config(capacity.max(1), config)?;
        // slot 0: the sentinel. All-invalid hook, no payload — `has_payload`
        // stays false via `Default`, so `Node`'s `Drop` never touches it.
        nodes.emplace_back(SeqNode::default())?;
        log::debug!(
            "sequential tree constructed with capacity {capacity} (chunk_bytes={})",
            config.chunk_bytes
        );
        Ok(Self { nodes })
    }

    /// Construct a tree and emplace its root in one step.
    pub fn with_root(payload: T) -> VmResult<Self> {
        Self::with_root_capacity(payload, Self::DEFAULT_CAPACITY)
    }

    pub fn with_root_capacity(payload: T, capacity: usize) -> VmResult<Self> {
        let mut tree = Self::with_capacity(capacity)?;
        tree.insert(NodeId::INVALID, payload)?;
        Ok(tree)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        // only the sentinel: no root yet
        self.nodes.len() <= 1
    }

    /// Append a new slot under `parent` and link it as the head of
    /// `parent`'s sibling list (§4.D).
    pub fn insert(&mut self, parent: NodeId, payload: T) -> VmResult<NodeId> {
        if !parent.is_valid() {
            error::precondition(self.root() == NodeId::INVALID, PreconditionViolation::SecondRoot);
        }
        let parent_tail = self.hook_tail(parent);
        error::precondition(
            self.hook_fan(parent) < SeqHook::MAX_FAN,
            PreconditionViolation::FanOverflow,
        );
        let node = SeqNode::new(payload, SeqHook::default());
        node.hook.set_up(parent);
        node.hook.set_prev(parent_tail);
        let id = NodeId::from(self.nodes.len());
        self.nodes.emplace_back(node)?;
        let parent_node = &self.nodes[parent.idx()];
        parent_node.hook.set_tail(id);
        parent_node.hook.incr_fan();
        Ok(id)
    }

    pub fn emplace<F: FnOnce() -> T>(&mut self, parent: NodeId, f: F) -> VmResult<NodeId> {
        self.insert(parent, f())
    }

    /// Replace this tree's store with `make_sub(max_depth, root)` (§4.G).
    pub fn sub(&mut self, max_depth: u32, root: NodeId) -> VmResult<()>
    where
        T: Clone,
    {
        let new = ops::make_sub_seq(self, root, max_depth)?;
        self.nodes = new.nodes;
        Ok(())
    }

    /// `sub(unbounded, node)` (§4.G).
    pub fn reroot(&mut self, node: NodeId) -> VmResult<()>
    where
        T: Clone,
    {
        self.sub(0, node)
    }

    /// A new tree whose root's children are exactly the direct children of
    /// the current root (§4.G). Two BFS levels: the root itself, then its
    /// direct children.
    pub fn flatten(&mut self) -> VmResult<()>
    where
        T: Clone,
    {
        let root = self.root();
        self.sub(2, root)
    }
}

impl<T> HookedStore<T> for SeqTree<T> {
    #[inline]
    fn size(&self) -> usize {
        self.nodes.len()
    }
    #[inline]
    fn hook_up(&self, id: NodeId) -> NodeId {
        self.nodes[id.idx()].hook.up()
    }
    #[inline]
    fn hook_prev(&self, id: NodeId) -> NodeId {
        self.nodes[id.idx()].hook.prev()
    }
    #[inline]
    fn hook_tail(&self, id: NodeId) -> NodeId {
        self.nodes[id.idx()].hook.tail()
    }
    #[inline]
    fn hook_fan(&self, id: NodeId) -> i32 {
        self.nodes[id.idx()].hook.fan()
    }
    #[inline]
    fn payload(&self, id: NodeId) -> &T {
        // UNSAFE(@ohsayan): every non-sentinel slot in a sequential tree is
        // fully constructed by the time its id is observable (no
        // allocate-then-construct gap, unlike the concurrent variant)
        unsafe { self.nodes[id.idx()].payload() }
    }
}

impl<T> HookedStoreMut<T> for SeqTree<T> {
    #[inline]
    fn payload_mut(&self, id: NodeId) -> &mut T {
        // UNSAFE(@ohsayan): exclusivity is the caller's responsibility,
        // upheld by the `&mut SeqTree` consumed to construct an exclusive
        // cursor (see `crate::engine::cursor`)
        unsafe { self.nodes[id.idx()].payload_mut() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cursor;

    #[test]
    fn root_then_children_contiguous() {
        let mut t = SeqTree::with_root("root").unwrap();
        assert_eq!(t.root(), NodeId::ROOT);
        let c1 = t.insert(NodeId::ROOT, "c1").unwrap();
        let c2 = t.insert(NodeId::ROOT, "c2").unwrap();
        assert_eq!(c1, NodeId::new(2));
        assert_eq!(c2, NodeId::new(3));
        assert_eq!(t.hook_fan(NodeId::ROOT), 2);
        assert_eq!(t.hook_tail(NodeId::ROOT), c2);
        assert_eq!(t.hook_prev(c2), c1);
    }

    #[test]
    #[should_panic]
    fn second_root_is_rejected_in_debug() {
        let mut t = SeqTree::with_root("root").unwrap();
        t.insert(NodeId::INVALID, "oops").unwrap();
    }

    #[test]
    fn linear_chain_scenario() {
        // §8 scenario 1
        let mut t = SeqTree::with_root(1).unwrap();
        let n2 = t.insert(NodeId::ROOT, 2).unwrap();
        let n3 = t.insert(n2, 3).unwrap();
        let n4 = t.insert(n3, 4).unwrap();
        let _n5 = t.insert(n4, 5).unwrap();
        let (height, width) = ops::height(&t, NodeId::ROOT);
        assert_eq!(height, 5);
        assert_eq!(width, 1);
        let dfs: Vec<i32> = cursor::DepthFirst::new(&t, NodeId::ROOT)
            .map(|id| *t.payload(id))
            .collect();
        assert_eq!(dfs, vec![1, 2, 3, 4, 5]);
        let leaves: Vec<i32> = cursor::LeafOnly::new(&t, NodeId::ROOT)
            .map(|id| *t.payload(id))
            .collect();
        assert_eq!(leaves, vec![5]);
        let internal: Vec<i32> = cursor::InternalOnly::new(&t, NodeId::ROOT)
            .map(|id| *t.payload(id))
            .collect();
        assert_eq!(internal, vec![1, 2, 3, 4]);
    }

    #[test]
    fn star_scenario() {
        // §8 scenario 2
        let mut t = SeqTree::with_root(1).unwrap();
        for v in 2..=6 {
            t.insert(NodeId::ROOT, v).unwrap();
        }
        let (height, width) = ops::height(&t, NodeId::ROOT);
        assert_eq!(height, 2);
        assert_eq!(width, 5);
        assert_eq!(t.hook_fan(NodeId::ROOT), 5);
        let down: Vec<i32> = cursor::Down::new(&t, NodeId::ROOT)
            .map(|id| *t.payload(id))
            .collect();
        assert_eq!(down, vec![6, 5, 4, 3, 2]);
        let leaves: Vec<i32> = cursor::LeafOnly::new(&t, NodeId::ROOT)
            .map(|id| *t.payload(id))
            .collect();
        assert_eq!(leaves, vec![6, 5, 4, 3, 2]);
        let internal: Vec<i32> = cursor::InternalOnly::new(&t, NodeId::ROOT)
            .map(|id| *t.payload(id))
            .collect();
        assert_eq!(internal, vec![1]);
    }

    #[test]
    fn textual_example_replay() {
        // §8 scenario 3
        let mut t = SeqTree::with_root(1).unwrap();
        let mut ids = vec![NodeId::INVALID, NodeId::ROOT]; // index by payload value
        let pairs = [
            (1, 2),
            (1, 3),
            (1, 4),
            (2, 5),
            (2, 6),
            (3, 7),
            (4, 8),
            (1, 9),
            (4, 10),
            (2, 11),
            (2, 12),
            (12, 13),
        ];
        for (parent_v, child_v) in pairs {
            let parent_id = ids[parent_v];
            let id = t.insert(parent_id, child_v).unwrap();
            ids.push(id);
            debug_assert_eq!(ids.len() - 1, child_v);
        }
        let (height, _) = ops::height(&t, NodeId::ROOT);
        assert_eq!(height, 4);
        let down_from_1: Vec<usize> = cursor::Down::new(&t, NodeId::ROOT)
            .map(|id| *t.payload(id))
            .collect();
        assert_eq!(down_from_1, vec![9, 4, 3, 2]);
        let down_from_2: Vec<usize> = cursor::Down::new(&t, ids[2])
            .map(|id| *t.payload(id))
            .collect();
        assert_eq!(down_from_2, vec![12, 11, 6, 5]);
    }

    #[test]
    fn capacity_exhaustion_scenario() {
        // §8 scenario 6
        let mut t: SeqTree<u8> = SeqTree::with_root_capacity(0, 1024).unwrap();
        for i in 1..1023u16 {
            t.insert(NodeId::ROOT, i as u8).unwrap();
        }
        assert_eq!(t.len(), 1024);
        assert_eq!(
            t.insert(NodeId::ROOT, 0).unwrap_err(),
            crate::engine::error::VmError::CapacityExhausted
        );
        assert_eq!(t.len(), 1024);
    }

    #[test]
    fn with_capacity_and_config_honors_chunk_bytes() {
        let mut t: SeqTree<u8> =
            SeqTree::with_capacity_and_config(64, VmConfig::new(1 << 16)).unwrap();
        t.insert(NodeId::INVALID, 1).unwrap();
        let c = t.insert(NodeId::ROOT, 2).unwrap();
        assert_eq!(*t.payload(c), 2);
    }

    #[test]
    fn reroot_preserves_subtree() {
        // §8 scenario 5
        let mut t = SeqTree::with_root(1).unwrap();
        let n2 = t.insert(NodeId::ROOT, 2).unwrap();
        let n3 = t.insert(NodeId::ROOT, 3).unwrap();
        let n4 = t.insert(n2, 4).unwrap();
        let _n5 = t.insert(n2, 5).unwrap();
        let _n6 = t.insert(n3, 6).unwrap();
        let before: std::collections::HashSet<i32> = cursor::DepthFirst::new(&t, n2)
            .map(|id| *t.payload(id))
            .collect();
        t.reroot(n2).unwrap();
        assert_eq!(*t.payload(t.root()), 2);
        let after: std::collections::HashSet<i32> = cursor::DepthFirst::new(&t, t.root())
            .map(|id| *t.payload(id))
            .collect();
        assert_eq!(before, after);
        assert_eq!(t.len(), 4); // sentinel + {2,4,5}
        let _ = n4;
    }

    #[test]
    fn flatten_keeps_only_direct_children() {
        let mut t = SeqTree::with_root(1).unwrap();
        let n2 = t.insert(NodeId::ROOT, 2).unwrap();
        t.insert(NodeId::ROOT, 3).unwrap();
        t.insert(n2, 4).unwrap();
        t.flatten().unwrap();
        assert_eq!(t.len(), 3); // sentinel + root + {2,3}
        let children: Vec<i32> = cursor::Down::new(&t, t.root())
            .map(|id| *t.payload(id))
            .collect();
        let mut children = children;
        children.sort_unstable();
        assert_eq!(children, vec![2, 3]);
    }
}
