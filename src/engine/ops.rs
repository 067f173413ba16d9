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

//! Structural operators (§4.G): height/width, early-terminating BFS
//! `apply`, and the BFS-with-index-table `make_sub` formulation that
//! `sub`/`reroot`/`flatten` on each tree variant build on (§9 "open
//! questions": this BFS-with-index-table formulation is the one this crate
//! takes as authoritative among the source's divergent variants).
//!
//! Levels are counted the same way throughout this module and in
//! [`crate::engine::cursor::BreadthFirst`]: the root occupies level 1, so a
//! `max_depth` of 2 reaches the root's direct children and no further.

use crate::engine::{
    error::VmResult,
    id::NodeId,
    tree::{HookedStore, SeqTree},
};

/// BFS from `root`; returns `(levels, max_level_width)`. `0, 0` if `root` is
/// invalid (no tree rooted there).
pub fn height<T>(store: &impl HookedStore<T>, root: NodeId) -> (u32, usize) {
    if !root.is_valid() {
        return (0, 0);
    }
    let mut frontier = vec![root];
    let mut levels = 0u32;
    let mut max_width = 0usize;
    while !frontier.is_empty() {
        levels += 1;
        max_width = max_width.max(frontier.len());
        frontier = next_level(store, &frontier);
    }
    (levels, max_width)
}

/// BFS from `root`, stopping as soon as `pred` returns `true` for some node;
/// returns that node, or [`NodeId::INVALID`] if the frontier is exhausted or
/// `max_depth` (levels, 0 = unbounded) is reached first.
pub fn apply<T>(
    store: &impl HookedStore<T>,
    root: NodeId,
    max_depth: u32,
    mut pred: impl FnMut(NodeId) -> bool,
) -> NodeId {
    if !root.is_valid() {
        return NodeId::INVALID;
    }
    let mut frontier = vec![root];
    let mut level = 1u32;
    loop {
        if frontier.is_empty() {
            return NodeId::INVALID;
        }
        for &id in &frontier {
            if pred(id) {
                return id;
            }
        }
        if max_depth != 0 && level >= max_depth {
            return NodeId::INVALID;
        }
        frontier = next_level(store, &frontier);
        level += 1;
    }
}

/// Nodes reachable from `root` in BFS order, bounded to `max_depth` levels
/// (0 = unbounded). `root` itself is level 1.
fn bfs_order<T>(store: &impl HookedStore<T>, root: NodeId, max_depth: u32) -> Vec<NodeId> {
    let mut order = Vec::new();
    if !root.is_valid() {
        return order;
    }
    let mut frontier = vec![root];
    let mut level = 1u32;
    loop {
        if frontier.is_empty() {
            break;
        }
        order.extend_from_slice(&frontier);
        if max_depth != 0 && level >= max_depth {
            break;
        }
        frontier = next_level(store, &frontier);
        level += 1;
    }
    order
}

fn next_level<T>(store: &impl HookedStore<T>, frontier: &[NodeId]) -> Vec<NodeId> {
    let mut next = Vec::new();
    for &id in frontier {
        let mut c = store.hook_tail(id);
        while c.is_valid() {
            next.push(c);
            c = store.hook_prev(c);
        }
    }
    next
}

/// `make_sub(max_depth, root)` (§4.G): a fresh sequential tree containing
/// exactly the nodes `bfs_order` reaches, re-numbered densely from 1 in that
/// same BFS order. The mapping table is sized `store.size()`, as specified.
pub fn make_sub_seq<T: Clone>(
    store: &impl HookedStore<T>,
    root: NodeId,
    max_depth: u32,
) -> VmResult<SeqTree<T>> {
    let order = bfs_order(store, root, max_depth);
    let mut sub = SeqTree::with_capacity((order.len() + 1).max(SeqTree::<T>::DEFAULT_CAPACITY))?;
    if order.is_empty() {
        return Ok(sub);
    }
    let mut map = vec![NodeId::INVALID; store.size()];
    for &src_id in &order {
        let parent_new = if src_id == root {
            NodeId::INVALID
        } else {
            map[store.hook_up(src_id).idx()]
        };
        let new_id = sub.insert(parent_new, store.payload(src_id).clone())?;
        map[src_id.idx()] = new_id;
    }
    Ok(sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::id::NodeId;

    #[test]
    fn height_single_node() {
        let t = SeqTree::with_root(1).unwrap();
        assert_eq!(height(&t, NodeId::ROOT), (1, 1));
    }

    #[test]
    fn height_empty_tree_is_zero() {
        let t: SeqTree<i32> = SeqTree::new().unwrap();
        assert_eq!(height(&t, t.root()), (0, 0));
    }

    #[test]
    fn apply_finds_matching_node() {
        let mut t = SeqTree::with_root(1).unwrap();
        let n2 = t.insert(NodeId::ROOT, 2).unwrap();
        t.insert(n2, 3).unwrap();
        let found = apply(&t, NodeId::ROOT, 0, |id| *t.payload(id) == 3);
        assert_eq!(*t.payload(found), 3);
    }

    #[test]
    fn apply_respects_depth_bound() {
        let mut t = SeqTree::with_root(1).unwrap();
        let n2 = t.insert(NodeId::ROOT, 2).unwrap();
        t.insert(n2, 3).unwrap();
        // max_depth=1: only the root level is visited
        let found = apply(&t, NodeId::ROOT, 1, |id| *t.payload(id) == 3);
        assert_eq!(found, NodeId::INVALID);
    }

    #[test]
    fn make_sub_renumbers_densely_from_root() {
        let mut t = SeqTree::with_root(1).unwrap();
        let n2 = t.insert(NodeId::ROOT, 2).unwrap();
        t.insert(NodeId::ROOT, 3).unwrap();
        t.insert(n2, 4).unwrap();
        let sub = make_sub_seq(&t, n2, 0).unwrap();
        assert_eq!(sub.len(), 3); // sentinel + {2,4}
        assert_eq!(*sub.payload(sub.root()), 2);
    }
}
