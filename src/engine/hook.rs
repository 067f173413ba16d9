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

//! Per-node structural fields ("hooks"), in the sequential and concurrent
//! flavors described by §4.B. The hook is composed alongside the user
//! payload rather than embedded via inheritance: a node is a
//! `(payload, hook)` pair selected at the type level by the tree variant.

use {
    crate::engine::{id::NodeId, sync::spinlock::SpinLock},
    core::{
        cell::Cell,
        sync::atomic::{AtomicI16, AtomicI32, AtomicU8, Ordering},
    },
};

/// Structural accessors shared by the sequential and concurrent hooks.
///
/// Every method takes `&self`: the sequential hook achieves this with
/// `Cell`-based interior mutability (free, single-threaded), and the
/// concurrent hook with atomics. This lets the cursor family (§4.F) be
/// written once, generic over `H: Hook`, instead of duplicated per variant.
pub trait Hook: Default {
    /// upper bound on `fan` for this hook width (I5)
    const MAX_FAN: i32;

    fn up(&self) -> NodeId;
    fn set_up(&self, id: NodeId);
    fn prev(&self) -> NodeId;
    fn set_prev(&self, id: NodeId);
    fn tail(&self) -> NodeId;
    fn set_tail(&self, id: NodeId);
    fn fan(&self) -> i32;
    /// Increment `fan` by one. Precondition: caller already serialized
    /// writers of this node acting as a parent (trivial for the sequential
    /// hook; the parent's spin lock for the concurrent hook).
    fn incr_fan(&self);
}

/// Distinguishes a hook whose node has a live payload from a freshly
/// zero-filled or default-constructed one. Used only by [`super::node::Node`]'s
/// `Drop` impl, which must never run a destructor over an uninitialized
/// [`core::mem::MaybeUninit`] (most notably the sentinel, slot 0, which is
/// never given a payload at all).
pub trait PayloadGate {
    fn has_payload(&self) -> bool;
    fn mark_has_payload(&self);
}

/// Sequential hook: 16 bytes, no atomics, no lock.
#[derive(Default)]
pub struct SeqHook {
    up: Cell<NodeId>,
    prev: Cell<NodeId>,
    tail: Cell<NodeId>,
    fan: Cell<i32>,
    has_payload: Cell<bool>,
}

impl PayloadGate for SeqHook {
    #[inline(always)]
    fn has_payload(&self) -> bool {
        self.has_payload.get()
    }
    #[inline(always)]
    fn mark_has_payload(&self) {
        self.has_payload.set(true);
    }
}

impl Hook for SeqHook {
    const MAX_FAN: i32 = i32::MAX;

    #[inline(always)]
    fn up(&self) -> NodeId {
        self.up.get()
    }
    #[inline(always)]
    fn set_up(&self, id: NodeId) {
        self.up.set(id);
    }
    #[inline(always)]
    fn prev(&self) -> NodeId {
        self.prev.get()
    }
    #[inline(always)]
    fn set_prev(&self, id: NodeId) {
        self.prev.set(id);
    }
    #[inline(always)]
    fn tail(&self) -> NodeId {
        self.tail.get()
    }
    #[inline(always)]
    fn set_tail(&self, id: NodeId) {
        self.tail.set(id);
    }
    #[inline(always)]
    fn fan(&self) -> i32 {
        self.fan.get()
    }
    #[inline(always)]
    fn incr_fan(&self) {
        self.fan.set(self.fan.get() + 1);
    }
}

/// Concurrent hook: same four structural fields as [`SeqHook`] (with `fan`
/// narrowed to 16 bits, I5), plus a per-node [`SpinLock`] used only while
/// this node acts as a parent, and a `done` flag (I4) distinguishing a
/// freshly zero-filled (allocated-but-not-constructed) slot from one whose
/// payload and structural fields are fully visible.
#[derive(Default)]
pub struct ConcHook {
    up: AtomicI32,
    prev: AtomicI32,
    tail: AtomicI32,
    fan: AtomicI16,
    lock: SpinLock,
    done: AtomicU8,
}

impl Hook for ConcHook {
    const MAX_FAN: i32 = i16::MAX as i32;

    #[inline(always)]
    fn up(&self) -> NodeId {
        NodeId::new(self.up.load(Ordering::Acquire))
    }
    #[inline(always)]
    fn set_up(&self, id: NodeId) {
        self.up.store(id.get(), Ordering::Release);
    }
    #[inline(always)]
    fn prev(&self) -> NodeId {
        NodeId::new(self.prev.load(Ordering::Acquire))
    }
    #[inline(always)]
    fn set_prev(&self, id: NodeId) {
        self.prev.store(id.get(), Ordering::Release);
    }
    #[inline(always)]
    fn tail(&self) -> NodeId {
        NodeId::new(self.tail.load(Ordering::Acquire))
    }
    #[inline(always)]
    fn set_tail(&self, id: NodeId) {
        self.tail.store(id.get(), Ordering::Release);
    }
    #[inline(always)]
    fn fan(&self) -> i32 {
        self.fan.load(Ordering::Acquire) as i32
    }
    #[inline(always)]
    fn incr_fan(&self) {
        self.fan.fetch_add(1, Ordering::AcqRel);
    }
}

impl ConcHook {
    /// Acquire this node's per-parent publish lock (§4.E phase 2).
    #[inline(always)]
    pub fn lock_as_parent(&self) -> crate::engine::sync::spinlock::SpinGuard<'_> {
        self.lock.lock()
    }

    /// `true` iff the payload and the rest of this hook have been fully
    /// constructed and published (I4). Loaded with acquire ordering so that
    /// observing `true` implies observing the writer's prior releases.
    #[inline(always)]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire) == 1
    }

    /// Publish this slot: release-store `done = 1` after every other field
    /// has been written. Must be called exactly once, by the slot's writer.
    #[inline(always)]
    pub fn publish(&self) {
        self.done.store(1, Ordering::Release);
    }
}

impl PayloadGate for ConcHook {
    #[inline(always)]
    fn has_payload(&self) -> bool {
        self.is_done()
    }
    #[inline(always)]
    fn mark_has_payload(&self) {
        self.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_hook_roundtrip() {
        let h = SeqHook::default();
        h.set_up(NodeId::new(1));
        h.set_prev(NodeId::new(2));
        h.set_tail(NodeId::new(3));
        h.incr_fan();
        h.incr_fan();
        assert_eq!(h.up(), NodeId::new(1));
        assert_eq!(h.prev(), NodeId::new(2));
        assert_eq!(h.tail(), NodeId::new(3));
        assert_eq!(h.fan(), 2);
    }

    #[test]
    fn conc_hook_roundtrip_and_done_flag() {
        let h = ConcHook::default();
        assert!(!h.is_done());
        h.set_up(NodeId::new(7));
        h.set_prev(NodeId::INVALID);
        h.publish();
        assert!(h.is_done());
        assert_eq!(h.up(), NodeId::new(7));
    }

    #[test]
    fn conc_hook_fan_bound_matches_i16() {
        assert_eq!(ConcHook::MAX_FAN, i16::MAX as i32);
        assert_eq!(SeqHook::MAX_FAN, i32::MAX);
    }
}
