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

//! A node is the composition of a user payload with a structural [`Hook`].
//!
//! The payload is stored behind a cell so that both variants expose the
//! same `&self` surface: the sequential tree never needs it (a node is
//! always fully constructed before it becomes reachable), while the
//! concurrent tree relies on it to let a writer populate a freshly
//! zero-filled slot before any other thread is allowed to observe it
//! (I4, "constructed flag").

use {
    crate::engine::hook::{ConcHook, Hook, PayloadGate, SeqHook},
    core::{cell::UnsafeCell, mem::MaybeUninit},
};

pub struct Node<T, H: PayloadGate> {
    payload: UnsafeCell<MaybeUninit<T>>,
    pub hook: H,
}

impl<T, H: Hook + PayloadGate> Default for Node<T, H> {
    fn default() -> Self {
        Self {
            payload: UnsafeCell::new(MaybeUninit::uninit()),
            hook: H::default(),
        }
    }
}

impl<T, H: PayloadGate> Node<T, H> {
    /// Construct a fully-initialized node directly (used by the sequential
    /// tree, where there is no allocate-then-construct gap).
    pub fn new(payload: T, hook: H) -> Self {
        hook.mark_has_payload();
        Self {
            payload: UnsafeCell::new(MaybeUninit::new(payload)),
            hook,
        }
    }
}

impl<T, H: PayloadGate> Node<T, H> {
    /// Write `payload` into this (assumed uninitialized or previously
    /// retired) slot.
    ///
    /// # Safety
    /// The caller must ensure no other reference to the payload is alive and
    /// that the slot is not currently considered initialized.
    pub unsafe fn write_payload(&self, payload: T) {
        (*self.payload.get()).write(payload);
    }

    /// # Safety
    /// The caller must ensure the payload has been written (directly via
    /// [`Self::new`] or [`Self::write_payload`], or — for the concurrent
    /// variant — by observing the hook's `done` flag set).
    pub unsafe fn payload(&self) -> &T {
        (*self.payload.get()).assume_init_ref()
    }

    /// # Safety
    /// Same as [`Self::payload`], plus exclusive access to this node.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn payload_mut(&self) -> &mut T {
        (*self.payload.get()).assume_init_mut()
    }

    /// Drop the payload in place.
    ///
    /// # Safety
    /// Must only be called once per initialized slot (sentinel slots, and
    /// concurrent slots that never reached `done = 1`, must not be dropped
    /// this way).
    pub unsafe fn drop_payload(&mut self) {
        core::ptr::drop_in_place((*self.payload.get()).as_mut_ptr());
    }
}

impl<T, H: PayloadGate> Drop for Node<T, H> {
    fn drop(&mut self) {
        if core::mem::needs_drop::<T>() && self.hook.has_payload() {
            // UNSAFE(@ohsayan): `has_payload` is only ever true for a slot
            // that was fully constructed (via `Node::new`, or via
            // `write_payload` followed by `ConcHook::publish`), and this is
            // the one and only place a node's payload is ever dropped
            unsafe { self.drop_payload() };
        }
    }
}

pub type SeqNode<T> = Node<T, SeqHook>;
pub type ConcNode<T> = Node<T, ConcHook>;

// SAFETY: a `ConcNode<T>` is shared across producer/reader threads. Access to
// the payload is gated by `ConcHook::done`, published with `Release` and
// observed with `Acquire` (I4); access to the structural fields goes through
// `ConcHook`'s own atomics. This establishes the happens-before edge required
// for `T: Send` data to cross threads without `T: Sync`.
unsafe impl<T: Send> Sync for ConcNode<T> {}

// SAFETY: a zero-filled `ConcNode<T>` has `hook.done = 0` (unpublished) and
// every structural field equal to `NodeId::INVALID` (also zero); its `Drop`
// impl checks `has_payload()` before touching `T`, so dropping such a value
// is a no-op.
unsafe impl<T> crate::engine::mem::ZeroInit for ConcNode<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::id::NodeId;

    #[test]
    fn seq_node_new_and_read() {
        let node = SeqNode::new(42u32, SeqHook::default());
        node.hook.set_up(NodeId::new(1));
        assert_eq!(unsafe { *node.payload() }, 42);
        assert_eq!(node.hook.up(), NodeId::new(1));
    }

    #[test]
    fn conc_node_default_then_publish() {
        let node = ConcNode::<u32>::default();
        assert!(!node.hook.is_done());
        unsafe { node.write_payload(7) };
        node.hook.publish();
        assert!(node.hook.is_done());
        assert_eq!(unsafe { *node.payload() }, 7);
    }
}
