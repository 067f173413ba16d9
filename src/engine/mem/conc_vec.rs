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

//! The multi-producer flavor of the VM-backed append vector (§4.C, §5).
//!
//! Concurrent appenders never contend on a single atomic counter per slot:
//! each thread claims a contiguous run of [`super::BUMP_RUN_LEN`] indices at
//! once (via [`super::bump`]) and only the rare refill touches the shared
//! reservation counter; a separate counter tracks how many slots `alloc_one`
//! has actually handed out, since a thread's run can still hold unconsumed
//! slots at any given moment. Growth never moves an existing element, so `alloc_one`
//! takes `&self` and hands back a `&T` good for the vector's lifetime, same
//! as [`super::seq_vec::SeqVmVec`].
//!
//! A freshly committed page is guaranteed zero by every host this crate
//! targets. [`ZeroInit`] is the promise that a slot's all-zero bit pattern is
//! a valid, droppable `T` — which is exactly what a zero-filled
//! [`crate::engine::node::ConcNode`] is: `ConcHook::done = 0` and every
//! structural field equal to [`crate::engine::id::NodeId::INVALID`], which is
//! itself zero. This is what lets the vector commit pages in bulk without
//! running a constructor over each slot up front.

use {
    super::unsafe_apis,
    crate::engine::{
        error::VmError,
        registry,
        vm::{self, HostVm, VmSource},
    },
    core::{marker::PhantomData, mem, ptr::NonNull},
    parking_lot::Mutex,
    std::sync::atomic::{AtomicUsize, Ordering},
};

/// Marks a type whose all-zero bit pattern is a valid, safely droppable
/// value. Implemented only for node types whose structural fields are all
/// represented as zero in their unconstructed state (§4.B, I4).
///
/// # Safety
/// The implementor must guarantee that a `T` at an all-zero address is valid
/// for reads, and that running `T`'s destructor over such a value is sound
/// (typically because the destructor itself gates on a "constructed" flag
/// that is, itself, zero in the unconstructed state).
pub unsafe trait ZeroInit {}

pub struct ConcVmVec<T: ZeroInit, V: VmSource = HostVm> {
    id: u64,
    base: NonNull<T>,
    capacity: usize,
    reserved_bytes: usize,
    chunk_bytes: usize,
    committed_elems: super::CachePadded<AtomicUsize>,
    /// high-water mark of indices claimed by a bump run (`grow_run`); always
    /// `>= handed_out`, since a thread's region can hold slots it hasn't
    /// consumed via `alloc_one` yet
    reserved: super::CachePadded<AtomicUsize>,
    /// slots actually returned by `alloc_one`; this, not `reserved`, is what
    /// `size()` reports (§8's "size == 2 + N·K" invariant counts allocations,
    /// not bump-region padding)
    handed_out: super::CachePadded<AtomicUsize>,
    commit_lock: Mutex<()>,
    _vm: PhantomData<V>,
}

// SAFETY: every slot is either untouched host-zeroed memory or a fully
// published `T` (I4). Reads past `size` are never dereferenced as `T` by
// this type's own API; the host's VM reservation itself is a plain
// heap-backed address range with no thread affinity.
unsafe impl<T: ZeroInit + Send, V: VmSource> Sync for ConcVmVec<T, V> {}
unsafe impl<T: ZeroInit + Send, V: VmSource> Send for ConcVmVec<T, V> {}

impl<T: ZeroInit, V: VmSource> ConcVmVec<T, V> {
    pub fn with_chunk_bytes(capacity: usize, chunk_bytes: usize) -> Result<Self, VmError> {
        assert!(capacity > 0, "capacity must be nonzero");
        let elem_size = mem::size_of::<T>().max(1);
        let reserved_bytes = vm::round_up(capacity * elem_size, chunk_bytes.max(V::page_size()));
        let base = V::reserve(reserved_bytes)?.cast::<T>();
        Ok(Self {
            id: registry::next_vec_id(),
            base,
            capacity,
            reserved_bytes,
            chunk_bytes: chunk_bytes.max(V::page_size()),
            committed_elems: super::CachePadded::new(AtomicUsize::new(0)),
            reserved: super::CachePadded::new(AtomicUsize::new(0)),
            handed_out: super::CachePadded::new(AtomicUsize::new(0)),
            commit_lock: Mutex::new(()),
            _vm: PhantomData,
        })
    }

    pub fn new(capacity: usize) -> Result<Self, VmError> {
        Self::with_chunk_bytes(capacity, super::DEFAULT_CHUNK_BYTES)
    }

    /// Construct with an explicit [`VmConfig`](crate::engine::config::VmConfig)
    /// in place of the crate-wide default chunk size (§10.C).
    pub fn with_config(
        capacity: usize,
        config: crate::engine::config::VmConfig,
    ) -> Result<Self, VmError> {
        Self::with_chunk_bytes(capacity, config.chunk_bytes)
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots ever handed out by `alloc_one`. Monotonically
    /// non-decreasing; never shrinks (the concurrent variant has no
    /// `pop_back`, §4.C "Non-goals").
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.handed_out.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Claim the next slot for the calling thread and return its index and a
    /// reference to the (zero-filled, not-yet-published) `T` living there.
    ///
    /// The returned `T` is exactly the host's zero page until the caller
    /// writes into it; callers that embed a "done" flag (as every node hook
    /// in this crate does) must publish it themselves before any other
    /// thread is allowed to treat the slot as initialized (I4).
    pub fn alloc_one(&self) -> Result<(usize, &T), VmError> {
        let idx = registry_bump_next(self)?;
        self.handed_out.fetch_add(1, Ordering::AcqRel);
        Ok((idx, unsafe {
            // UNSAFE(@ohsayan): `idx` was just returned by a successful grow,
            // which only ever hands out indices `< capacity` that are backed
            // by committed pages
            &*self.base.as_ptr().add(idx)
        }))
    }

    pub fn at(&self, idx: usize) -> Result<&T, VmError> {
        if idx >= self.size() {
            return Err(VmError::OutOfBounds);
        }
        Ok(unsafe {
            // UNSAFE(@ohsayan): `idx < size <= committed_elems`
            &*self.base.as_ptr().add(idx)
        })
    }

    /// Reserve a contiguous run of up to `run_len` slot indices, committing
    /// more pages as needed. Returns the first index and the actual run
    /// length, which is only shorter than requested when the vector's
    /// logical capacity is nearly exhausted.
    fn grow_run(&self, run_len: usize) -> Result<(usize, usize), VmError> {
        let remaining_before = self.capacity.saturating_sub(self.reserved.load(Ordering::Relaxed));
        if remaining_before == 0 {
            return Err(VmError::CapacityExhausted);
        }
        let want = run_len.min(remaining_before).max(1);
        let start = self.reserved.fetch_add(want, Ordering::AcqRel);
        // a racing thread may have pushed `reserved` past `capacity` between
        // our check and our fetch_add; clamp the run we actually hand out
        let actual_len = want.min(self.capacity.saturating_sub(start));
        if actual_len == 0 {
            return Err(VmError::CapacityExhausted);
        }
        self.ensure_committed(start + actual_len)?;
        Ok((start, actual_len))
    }

    /// Commit enough pages to back every index in `[0, upto)`. Serialized by
    /// `commit_lock` so concurrent refills never race on the same page.
    fn ensure_committed(&self, upto: usize) -> Result<(), VmError> {
        let elem_size = mem::size_of::<T>().max(1);
        if upto * elem_size <= self.committed_elems.load(Ordering::Acquire) * elem_size {
            return Ok(());
        }
        let _guard = self.commit_lock.lock();
        let mut committed = self.committed_elems.load(Ordering::Acquire);
        if upto <= committed {
            return Ok(());
        }
        let chunk_elems = (self.chunk_bytes / elem_size).max(1);
        while committed < upto {
            let want_elems = chunk_elems.min(self.capacity - committed);
            let offset_bytes = committed * elem_size;
            let commit_bytes = vm::round_up(want_elems * elem_size, V::page_size())
                .min(self.reserved_bytes - offset_bytes);
            unsafe {
                // UNSAFE(@ohsayan): `base` is a live reservation at least
                // `reserved_bytes` long, and `offset_bytes + commit_bytes` is
                // bounded above by that same `reserved_bytes`
                V::commit(self.base.cast::<u8>(), offset_bytes, commit_bytes)?;
            }
            committed += want_elems;
            self.committed_elems.store(committed, Ordering::Release);
        }
        Ok(())
    }
}

/// Bridges the thread-local bump table (keyed by opaque [`registry::next_vec_id`]
/// ids, not by address) to this vector's own `grow_run`.
fn registry_bump_next<T: ZeroInit, V: VmSource>(v: &ConcVmVec<T, V>) -> Result<usize, VmError> {
    super::bump::next_slot(v.id, super::BUMP_RUN_LEN, |run_len| v.grow_run(run_len))
}

impl<T: ZeroInit, V: VmSource> Drop for ConcVmVec<T, V> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            let committed = self.committed_elems.load(Ordering::Acquire);
            unsafe {
                // UNSAFE(@ohsayan): `[0, committed)` is backed memory holding
                // valid `T`s by `ZeroInit`'s contract, whether or not each one
                // was ever published; each `T`'s own `Drop` (for the node
                // types this vector stores) is a no-op over an unpublished
                // slot
                unsafe_apis::drop_slice_in_place(self.base.as_ptr(), committed);
            }
        }
        unsafe {
            // UNSAFE(@ohsayan): `base`/`reserved_bytes` match the live
            // reservation from construction, and `&mut self` means nothing
            // else can be referencing it
            V::release(self.base.cast::<u8>(), self.reserved_bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::engine::vm::HostVm,
        std::{sync::Arc, thread},
    };

    unsafe impl ZeroInit for u64 {}

    #[test]
    fn single_thread_alloc_and_read() {
        let v: ConcVmVec<u64, HostVm> = ConcVmVec::new(1024).unwrap();
        for _ in 0..100 {
            v.alloc_one().unwrap();
        }
        assert_eq!(v.size(), 100);
        for i in 0..100 {
            assert_eq!(*v.at(i).unwrap(), 0);
        }
    }

    #[test]
    fn concurrent_growth_hands_out_unique_indices() {
        let v = Arc::new(ConcVmVec::<u64, HostVm>::new(1 << 16).unwrap());
        let mut handles = vec![];
        for _ in 0..8 {
            let v = v.clone();
            handles.push(thread::spawn(move || {
                let mut idxs = Vec::with_capacity(1000);
                for _ in 0..1000 {
                    idxs.push(v.alloc_one().unwrap().0);
                }
                idxs
            }));
        }
        let mut all = Vec::new();
        for h in handles {
            all.extend(h.join().unwrap());
        }
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 8000);
        assert_eq!(v.size(), 8000);
    }

    #[test]
    fn capacity_exhaustion_is_reported() {
        let v: ConcVmVec<u64, HostVm> = ConcVmVec::new(4).unwrap();
        for _ in 0..4 {
            v.alloc_one().unwrap();
        }
        assert_eq!(v.alloc_one().unwrap_err(), VmError::CapacityExhausted);
    }

    #[test]
    fn out_of_bounds_access() {
        let v: ConcVmVec<u64, HostVm> = ConcVmVec::new(8).unwrap();
        v.alloc_one().unwrap();
        assert_eq!(v.at(5).unwrap_err(), VmError::OutOfBounds);
    }
}
