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

//! Thread-local bump regions (§5, §9).
//!
//! The source keeps a process-wide map of `(vector instance, thread id) ->
//! region`, with a freelist that recycles region-collections on vector
//! destruction. `thread_local!` storage gives us the per-thread dimension
//! natively; we only need the vector dimension as an inner key. We key that
//! inner map by a monotonic [`VecId`] (see [`crate::engine::registry`])
//! rather than the vector's address, so a destroyed-and-reused allocation at
//! the same address can never be confused with a stale bump region left
//! behind in some other thread's table.

use std::{cell::RefCell, collections::HashMap};

/// A contiguous run of slot indices reserved from a vector for the
/// exclusive use of the current thread.
#[derive(Clone, Copy, Default)]
struct Region {
    next: usize,
    end: usize,
}

thread_local! {
    static TABLE: RefCell<HashMap<u64, Region>> = RefCell::new(HashMap::new());
}

/// Take the next slot index for `vec_id`, refilling this thread's region via
/// `grow` when exhausted.
///
/// `grow(run_len)` must reserve (bumping the vector's monotonic `size` and
/// extending commitment as needed) and return the first index of an actual
/// run of length `<= run_len` (shorter only when the vector's logical
/// capacity is nearly exhausted), or an error if none remains.
pub fn next_slot<E>(
    vec_id: u64,
    run_len: usize,
    grow: impl FnOnce(usize) -> Result<(usize, usize), E>,
) -> Result<usize, E> {
    TABLE.with(|t| {
        let mut table = t.borrow_mut();
        let region = table.entry(vec_id).or_default();
        if region.next == region.end {
            let (start, actual_len) = grow(run_len)?;
            region.next = start;
            region.end = start + actual_len;
        }
        let id = region.next;
        region.next += 1;
        Ok(id)
    })
}

/// Drop this thread's cached region for `vec_id`. Any unused indices in the
/// region are simply abandoned (the vector's `size` already accounts for
/// them as allocated slots); this only matters for tests that run many
/// short-lived vectors on the same thread and want a clean slate.
#[cfg(test)]
pub fn forget(vec_id: u64) {
    TABLE.with(|t| {
        t.borrow_mut().remove(&vec_id);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refills_on_exhaustion() {
        forget(1);
        let mut grows = 0;
        let mut size = 0usize;
        for i in 0..10 {
            let id = next_slot::<()>(1, 4, |run| {
                grows += 1;
                let start = size;
                size += run;
                Ok((start, run))
            })
            .unwrap();
            assert_eq!(id, i);
        }
        // 10 slots at run_len=4 => 3 refills (runs 0..4, 4..8, 8..12)
        assert_eq!(grows, 3);
    }

    #[test]
    fn separate_vectors_do_not_share_regions() {
        forget(10);
        forget(11);
        let a = next_slot::<()>(10, 4, |run| Ok((0, run))).unwrap();
        let b = next_slot::<()>(11, 4, |run| Ok((1000, run))).unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 1000);
    }
}
