/*
 * Created on Mon Jul 26 2021
 *
 * This file is a part of Skytable
 * Skytable (formerly known as TerrabaseDB or Skybase) is a free and open-source
 * NoSQL database written by Sayan Nandan ("the Author") with the
 * vision to provide flexibility in data modelling without compromising
 * on performance, queryability or scalability.
 *
 * Copyright (c) 2021, Sayan Nandan <ohsayan@outlook.com>
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

//! # Process-wide registry
//!
//! Two small pieces of global state: a monotonic counter minting opaque
//! [`VecId`]s for every concurrent VM-backed vector (used to key the
//! thread-local bump-region table in [`crate::engine::mem::bump`] without
//! pointer-reuse hazards), and a poison switch for the rare case where an
//! insertion is interrupted mid-construction (§7, §9 "Failure during
//! construction").

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

const ORD_ACQ: Ordering = Ordering::Acquire;
const ORD_REL: Ordering = Ordering::Release;

static NEXT_VEC_ID: AtomicU64 = AtomicU64::new(1);

/// Mint a fresh id for a new concurrent vector instance. Never reused.
pub fn next_vec_id() -> u64 {
    NEXT_VEC_ID.fetch_add(1, Ordering::Relaxed)
}

/// Per-tree poison flag. A concurrent tree whose payload constructor panics
/// mid-insert can no longer guarantee I1-I5; rather than attempt unwind-safe
/// rollback, the tree is poisoned and every subsequent operation refuses to
/// run.
#[derive(Debug, Default)]
pub struct Poison(AtomicBool);

impl Poison {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[inline(always)]
    pub fn is_poisoned(&self) -> bool {
        self.0.load(ORD_ACQ)
    }

    #[inline(always)]
    pub fn poison(&self) {
        self.0.store(true, ORD_REL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_ids_are_monotonic_and_unique() {
        let a = next_vec_id();
        let b = next_vec_id();
        assert!(b > a);
    }

    #[test]
    fn poison_flag() {
        let p = Poison::new();
        assert!(!p.is_poisoned());
        p.poison();
        assert!(p.is_poisoned());
    }
}
