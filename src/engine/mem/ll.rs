/*
 * Created on Fri Sep 01 2023
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

//! Low-level padding primitive backing the hot atomics in
//! [`super::conc_vec`]: `committed_elems`, `reserved`, and `handed_out` each
//! sit on their own cache line so a refilling producer never bounces a line
//! another thread is merely reading `size()` from.

use core::ops::{Deref, DerefMut};

/// Pads `T` out to (an estimate of) one cache line, so two instances never
/// share a line and false-share under concurrent access.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(target_arch = "s390x", repr(align(256)))]
#[cfg_attr(
    any(
        target_arch = "aarch64",
        target_arch = "powerpc64",
        target_arch = "x86_64",
    ),
    repr(align(128))
)]
#[cfg_attr(
    any(
        target_arch = "arm",
        target_arch = "hexagon",
        target_arch = "mips",
        target_arch = "mips64",
        target_arch = "riscv32",
        target_arch = "riscv64",
        target_arch = "sparc"
    ),
    repr(align(32))
)]
#[cfg_attr(
    not(any(
        target_arch = "aarch64",
        target_arch = "arm",
        target_arch = "hexagon",
        target_arch = "m68k",
        target_arch = "mips",
        target_arch = "mips64",
        target_arch = "powerpc64",
        target_arch = "riscv32",
        target_arch = "riscv64",
        target_arch = "s390x",
        target_arch = "sparc",
        target_arch = "x86_64",
    )),
    repr(align(64))
)]
#[cfg_attr(target_arch = "m68k", repr(align(16)))]
pub struct CachePadded<T> {
    inner: T,
}

// cache line sizes per target family:
// - 256B: s390x
// - 128B: aarch64 (big.LITTLE splits can have mismatched line sizes across
//   cores, so this picks the larger), powerpc64, x86_64 (Sandy Bridge+)
// - 64B: default for everything else
// - 32B: arm, hexagon, mips(64), riscv32/64, sparc
// - 16B: m68k
impl<T> CachePadded<T> {
    pub const fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T> Deref for CachePadded<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> DerefMut for CachePadded<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::CachePadded;
    use core::mem::{align_of, size_of};

    #[test]
    fn pads_past_a_single_byte() {
        let p = CachePadded::new(1u8);
        assert!(size_of::<CachePadded<u8>>() >= align_of::<CachePadded<u8>>());
        assert_eq!(*p, 1u8);
    }
}
