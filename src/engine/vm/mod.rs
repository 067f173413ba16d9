/*
 * Created on Thu Jan 18 2024
 *
 * This file is a part of Skytable
 * Skytable (formerly known as TerrabaseDB or Skybase) is a free and open-source
 * NoSQL database written by Sayan Nandan ("the Author") with the
 * vision to provide flexibility in data modelling without compromising
 * on performance, queryability or scalability.
 *
 * Copyright (c) 2024, Sayan Nandan <nandansayan@outlook.com>
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

//! The minimal virtual-memory interface the core consumes from the host
//! (§6). Exactly four operations: reserve an address range with no backing
//! pages, commit a page-aligned subrange, release the whole reservation, and
//! (optionally) decommit a subrange. The per-OS implementation lives in
//! [`unix`] and [`windows`]; neither is part of the core's own surface.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

use {crate::engine::error::VmError, core::ptr::NonNull};

/// Host-provided virtual memory operations.
///
/// `reserve` is infallible with respect to physical memory: it only stakes
/// out address space. Pages become physically backed one `chunk` at a time
/// via `commit`, in [`crate::mem::VmVec`].
pub trait VmSource {
    /// Reserve `bytes` of address space, rounded up by the caller to a
    /// chunk boundary. Returns the base pointer.
    fn reserve(bytes: usize) -> Result<NonNull<u8>, VmError>;

    /// Back `[base + offset, base + offset + bytes)` with read-write pages.
    ///
    /// # Safety
    /// `base` must be a live reservation from `reserve` at least
    /// `offset + bytes` long.
    unsafe fn commit(base: NonNull<u8>, offset: usize, bytes: usize) -> Result<(), VmError>;

    /// Release the entire reservation obtained from `reserve`.
    ///
    /// # Safety
    /// `base`/`bytes` must match a still-live reservation, and no reference
    /// into it may outlive this call.
    unsafe fn release(base: NonNull<u8>, bytes: usize);

    /// Advise the host that `[base + offset, base + offset + bytes)` is no
    /// longer needed; physical backing may be reclaimed. Not required by the
    /// core (no caller currently shrinks a `VmVec`), but kept as part of the
    /// adapter surface per §6.
    ///
    /// # Safety
    /// Same as [`Self::commit`].
    unsafe fn decommit(base: NonNull<u8>, offset: usize, bytes: usize);

    /// The host's native page granularity (4 KiB on most targets, 64 KiB on
    /// some others). Commit sizes are rounded up to this.
    fn page_size() -> usize;
}

#[cfg(unix)]
pub use unix::Unix as HostVm;
#[cfg(windows)]
pub use windows::Windows as HostVm;

#[cfg(not(any(unix, windows)))]
compile_error!("vmtree requires a `vm::VmSource` implementation for this target");

/// Round `bytes` up to the next multiple of `chunk`.
#[inline]
pub fn round_up(bytes: usize, chunk: usize) -> usize {
    debug_assert!(chunk.is_power_of_two() || chunk % 4096 == 0, "unreasonable chunk size");
    if chunk == 0 {
        return bytes;
    }
    let rem = bytes % chunk;
    if rem == 0 {
        bytes
    } else {
        bytes + (chunk - rem)
    }
}

#[cfg(test)]
mod tests {
    use super::round_up;

    #[test]
    fn round_up_basic() {
        assert_eq!(round_up(0, 64), 0);
        assert_eq!(round_up(1, 64), 64);
        assert_eq!(round_up(64, 64), 64);
        assert_eq!(round_up(65, 64), 128);
    }
}
