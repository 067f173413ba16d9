/*
 * Created on Thu Jan 18 2024
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

//! `SeqVmVec`/`ConcVmVec` manage their own backing memory via `VmSource`
//! (reserve/commit/release), not `std::alloc` — the one unsafe primitive
//! both still need from outside is running destructors over a committed-but-
//! not-yet-released range on `Drop`, since a VM-backed vector's storage isn't
//! a `Vec<T>` the standard drop glue already knows how to walk.

use core::ptr;

/// Run the dtor for `l` elements starting at `ptr`, as `Drop for SeqVmVec`
/// and `Drop for ConcVmVec` do over their live range before releasing the
/// underlying reservation.
#[inline(always)]
pub unsafe fn drop_slice_in_place<T>(ptr: *mut T, l: usize) {
    ptr::drop_in_place(ptr::slice_from_raw_parts_mut(ptr, l))
}
