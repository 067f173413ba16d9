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

use {
    super::VmSource,
    crate::engine::error::VmError,
    core::ptr::NonNull,
    std::sync::OnceLock,
};

pub struct Unix;

impl VmSource for Unix {
    fn reserve(bytes: usize) -> Result<NonNull<u8>, VmError> {
        if bytes == 0 {
            return Err(VmError::AllocationFailure);
        }
        let p = unsafe {
            // UNSAFE(@ohsayan): PROT_NONE + MAP_NORESERVE stakes out address
            // space without committing physical pages or swap accounting
            libc::mmap(
                core::ptr::null_mut(),
                bytes,
                libc::PROT_NONE,
                libc::MAP_PRIVATE | libc::MAP_ANON | libc::MAP_NORESERVE,
                -1,
                0,
            )
        };
        if p == libc::MAP_FAILED {
            return Err(VmError::AllocationFailure);
        }
        // SAFETY: mmap returned success, so p is non-null
        Ok(unsafe { NonNull::new_unchecked(p as *mut u8) })
    }

    unsafe fn commit(base: NonNull<u8>, offset: usize, bytes: usize) -> Result<(), VmError> {
        let target = base.as_ptr().add(offset) as *mut libc::c_void;
        let rc = libc::mprotect(target, bytes, libc::PROT_READ | libc::PROT_WRITE);
        if rc != 0 {
            return Err(VmError::AllocationFailure);
        }
        Ok(())
    }

    unsafe fn release(base: NonNull<u8>, bytes: usize) {
        let rc = libc::munmap(base.as_ptr() as *mut libc::c_void, bytes);
        debug_assert_eq!(rc, 0, "munmap failed");
    }

    unsafe fn decommit(base: NonNull<u8>, offset: usize, bytes: usize) {
        let target = base.as_ptr().add(offset) as *mut libc::c_void;
        // MADV_DONTNEED lets the kernel drop the backing pages; a subsequent
        // access re-faults them in zeroed, which is why this op is optional
        // for the core (nothing here shrinks a VmVec today)
        libc::madvise(target, bytes, libc::MADV_DONTNEED);
        let _ = libc::mprotect(target, bytes, libc::PROT_NONE);
    }

    fn page_size() -> usize {
        static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
        *PAGE_SIZE.get_or_init(|| {
            let sz = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
            if sz > 0 {
                sz as usize
            } else {
                4096
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_commit_write_release() {
        let bytes = Unix::page_size() * 4;
        let base = Unix::reserve(bytes).expect("reserve");
        unsafe {
            Unix::commit(base, 0, Unix::page_size()).expect("commit");
            let slice = core::slice::from_raw_parts_mut(base.as_ptr(), Unix::page_size());
            slice[0] = 0xAB;
            assert_eq!(slice[0], 0xAB);
            Unix::release(base, bytes);
        }
    }

    #[test]
    fn reserve_zero_fails() {
        assert!(Unix::reserve(0).is_err());
    }
}
