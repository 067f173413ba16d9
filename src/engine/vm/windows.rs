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
    windows::Win32::System::Memory::{
        VirtualAlloc, VirtualFree, MEM_COMMIT, MEM_DECOMMIT, MEM_RELEASE, MEM_RESERVE,
        PAGE_NOACCESS, PAGE_READWRITE,
    },
    windows::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO},
};

pub struct Windows;

impl VmSource for Windows {
    fn reserve(bytes: usize) -> Result<NonNull<u8>, VmError> {
        if bytes == 0 {
            return Err(VmError::AllocationFailure);
        }
        let p = unsafe {
            // UNSAFE(@ohsayan): MEM_RESERVE with PAGE_NOACCESS stakes out
            // address space without committing it
            VirtualAlloc(None, bytes, MEM_RESERVE, PAGE_NOACCESS)
        };
        NonNull::new(p as *mut u8).ok_or(VmError::AllocationFailure)
    }

    unsafe fn commit(base: NonNull<u8>, offset: usize, bytes: usize) -> Result<(), VmError> {
        let target = base.as_ptr().add(offset) as *mut core::ffi::c_void;
        let p = VirtualAlloc(Some(target), bytes, MEM_COMMIT, PAGE_READWRITE);
        if p.is_null() {
            return Err(VmError::AllocationFailure);
        }
        Ok(())
    }

    unsafe fn release(base: NonNull<u8>, _bytes: usize) {
        let rc = VirtualFree(base.as_ptr() as *mut core::ffi::c_void, 0, MEM_RELEASE);
        debug_assert!(rc.is_ok(), "VirtualFree(MEM_RELEASE) failed");
    }

    unsafe fn decommit(base: NonNull<u8>, offset: usize, bytes: usize) {
        let target = base.as_ptr().add(offset) as *mut core::ffi::c_void;
        let _ = VirtualFree(target, bytes, MEM_DECOMMIT);
    }

    fn page_size() -> usize {
        static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
        *PAGE_SIZE.get_or_init(|| unsafe {
            let mut info = SYSTEM_INFO::default();
            GetSystemInfo(&mut info);
            info.dwPageSize as usize
        })
    }
}
