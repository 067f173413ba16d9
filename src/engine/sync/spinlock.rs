/*
 * Created on Thu Jan 19 2023
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

use {
    super::Backoff,
    core::sync::atomic::{AtomicU8, Ordering},
};

const UNLOCKED: u8 = 0;
const LOCKED: u8 = 1;

/// A one-byte test-and-set spin mutex.
///
/// Embedded directly in [`ConcHook`](super::super::hook::ConcHook) and used
/// *only* while a node acts as the parent of an insertion: it guards `tail`,
/// the `prev` write into a newly linked child, and `fan` of that one node
/// (§4.E). Contention scales with inserts into the same parent, never with
/// tree size.
#[derive(Debug, Default)]
#[repr(transparent)]
pub struct SpinLock(AtomicU8);

impl SpinLock {
    #[inline(always)]
    pub const fn new() -> Self {
        Self(AtomicU8::new(UNLOCKED))
    }

    /// Acquire the lock, spinning/yielding until it is free. The critical
    /// section guarded by this lock is always three field writes (§5), so
    /// the spin is bounded in practice.
    pub fn lock(&self) -> SpinGuard<'_> {
        let backoff = Backoff::new();
        while self
            .0
            .compare_exchange_weak(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            backoff.snooze();
        }
        SpinGuard { lock: self }
    }

    #[inline(always)]
    fn unlock(&self) {
        self.0.store(UNLOCKED, Ordering::Release);
    }
}

/// RAII guard releasing the spin lock on drop.
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::SpinLock;
    use std::sync::Arc;

    #[test]
    fn mutual_exclusion() {
        let lock = Arc::new(SpinLock::new());
        let counter = Arc::new(core::sync::atomic::AtomicU64::new(0));
        let mut handles = vec![];
        for _ in 0..8 {
            let lock = lock.clone();
            let counter = counter.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    let _g = lock.lock();
                    counter.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.load(core::sync::atomic::Ordering::Relaxed), 8000);
    }
}
