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

pub(crate) mod spinlock;

use std::{cell::Cell, hint::spin_loop, thread};

/// Exponential spin/yield backoff shared by every busy-wait in this crate:
/// [`spinlock::SpinLock::lock`]'s contention loop and
/// [`crate::engine::tree::ConcTree`]'s reader `done`-flag poll (§5, I4).
///
/// Each call to [`snooze`](Self::snooze) spins for twice as long as the
/// last, up to a point, then switches to yielding the thread to the OS
/// scheduler entirely. A fresh `Backoff` should be created per wait loop —
/// reusing one across unrelated waits just starts the next wait already at
/// the slow end of the ramp.
pub struct Backoff {
    step: Cell<u8>,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Backoff {
    /// Past this many calls, spinning stops and every `snooze` yields.
    const SPIN_LIMIT: u8 = 6;
    /// Past this many calls, `step` stops advancing (nothing reads it beyond
    /// `SPIN_LIMIT`, but this keeps the counter from wrapping under a very
    /// long-lived `Backoff`).
    const STEP_CAP: u8 = 8;

    pub fn new() -> Self {
        Self { step: Cell::new(0) }
    }

    pub fn snooze(&self) {
        let step = self.step.get();
        if step <= Self::SPIN_LIMIT {
            for _ in 0..1u32 << step {
                spin_loop();
            }
        } else {
            thread::yield_now();
        }
        if step <= Self::STEP_CAP {
            self.step.set(step + 1);
        }
    }
}
