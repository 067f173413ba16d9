/*
 * Created on Sat Feb 04 2023
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

use core::fmt;

pub type VmResult<T> = Result<T, VmError>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
/// Errors surfaced by the VM-backed append vector
pub enum VmError {
    /// the host refused a `reserve` or `commit` call
    AllocationFailure,
    /// an append would pass the configured logical capacity
    CapacityExhausted,
    /// a checked random access landed outside `[0, size)`
    OutOfBounds,
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::AllocationFailure => "the host VM subsystem refused to reserve or commit pages",
            Self::CapacityExhausted => "append would exceed the configured logical capacity",
            Self::OutOfBounds => "index is out of bounds",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for VmError {}

/// A precondition of the tree or vector API was violated by the caller.
///
/// Per the design, this is a programmer error: it aborts via assertion in
/// debug builds and is unchecked (undefined behavior on divergence from the
/// invariant) in release builds, consistent with a low-level systems
/// component that does not pay for checks its callers are expected to
/// uphold.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum PreconditionViolation {
    /// attempted to emplace a second node with `parent = NodeID::INVALID`
    SecondRoot,
    /// `pop_back` called on an empty vector
    PopEmpty,
    /// a sequential-only operation was invoked on a concurrent tree (or vice versa)
    WrongVariant,
    /// a node's fan-out would exceed the bound for its hook width
    FanOverflow,
}

impl fmt::Display for PreconditionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::SecondRoot => "a root already exists; parent=invalid is rejected (I1)",
            Self::PopEmpty => "pop_back on an empty vector",
            Self::WrongVariant => "operation is not valid for this tree variant",
            Self::FanOverflow => "fan-out bound exceeded for this hook width (I5)",
        };
        f.write_str(msg)
    }
}

/// Check a precondition: debug-asserts so release builds pay nothing and the
/// violation is, as designed, undefined behavior rather than a checked error.
#[inline(always)]
pub fn precondition(cond: bool, violation: PreconditionViolation) {
    debug_assert!(cond, "precondition violated: {violation}");
}

pub type TreeResult<T> = Result<T, TreeError>;

/// Errors surfaced by [`crate::engine::tree::ConcTree`]'s fallible operations.
///
/// The sequential tree never returns this: its only fallible path is the
/// backing vector running out of capacity, surfaced directly as [`VmError`].
#[derive(Debug, Clone, Copy)]
pub enum TreeError {
    /// the backing vector refused the allocation
    Vm(VmError),
    /// a payload constructor panicked mid-insert on some earlier call;
    /// the tree no longer accepts operations (§9 "Failure during construction")
    Poisoned,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vm(e) => fmt::Display::fmt(e, f),
            Self::Poisoned => f.write_str("tree is poisoned after a panicked insert"),
        }
    }
}

impl std::error::Error for TreeError {}

impl From<VmError> for TreeError {
    fn from(e: VmError) -> Self {
        Self::Vm(e)
    }
}
