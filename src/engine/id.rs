/*
 * Created on Mon Sep 12 2022
 *
 * This file is a part of Skytable
 * Skytable (formerly known as TerrabaseDB or Skybase) is a free and open-source
 * NoSQL database written by Sayan Nandan ("the Author") with the
 * vision to provide flexibility in data modelling without compromising
 * on performance, queryability or scalability.
 *
 * Copyright (c) 2022, Sayan Nandan <ohsayan@outlook.com>
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

/// An opaque, densely-allocated index into a node store.
///
/// `0` is the reserved invalid sentinel (see [`NodeId::INVALID`]); `1` is the
/// id of the root once one has been emplaced. NodeIds are never reused: a
/// slot's id is stable for the lifetime of the store that allocated it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(i32);

impl NodeId {
    /// The reserved sentinel id. Never the id of a real node.
    pub const INVALID: Self = Self(0);
    /// The id of the root, once one has been emplaced.
    pub const ROOT: Self = Self(1);

    #[inline(always)]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }

    #[inline(always)]
    pub const fn get(&self) -> i32 {
        self.0
    }

    #[inline(always)]
    pub const fn idx(&self) -> usize {
        self.0 as usize
    }

    /// The id one past this one. Used by the store to mint a new id on push.
    #[inline(always)]
    pub(crate) const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            f.write_str("NodeId(invalid)")
        }
    }
}

impl From<usize> for NodeId {
    fn from(idx: usize) -> Self {
        Self(idx as i32)
    }
}

impl From<NodeId> for i32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::NodeId;

    #[test]
    fn invalid_is_zero() {
        assert_eq!(NodeId::INVALID.get(), 0);
        assert!(!NodeId::INVALID.is_valid());
    }

    #[test]
    fn root_is_one() {
        assert_eq!(NodeId::ROOT.get(), 1);
        assert!(NodeId::ROOT.is_valid());
    }

    #[test]
    fn next_increments() {
        assert_eq!(NodeId::new(5).next(), NodeId::new(6));
    }
}
