/*
 * Created on Sun Jan 22 2023
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

//! The two rooted-tree variants (components D and E) and the trait that lets
//! the cursor family and structural operators (components F and G) be
//! written once against either one.

pub mod concurrent;
pub mod sequential;

pub use concurrent::ConcTree;
pub use sequential::SeqTree;

use crate::engine::id::NodeId;

/// Structural + payload read access shared by [`SeqTree`] and [`ConcTree`].
///
/// Implementations gate every accessor on whatever their variant needs for
/// safety: the sequential tree has nothing to gate, the concurrent tree
/// spin-yields until the target slot's `done` flag is set (I4).
pub trait HookedStore<T> {
    /// Number of slots in the store, including the sentinel at index 0.
    fn size(&self) -> usize;
    fn hook_up(&self, id: NodeId) -> NodeId;
    fn hook_prev(&self, id: NodeId) -> NodeId;
    fn hook_tail(&self, id: NodeId) -> NodeId;
    fn hook_fan(&self, id: NodeId) -> i32;
    fn payload(&self, id: NodeId) -> &T;

    /// The tree's root, or [`NodeId::INVALID`] if none has been emplaced yet.
    #[inline]
    fn root(&self) -> NodeId {
        self.hook_tail(NodeId::INVALID)
    }
}

/// Exclusive (read-write) access, available only where a single writer can
/// be guaranteed at the type level — the sequential tree (§4.F: "the latter
/// is available only on the sequential tree").
///
/// `payload_mut` takes `&self` rather than `&mut self`: the guarantee that
/// only one exclusive cursor is ever alive comes from the `&mut S` consumed
/// by the cursor's constructor, not from this trait method's receiver.
pub trait HookedStoreMut<T>: HookedStore<T> {
    fn payload_mut(&self, id: NodeId) -> &mut T;
}
