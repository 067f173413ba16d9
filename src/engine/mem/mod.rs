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

mod bump;
mod conc_vec;
mod ll;
mod seq_vec;
pub mod unsafe_apis;

pub use conc_vec::{ConcVmVec, ZeroInit};
pub use ll::CachePadded;
pub use seq_vec::SeqVmVec;

/// design target commit unit: 64 MiB, rounded up to the host page size
pub const DEFAULT_CHUNK_BYTES: usize = 64 * 1024 * 1024;
/// number of slots a thread-local bump region claims per refill (§5, §9)
pub const BUMP_RUN_LEN: usize = 32;
