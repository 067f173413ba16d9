/*
 * Created on Fri Sep 22 2023
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

//! Construction-time configuration for the VM-backed vectors (§6, §10.C).
//!
//! There is no runtime config file or CLI parser here, unlike the server
//! this module is adapted from: every tree in this crate is a library value
//! constructed directly by its caller, so the only knob worth exposing is
//! the chunk size each vector commits host pages in.

use crate::engine::mem::DEFAULT_CHUNK_BYTES;

/// Sizing knob for a VM-backed vector, handed to `with_chunk_bytes`
/// constructors in place of the crate-wide [`DEFAULT_CHUNK_BYTES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VmConfig {
    /// bytes committed per host `commit` call, rounded up to the page size
    pub chunk_bytes: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }
}

impl VmConfig {
    pub const fn new(chunk_bytes: usize) -> Self {
        Self { chunk_bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_crate_constant() {
        assert_eq!(VmConfig::default().chunk_bytes, DEFAULT_CHUNK_BYTES);
    }

    #[test]
    fn custom_chunk_bytes() {
        let cfg = VmConfig::new(1 << 20);
        assert_eq!(cfg.chunk_bytes, 1 << 20);
    }
}
