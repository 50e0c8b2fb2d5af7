// Copyright 2018-2021 DDK developers
// This file is part of DDK Core.

// DDK Core is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// DDK Core is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with DDK Core.  If not, see <http://www.gnu.org/licenses/>.

//! DDK Common Types

extern crate parity_crypto as crypto;

pub mod account;
pub mod block;
pub mod params;
pub mod slots;
pub mod transaction;

/// Block height.
pub type BlockNumber = u64;

/// Seconds since the chain epoch (see `slots`).
pub type EpochSeconds = u32;
