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

//! Slot arithmetic.
//!
//! Time on this chain is measured in seconds since the chain epoch and
//! bucketed into fixed-duration slots; within a round each slot belongs
//! to exactly one of the active delegates.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::EpochSeconds;

/// Slot clock for a given chain configuration.
#[derive(Debug, Clone, Copy)]
pub struct Slots {
    /// Chain epoch, unix seconds.
    pub epoch_time: u64,
    /// Slot duration, seconds.
    pub interval: u32,
    /// Delegates per round.
    pub active_delegates: u32,
}

impl Slots {
    /// Convert a unix timestamp to epoch seconds, clamping times before
    /// the epoch to zero.
    pub fn epoch_seconds(&self, unix: u64) -> EpochSeconds {
        unix.saturating_sub(self.epoch_time) as EpochSeconds
    }

    /// Current chain time.
    pub fn now(&self) -> EpochSeconds {
        let unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.epoch_seconds(unix)
    }

    /// Slot a chain timestamp falls into.
    pub fn slot_number(&self, timestamp: EpochSeconds) -> u32 {
        timestamp / self.interval
    }

    /// First chain timestamp of a slot.
    pub fn slot_time(&self, slot: u32) -> EpochSeconds {
        slot * self.interval
    }

    /// Which delegate of the round owns a slot.
    pub fn delegate_index(&self, slot: u32) -> u32 {
        slot % self.active_delegates
    }
}
