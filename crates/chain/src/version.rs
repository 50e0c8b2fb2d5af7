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

//! Block version schedule.

use ddk_types::BlockNumber;

/// Upgrade schedule mapping height ranges to the block version they
/// must carry.
#[derive(Debug, Clone)]
pub struct BlockVersion {
    // (first height, version), ascending by height.
    schedule: Vec<(BlockNumber, u32)>,
}

impl Default for BlockVersion {
    fn default() -> Self {
        BlockVersion {
            schedule: vec![(0, 1)],
        }
    }
}

impl BlockVersion {
    /// Schedule from explicit upgrade points.
    pub fn new(mut schedule: Vec<(BlockNumber, u32)>) -> BlockVersion {
        schedule.sort_by_key(|(height, _)| *height);
        if schedule.is_empty() {
            return BlockVersion::default();
        }
        BlockVersion { schedule }
    }

    /// Version blocks at `height` must carry.
    pub fn version_at(&self, height: BlockNumber) -> u32 {
        self.schedule
            .iter()
            .rev()
            .find(|(from, _)| *from <= height)
            .map(|(_, version)| *version)
            .unwrap_or(1)
    }

    /// Whether a `(version, height)` pair is acceptable.
    pub fn is_valid(&self, version: u32, height: BlockNumber) -> bool {
        self.version_at(height) == version
    }
}
