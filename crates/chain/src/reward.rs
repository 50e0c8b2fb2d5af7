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

//! Forging reward schedule.

use ddk_types::{params::ChainParams, BlockNumber};

/// Milestone-based reward schedule. The reward steps down every
/// `distance` blocks past `offset` and stays at the last milestone.
#[derive(Debug, Clone)]
pub struct BlockReward {
    offset: BlockNumber,
    distance: u64,
    milestones: Vec<u64>,
}

impl BlockReward {
    /// Schedule from chain parameters.
    pub fn new(params: &ChainParams) -> BlockReward {
        BlockReward {
            offset: params.reward_offset,
            distance: params.reward_distance.max(1),
            milestones: params.reward_milestones.clone(),
        }
    }

    /// Milestone index active at a height.
    fn milestone(&self, height: BlockNumber) -> usize {
        let location = height.saturating_sub(self.offset) / self.distance;
        (location as usize).min(self.milestones.len().saturating_sub(1))
    }

    /// Reward for forging at `height`.
    pub fn calc_reward(&self, height: BlockNumber) -> u64 {
        if height < self.offset || self.milestones.is_empty() {
            return 0;
        }
        self.milestones[self.milestone(height)]
    }
}
