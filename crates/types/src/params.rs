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

//! Chain parameters.

use std::collections::HashSet;

use crate::{slots::Slots, transaction::TransactionKind, BlockNumber};
use ethereum_types::H256;

/// Flat fee schedule per transaction kind, in the smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fees {
    pub send: u64,
    pub signature: u64,
    pub vote: u64,
    pub referral: u64,
    pub stake: u64,
    pub send_stake: u64,
}

impl Default for Fees {
    fn default() -> Self {
        Fees {
            send: 1_000_000,
            signature: 500_000_000,
            vote: 100_000_000,
            referral: 0,
            stake: 1_000_000,
            send_stake: 1_000_000,
        }
    }
}

impl Fees {
    /// Scheduled fee for a kind.
    pub fn fee(&self, kind: TransactionKind) -> u64 {
        match kind {
            TransactionKind::Send => self.send,
            TransactionKind::Signature => self.signature,
            TransactionKind::Vote => self.vote,
            TransactionKind::Referral => self.referral,
            TransactionKind::Stake => self.stake,
            TransactionKind::SendStake => self.send_stake,
        }
    }
}

/// Chain-wide constants.
///
/// Everything here is consensus-visible configuration; mainnet values
/// come from the config file, the defaults describe a fresh test chain.
#[derive(Debug, Clone)]
pub struct ChainParams {
    /// Transactions packaged into one block at most.
    pub max_txs_per_block: usize,
    /// Upper bound for transaction-listing queries.
    pub max_shared_txs: usize,
    /// Maximum block payload size in bytes.
    pub max_payload_length: usize,
    /// Receipt slot window and capacity of the recent-id ring.
    pub block_slot_window: usize,
    /// Residency bound for conflicted-queue entries, seconds.
    pub transaction_queue_expire: u64,
    /// Height of the masternode migration. Blocks at or below it are
    /// accepted under the relaxed historical checks.
    pub master_node_migrated_block: BlockNumber,
    /// Delegates per round.
    pub active_delegates: u32,
    /// Chain epoch, unix seconds.
    pub epoch_time: u64,
    /// Slot duration, seconds.
    pub slot_interval: u32,
    /// Vote entries allowed in one VOTE transaction.
    pub max_votes_per_transaction: usize,
    /// Smallest stake order accepted.
    pub min_stake_amount: u64,
    /// Height above which the forging reward is zero.
    pub reward_halt_height: BlockNumber,
    /// Height the reward schedule starts at.
    pub reward_offset: BlockNumber,
    /// Heights between reward milestone steps.
    pub reward_distance: u64,
    /// Reward amounts per milestone; the last one applies forever.
    pub reward_milestones: Vec<u64>,
    /// Block ids exempt from the reward check.
    pub exception_block_rewards: HashSet<H256>,
    /// Fee schedule.
    pub fees: Fees,
}

impl Default for ChainParams {
    fn default() -> Self {
        ChainParams {
            max_txs_per_block: 25,
            max_shared_txs: 100,
            max_payload_length: 1024 * 1024,
            block_slot_window: 5,
            transaction_queue_expire: 10_800,
            master_node_migrated_block: 0,
            active_delegates: 11,
            epoch_time: 1_451_667_600,
            slot_interval: 10,
            max_votes_per_transaction: 3,
            min_stake_amount: 100_000_000,
            reward_halt_height: 21_000_000,
            reward_offset: 1,
            reward_distance: 3_000_000,
            reward_milestones: vec![
                500_000_000,
                400_000_000,
                300_000_000,
                200_000_000,
                100_000_000,
            ],
            exception_block_rewards: HashSet::new(),
            fees: Fees::default(),
        }
    }
}

impl ChainParams {
    /// Slot clock for these parameters.
    pub fn slots(&self) -> Slots {
        Slots {
            epoch_time: self.epoch_time,
            interval: self.slot_interval,
            active_delegates: self.active_delegates,
        }
    }
}
