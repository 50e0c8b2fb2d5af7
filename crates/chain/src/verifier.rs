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

//! Pre-apply block verification.
//!
//! `verify_receipt` is the light pipeline run on blocks arriving from
//! peers before the node commits to processing them; `verify_block`
//! adds the fork-detection checks that need the chain tip. Checks
//! append to an error list and never short-circuit, so a rejection
//! reports everything wrong with the block at once. Blocks at or below
//! the masternode migration height are accepted under the relaxed
//! historical rules.

use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

use crypto::digest;
use ddk_types::{block::Block, params::ChainParams};
use ethereum_types::H256;
use parking_lot::Mutex;

use crate::{
    delegates::{Delegates, ForkKind},
    error::BlockError,
    logic::{self, TransactionLogic},
    reward::BlockReward,
    version::BlockVersion,
};

/// Outcome of a verification pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyResult {
    /// Every check that failed.
    pub errors: Vec<BlockError>,
}

impl VerifyResult {
    /// The block is verified iff no check failed.
    pub fn verified(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Block verifier.
pub struct BlockVerifier {
    params: ChainParams,
    versions: BlockVersion,
    reward: BlockReward,
    logic: Arc<TransactionLogic>,
    delegates: Arc<dyn Delegates>,
    // Recently accepted ids, capped at `block_slot_window`.
    last_n_block_ids: Mutex<VecDeque<H256>>,
}

impl BlockVerifier {
    /// Create a verifier for the logic's chain configuration.
    pub fn new(
        logic: Arc<TransactionLogic>,
        delegates: Arc<dyn Delegates>,
        versions: BlockVersion,
    ) -> BlockVerifier {
        let params = logic.params().clone();
        BlockVerifier {
            reward: BlockReward::new(&params),
            params,
            versions,
            logic,
            delegates,
            last_n_block_ids: Mutex::new(VecDeque::new()),
        }
    }

    /// Seed the recent-id ring from stored history.
    pub fn on_blockchain_ready(&self, ids: Vec<H256>) {
        let mut ring = self.last_n_block_ids.lock();
        ring.clear();
        ring.extend(ids);
        while ring.len() > self.params.block_slot_window {
            ring.pop_front();
        }
    }

    /// Record an accepted block id in the ring.
    pub fn on_new_block(&self, id: H256) {
        let mut ring = self.last_n_block_ids.lock();
        ring.push_back(id);
        while ring.len() > self.params.block_slot_window {
            ring.pop_front();
        }
    }

    /// Snapshot of the recent-id ring, oldest first.
    pub fn last_n_block_ids(&self) -> Vec<H256> {
        self.last_n_block_ids.lock().iter().copied().collect()
    }

    /// Light pipeline for blocks received from peers.
    pub fn verify_receipt(&self, block: &mut Block, last_block: &Block) -> VerifyResult {
        let mut errors = Vec::new();
        self.set_height(block, last_block);
        self.verify_signature(block, &mut errors);
        self.verify_previous_block(block, &mut errors);
        self.verify_against_last_n_block_ids(block, &mut errors);
        self.verify_block_slot_window(block, &mut errors);
        self.verify_version(block, &mut errors);
        self.verify_id(block, &mut errors);
        self.verify_payload(block, &mut errors);
        self.verify_reward(block, &mut errors);
        self.finish(block, errors)
    }

    /// Full pipeline run before a block is processed.
    pub fn verify_block(&self, block: &mut Block, last_block: &Block) -> VerifyResult {
        let mut errors = Vec::new();
        self.set_height(block, last_block);
        self.verify_signature(block, &mut errors);
        self.verify_previous_block(block, &mut errors);
        self.verify_version(block, &mut errors);
        self.verify_id(block, &mut errors);
        self.verify_payload(block, &mut errors);
        self.verify_reward(block, &mut errors);
        self.verify_fork_one(block, last_block, &mut errors);
        self.verify_block_slot(block, last_block, &mut errors);
        self.finish(block, errors)
    }

    fn finish(&self, block: &Block, errors: Vec<BlockError>) -> VerifyResult {
        if !errors.is_empty() {
            debug!(
                target: "verification",
                "Block {:?} at height {} failed {} checks, first: {}",
                block.id,
                block.height,
                errors.len(),
                errors[0],
            );
        }
        VerifyResult { errors }
    }

    fn post_migration(&self, block: &Block) -> bool {
        block.height > self.params.master_node_migrated_block
    }

    fn set_height(&self, block: &mut Block, last_block: &Block) {
        block.height = last_block.height + 1;
    }

    fn verify_signature(&self, block: &Block, errors: &mut Vec<BlockError>) {
        // The signature error is disabled for pre-migration history.
        if !logic::verify_block_signature(block) && self.post_migration(block) {
            errors.push(BlockError::InvalidSignature);
        }
    }

    fn verify_previous_block(&self, block: &Block, errors: &mut Vec<BlockError>) {
        if block.previous_block.is_none() && block.height != 1 {
            errors.push(BlockError::MissingPreviousBlock);
        }
    }

    fn verify_against_last_n_block_ids(&self, block: &Block, errors: &mut Vec<BlockError>) {
        if self.last_n_block_ids.lock().contains(&block.id) {
            errors.push(BlockError::AlreadyProcessed(block.id));
        }
    }

    fn verify_block_slot_window(&self, block: &Block, errors: &mut Vec<BlockError>) {
        let slots = self.params.slots();
        let current_slot = slots.slot_number(slots.now());
        let block_slot = slots.slot_number(block.timestamp);
        if block_slot > current_slot {
            errors.push(BlockError::SlotInFuture {
                block_slot,
                current_slot,
            });
        } else if current_slot - block_slot > self.params.block_slot_window as u32 {
            errors.push(BlockError::SlotTooOld {
                block_slot,
                current_slot,
            });
        }
    }

    fn verify_version(&self, block: &Block, errors: &mut Vec<BlockError>) {
        if !self.versions.is_valid(block.version, block.height) {
            errors.push(BlockError::InvalidVersion {
                version: block.version,
                height: block.height,
            });
        }
    }

    fn verify_id(&self, block: &Block, errors: &mut Vec<BlockError>) {
        let expected = logic::block_id(block);
        if block.id != expected {
            errors.push(BlockError::InvalidId {
                expected,
                got: block.id,
            });
        }
    }

    fn verify_payload(&self, block: &Block, errors: &mut Vec<BlockError>) {
        let post_migration = self.post_migration(block);

        if block.payload_length as usize > self.params.max_payload_length {
            errors.push(BlockError::PayloadTooLarge {
                limit: self.params.max_payload_length,
                got: block.payload_length as usize,
            });
        }
        if post_migration && block.transactions.len() != block.number_of_transactions as usize {
            errors.push(BlockError::TransactionCountMismatch {
                declared: block.number_of_transactions,
                got: block.transactions.len(),
            });
        }
        if block.transactions.len() > self.params.max_txs_per_block {
            errors.push(BlockError::TooManyTransactions {
                limit: self.params.max_txs_per_block,
                got: block.transactions.len(),
            });
        }

        let mut payload = Vec::new();
        let mut seen = HashSet::new();
        let mut total_amount = 0u64;
        let mut total_fee = 0u64;
        for trs in &block.transactions {
            if !seen.insert(trs.id) {
                errors.push(BlockError::DuplicateTransaction(trs.id));
            }
            payload.extend_from_slice(&self.logic.bytes(trs, false));
            total_amount = total_amount.saturating_add(trs.amount);
            total_fee = total_fee.saturating_add(trs.fee);
        }

        if post_migration {
            let payload_hash = H256::from_slice(&digest::sha256(&payload));
            if payload_hash != block.payload_hash {
                errors.push(BlockError::InvalidPayloadHash {
                    expected: payload_hash,
                    got: block.payload_hash,
                });
            }
            if total_amount != block.total_amount {
                errors.push(BlockError::InvalidTotalAmount {
                    expected: total_amount,
                    got: block.total_amount,
                });
            }
            if total_fee != block.total_fee {
                errors.push(BlockError::InvalidTotalFee {
                    expected: total_fee,
                    got: block.total_fee,
                });
            }
        }
    }

    fn verify_reward(&self, block: &mut Block, errors: &mut Vec<BlockError>) {
        let mut expected = self.reward.calc_reward(block.height);
        if block.height > self.params.reward_halt_height {
            expected = 0;
            block.reward = 0;
        }
        if block.reward != expected
            && !self.params.exception_block_rewards.contains(&block.id)
            && block.height != 1
        {
            errors.push(BlockError::InvalidReward {
                expected,
                got: block.reward,
            });
        }
    }

    fn verify_fork_one(
        &self,
        block: &Block,
        last_block: &Block,
        errors: &mut Vec<BlockError>,
    ) {
        if block.previous_block != Some(last_block.id) {
            self.delegates.fork(block, ForkKind::WrongPreviousBlock);
            errors.push(BlockError::ForkPreviousBlock {
                expected: last_block.id,
                got: block.previous_block,
            });
        }
    }

    fn verify_block_slot(
        &self,
        block: &Block,
        last_block: &Block,
        errors: &mut Vec<BlockError>,
    ) {
        let slots = self.params.slots();
        let block_slot = slots.slot_number(block.timestamp);
        let last_slot = slots.slot_number(last_block.timestamp);
        let current_slot = slots.slot_number(slots.now());
        if block_slot <= last_slot || block_slot > current_slot {
            errors.push(BlockError::InvalidBlockSlot {
                block_slot,
                last_slot,
                current_slot,
            });
        }
    }
}
