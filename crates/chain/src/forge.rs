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

//! Block forging.
//!
//! Drains the pool in canonical order, fills the payload fields and
//! signs the header. Slot scheduling and round fairness live with the
//! delegates module; the forger only builds a block for the timestamp
//! it is handed.

use std::sync::Arc;

use crypto::{
    digest,
    publickey::{KeyPair, Secret},
};
use ddk_pool::{Client, TransactionPool};
use ddk_types::{block::Block, transaction::Transaction, EpochSeconds};
use ethereum_types::H256;

use crate::{
    error::Error,
    logic::{self, TransactionLogic},
    reward::BlockReward,
    version::BlockVersion,
};

/// Assemble and sign a block continuing `last_block`.
pub fn assemble(
    logic: &TransactionLogic,
    reward: &BlockReward,
    versions: &BlockVersion,
    secret: &Secret,
    last_block: &Block,
    transactions: Vec<Transaction>,
    timestamp: EpochSeconds,
) -> Result<Block, Error> {
    let height = last_block.height + 1;
    let params = logic.params();

    let mut payload = Vec::new();
    let mut total_amount = 0u64;
    let mut total_fee = 0u64;
    for trs in &transactions {
        payload.extend_from_slice(&logic.bytes(trs, false));
        total_amount = total_amount.saturating_add(trs.amount);
        total_fee = total_fee.saturating_add(trs.fee);
    }

    let block_reward = if height > params.reward_halt_height {
        0
    } else {
        reward.calc_reward(height)
    };

    let keypair = KeyPair::from_secret(secret.clone())?;
    let mut block = Block {
        id: H256::zero(),
        height,
        previous_block: Some(last_block.id),
        timestamp,
        version: versions.version_at(height),
        generator_public_key: *keypair.public(),
        signature: None,
        reward: block_reward,
        total_amount,
        total_fee,
        payload_length: payload.len() as u32,
        payload_hash: H256::from_slice(&digest::sha256(&payload)),
        number_of_transactions: transactions.len() as u32,
        transactions,
    };
    logic::sign_block(secret, &mut block)?;
    Ok(block)
}

/// A forging delegate.
pub struct Forger {
    logic: Arc<TransactionLogic>,
    pool: Arc<TransactionPool>,
    reward: BlockReward,
    versions: BlockVersion,
    secret: Secret,
}

impl Forger {
    /// Create a forger signing with `secret`.
    pub fn new(
        logic: Arc<TransactionLogic>,
        pool: Arc<TransactionPool>,
        versions: BlockVersion,
        secret: Secret,
    ) -> Forger {
        Forger {
            reward: BlockReward::new(logic.params()),
            logic,
            pool,
            versions,
            secret,
        }
    }

    /// Forge a block for `timestamp`, draining up to a block's worth of
    /// transactions from the pool.
    pub fn forge<C: Client>(
        &self,
        client: &C,
        last_block: &Block,
        timestamp: EpochSeconds,
    ) -> Result<Block, Error> {
        let batch = self
            .pool
            .pop_sorted_unconfirmed(client, self.logic.params().max_txs_per_block);
        let transactions: Vec<Transaction> = batch.iter().map(|trs| (**trs).clone()).collect();
        debug!(
            target: "forge",
            "Forging block at height {} with {} transactions",
            last_block.height + 1,
            transactions.len(),
        );
        assemble(
            &self.logic,
            &self.reward,
            &self.versions,
            &self.secret,
            last_block,
            transactions,
            timestamp,
        )
    }
}
