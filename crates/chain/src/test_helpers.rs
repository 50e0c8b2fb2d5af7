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

//! Shared test fixtures.

use std::sync::{
    atomic::{AtomicBool, Ordering as AtomicOrdering},
    Arc,
};

use crypto::{
    digest,
    publickey::{Generator, KeyPair, Random},
};
use ddk_types::{
    block::Block,
    transaction::Transaction,
    BlockNumber, EpochSeconds,
};
use ethereum_types::H256;
use parking_lot::Mutex;

use crate::{
    delegates::{Delegates, ForkKind},
    forge,
    logic::{self, TransactionLogic},
    reward::BlockReward,
    version::BlockVersion,
};

/// A signed, empty genesis block.
pub fn genesis() -> Block {
    let delegate = Random.generate();
    let mut block = Block {
        id: H256::zero(),
        height: 1,
        previous_block: None,
        timestamp: 0,
        version: 1,
        generator_public_key: *delegate.public(),
        signature: None,
        reward: 0,
        total_amount: 0,
        total_fee: 0,
        payload_length: 0,
        payload_hash: H256::from_slice(&digest::sha256(&[])),
        number_of_transactions: 0,
        transactions: Vec::new(),
    };
    logic::sign_block(delegate.secret(), &mut block).expect("valid generated secret");
    block
}

/// Unsigned placeholder block for store-level tests.
pub fn empty_block_at(height: BlockNumber, previous: Option<H256>) -> Block {
    Block {
        id: H256::from_low_u64_be(7_000 + height),
        height,
        previous_block: previous,
        timestamp: 0,
        version: 1,
        generator_public_key: Default::default(),
        signature: None,
        reward: 0,
        total_amount: 0,
        total_fee: 0,
        payload_length: 0,
        payload_hash: H256::from_slice(&digest::sha256(&[])),
        number_of_transactions: 0,
        transactions: Vec::new(),
    }
}

/// A block continuing `last`, forged by `delegate` with the given body.
pub fn block_with(
    logic: &Arc<TransactionLogic>,
    delegate: &KeyPair,
    last: &Block,
    transactions: Vec<Transaction>,
    timestamp: EpochSeconds,
) -> Block {
    forge::assemble(
        logic,
        &BlockReward::new(logic.params()),
        &BlockVersion::default(),
        delegate.secret(),
        last,
        transactions,
        timestamp,
    )
    .expect("valid delegate secret")
}

/// An empty block continuing `last`.
pub fn block_at(
    logic: &Arc<TransactionLogic>,
    delegate: &KeyPair,
    last: &Block,
    timestamp: EpochSeconds,
) -> Block {
    block_with(logic, delegate, last, Vec::new(), timestamp)
}

/// Delegates mock recording fork signals.
#[derive(Default)]
pub struct TestDelegates {
    forks: Mutex<Vec<(H256, ForkKind)>>,
    invalid_slots: AtomicBool,
}

impl TestDelegates {
    /// Recorded fork signals.
    pub fn forks(&self) -> Vec<(H256, ForkKind)> {
        self.forks.lock().clone()
    }

    /// Make `validate_block_slot` accept or refuse every block.
    pub fn set_valid_slots(&self, valid: bool) {
        self.invalid_slots.store(!valid, AtomicOrdering::SeqCst);
    }
}

impl Delegates for TestDelegates {
    fn fork(&self, block: &Block, cause: ForkKind) {
        self.forks.lock().push((block.id, cause));
    }

    fn validate_block_slot(&self, _block: &Block) -> bool {
        !self.invalid_slots.load(AtomicOrdering::SeqCst)
    }
}
