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

//! Block processing.
//!
//! Orchestrates acceptance of a block: verification, duplicate checks,
//! slot validation against the delegates module, application of the
//! confirmed effects and the feedback edge into the mempool. The pool
//! and queue are locked for the duration of application; afterwards the
//! conflicted queue is reshuffled and admission resumes.

use std::sync::Arc;

use ddk_pool::{Client, TransactionPool, TransactionQueue};
use ddk_types::{
    block::Block,
    transaction::{self, TransactionStatus},
};

use crate::{
    delegates::{Delegates, ForkKind},
    error::Error,
    logic::TransactionLogic,
    store::ChainStore,
    verifier::BlockVerifier,
};

/// Block acceptance orchestrator.
pub struct BlockProcessor<C> {
    store: Arc<ChainStore>,
    logic: Arc<TransactionLogic>,
    verifier: Arc<BlockVerifier>,
    pool: Arc<TransactionPool>,
    queue: Arc<TransactionQueue>,
    delegates: Arc<dyn Delegates>,
    client: C,
}

impl<C: Client + Clone + Send + 'static> BlockProcessor<C> {
    /// Wire the processor into the chain state and the mempool.
    pub fn new(
        store: Arc<ChainStore>,
        logic: Arc<TransactionLogic>,
        verifier: Arc<BlockVerifier>,
        pool: Arc<TransactionPool>,
        queue: Arc<TransactionQueue>,
        delegates: Arc<dyn Delegates>,
        client: C,
    ) -> BlockProcessor<C> {
        BlockProcessor {
            store,
            logic,
            verifier,
            pool,
            queue,
            delegates,
            client,
        }
    }

    /// Seed the verifier's recent-id ring from stored history.
    pub fn on_blockchain_ready(&self) {
        let window = self.logic.params().block_slot_window;
        self.verifier
            .on_blockchain_ready(self.store.last_block_ids(window));
    }

    /// Install the genesis block: credit its recipients and set the
    /// chain tip. Genesis transfers mint the initial supply, so no
    /// sender is debited.
    pub fn install_genesis(&self, genesis: Block) -> Result<(), Error> {
        if self.store.last_block().is_some() {
            return Err(Error::AlreadyKnown(genesis.id));
        }
        for trs in &genesis.transactions {
            let recipient = trs
                .recipient_id
                .ok_or(transaction::Error::MissingRecipient)?;
            self.logic
                .accounts()
                .update::<transaction::Error, _>(recipient, |account| {
                    account.balance = account.balance.saturating_add(trs.amount);
                    account.u_balance = account.u_balance.saturating_add(trs.amount);
                    Ok(())
                })?;
        }
        info!(target: "chain", "Installed genesis block {:?}", genesis.id);
        self.store.save_block(&genesis);
        self.verifier.on_new_block(genesis.id);
        Ok(())
    }

    /// Gate the admission pipeline for a critical section.
    pub fn lock_pool_and_queue(&self) {
        self.queue.lock();
        self.pool.lock();
    }

    /// Reopen the admission pipeline and kick a cycle.
    pub fn unlock_pool_and_queue(&self) {
        self.pool.unlock();
        self.queue.unlock();
        self.queue.trigger(&self.client);
    }

    /// Accept a block: verify (unless pre-verified), validate its slot,
    /// reject duplicated confirmed transactions, apply and store.
    pub fn process_block(&self, mut block: Block, verify: bool, save: bool) -> Result<(), Error> {
        let last_block = self.store.last_block().ok_or(Error::Uninitialized)?;

        if verify {
            let result = self.verifier.verify_block(&mut block, &last_block);
            if !result.verified() {
                return Err(Error::Verification(result.errors));
            }
        } else {
            block.height = last_block.height + 1;
        }

        if save && self.store.has_block(&block.id) {
            return Err(Error::AlreadyKnown(block.id));
        }

        if !self.delegates.validate_block_slot(&block) {
            self.delegates.fork(&block, ForkKind::WrongSlot);
            return Err(Error::InvalidSlotDelegate);
        }

        self.check_transactions(&block)?;
        self.apply_block(block, save)
    }

    /// A transaction that is already confirmed must not be applied
    /// twice; its stale pool copy is evicted and a type-2 fork recorded.
    fn check_transactions(&self, block: &Block) -> Result<(), Error> {
        for trs in &block.transactions {
            if self.store.transaction_confirmed(&trs.id) {
                warn!(
                    target: "chain",
                    "Block {:?} carries confirmed transaction {:?}",
                    block.id,
                    trs.id,
                );
                self.delegates
                    .fork(block, ForkKind::DuplicateConfirmedTransaction);
                self.pool.remove_by_id(&self.client, &trs.id);
                return Err(Error::Transaction(transaction::Error::AlreadyConfirmed(
                    trs.id,
                )));
            }
        }
        Ok(())
    }

    fn apply_block(&self, mut block: Block, save: bool) -> Result<(), Error> {
        self.lock_pool_and_queue();

        let applied = self.apply_transactions(&mut block);
        let result = match applied {
            Ok(()) => {
                if save {
                    self.store.save_block(&block);
                }
                self.verifier.on_new_block(block.id);
                info!(
                    target: "chain",
                    "Imported block #{} {:?} ({} transactions)",
                    block.height,
                    block.id,
                    block.transactions.len(),
                );
                Ok(())
            }
            Err(err) => {
                error!(target: "chain", "Failed to apply block {:?}: {}", block.id, err);
                Err(err)
            }
        };

        self.pool.unlock();
        self.queue.unlock();
        self.queue.reshuffle();
        self.queue.trigger(&self.client);
        result
    }

    fn apply_transactions(&self, block: &mut Block) -> Result<(), Error> {
        for trs in &mut block.transactions {
            // Evict the pending copy; its unconfirmed effects are
            // undone before the confirmed ones land.
            self.pool.remove_by_id(&self.client, &trs.id);
            self.logic.apply(trs)?;
            trs.status = TransactionStatus::Confirmed;
        }
        self.logic.apply_forging_reward(block)?;
        Ok(())
    }
}
