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

//! The admission pipeline's ledger client, backed by the chain logic
//! and store.

use std::sync::Arc;

use crypto::publickey::Public;
use ddk_pool::{self, Client};
use ddk_types::{account::Account, transaction, transaction::Transaction};

use crate::{logic::TransactionLogic, store::ChainStore};

/// Ledger access handed to the transaction queue and pool.
#[derive(Clone)]
pub struct PoolClient {
    logic: Arc<TransactionLogic>,
    store: Arc<ChainStore>,
}

impl PoolClient {
    /// Create a client over the chain state.
    pub fn new(logic: Arc<TransactionLogic>, store: Arc<ChainStore>) -> PoolClient {
        PoolClient { logic, store }
    }
}

impl Client for PoolClient {
    fn get_or_create_account(&self, public: &Public) -> Result<Account, ddk_pool::Error> {
        Ok(self.logic.accounts().get_or_create(public))
    }

    fn verify(&self, trs: &Transaction, sender: &Account) -> Result<(), transaction::Error> {
        self.logic.verify(trs, sender)?;
        if self.store.transaction_confirmed(&trs.id) {
            return Err(transaction::Error::AlreadyConfirmed(trs.id));
        }
        Ok(())
    }

    fn verify_unconfirmed(
        &self,
        trs: &Transaction,
        sender: &Account,
    ) -> Result<(), transaction::Error> {
        self.logic.verify_unconfirmed(trs, sender)
    }

    fn apply_unconfirmed(&self, trs: &Transaction) -> Result<(), transaction::Error> {
        self.logic.apply_unconfirmed(trs)
    }

    fn undo_unconfirmed(&self, trs: &Transaction) -> Result<(), transaction::Error> {
        self.logic.undo_unconfirmed(trs)
    }
}
