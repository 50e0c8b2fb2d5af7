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

//! Ledger and crypto access used during admission.

use crate::error::Error;
use crypto::publickey::Public;
use ddk_types::{account::Account, transaction, transaction::Transaction};

/// The pipeline's view of the ledger.
///
/// Implementations carry the chain's transaction logic and accounts
/// store; the pipeline itself never touches balances directly.
pub trait Client {
    /// Ledger account of the sender key, created empty when new.
    fn get_or_create_account(&self, public: &Public) -> Result<Account, Error>;

    /// First verification phase: signature, id derivation, shape and
    /// schedule checks, and the confirmed-duplicate check.
    fn verify(&self, trs: &Transaction, sender: &Account) -> Result<(), transaction::Error>;

    /// Second verification phase against unconfirmed state: balance
    /// sufficiency, vote limits and frozen-amount rules.
    fn verify_unconfirmed(
        &self,
        trs: &Transaction,
        sender: &Account,
    ) -> Result<(), transaction::Error>;

    /// Debit the sender's unconfirmed balance by the transaction cost.
    fn apply_unconfirmed(&self, trs: &Transaction) -> Result<(), transaction::Error>;

    /// Reverse `apply_unconfirmed`.
    fn undo_unconfirmed(&self, trs: &Transaction) -> Result<(), transaction::Error>;
}
