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

//! In-memory accounts store.
//!
//! Keyed by derived address. Balance arithmetic lives with the chain
//! logic; the store only guarantees that each `update` observes and
//! publishes a consistent account snapshot.

extern crate parity_crypto as crypto;

#[macro_use]
extern crate log;

use std::collections::HashMap;

use crypto::publickey::Public;
use ddk_types::account::{Account, Address};
use parking_lot::RwLock;

/// Shared accounts store.
#[derive(Debug, Default)]
pub struct AccountDb {
    accounts: RwLock<HashMap<Address, Account>>,
}

impl AccountDb {
    /// Create an empty store.
    pub fn new() -> AccountDb {
        AccountDb::default()
    }

    /// Snapshot of an account.
    pub fn get(&self, address: &Address) -> Option<Account> {
        self.accounts.read().get(address).cloned()
    }

    /// Account owned by `public`, created empty on first sight. Installs
    /// the public key on accounts that were credited before ever signing.
    pub fn get_or_create(&self, public: &Public) -> Account {
        let address = Address::from_public(public);
        let mut accounts = self.accounts.write();
        let account = accounts
            .entry(address)
            .or_insert_with(|| Account::new(address));
        if account.public_key.is_none() {
            trace!(target: "accounts", "Installing public key for {address}");
            account.public_key = Some(*public);
        }
        account.clone()
    }

    /// Insert or replace an account.
    pub fn insert(&self, account: Account) {
        self.accounts.write().insert(account.address, account);
    }

    /// Mutate an account under the write lock, creating it empty when
    /// absent. The closure's error aborts the mutation.
    pub fn update<E, F>(&self, address: Address, f: F) -> Result<(), E>
    where
        F: FnOnce(&mut Account) -> Result<(), E>,
    {
        let mut accounts = self.accounts.write();
        let account = accounts
            .entry(address)
            .or_insert_with(|| Account::new(address));
        let mut updated = account.clone();
        f(&mut updated)?;
        *account = updated;
        Ok(())
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Drop all accounts.
    pub fn clear(&self) {
        self.accounts.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_account_on_first_sight() {
        let db = AccountDb::new();
        let public = Public::from_low_u64_be(1);

        let account = db.get_or_create(&public);
        assert_eq!(account.public_key, Some(public));
        assert_eq!(account.balance, 0);
        assert_eq!(db.len(), 1);

        // Second lookup returns the same account.
        assert_eq!(db.get_or_create(&public), account);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn installs_key_on_credited_account() {
        let db = AccountDb::new();
        let public = Public::from_low_u64_be(1);
        let address = Address::from_public(&public);

        let mut credited = Account::new(address);
        credited.balance = 100;
        credited.u_balance = 100;
        db.insert(credited);

        let account = db.get_or_create(&public);
        assert_eq!(account.public_key, Some(public));
        assert_eq!(account.balance, 100);
    }

    #[test]
    fn update_aborts_on_error() {
        let db = AccountDb::new();
        let public = Public::from_low_u64_be(1);
        let address = db.get_or_create(&public).address;

        let result: Result<(), &str> = db.update(address, |account| {
            account.balance = 42;
            Err("nope")
        });

        assert!(result.is_err());
        assert_eq!(db.get(&address).unwrap().balance, 0);
    }
}
