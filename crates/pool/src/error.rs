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

use std::fmt;

use ddk_types::transaction;
use ethereum_types::H256;

/// Transaction pool error.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Transaction is already in the pool.
    AlreadyInPool(H256),
    /// Admission is gated by the pool lock.
    Locked,
    /// Another pending transaction on the same account orders after
    /// this one.
    PotentialConflict(H256),
    /// Ledger state was unreachable.
    Db(String),
    /// Verification or apply failure.
    Transaction(transaction::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AlreadyInPool(id) => write!(f, "[{id:?}] already in the pool"),
            Error::Locked => write!(f, "Transaction pool is locked"),
            Error::PotentialConflict(id) => write!(f, "[{id:?}] conflicts with the pending set"),
            Error::Db(err) => write!(f, "Ledger unavailable: {err}"),
            Error::Transaction(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<transaction::Error> for Error {
    fn from(err: transaction::Error) -> Self {
        Error::Transaction(err)
    }
}
