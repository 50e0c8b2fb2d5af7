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

//! Shared test helpers.


use crypto::publickey::Public;
use ddk_types::{
    account::Address,
    transaction::{Transaction, TransactionAsset, TransactionKind, TransactionStatus},
    EpochSeconds,
};
use ethereum_types::H256;

/// Test transaction with the given amount and timestamp. The id stands
/// in for the canonical derivation and only needs to be unique.
pub fn tx_with(
    kind: TransactionKind,
    sender: &Public,
    id: u64,
    amount: u64,
    timestamp: EpochSeconds,
) -> Transaction {
    Transaction {
        id: H256::from_low_u64_be(id),
        kind,
        sender_public_key: *sender,
        sender_id: Address::from_public(sender),
        recipient_id: Some(Address(999)),
        amount,
        fee: 1,
        timestamp,
        signature: None,
        asset: TransactionAsset::None,
        status: TransactionStatus::Created,
    }
}

/// Test transaction with default amount and timestamp.
pub fn tx(kind: TransactionKind, sender: &Public, id: u64) -> Transaction {
    tx_with(kind, sender, id, 10, 100)
}
