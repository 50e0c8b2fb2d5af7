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

//! Blocks.

use crate::{transaction::Transaction, BlockNumber, EpochSeconds};
use crypto::publickey::{Public, Signature};
use ethereum_types::H256;

/// A block.
///
/// `number_of_transactions` is carried separately from `transactions` so
/// that a count/body mismatch arriving off the wire is representable and
/// can be rejected by verification instead of being silently repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// sha256 of the canonical header bytes.
    pub id: H256,
    /// Height; set from the last block during verification.
    pub height: BlockNumber,
    /// Parent id, absent only for the genesis block.
    pub previous_block: Option<H256>,
    /// Seconds since the chain epoch.
    pub timestamp: EpochSeconds,
    /// Block format version.
    pub version: u32,
    /// Forging delegate key.
    pub generator_public_key: Public,
    /// Delegate signature over the header bytes.
    pub signature: Option<Signature>,
    /// Forging reward for this height.
    pub reward: u64,
    /// Declared sum of transaction amounts.
    pub total_amount: u64,
    /// Declared sum of transaction fees.
    pub total_fee: u64,
    /// Declared payload byte length.
    pub payload_length: u32,
    /// Rolling sha256 over the transaction payload.
    pub payload_hash: H256,
    /// Declared transaction count.
    pub number_of_transactions: u32,
    /// Transactions in packaging order.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Whether this block claims to be the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.height == 1
    }
}
