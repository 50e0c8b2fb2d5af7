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

use crypto::publickey;
use ddk_types::{transaction, BlockNumber};
use ethereum_types::H256;

/// A single failed block verification check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// Delegate signature does not verify.
    InvalidSignature,
    /// Non-genesis block without a parent id.
    MissingPreviousBlock,
    /// Block id seen among the recently accepted blocks.
    AlreadyProcessed(H256),
    /// Receipt slot older than the acceptance window.
    SlotTooOld {
        /// Slot of the block timestamp.
        block_slot: u32,
        /// Slot of the node clock.
        current_slot: u32,
    },
    /// Receipt slot ahead of the node clock.
    SlotInFuture {
        /// Slot of the block timestamp.
        block_slot: u32,
        /// Slot of the node clock.
        current_slot: u32,
    },
    /// Version not allowed at this height.
    InvalidVersion {
        /// Declared version.
        version: u32,
        /// Block height.
        height: BlockNumber,
    },
    /// Declared id does not match the recomputed one.
    InvalidId {
        /// Recomputed id.
        expected: H256,
        /// Declared id.
        got: H256,
    },
    /// Payload length above the cap.
    PayloadTooLarge {
        /// Configured cap.
        limit: usize,
        /// Declared length.
        got: usize,
    },
    /// Body does not match the declared transaction count.
    TransactionCountMismatch {
        /// Declared count.
        declared: u32,
        /// Transactions carried.
        got: usize,
    },
    /// More transactions than a block may carry.
    TooManyTransactions {
        /// Configured cap.
        limit: usize,
        /// Transactions carried.
        got: usize,
    },
    /// The same transaction id appears twice in the payload.
    DuplicateTransaction(H256),
    /// Recomputed payload hash differs from the declared one.
    InvalidPayloadHash {
        /// Recomputed hash.
        expected: H256,
        /// Declared hash.
        got: H256,
    },
    /// Summed amounts differ from the declared total.
    InvalidTotalAmount {
        /// Summed amount.
        expected: u64,
        /// Declared total.
        got: u64,
    },
    /// Summed fees differ from the declared total.
    InvalidTotalFee {
        /// Summed fees.
        expected: u64,
        /// Declared total.
        got: u64,
    },
    /// Reward differs from the schedule.
    InvalidReward {
        /// Scheduled reward.
        expected: u64,
        /// Declared reward.
        got: u64,
    },
    /// Parent id does not continue the current chain tip.
    ForkPreviousBlock {
        /// Current tip id.
        expected: H256,
        /// Declared parent.
        got: Option<H256>,
    },
    /// Timestamp slot not in the window between the tip and now.
    InvalidBlockSlot {
        /// Slot of the block timestamp.
        block_slot: u32,
        /// Slot of the chain tip.
        last_slot: u32,
        /// Slot of the node clock.
        current_slot: u32,
    },
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BlockError::InvalidSignature => write!(f, "Failed to verify block signature"),
            BlockError::MissingPreviousBlock => write!(f, "Invalid previous block"),
            BlockError::AlreadyProcessed(id) => write!(f, "Block already processed: {id:?}"),
            BlockError::SlotTooOld {
                block_slot,
                current_slot,
            } => write!(f, "Block slot is too old: {block_slot} < {current_slot}"),
            BlockError::SlotInFuture {
                block_slot,
                current_slot,
            } => write!(f, "Block slot is in the future: {block_slot} > {current_slot}"),
            BlockError::InvalidVersion { version, height } => {
                write!(f, "Invalid block version {version} at height {height}")
            }
            BlockError::InvalidId { expected, got } => {
                write!(f, "Invalid block id: expected {expected:?}, got {got:?}")
            }
            BlockError::PayloadTooLarge { limit, got } => {
                write!(f, "Payload length is too big: {got} > {limit}")
            }
            BlockError::TransactionCountMismatch { declared, got } => write!(
                f,
                "Included transactions do not match block transactions count: {got} != {declared}",
            ),
            BlockError::TooManyTransactions { limit, got } => write!(
                f,
                "Number of transactions exceeds maximum per block: {got} > {limit}",
            ),
            BlockError::DuplicateTransaction(id) => {
                write!(f, "Encountered duplicate transaction: {id:?}")
            }
            BlockError::InvalidPayloadHash { expected, got } => {
                write!(f, "Invalid payload hash: expected {expected:?}, got {got:?}")
            }
            BlockError::InvalidTotalAmount { expected, got } => {
                write!(f, "Invalid total amount: expected {expected}, got {got}")
            }
            BlockError::InvalidTotalFee { expected, got } => {
                write!(f, "Invalid total fee: expected {expected}, got {got}")
            }
            BlockError::InvalidReward { expected, got } => {
                write!(f, "Invalid block reward: expected {expected}, got {got}")
            }
            BlockError::ForkPreviousBlock { expected, got } => write!(
                f,
                "Invalid previous block: expected {expected:?}, got {got:?}",
            ),
            BlockError::InvalidBlockSlot {
                block_slot,
                last_slot,
                current_slot,
            } => write!(
                f,
                "Invalid block slot: {block_slot} not in ({last_slot}, {current_slot}]",
            ),
        }
    }
}

impl std::error::Error for BlockError {}

/// Block processing error.
#[derive(Debug)]
pub enum Error {
    /// Verification checks failed.
    Verification(Vec<BlockError>),
    /// Block id already stored.
    AlreadyKnown(H256),
    /// The forging delegate does not own the block slot.
    InvalidSlotDelegate,
    /// No chain tip; the genesis block was never installed.
    Uninitialized,
    /// Transaction-level failure during checks or application.
    Transaction(transaction::Error),
    /// Key handling failure.
    Crypto(publickey::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Verification(errors) => {
                write!(f, "Block verification failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{err}")?;
                }
                Ok(())
            }
            Error::AlreadyKnown(id) => write!(f, "Block already known: {id:?}"),
            Error::InvalidSlotDelegate => write!(f, "Delegate does not own the block slot"),
            Error::Uninitialized => write!(f, "Blockchain is not initialized"),
            Error::Transaction(err) => write!(f, "{err}"),
            Error::Crypto(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<transaction::Error> for Error {
    fn from(err: transaction::Error) -> Self {
        Error::Transaction(err)
    }
}

impl From<publickey::Error> for Error {
    fn from(err: publickey::Error) -> Self {
        Error::Crypto(err)
    }
}
