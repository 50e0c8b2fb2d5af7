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

//! Transactions, their lifecycle and the canonical pool ordering.

use std::{cmp::Ordering, fmt};

use crate::{account::Address, EpochSeconds};
use crypto::publickey::{Public, Signature};
use ethereum_types::H256;

/// Transaction kind.
///
/// The numeric codes are part of the canonical byte layout and must not
/// be reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransactionKind {
    /// Plain balance transfer.
    Send,
    /// Installs a second signing key on the sender account.
    Signature,
    /// Delegate vote update.
    Vote,
    /// Links the sender to a referrer account.
    Referral,
    /// Freezes part of the sender balance as a stake order.
    Stake,
    /// Hands an active stake order over to another account.
    SendStake,
}

impl TransactionKind {
    /// Wire code of this kind.
    pub fn code(self) -> u8 {
        match self {
            TransactionKind::Send => 0,
            TransactionKind::Signature => 1,
            TransactionKind::Vote => 2,
            TransactionKind::Referral => 3,
            TransactionKind::Stake => 4,
            TransactionKind::SendStake => 5,
        }
    }

    /// Inverse of `code`.
    pub fn from_code(code: u8) -> Option<TransactionKind> {
        match code {
            0 => Some(TransactionKind::Send),
            1 => Some(TransactionKind::Signature),
            2 => Some(TransactionKind::Vote),
            3 => Some(TransactionKind::Referral),
            4 => Some(TransactionKind::Stake),
            5 => Some(TransactionKind::SendStake),
            _ => None,
        }
    }
}

/// A single vote entry of a VOTE transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    /// Vote for a delegate.
    Add(Public),
    /// Withdraw a vote from a delegate.
    Remove(Public),
}

impl Vote {
    /// Delegate this vote refers to.
    pub fn delegate(&self) -> &Public {
        match self {
            Vote::Add(public) | Vote::Remove(public) => public,
        }
    }
}

/// Kind-specific transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransactionAsset {
    /// SEND, STAKE and SENDSTAKE carry no payload beyond amount/recipient.
    #[default]
    None,
    /// SIGNATURE payload.
    SecondSignature {
        /// The key being installed.
        public_key: Public,
    },
    /// VOTE payload.
    Votes {
        /// Vote updates, at most `max_votes_per_transaction`.
        votes: Vec<Vote>,
    },
    /// REFERRAL payload.
    Referral {
        /// The referrer being linked.
        referral: Address,
    },
}

/// Lifecycle tag of a transaction moving through the admission pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Built, not yet submitted.
    Created,
    /// Accepted into the admission queue.
    Queued,
    /// Parked in the conflicted queue awaiting reshuffle.
    QueuedAsConflicted,
    /// Passed both verification phases.
    Verified,
    /// Rejected; will not be retried.
    Declined,
    /// Inserted into the pool indexes.
    PutInPool,
    /// In the pool with its unconfirmed balance effects applied.
    UnconfirmApplied,
    /// Included in an accepted block.
    Confirmed,
}

/// A transaction.
///
/// `id` is derived from the canonical byte layout owned by the chain
/// logic; everything except `status` is immutable once signed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// sha256 of the canonical bytes.
    pub id: H256,
    /// Transaction kind.
    pub kind: TransactionKind,
    /// Signing key of the sender.
    pub sender_public_key: Public,
    /// Address derived from `sender_public_key`.
    pub sender_id: Address,
    /// Counterparty, where the kind has one.
    pub recipient_id: Option<Address>,
    /// Transferred (or staked) amount.
    pub amount: u64,
    /// Fee paid to the forger.
    pub fee: u64,
    /// Seconds since the chain epoch.
    pub timestamp: EpochSeconds,
    /// Sender signature over the canonical bytes.
    pub signature: Option<Signature>,
    /// Kind-specific payload.
    pub asset: TransactionAsset,
    /// Lifecycle tag; not part of the signed content.
    pub status: TransactionStatus,
}

impl Transaction {
    /// Total cost charged against the sender balance.
    pub fn cost(&self) -> u64 {
        self.amount.saturating_add(self.fee)
    }
}

/// The canonical pool ordering.
///
/// A strict total order derived from transaction content alone, so two
/// independent nodes ordering the same set produce identical sequences.
/// The key is `(kind code, timestamp, amount descending, id)`; the id is
/// the final tie-break and makes the order total. Admission, conflict
/// resolution and block packaging all use this ordering, which makes the
/// comparator consensus-visible: changing it is a hard fork.
pub fn ordering(a: &Transaction, b: &Transaction) -> Ordering {
    a.kind
        .code()
        .cmp(&b.kind.code())
        .then_with(|| a.timestamp.cmp(&b.timestamp))
        .then_with(|| b.amount.cmp(&a.amount))
        .then_with(|| a.id.cmp(&b.id))
}

/// Transaction verification error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Transaction id is already confirmed on chain.
    AlreadyConfirmed(H256),
    /// Declared id does not match the recomputed one.
    InvalidId {
        /// Recomputed id.
        expected: H256,
        /// Declared id.
        got: H256,
    },
    /// Signature field is absent.
    MissingSignature,
    /// Signature does not verify against the sender key.
    InvalidSignature,
    /// Declared sender address does not match the sender key.
    InvalidSenderAddress {
        /// Address derived from the sender key.
        expected: Address,
        /// Declared address.
        got: Address,
    },
    /// Kind requires a recipient and none was given.
    MissingRecipient,
    /// Asset payload does not match the transaction kind.
    InvalidAsset,
    /// Amount must be non-zero for this kind.
    ZeroAmount,
    /// Fee below the schedule for this kind.
    InsufficientFee {
        /// Scheduled fee.
        minimal: u64,
        /// Declared fee.
        got: u64,
    },
    /// Timestamp is ahead of the node clock.
    TimestampInFuture {
        /// Node time, epoch seconds.
        now: EpochSeconds,
        /// Transaction timestamp.
        got: EpochSeconds,
    },
    /// Unconfirmed balance cannot cover amount + fee.
    InsufficientBalance {
        /// amount + fee.
        cost: u64,
        /// Sender unconfirmed balance.
        balance: u64,
    },
    /// VOTE carries more entries than allowed.
    TooManyVotes {
        /// Allowed maximum.
        max: usize,
        /// Entries carried.
        got: usize,
    },
    /// SENDSTAKE exceeds the sender's unconfirmed frozen amount.
    InsufficientFrozenAmount {
        /// Stake being moved.
        required: u64,
        /// Unconfirmed frozen amount.
        available: u64,
    },
    /// STAKE below the configured minimum.
    BelowMinimumStake {
        /// Configured minimum.
        minimal: u64,
        /// Staked amount.
        got: u64,
    },
    /// SIGNATURE for an account that already has a second key.
    SecondSignatureExists,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AlreadyConfirmed(id) => write!(f, "Transaction is already confirmed: {id:?}"),
            Error::InvalidId { expected, got } => {
                write!(f, "Invalid transaction id: expected {expected:?}, got {got:?}")
            }
            Error::MissingSignature => write!(f, "Missing signature"),
            Error::InvalidSignature => write!(f, "Failed to verify signature"),
            Error::InvalidSenderAddress { expected, got } => {
                write!(f, "Invalid sender address: expected {expected}, got {got}")
            }
            Error::MissingRecipient => write!(f, "Missing recipient"),
            Error::InvalidAsset => write!(f, "Asset does not match transaction kind"),
            Error::ZeroAmount => write!(f, "Invalid transaction amount"),
            Error::InsufficientFee { minimal, got } => {
                write!(f, "Insufficient fee: {got} < {minimal}")
            }
            Error::TimestampInFuture { now, got } => {
                write!(f, "Invalid timestamp: {got} is ahead of {now}")
            }
            Error::InsufficientBalance { cost, balance } => {
                write!(f, "Insufficient unconfirmed balance: {balance} < {cost}")
            }
            Error::TooManyVotes { max, got } => {
                write!(f, "Voting limit exceeded: {got} > {max}")
            }
            Error::InsufficientFrozenAmount {
                required,
                available,
            } => write!(f, "Insufficient frozen amount: {available} < {required}"),
            Error::BelowMinimumStake { minimal, got } => {
                write!(f, "Stake below minimum: {got} < {minimal}")
            }
            Error::SecondSignatureExists => write!(f, "Second signature already enabled"),
        }
    }
}

impl std::error::Error for Error {}
