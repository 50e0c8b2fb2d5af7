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

//! Transaction admission pipeline.
//!
//! Transactions submitted by users and peers enter the [`TransactionQueue`],
//! are verified in two phases against current ledger state, checked for
//! conflicts with the pending set, and land in the [`TransactionPool`]
//! with their unconfirmed balance effects applied. Block production drains
//! the pool through [`TransactionPool::pop_sorted_unconfirmed`]. All
//! ledger-visible mutations are serialized through the [`Sequence`]
//! worker.

extern crate parity_crypto as crypto;

#[macro_use]
extern crate log;
#[macro_use]
extern crate trace_time;

pub mod client;
pub mod conflict;
pub mod error;
pub mod listener;
pub mod pool;
pub mod queue;
pub mod sequence;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use self::{
    client::Client,
    conflict::is_potential_conflict,
    error::Error,
    listener::{AccountSessions, Notifier, NullSessions, POOL_VERIFY_CHANNEL},
    pool::{Options, Status, TransactionPool},
    queue::TransactionQueue,
    sequence::{Sequence, SequenceConfig},
    verifier::{Verifier, VerifyMessage},
};
