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

//! Chain logic and block verification.
//!
//! The chain side of the node: canonical byte layouts and signatures,
//! the accounts-backed transaction logic consumed by the admission
//! pipeline, the pre-apply block verifier and the block processor that
//! feeds accepted state back into the mempool.

extern crate parity_crypto as crypto;

#[macro_use]
extern crate log;

pub mod delegates;
pub mod error;
pub mod forge;
pub mod logic;
pub mod pool_client;
pub mod process;
pub mod reward;
pub mod store;
pub mod verifier;
pub mod version;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use self::{
    delegates::{Delegates, ForkKind, NullDelegates},
    error::{BlockError, Error},
    forge::Forger,
    logic::TransactionLogic,
    pool_client::PoolClient,
    process::BlockProcessor,
    reward::BlockReward,
    store::ChainStore,
    verifier::{BlockVerifier, VerifyResult},
    version::BlockVersion,
};
