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

//! Interface to the delegates module.

use ddk_types::block::Block;

/// Consensus rule a rejected block violated, recorded as a node-local
/// fork signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkKind {
    /// Parent id does not continue the chain tip.
    WrongPreviousBlock,
    /// Block carries an already confirmed transaction.
    DuplicateConfirmedTransaction,
    /// Forging delegate does not own the block slot.
    WrongSlot,
}

impl ForkKind {
    /// Numeric fork cause.
    pub fn code(self) -> u8 {
        match self {
            ForkKind::WrongPreviousBlock => 1,
            ForkKind::DuplicateConfirmedTransaction => 2,
            ForkKind::WrongSlot => 3,
        }
    }
}

/// The delegates module as seen by block processing.
pub trait Delegates: Send + Sync {
    /// Record a fork signal.
    fn fork(&self, block: &Block, cause: ForkKind);

    /// Whether the block's generator owns the slot its timestamp falls
    /// into.
    fn validate_block_slot(&self, block: &Block) -> bool;
}

/// Delegates sink that accepts every slot and only logs fork signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDelegates;

impl Delegates for NullDelegates {
    fn fork(&self, block: &Block, cause: ForkKind) {
        warn!(
            target: "fork",
            "Fork type {} observed at height {} ({:?})",
            cause.code(),
            block.height,
            block.id,
        );
    }

    fn validate_block_slot(&self, _block: &Block) -> bool {
        true
    }
}
