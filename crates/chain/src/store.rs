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

//! In-memory chain store: accepted blocks and confirmed transaction ids.

use std::collections::{HashMap, HashSet};

use ddk_types::{block::Block, BlockNumber};
use ethereum_types::H256;
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct Inner {
    blocks: HashMap<H256, Block>,
    // Accepted ids in height order.
    order: Vec<H256>,
    confirmed: HashSet<H256>,
}

/// Accepted chain state.
#[derive(Debug, Default)]
pub struct ChainStore {
    inner: RwLock<Inner>,
}

impl ChainStore {
    /// Create an empty store.
    pub fn new() -> ChainStore {
        ChainStore::default()
    }

    /// Append an accepted block and record its transaction ids as
    /// confirmed.
    pub fn save_block(&self, block: &Block) {
        let mut inner = self.inner.write();
        inner.order.push(block.id);
        inner
            .confirmed
            .extend(block.transactions.iter().map(|trs| trs.id));
        inner.blocks.insert(block.id, block.clone());
        debug!(
            target: "chain",
            "Saved block {:?} at height {} with {} transactions",
            block.id,
            block.height,
            block.transactions.len(),
        );
    }

    /// Whether a block id is stored.
    pub fn has_block(&self, id: &H256) -> bool {
        self.inner.read().blocks.contains_key(id)
    }

    /// Stored block by id.
    pub fn block(&self, id: &H256) -> Option<Block> {
        self.inner.read().blocks.get(id).cloned()
    }

    /// The chain tip.
    pub fn last_block(&self) -> Option<Block> {
        let inner = self.inner.read();
        inner
            .order
            .last()
            .and_then(|id| inner.blocks.get(id))
            .cloned()
    }

    /// Height of the chain tip, zero when uninitialized.
    pub fn height(&self) -> BlockNumber {
        self.last_block().map(|block| block.height).unwrap_or(0)
    }

    /// Whether a transaction id was confirmed by an accepted block.
    pub fn transaction_confirmed(&self, id: &H256) -> bool {
        self.inner.read().confirmed.contains(id)
    }

    /// The newest `limit` accepted block ids, oldest first. Seeds the
    /// verifier's recent-id ring on startup.
    pub fn last_block_ids(&self, limit: usize) -> Vec<H256> {
        let inner = self.inner.read();
        let skip = inner.order.len().saturating_sub(limit);
        inner.order[skip..].to_vec()
    }
}
