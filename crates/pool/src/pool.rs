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

//! Transaction pool (mempool).
//!
//! Three indexes over the pending set: `by_id` is the source of truth,
//! `by_sender` holds one bucket per account, `by_recipient` tracks SEND
//! transactions only. Every pooled transaction has its unconfirmed
//! balance effects already applied (`UnconfirmApplied`); push and remove
//! keep the indexes and the ledger's unconfirmed balances in step.

use std::{
    cmp,
    collections::{HashMap, HashSet},
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        Arc,
    },
};

use crypto::publickey::Public;
use ddk_types::{
    account::Address,
    transaction::{self, Transaction, TransactionKind, TransactionStatus},
};
use ethereum_types::H256;
use parking_lot::RwLock;

use crate::{client::Client, conflict, error::Error, listener::Notifier};

/// Pool limits.
#[derive(Debug, Clone)]
pub struct Options {
    /// Upper bound for transaction-listing queries.
    pub max_shared_txs: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_shared_txs: 100,
        }
    }
}

/// Pool status snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Pending transactions.
    pub transactions: usize,
    /// Accounts with at least one pending transaction.
    pub senders: usize,
}

impl fmt::Display for Status {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Pool: {} transactions ({} senders)",
            self.transactions, self.senders,
        )
    }
}

#[derive(Debug, Default)]
struct Indexes {
    by_id: HashMap<H256, Arc<Transaction>>,
    by_sender: HashMap<Address, Vec<Arc<Transaction>>>,
    by_recipient: HashMap<Address, Vec<Arc<Transaction>>>,
}

impl Indexes {
    fn link(&mut self, trs: &Arc<Transaction>) {
        self.by_sender
            .entry(trs.sender_id)
            .or_default()
            .push(trs.clone());
        if trs.kind == TransactionKind::Send {
            if let Some(recipient) = trs.recipient_id {
                self.by_recipient
                    .entry(recipient)
                    .or_default()
                    .push(trs.clone());
            }
        }
    }

    fn insert(&mut self, trs: Arc<Transaction>) {
        self.link(&trs);
        self.by_id.insert(trs.id, trs);
    }

    fn remove(&mut self, id: &H256) -> Option<Arc<Transaction>> {
        let trs = self.by_id.remove(id)?;
        if let Some(bucket) = self.by_sender.get_mut(&trs.sender_id) {
            bucket.retain(|t| t.id != *id);
            if bucket.is_empty() {
                self.by_sender.remove(&trs.sender_id);
            }
        }
        if let Some(recipient) = trs.recipient_id {
            if let Some(bucket) = self.by_recipient.get_mut(&recipient) {
                bucket.retain(|t| t.id != *id);
                if bucket.is_empty() {
                    self.by_recipient.remove(&recipient);
                }
            }
        }
        Some(trs)
    }
}

/// The mempool.
#[derive(Debug)]
pub struct TransactionPool {
    indexes: RwLock<Indexes>,
    options: Options,
    locked: AtomicBool,
    notifier: Notifier,
}

impl TransactionPool {
    /// Create an empty pool.
    pub fn new(options: Options) -> TransactionPool {
        TransactionPool {
            indexes: RwLock::new(Indexes::default()),
            options,
            locked: AtomicBool::new(false),
            notifier: Notifier::default(),
        }
    }

    /// Add a callback notified about every transaction entering the pool.
    pub fn add_listener(&self, f: Box<dyn Fn(&Transaction) + Send + Sync>) {
        self.notifier.add(f);
    }

    /// Admit a verified transaction: apply its unconfirmed balance
    /// effects and insert it into all indexes. Returns `true` iff the
    /// transaction is now in the pool.
    pub fn push<C: Client>(
        &self,
        client: &C,
        trs: Transaction,
        broadcast: bool,
        force: bool,
    ) -> bool {
        let id = trs.id;
        match self.try_push(client, trs, broadcast, force) {
            Ok(()) => true,
            Err(err) => {
                debug!(target: "txpool", "[{id:?}] Rejected: {err}");
                false
            }
        }
    }

    fn try_push<C: Client>(
        &self,
        client: &C,
        mut trs: Transaction,
        broadcast: bool,
        force: bool,
    ) -> Result<(), Error> {
        trace_time!("pool::push");

        if self.lock_status() && !force {
            return Err(Error::Locked);
        }
        if self.has(&trs.id) {
            return Err(Error::AlreadyInPool(trs.id));
        }
        if conflict::is_potential_conflict(self, &trs) {
            return Err(Error::PotentialConflict(trs.id));
        }

        trs.status = TransactionStatus::PutInPool;
        if let Err(err) = client.apply_unconfirmed(&trs) {
            trs.status = TransactionStatus::Declined;
            return Err(err.into());
        }
        trs.status = TransactionStatus::UnconfirmApplied;

        let trs = Arc::new(trs);
        self.indexes.write().insert(trs.clone());
        debug!(target: "txpool", "[{:?}] Put in the pool, sender {}", trs.id, trs.sender_id);

        if broadcast {
            self.notifier.notify(&trs);
        }
        Ok(())
    }

    /// Remove a transaction and reverse its unconfirmed effects.
    /// Returns `true` iff it was present.
    pub fn remove<C: Client>(&self, client: &C, trs: &Transaction) -> bool {
        self.remove_by_id(client, &trs.id).is_some()
    }

    /// Remove-and-return by id.
    pub fn remove_by_id<C: Client>(&self, client: &C, id: &H256) -> Option<Arc<Transaction>> {
        let trs = self.indexes.write().remove(id)?;
        // Removal proceeds even when the undo fails.
        if let Err(err) = client.undo_unconfirmed(&trs) {
            warn!(target: "txpool", "[{id:?}] Failed to undo unconfirmed: {err}");
        }
        debug!(target: "txpool", "[{id:?}] Removed from the pool");
        Some(trs)
    }

    /// Remove-and-return.
    pub fn pop<C: Client>(&self, client: &C, trs: &Transaction) -> Option<Arc<Transaction>> {
        self.remove_by_id(client, &trs.id)
    }

    /// Look up a transaction by id.
    pub fn get(&self, id: &H256) -> Option<Arc<Transaction>> {
        self.indexes.read().by_id.get(id).cloned()
    }

    /// Whether an id is pending.
    pub fn has(&self, id: &H256) -> bool {
        self.indexes.read().by_id.contains_key(id)
    }

    /// Number of pending transactions.
    pub fn size(&self) -> usize {
        self.indexes.read().by_id.len()
    }

    /// Pending transactions sent by `address`.
    pub fn transactions_by_sender(&self, address: &Address) -> Vec<Arc<Transaction>> {
        self.indexes
            .read()
            .by_sender
            .get(address)
            .cloned()
            .unwrap_or_default()
    }

    /// Pending SEND transactions towards `address`.
    pub fn transactions_by_recipient(&self, address: &Address) -> Vec<Arc<Transaction>> {
        self.indexes
            .read()
            .by_recipient
            .get(address)
            .cloned()
            .unwrap_or_default()
    }

    /// Pending transactions an account depends on: incoming SENDs and
    /// everything it sent, deduplicated by id.
    pub fn dependent_transactions(&self, address: &Address) -> Vec<Arc<Transaction>> {
        let indexes = self.indexes.read();
        let mut seen = HashSet::new();
        let mut dependent = Vec::new();
        for bucket in [
            indexes.by_recipient.get(address),
            indexes.by_sender.get(address),
        ]
        .into_iter()
        .flatten()
        {
            for trs in bucket {
                if seen.insert(trs.id) {
                    dependent.push(trs.clone());
                }
            }
        }
        dependent
    }

    /// Whether admitting `trs` now would conflict with the pending set.
    pub fn is_potential_conflict(&self, trs: &Transaction) -> bool {
        conflict::is_potential_conflict(self, trs)
    }

    /// Purge every pending transaction sent by `address`.
    pub fn remove_by_sender<C: Client>(
        &self,
        client: &C,
        address: &Address,
    ) -> Vec<Arc<Transaction>> {
        // Snapshot ids first; removal mutates the bucket being walked.
        let ids: Vec<H256> = self
            .transactions_by_sender(address)
            .iter()
            .map(|t| t.id)
            .collect();
        ids.iter()
            .filter_map(|id| self.remove_by_id(client, id))
            .collect()
    }

    /// Purge every pending SEND towards `address`.
    pub fn remove_by_recipient<C: Client>(
        &self,
        client: &C,
        address: &Address,
    ) -> Vec<Arc<Transaction>> {
        let ids: Vec<H256> = self
            .transactions_by_recipient(address)
            .iter()
            .map(|t| t.id)
            .collect();
        ids.iter()
            .filter_map(|id| self.remove_by_id(client, id))
            .collect()
    }

    /// Drain the first `limit` transactions in canonical order out of
    /// the pool. This is the block producer's batch: selection and
    /// removal happen against one snapshot, so the batch cannot tear.
    pub fn pop_sorted_unconfirmed<C: Client>(
        &self,
        client: &C,
        limit: usize,
    ) -> Vec<Arc<Transaction>> {
        trace_time!("pool::pop_sorted_unconfirmed");

        let mut snapshot: Vec<Arc<Transaction>> =
            self.indexes.read().by_id.values().cloned().collect();
        snapshot.sort_by(|a, b| transaction::ordering(a, b));
        snapshot.truncate(limit);
        for trs in &snapshot {
            self.remove_by_id(client, &trs.id);
        }
        snapshot
    }

    /// List pending transactions for queries, together with the total
    /// count before the limit. `limit` is clamped to `max_shared_txs`.
    /// With a sender key the result is that account's dependent set,
    /// newest-ordering first.
    pub fn get_transactions(
        &self,
        limit: usize,
        sender_public_key: Option<&Public>,
    ) -> (Vec<Arc<Transaction>>, usize) {
        let limit = cmp::min(limit, self.options.max_shared_txs);
        match sender_public_key {
            Some(public) => {
                let address = Address::from_public(public);
                let mut dependent = self.dependent_transactions(&address);
                dependent.sort_by(|a, b| transaction::ordering(a, b));
                let count = dependent.len();
                dependent.truncate(limit);
                dependent.reverse();
                (dependent, count)
            }
            None => {
                let mut all: Vec<Arc<Transaction>> =
                    self.indexes.read().by_id.values().cloned().collect();
                all.sort_by(|a, b| transaction::ordering(a, b));
                let count = all.len();
                all.truncate(limit);
                (all, count)
            }
        }
    }

    /// Gate admission during block application and fork recovery.
    pub fn lock(&self) {
        self.locked.store(true, AtomicOrdering::SeqCst);
    }

    /// Resume admission.
    pub fn unlock(&self) {
        self.locked.store(false, AtomicOrdering::SeqCst);
    }

    /// Whether admission is gated.
    pub fn lock_status(&self) -> bool {
        self.locked.load(AtomicOrdering::SeqCst)
    }

    /// Rebuild `by_sender` / `by_recipient` from `by_id` after recovery.
    pub fn rebuild_secondary_indexes(&self) {
        let mut indexes = self.indexes.write();
        let transactions: Vec<Arc<Transaction>> = indexes.by_id.values().cloned().collect();
        indexes.by_sender.clear();
        indexes.by_recipient.clear();
        for trs in &transactions {
            indexes.link(trs);
        }
    }

    /// Status snapshot.
    pub fn status(&self) -> Status {
        let indexes = self.indexes.read();
        Status {
            transactions: indexes.by_id.len(),
            senders: indexes.by_sender.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{client::TestClient, tx, tx_with};
    use ddk_types::transaction::TransactionKind::*;
    use parking_lot::Mutex;

    fn pool() -> TransactionPool {
        TransactionPool::new(Options::default())
    }

    #[test]
    fn push_maintains_all_indexes() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let client = TestClient::new().with_balance(&sender, 100);
        let trs = tx(Send, &sender, 1);
        let (id, sender_id, recipient) = (trs.id, trs.sender_id, trs.recipient_id.unwrap());

        assert!(pool.push(&client, trs, false, false));

        assert!(pool.has(&id));
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.transactions_by_sender(&sender_id).len(), 1);
        assert_eq!(pool.transactions_by_recipient(&recipient).len(), 1);
        assert_eq!(
            pool.get(&id).unwrap().status,
            TransactionStatus::UnconfirmApplied,
        );
        // Cost debited from the unconfirmed balance.
        assert_eq!(client.u_balance(&sender_id), 100 - 11);
    }

    #[test]
    fn non_send_skips_recipient_index() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let client = TestClient::new().with_balance(&sender, 1_000);
        let trs = tx(Stake, &sender, 1);
        let recipient = trs.recipient_id.unwrap();

        assert!(pool.push(&client, trs, false, false));
        assert!(pool.transactions_by_recipient(&recipient).is_empty());
    }

    #[test]
    fn duplicate_push_is_rejected() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let client = TestClient::new().with_balance(&sender, 100);

        assert!(pool.push(&client, tx(Send, &sender, 1), false, false));
        assert!(!pool.push(&client, tx(Send, &sender, 1), false, false));
        assert_eq!(pool.size(), 1);
        assert_eq!(client.u_balance(&Address::from_public(&sender)), 100 - 11);
    }

    #[test]
    fn locked_pool_rejects_unless_forced() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let client = TestClient::new().with_balance(&sender, 100);

        pool.lock();
        assert!(pool.lock_status());
        assert!(!pool.push(&client, tx(Send, &sender, 1), false, false));
        assert!(pool.push(&client, tx(Send, &sender, 1), false, true));

        pool.unlock();
        assert!(!pool.lock_status());
    }

    #[test]
    fn apply_failure_leaves_no_residue() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let client = TestClient::new().with_balance(&sender, 100);
        let trs = tx(Send, &sender, 1);
        let (id, sender_id) = (trs.id, trs.sender_id);
        client.fail_apply(id);

        assert!(!pool.push(&client, trs, false, false));
        assert!(!pool.has(&id));
        assert_eq!(pool.size(), 0);
        assert!(pool.transactions_by_sender(&sender_id).is_empty());
        assert_eq!(client.u_balance(&sender_id), 100);
    }

    #[test]
    fn push_then_remove_restores_prior_state() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let client = TestClient::new().with_balance(&sender, 100);
        let trs = tx(Send, &sender, 1);
        let (id, sender_id, recipient) = (trs.id, trs.sender_id, trs.recipient_id.unwrap());

        assert!(pool.push(&client, trs.clone(), false, false));
        assert!(pool.remove(&client, &trs));

        assert!(!pool.has(&id));
        assert_eq!(pool.size(), 0);
        assert!(pool.transactions_by_sender(&sender_id).is_empty());
        assert!(pool.transactions_by_recipient(&recipient).is_empty());
        assert_eq!(client.u_balance(&sender_id), 100);

        // Removing again is a no-op.
        assert!(!pool.remove(&client, &trs));
        assert_eq!(client.u_balance(&sender_id), 100);
    }

    #[test]
    fn failed_undo_still_removes() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let client = TestClient::new().with_balance(&sender, 100);
        let trs = tx(Send, &sender, 1);
        client.fail_undo(trs.id);

        assert!(pool.push(&client, trs.clone(), false, false));
        assert!(pool.remove(&client, &trs));
        assert!(!pool.has(&trs.id));
    }

    #[test]
    fn pop_sorted_takes_lowest_and_clears_indexes() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let other = Public::from_low_u64_be(2);
        let client = TestClient::new()
            .with_balance(&sender, 1_000)
            .with_balance(&other, 1_000);

        // Ordering is by timestamp here; senders differ so nothing
        // conflicts.
        let t1 = tx_with(Send, &sender, 1, 10, 100);
        let t2 = tx_with(Send, &other, 2, 10, 50);
        let t3 = tx_with(Send, &other, 3, 10, 200);
        for trs in [t1.clone(), t2.clone(), t3.clone()] {
            assert!(pool.push(&client, trs, false, false));
        }

        let popped = pool.pop_sorted_unconfirmed(&client, 2);
        let ids: Vec<_> = popped.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t2.id, t1.id]);
        assert_eq!(pool.size(), 1);
        for id in ids {
            assert!(!pool.has(&id));
            assert!(pool
                .transactions_by_sender(&t2.sender_id)
                .iter()
                .all(|t| t.id != id));
        }
        // Popped transactions have their unconfirmed effects undone.
        assert_eq!(client.u_balance(&t2.sender_id), 1_000 - 11);
    }

    #[test]
    fn get_transactions_clamps_limit() {
        let pool = TransactionPool::new(Options { max_shared_txs: 2 });
        let client = TestClient::new();
        for i in 0..4 {
            let sender = Public::from_low_u64_be(100 + i);
            let client = client.clone().with_balance(&sender, 1_000);
            assert!(pool.push(&client, tx(Send, &sender, i), false, false));
        }

        let (transactions, count) = pool.get_transactions(10, None);
        assert_eq!(transactions.len(), 2);
        assert_eq!(count, 4);
    }

    #[test]
    fn get_transactions_projects_sender_and_reverses() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let other = Public::from_low_u64_be(2);
        let client = TestClient::new()
            .with_balance(&sender, 1_000)
            .with_balance(&other, 1_000);
        let address = Address::from_public(&sender);

        // One outgoing transaction and one incoming SEND; pushed in
        // conflict-free canonical order per account.
        let outgoing = tx_with(Send, &sender, 1, 10, 50);
        let mut incoming = tx_with(Send, &other, 2, 10, 100);
        incoming.recipient_id = Some(address);
        assert!(pool.push(&client, outgoing.clone(), false, false));
        assert!(pool.push(&client, incoming.clone(), false, false));

        let (transactions, count) = pool.get_transactions(10, Some(&sender));
        assert_eq!(count, 2);
        // Ascending order, reversed on output.
        let ids: Vec<_> = transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![incoming.id, outgoing.id]);
    }

    #[test]
    fn sender_projection_truncates_before_reversing() {
        let pool = TransactionPool::new(Options { max_shared_txs: 2 });
        let sender = Public::from_low_u64_be(1);
        let client = TestClient::new().with_balance(&sender, 1_000);

        // Three outgoing transfers pushed in canonical order.
        let t1 = tx_with(Send, &sender, 1, 10, 10);
        let t2 = tx_with(Send, &sender, 2, 10, 20);
        let t3 = tx_with(Send, &sender, 3, 10, 30);
        for trs in [t1.clone(), t2.clone(), t3.clone()] {
            assert!(pool.push(&client, trs, false, false));
        }

        // The clamp cuts the ascending-sorted set, so the earliest
        // orderings survive; the reverse only reorders that slice.
        let (transactions, count) = pool.get_transactions(10, Some(&sender));
        assert_eq!(count, 3);
        let ids: Vec<_> = transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t2.id, t1.id]);
    }

    #[test]
    fn remove_by_sender_purges_account() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let other = Public::from_low_u64_be(2);
        let client = TestClient::new()
            .with_balance(&sender, 1_000)
            .with_balance(&other, 1_000);
        let address = Address::from_public(&sender);

        assert!(pool.push(&client, tx_with(Send, &sender, 1, 10, 100), false, false));
        assert!(pool.push(&client, tx(Send, &other, 2), false, false));

        let removed = pool.remove_by_sender(&client, &address);
        assert_eq!(removed.len(), 1);
        assert_eq!(pool.size(), 1);
        assert_eq!(client.u_balance(&address), 1_000);
    }

    #[test]
    fn rebuild_restores_secondary_indexes() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let client = TestClient::new().with_balance(&sender, 1_000);
        let trs = tx(Send, &sender, 1);
        let (sender_id, recipient) = (trs.sender_id, trs.recipient_id.unwrap());
        assert!(pool.push(&client, trs, false, false));

        {
            let mut indexes = pool.indexes.write();
            indexes.by_sender.clear();
            indexes.by_recipient.clear();
        }
        pool.rebuild_secondary_indexes();

        assert_eq!(pool.transactions_by_sender(&sender_id).len(), 1);
        assert_eq!(pool.transactions_by_recipient(&recipient).len(), 1);
    }

    #[test]
    fn broadcast_notifies_listeners() {
        let pool = pool();
        let sender = Public::from_low_u64_be(1);
        let client = TestClient::new().with_balance(&sender, 100);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let listener = seen.clone();
        pool.add_listener(Box::new(move |trs| {
            listener.lock().push(trs.id);
        }));

        let trs = tx(Send, &sender, 1);
        let id = trs.id;
        assert!(pool.push(&client, trs, true, false));
        assert_eq!(*seen.lock(), vec![id]);

        // No broadcast requested, no notification.
        assert!(pool.push(&client, tx_with(Send, &sender, 2, 10, 200), false, false));
        assert_eq!(seen.lock().len(), 1);
    }
}
