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

//! Staged transaction admission.
//!
//! Submitted transactions wait in the queue in canonical order. A
//! processing cycle runs as a sequence task: each transaction is checked
//! against the pool, checked for conflicts, verified in two phases and
//! pushed into the pool. Conflicted transactions are parked with an
//! expiry and retried after the next reshuffle. A cycle is kicked only
//! on the empty-to-non-empty transition and on explicit triggers, which
//! keeps a single cycle in flight.

use std::{
    collections::{HashSet, VecDeque},
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use ddk_types::transaction::{self, Transaction, TransactionStatus};
use parking_lot::Mutex;

use crate::{
    client::Client,
    listener::{AccountSessions, POOL_VERIFY_CHANNEL},
    pool::TransactionPool,
    sequence::Sequence,
    verifier::{Verifier, VerifyMessage},
};

/// A transaction parked after losing a conflict.
#[derive(Debug, Clone)]
pub struct ConflictedEntry {
    /// The parked transaction.
    pub transaction: Transaction,
    /// Unix seconds past which the entry is dropped on reshuffle.
    pub expire: u64,
}

/// The admission queue.
pub struct TransactionQueue {
    queue: Mutex<VecDeque<Transaction>>,
    conflicted: Mutex<Vec<ConflictedEntry>>,
    locked: AtomicBool,
    pool: Arc<TransactionPool>,
    sequence: Arc<Sequence>,
    sessions: Arc<dyn AccountSessions>,
    expire: u64,
}

impl TransactionQueue {
    /// Create an empty queue feeding `pool`.
    pub fn new(
        pool: Arc<TransactionPool>,
        sequence: Arc<Sequence>,
        sessions: Arc<dyn AccountSessions>,
        expire: u64,
    ) -> TransactionQueue {
        TransactionQueue {
            queue: Mutex::new(VecDeque::new()),
            conflicted: Mutex::new(Vec::new()),
            locked: AtomicBool::new(false),
            pool,
            sequence,
            sessions,
            expire,
        }
    }

    /// Submit a transaction. Kicks a processing cycle when the queue was
    /// empty; otherwise the queue is re-sorted into canonical order.
    pub fn push<C>(self: &Arc<Self>, client: &C, mut trs: Transaction)
    where
        C: Client + Clone + Send + 'static,
    {
        trs.status = TransactionStatus::Queued;
        let was_empty = {
            let mut queue = self.queue.lock();
            let was_empty = queue.is_empty();
            queue.push_back(trs);
            if !was_empty {
                queue
                    .make_contiguous()
                    .sort_by(|a, b| transaction::ordering(a, b));
            }
            was_empty
        };
        if was_empty {
            self.trigger(client);
        }
    }

    /// Schedule a processing cycle on the sequence worker. Called on
    /// submission, after unlocking and after a reshuffle.
    pub fn trigger<C>(self: &Arc<Self>, client: &C)
    where
        C: Client + Clone + Send + 'static,
    {
        let queue = self.clone();
        let client = client.clone();
        self.sequence.push(move || queue.process(&client));
    }

    /// The admission cycle. Drains the queue until it is empty or a
    /// lock blocks progress.
    pub fn process<C: Client>(&self, client: &C) {
        let mut retried: HashSet<_> = HashSet::new();
        loop {
            if self.lock_status() {
                trace!(target: "txqueue", "Processing halted, queue is locked");
                return;
            }
            let Some(mut trs) = self.queue.lock().pop_front() else {
                return;
            };

            // Admitted by a concurrent path already.
            if self.pool.has(&trs.id) {
                continue;
            }

            if self.pool.is_potential_conflict(&trs) {
                self.push_in_conflicted(trs);
                continue;
            }

            let sender = match client.get_or_create_account(&trs.sender_public_key) {
                Ok(sender) => sender,
                Err(err) => {
                    // Infrastructure failure drops the item; the cycle
                    // stays live for the rest of the queue.
                    warn!(target: "txqueue", "[{:?}] Dropped: {}", trs.id, err);
                    continue;
                }
            };

            match Verifier::verify(client, &trs, &sender) {
                Ok(()) => {
                    trs.status = TransactionStatus::Verified;
                    self.sessions
                        .send(sender.address, POOL_VERIFY_CHANNEL, VerifyMessage::verified());
                }
                Err(err) => {
                    trs.status = TransactionStatus::Declined;
                    self.sessions.send(
                        sender.address,
                        POOL_VERIFY_CHANNEL,
                        VerifyMessage::declined(&err),
                    );
                    continue;
                }
            }

            if self.lock_status() || self.pool.lock_status() {
                self.enqueue(trs);
                return;
            }

            if !self.pool.push(client, trs.clone(), true, false) {
                // Raced conflict or apply failure; one more round
                // through verification settles which.
                if retried.insert(trs.id) {
                    self.enqueue(trs);
                } else {
                    warn!(target: "txqueue", "[{:?}] Declined, repeatedly failed to enter the pool", trs.id);
                    trs.status = TransactionStatus::Declined;
                }
            }
        }
    }

    /// Append a transaction in canonical position without scheduling a
    /// cycle. Used for re-queueing and by callers driving `process`
    /// themselves.
    pub fn enqueue(&self, mut trs: Transaction) {
        trs.status = TransactionStatus::Queued;
        let mut queue = self.queue.lock();
        queue.push_back(trs);
        if queue.len() > 1 {
            queue
                .make_contiguous()
                .sort_by(|a, b| transaction::ordering(a, b));
        }
    }

    /// Park a transaction that lost a conflict.
    pub fn push_in_conflicted(&self, mut trs: Transaction) {
        trs.status = TransactionStatus::QueuedAsConflicted;
        let expire = unix_now() + self.expire;
        debug!(target: "txqueue", "[{:?}] Moved to the conflicted queue, expires at {}", trs.id, expire);
        self.conflicted.lock().push(ConflictedEntry {
            transaction: trs,
            expire,
        });
    }

    /// Move conflicted transactions back onto the queue, dropping the
    /// ones whose expiry has passed. The queue re-sorts, so drain order
    /// is irrelevant. Callers trigger a cycle afterwards.
    pub fn reshuffle(&self) {
        let now = unix_now();
        let drained: Vec<ConflictedEntry> = self.conflicted.lock().drain(..).collect();

        let mut queue = self.queue.lock();
        for entry in drained.into_iter().rev() {
            if entry.expire <= now {
                debug!(
                    target: "txqueue",
                    "[{:?}] Dropping expired conflicted transaction",
                    entry.transaction.id,
                );
                continue;
            }
            let mut trs = entry.transaction;
            trs.status = TransactionStatus::Queued;
            queue.push_back(trs);
        }
        queue
            .make_contiguous()
            .sort_by(|a, b| transaction::ordering(a, b));
    }

    /// Transactions waiting for a cycle.
    pub fn size(&self) -> usize {
        self.queue.lock().len()
    }

    /// Transactions parked as conflicted.
    pub fn conflicted_size(&self) -> usize {
        self.conflicted.lock().len()
    }

    /// Gate admission.
    pub fn lock(&self) {
        self.locked.store(true, AtomicOrdering::SeqCst);
    }

    /// Resume admission; a cycle must be triggered explicitly.
    pub fn unlock(&self) {
        self.locked.store(false, AtomicOrdering::SeqCst);
    }

    /// Whether admission is gated.
    pub fn lock_status(&self) -> bool {
        self.locked.load(AtomicOrdering::SeqCst)
    }
}

impl std::fmt::Debug for TransactionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("TransactionQueue")
            .field("queue", &self.size())
            .field("conflicted", &self.conflicted_size())
            .field("locked", &self.lock_status())
            .finish()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
