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

//! Conflict detection over the pending set.
//!
//! A candidate conflicts when the pool already holds transactions on the
//! same account that cannot all be applied alongside it. The loser is
//! parked in the conflicted queue and retried after the next reshuffle;
//! the winner is whichever transaction sorts last under the canonical
//! ordering.

use ddk_types::transaction::{self, Transaction, TransactionKind};

use crate::pool::TransactionPool;

/// Whether admitting `trs` now would conflict with the pending set.
///
/// Read-only; callers must observe a consistent pool snapshot, which in
/// practice means running under the sequence worker.
pub fn is_potential_conflict(pool: &TransactionPool, trs: &Transaction) -> bool {
    let dependent = pool.dependent_transactions(&trs.sender_id);
    if dependent.is_empty() {
        return false;
    }

    match trs.kind {
        // A sender with any pending transaction must not rotate keys.
        TransactionKind::Signature => true,
        TransactionKind::Vote
            if dependent
                .iter()
                .any(|d| d.kind == TransactionKind::Vote) =>
        {
            true
        }
        TransactionKind::Referral
            if dependent
                .iter()
                .any(|d| d.kind == TransactionKind::Referral) =>
        {
            true
        }
        _ => {
            // The candidate conflicts iff some pending sibling orders
            // after it.
            let mut combined: Vec<&Transaction> =
                dependent.iter().map(|t| t.as_ref()).collect();
            combined.push(trs);
            combined.sort_by(|a, b| transaction::ordering(a, b));
            combined.last().map(|t| t.id) != Some(trs.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pool::Options,
        tests::{client::TestClient, tx, tx_with},
    };
    use crypto::publickey::Public;
    use ddk_types::transaction::TransactionKind::*;

    fn pool_with(transactions: Vec<Transaction>) -> (TransactionPool, TestClient) {
        let pool = TransactionPool::new(Options::default());
        let client = TestClient::new();
        for trs in transactions {
            let client = client.clone().with_balance_at(trs.sender_id, 1_000_000_000);
            assert!(pool.push(&client, trs, false, false));
        }
        (pool, client)
    }

    #[test]
    fn empty_dependent_set_never_conflicts() {
        let (pool, _) = pool_with(vec![]);
        let sender = Public::from_low_u64_be(1);
        assert!(!is_potential_conflict(&pool, &tx(Send, &sender, 1)));
        assert!(!is_potential_conflict(&pool, &tx(Signature, &sender, 2)));
    }

    #[test]
    fn signature_conflicts_with_any_pending() {
        let sender = Public::from_low_u64_be(1);
        let (pool, _) = pool_with(vec![tx(Send, &sender, 1)]);

        // Regardless of where it would sort.
        let mut rotation = tx_with(Signature, &sender, 2, 0, 1_000_000);
        assert!(is_potential_conflict(&pool, &rotation));
        rotation.timestamp = 1;
        assert!(is_potential_conflict(&pool, &rotation));
    }

    #[test]
    fn vote_conflicts_with_pending_vote_only() {
        let sender = Public::from_low_u64_be(1);
        let (pool, _) = pool_with(vec![tx_with(Vote, &sender, 1, 0, 100)]);

        assert!(is_potential_conflict(&pool, &tx_with(Vote, &sender, 2, 0, 200)));

        // A later SEND does not trip the vote rule.
        let (pool, _) = pool_with(vec![tx_with(Send, &sender, 3, 10, 100)]);
        assert!(!is_potential_conflict(&pool, &tx_with(Vote, &sender, 4, 0, 200)));
    }

    #[test]
    fn referral_conflicts_with_pending_referral() {
        let sender = Public::from_low_u64_be(1);
        let (pool, _) = pool_with(vec![tx_with(Referral, &sender, 1, 0, 100)]);
        assert!(is_potential_conflict(
            &pool,
            &tx_with(Referral, &sender, 2, 0, 200),
        ));
    }

    #[test]
    fn overtaken_candidate_conflicts() {
        let sender = Public::from_low_u64_be(1);
        let (pool, _) = pool_with(vec![tx_with(Send, &sender, 1, 10, 100)]);

        // Earlier timestamp orders first, so the pending sibling would
        // overtake it.
        assert!(is_potential_conflict(&pool, &tx_with(Send, &sender, 2, 5, 50)));
        // A later candidate sorts last and is admissible.
        assert!(!is_potential_conflict(&pool, &tx_with(Send, &sender, 3, 5, 200)));
    }

    #[test]
    fn incoming_send_makes_recipient_dependent() {
        let sender = Public::from_low_u64_be(1);
        let recipient = Public::from_low_u64_be(2);
        let mut incoming = tx_with(Send, &sender, 1, 10, 100);
        incoming.recipient_id = Some(ddk_types::account::Address::from_public(&recipient));
        let (pool, _) = pool_with(vec![incoming]);

        // The recipient now has a dependent set; an earlier-ordering
        // transaction of theirs conflicts.
        assert!(is_potential_conflict(
            &pool,
            &tx_with(Send, &recipient, 2, 10, 50),
        ));
    }
}
