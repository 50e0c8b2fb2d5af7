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

//! Transaction and block logic: canonical byte layouts, ids, signatures
//! and ledger application.
//!
//! The canonical transaction layout is
//! `kind u8 | timestamp u32-LE | sender key 64B | recipient u64-BE |
//! amount u64-LE | fee u64-LE | asset | signature 65B`; the id is the
//! sha256 of the full layout, signatures cover the layout without the
//! signature field. Both layouts are consensus-visible.

use std::sync::Arc;

use crypto::{
    digest,
    publickey::{sign, verify_public, KeyPair, Message, Secret},
};
use ddk_accounts::AccountDb;
use ddk_types::{
    account::{Account, Address},
    block::Block,
    params::ChainParams,
    transaction::{
        self, Transaction, TransactionAsset, TransactionKind, TransactionStatus, Vote,
    },
    EpochSeconds,
};
use ethereum_types::H256;

use crate::error::Error;

/// Transaction logic over the accounts store.
#[derive(Debug)]
pub struct TransactionLogic {
    accounts: Arc<AccountDb>,
    params: ChainParams,
}

impl TransactionLogic {
    /// Create the logic for a chain configuration.
    pub fn new(accounts: Arc<AccountDb>, params: ChainParams) -> TransactionLogic {
        TransactionLogic { accounts, params }
    }

    /// The underlying accounts store.
    pub fn accounts(&self) -> &Arc<AccountDb> {
        &self.accounts
    }

    /// The chain parameters.
    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// Canonical bytes of a transaction.
    pub fn bytes(&self, trs: &Transaction, skip_signature: bool) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(160);
        bytes.push(trs.kind.code());
        bytes.extend_from_slice(&trs.timestamp.to_le_bytes());
        bytes.extend_from_slice(trs.sender_public_key.as_bytes());
        bytes.extend_from_slice(&trs.recipient_id.map(|a| a.0).unwrap_or(0).to_be_bytes());
        bytes.extend_from_slice(&trs.amount.to_le_bytes());
        bytes.extend_from_slice(&trs.fee.to_le_bytes());
        match &trs.asset {
            TransactionAsset::None => {}
            TransactionAsset::SecondSignature { public_key } => {
                bytes.extend_from_slice(public_key.as_bytes());
            }
            TransactionAsset::Votes { votes } => {
                for vote in votes {
                    bytes.push(match vote {
                        Vote::Add(_) => b'+',
                        Vote::Remove(_) => b'-',
                    });
                    bytes.extend_from_slice(vote.delegate().as_bytes());
                }
            }
            TransactionAsset::Referral { referral } => {
                bytes.extend_from_slice(&referral.0.to_be_bytes());
            }
        }
        if !skip_signature {
            if let Some(signature) = &trs.signature {
                bytes.extend_from_slice(&signature[..]);
            }
        }
        bytes
    }

    /// Transaction id: sha256 over the canonical bytes.
    pub fn id(&self, trs: &Transaction) -> H256 {
        H256::from_slice(&digest::sha256(&self.bytes(trs, false)))
    }

    fn signing_message(&self, trs: &Transaction) -> Message {
        Message::from_slice(&digest::sha256(&self.bytes(trs, true)))
    }

    /// Sign a transaction and derive its id.
    pub fn sign(&self, secret: &Secret, trs: &mut Transaction) -> Result<(), Error> {
        let message = self.signing_message(trs);
        trs.signature = Some(sign(secret, &message)?);
        trs.id = self.id(trs);
        Ok(())
    }

    /// Build and sign a transaction, with the fee from the schedule.
    pub fn create(
        &self,
        secret: &Secret,
        kind: TransactionKind,
        recipient_id: Option<Address>,
        amount: u64,
        timestamp: EpochSeconds,
        asset: TransactionAsset,
    ) -> Result<Transaction, Error> {
        let keypair = KeyPair::from_secret(secret.clone())?;
        let public = *keypair.public();
        let mut trs = Transaction {
            id: H256::zero(),
            kind,
            sender_public_key: public,
            sender_id: Address::from_public(&public),
            recipient_id,
            amount,
            fee: self.params.fees.fee(kind),
            timestamp,
            signature: None,
            asset,
            status: TransactionStatus::Created,
        };
        self.sign(secret, &mut trs)?;
        Ok(trs)
    }

    /// First verification phase: content checks ordered cheap-first.
    pub fn verify(
        &self,
        trs: &Transaction,
        sender: &Account,
    ) -> Result<(), transaction::Error> {
        let expected_sender = Address::from_public(&trs.sender_public_key);
        if trs.sender_id != expected_sender {
            return Err(transaction::Error::InvalidSenderAddress {
                expected: expected_sender,
                got: trs.sender_id,
            });
        }

        let asset_matches = matches!(
            (trs.kind, &trs.asset),
            (
                TransactionKind::Send | TransactionKind::Stake | TransactionKind::SendStake,
                TransactionAsset::None,
            ) | (
                TransactionKind::Signature,
                TransactionAsset::SecondSignature { .. },
            ) | (TransactionKind::Vote, TransactionAsset::Votes { .. })
                | (TransactionKind::Referral, TransactionAsset::Referral { .. }),
        );
        if !asset_matches {
            return Err(transaction::Error::InvalidAsset);
        }

        match trs.kind {
            TransactionKind::Send | TransactionKind::SendStake if trs.recipient_id.is_none() => {
                return Err(transaction::Error::MissingRecipient);
            }
            TransactionKind::Send | TransactionKind::Stake | TransactionKind::SendStake
                if trs.amount == 0 =>
            {
                return Err(transaction::Error::ZeroAmount);
            }
            TransactionKind::Signature if sender.second_public_key.is_some() => {
                return Err(transaction::Error::SecondSignatureExists);
            }
            _ => {}
        }

        let minimal_fee = self.params.fees.fee(trs.kind);
        if trs.fee < minimal_fee {
            return Err(transaction::Error::InsufficientFee {
                minimal: minimal_fee,
                got: trs.fee,
            });
        }

        // One slot of clock drift is tolerated.
        let now = self.params.slots().now();
        if trs.timestamp > now + self.params.slot_interval {
            return Err(transaction::Error::TimestampInFuture {
                now,
                got: trs.timestamp,
            });
        }

        let signature = trs
            .signature
            .as_ref()
            .ok_or(transaction::Error::MissingSignature)?;

        let expected_id = self.id(trs);
        if trs.id != expected_id {
            return Err(transaction::Error::InvalidId {
                expected: expected_id,
                got: trs.id,
            });
        }

        let message = self.signing_message(trs);
        match verify_public(&trs.sender_public_key, signature, &message) {
            Ok(true) => Ok(()),
            _ => Err(transaction::Error::InvalidSignature),
        }
    }

    /// Second verification phase against unconfirmed ledger state.
    pub fn verify_unconfirmed(
        &self,
        trs: &Transaction,
        sender: &Account,
    ) -> Result<(), transaction::Error> {
        if trs.cost() > sender.u_balance {
            return Err(transaction::Error::InsufficientBalance {
                cost: trs.cost(),
                balance: sender.u_balance,
            });
        }

        match (&trs.kind, &trs.asset) {
            (TransactionKind::Vote, TransactionAsset::Votes { votes }) => {
                let max = self.params.max_votes_per_transaction;
                if votes.len() > max {
                    return Err(transaction::Error::TooManyVotes {
                        max,
                        got: votes.len(),
                    });
                }
            }
            (TransactionKind::Stake, _) => {
                if trs.amount < self.params.min_stake_amount {
                    return Err(transaction::Error::BelowMinimumStake {
                        minimal: self.params.min_stake_amount,
                        got: trs.amount,
                    });
                }
            }
            (TransactionKind::SendStake, _) => {
                if trs.amount > sender.u_total_froze_amount {
                    return Err(transaction::Error::InsufficientFrozenAmount {
                        required: trs.amount,
                        available: sender.u_total_froze_amount,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Debit the sender's unconfirmed balance and move unconfirmed
    /// frozen amounts.
    pub fn apply_unconfirmed(&self, trs: &Transaction) -> Result<(), transaction::Error> {
        self.accounts.update(trs.sender_id, |account| {
            account.u_balance = account.u_balance.checked_sub(trs.cost()).ok_or(
                transaction::Error::InsufficientBalance {
                    cost: trs.cost(),
                    balance: account.u_balance,
                },
            )?;
            match trs.kind {
                TransactionKind::Stake => {
                    account.u_total_froze_amount =
                        account.u_total_froze_amount.saturating_add(trs.amount);
                }
                TransactionKind::SendStake => {
                    account.u_total_froze_amount = account
                        .u_total_froze_amount
                        .checked_sub(trs.amount)
                        .ok_or(transaction::Error::InsufficientFrozenAmount {
                            required: trs.amount,
                            available: account.u_total_froze_amount,
                        })?;
                }
                _ => {}
            }
            Ok(())
        })
    }

    /// Reverse a transaction's unconfirmed effects on an account copy
    /// without touching the store. Query surfaces use this to present
    /// balances as they would look were the transaction dropped.
    pub fn calc_undo_unconfirmed(&self, trs: &Transaction, account: &mut Account) {
        account.u_balance = account.u_balance.saturating_add(trs.cost());
        match trs.kind {
            TransactionKind::Stake => {
                account.u_total_froze_amount =
                    account.u_total_froze_amount.saturating_sub(trs.amount);
            }
            TransactionKind::SendStake => {
                account.u_total_froze_amount =
                    account.u_total_froze_amount.saturating_add(trs.amount);
            }
            _ => {}
        }
    }

    /// Reverse `apply_unconfirmed`.
    pub fn undo_unconfirmed(&self, trs: &Transaction) -> Result<(), transaction::Error> {
        self.accounts.update(trs.sender_id, |account| {
            account.u_balance = account.u_balance.saturating_add(trs.cost());
            match trs.kind {
                TransactionKind::Stake => {
                    account.u_total_froze_amount =
                        account.u_total_froze_amount.saturating_sub(trs.amount);
                }
                TransactionKind::SendStake => {
                    account.u_total_froze_amount =
                        account.u_total_froze_amount.saturating_add(trs.amount);
                }
                _ => {}
            }
            Ok(())
        })
    }

    /// Apply the confirmed effects of a transaction included in an
    /// accepted block. Both the confirmed and unconfirmed balance move;
    /// the unconfirmed effects were undone when the transaction left
    /// the pool.
    pub fn apply(&self, trs: &Transaction) -> Result<(), transaction::Error> {
        self.accounts.update(trs.sender_id, |account| {
            account.balance = account.balance.checked_sub(trs.cost()).ok_or(
                transaction::Error::InsufficientBalance {
                    cost: trs.cost(),
                    balance: account.balance,
                },
            )?;
            account.u_balance = account.u_balance.saturating_sub(trs.cost());
            match &trs.asset {
                TransactionAsset::SecondSignature { public_key } => {
                    account.second_public_key = Some(*public_key);
                }
                TransactionAsset::Referral { referral } => {
                    account.referral = Some(*referral);
                }
                _ => {}
            }
            match trs.kind {
                TransactionKind::Stake => {
                    account.total_froze_amount =
                        account.total_froze_amount.saturating_add(trs.amount);
                    account.u_total_froze_amount =
                        account.u_total_froze_amount.saturating_add(trs.amount);
                }
                TransactionKind::SendStake => {
                    account.total_froze_amount = account
                        .total_froze_amount
                        .checked_sub(trs.amount)
                        .ok_or(transaction::Error::InsufficientFrozenAmount {
                            required: trs.amount,
                            available: account.total_froze_amount,
                        })?;
                    account.u_total_froze_amount =
                        account.u_total_froze_amount.saturating_sub(trs.amount);
                }
                _ => {}
            }
            Ok(())
        })?;

        match trs.kind {
            TransactionKind::Send => {
                let recipient = trs
                    .recipient_id
                    .ok_or(transaction::Error::MissingRecipient)?;
                self.accounts.update(recipient, |account| {
                    account.balance = account.balance.saturating_add(trs.amount);
                    account.u_balance = account.u_balance.saturating_add(trs.amount);
                    Ok(())
                })
            }
            TransactionKind::SendStake => {
                let recipient = trs
                    .recipient_id
                    .ok_or(transaction::Error::MissingRecipient)?;
                self.accounts.update(recipient, |account| {
                    account.total_froze_amount =
                        account.total_froze_amount.saturating_add(trs.amount);
                    account.u_total_froze_amount =
                        account.u_total_froze_amount.saturating_add(trs.amount);
                    Ok(())
                })
            }
            _ => Ok(()),
        }
    }

    /// Credit the forging delegate with the block's reward and fees.
    pub fn apply_forging_reward(&self, block: &Block) -> Result<(), transaction::Error> {
        let forger = Address::from_public(&block.generator_public_key);
        let earned = block.reward.saturating_add(block.total_fee);
        self.accounts.update(forger, |account| {
            account.balance = account.balance.saturating_add(earned);
            account.u_balance = account.u_balance.saturating_add(earned);
            Ok(())
        })
    }
}

/// Canonical bytes of a block header.
pub fn block_bytes(block: &Block, skip_signature: bool) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(256);
    bytes.extend_from_slice(&block.version.to_le_bytes());
    bytes.extend_from_slice(&block.timestamp.to_le_bytes());
    bytes.extend_from_slice(block.previous_block.unwrap_or_default().as_bytes());
    bytes.extend_from_slice(&block.number_of_transactions.to_le_bytes());
    bytes.extend_from_slice(&block.total_amount.to_le_bytes());
    bytes.extend_from_slice(&block.total_fee.to_le_bytes());
    bytes.extend_from_slice(&block.reward.to_le_bytes());
    bytes.extend_from_slice(&block.payload_length.to_le_bytes());
    bytes.extend_from_slice(block.payload_hash.as_bytes());
    bytes.extend_from_slice(block.generator_public_key.as_bytes());
    if !skip_signature {
        if let Some(signature) = &block.signature {
            bytes.extend_from_slice(&signature[..]);
        }
    }
    bytes
}

/// Block id: sha256 over the canonical header bytes.
pub fn block_id(block: &Block) -> H256 {
    H256::from_slice(&digest::sha256(&block_bytes(block, false)))
}

fn block_signing_message(block: &Block) -> Message {
    Message::from_slice(&digest::sha256(&block_bytes(block, true)))
}

/// Sign a block header and derive its id.
pub fn sign_block(secret: &Secret, block: &mut Block) -> Result<(), Error> {
    let message = block_signing_message(block);
    block.signature = Some(sign(secret, &message)?);
    block.id = block_id(block);
    Ok(())
}

/// Whether the delegate signature verifies against the generator key.
pub fn verify_block_signature(block: &Block) -> bool {
    let Some(signature) = &block.signature else {
        return false;
    };
    let message = block_signing_message(block);
    verify_public(&block.generator_public_key, signature, &message).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers;
    use crypto::publickey::{Generator, Random};
    use ddk_types::transaction::TransactionKind::*;

    fn logic() -> TransactionLogic {
        TransactionLogic::new(Arc::new(AccountDb::new()), ChainParams::default())
    }

    fn seeded_sender(logic: &TransactionLogic, keypair: &KeyPair, balance: u64) -> Account {
        let mut account = logic.accounts().get_or_create(keypair.public());
        logic
            .accounts()
            .update::<transaction::Error, _>(account.address, |a| {
                a.balance = balance;
                a.u_balance = balance;
                Ok(())
            })
            .unwrap();
        account.balance = balance;
        account.u_balance = balance;
        account
    }

    #[test]
    fn created_transaction_verifies() {
        let logic = logic();
        let keypair = Random.generate();
        let sender = seeded_sender(&logic, &keypair, 1_000_000_000);

        let trs = logic
            .create(
                keypair.secret(),
                Send,
                Some(Address(42)),
                1_000,
                100,
                TransactionAsset::None,
            )
            .unwrap();

        assert_eq!(trs.fee, logic.params().fees.send);
        assert_eq!(trs.sender_id, sender.address);
        assert!(logic.verify(&trs, &sender).is_ok());
        assert!(logic.verify_unconfirmed(&trs, &sender).is_ok());
    }

    #[test]
    fn tampered_content_fails_id_check() {
        let logic = logic();
        let keypair = Random.generate();
        let sender = seeded_sender(&logic, &keypair, 1_000_000_000);

        let mut trs = logic
            .create(
                keypair.secret(),
                Send,
                Some(Address(42)),
                1_000,
                100,
                TransactionAsset::None,
            )
            .unwrap();
        trs.amount += 1;

        assert!(matches!(
            logic.verify(&trs, &sender),
            Err(transaction::Error::InvalidId { .. }),
        ));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let logic = logic();
        let keypair = Random.generate();
        let attacker = Random.generate();
        let sender = seeded_sender(&logic, &keypair, 1_000_000_000);

        let mut trs = logic
            .create(
                keypair.secret(),
                Send,
                Some(Address(42)),
                1_000,
                100,
                TransactionAsset::None,
            )
            .unwrap();
        // Re-sign with a foreign key and refresh the id so only the
        // signature check can fail.
        let message = logic.signing_message(&trs);
        trs.signature = Some(sign(attacker.secret(), &message).unwrap());
        trs.id = logic.id(&trs);

        assert_eq!(
            logic.verify(&trs, &sender),
            Err(transaction::Error::InvalidSignature),
        );
    }

    #[test]
    fn missing_signature_is_rejected() {
        let logic = logic();
        let keypair = Random.generate();
        let sender = seeded_sender(&logic, &keypair, 1_000_000_000);

        let mut trs = logic
            .create(
                keypair.secret(),
                Send,
                Some(Address(42)),
                1_000,
                100,
                TransactionAsset::None,
            )
            .unwrap();
        trs.signature = None;

        assert_eq!(
            logic.verify(&trs, &sender),
            Err(transaction::Error::MissingSignature),
        );
    }

    #[test]
    fn shape_checks_reject_bad_transactions() {
        let logic = logic();
        let keypair = Random.generate();
        let sender = seeded_sender(&logic, &keypair, 1_000_000_000);

        let missing_recipient = logic
            .create(keypair.secret(), Send, None, 1_000, 100, TransactionAsset::None)
            .unwrap();
        assert_eq!(
            logic.verify(&missing_recipient, &sender),
            Err(transaction::Error::MissingRecipient),
        );

        let zero_amount = logic
            .create(
                keypair.secret(),
                Send,
                Some(Address(42)),
                0,
                100,
                TransactionAsset::None,
            )
            .unwrap();
        assert_eq!(
            logic.verify(&zero_amount, &sender),
            Err(transaction::Error::ZeroAmount),
        );

        let mut cheap = logic
            .create(
                keypair.secret(),
                Send,
                Some(Address(42)),
                1_000,
                100,
                TransactionAsset::None,
            )
            .unwrap();
        cheap.fee = 0;
        logic.sign(keypair.secret(), &mut cheap).unwrap();
        assert!(matches!(
            logic.verify(&cheap, &sender),
            Err(transaction::Error::InsufficientFee { .. }),
        ));

        let wrong_asset = logic
            .create(
                keypair.secret(),
                Vote,
                None,
                0,
                100,
                TransactionAsset::None,
            )
            .unwrap();
        assert_eq!(
            logic.verify(&wrong_asset, &sender),
            Err(transaction::Error::InvalidAsset),
        );
    }

    #[test]
    fn unconfirmed_checks_cover_votes_and_stakes() {
        let logic = logic();
        let keypair = Random.generate();
        let mut sender = seeded_sender(&logic, &keypair, 10_000_000_000);

        let too_many = logic
            .create(
                keypair.secret(),
                Vote,
                None,
                0,
                100,
                TransactionAsset::Votes {
                    votes: (0..4).map(|_| Vote::Add(*Random.generate().public())).collect(),
                },
            )
            .unwrap();
        assert!(matches!(
            logic.verify_unconfirmed(&too_many, &sender),
            Err(transaction::Error::TooManyVotes { max: 3, got: 4 }),
        ));

        let small_stake = logic
            .create(keypair.secret(), Stake, None, 1_000, 100, TransactionAsset::None)
            .unwrap();
        assert!(matches!(
            logic.verify_unconfirmed(&small_stake, &sender),
            Err(transaction::Error::BelowMinimumStake { .. }),
        ));

        let unbacked = logic
            .create(
                keypair.secret(),
                SendStake,
                Some(Address(42)),
                100_000_000,
                100,
                TransactionAsset::None,
            )
            .unwrap();
        assert!(matches!(
            logic.verify_unconfirmed(&unbacked, &sender),
            Err(transaction::Error::InsufficientFrozenAmount { .. }),
        ));

        sender.u_total_froze_amount = 100_000_000;
        assert!(logic.verify_unconfirmed(&unbacked, &sender).is_ok());
    }

    #[test]
    fn unconfirmed_apply_undo_round_trips() {
        let logic = logic();
        let keypair = Random.generate();
        let sender = seeded_sender(&logic, &keypair, 1_000_000_000);

        let stake = logic
            .create(
                keypair.secret(),
                Stake,
                None,
                100_000_000,
                100,
                TransactionAsset::None,
            )
            .unwrap();

        logic.apply_unconfirmed(&stake).unwrap();
        let applied = logic.accounts().get(&sender.address).unwrap();
        assert_eq!(applied.u_balance, 1_000_000_000 - stake.cost());
        assert_eq!(applied.u_total_froze_amount, 100_000_000);
        assert_eq!(applied.balance, 1_000_000_000);

        logic.undo_unconfirmed(&stake).unwrap();
        let undone = logic.accounts().get(&sender.address).unwrap();
        assert_eq!(undone.u_balance, 1_000_000_000);
        assert_eq!(undone.u_total_froze_amount, 0);
    }

    #[test]
    fn calc_undo_projects_without_touching_the_store() {
        let logic = logic();
        let keypair = Random.generate();
        let sender = seeded_sender(&logic, &keypair, 1_000_000_000);

        let stake = logic
            .create(
                keypair.secret(),
                Stake,
                None,
                100_000_000,
                100,
                TransactionAsset::None,
            )
            .unwrap();
        logic.apply_unconfirmed(&stake).unwrap();

        let mut projected = logic.accounts().get(&sender.address).unwrap();
        logic.calc_undo_unconfirmed(&stake, &mut projected);
        assert_eq!(projected.u_balance, 1_000_000_000);
        assert_eq!(projected.u_total_froze_amount, 0);

        // The store still carries the applied effects.
        let stored = logic.accounts().get(&sender.address).unwrap();
        assert_eq!(stored.u_balance, 1_000_000_000 - stake.cost());
    }

    #[test]
    fn insufficient_unconfirmed_balance_fails_apply() {
        let logic = logic();
        let keypair = Random.generate();
        let sender = seeded_sender(&logic, &keypair, 10);

        let trs = logic
            .create(
                keypair.secret(),
                Send,
                Some(Address(42)),
                1_000,
                100,
                TransactionAsset::None,
            )
            .unwrap();
        assert!(matches!(
            logic.apply_unconfirmed(&trs),
            Err(transaction::Error::InsufficientBalance { .. }),
        ));
        // Nothing changed.
        assert_eq!(logic.accounts().get(&sender.address).unwrap().u_balance, 10);
    }

    #[test]
    fn confirmed_apply_credits_recipient() {
        let logic = logic();
        let keypair = Random.generate();
        let sender = seeded_sender(&logic, &keypair, 1_000_000_000);
        let recipient = Address(42);

        let trs = logic
            .create(
                keypair.secret(),
                Send,
                Some(recipient),
                1_000,
                100,
                TransactionAsset::None,
            )
            .unwrap();
        logic.apply(&trs).unwrap();

        let debited = logic.accounts().get(&sender.address).unwrap();
        assert_eq!(debited.balance, 1_000_000_000 - trs.cost());
        assert_eq!(debited.u_balance, 1_000_000_000 - trs.cost());

        let credited = logic.accounts().get(&recipient).unwrap();
        assert_eq!(credited.balance, 1_000);
        assert_eq!(credited.u_balance, 1_000);
    }

    #[test]
    fn confirmed_signature_installs_second_key() {
        let logic = logic();
        let keypair = Random.generate();
        let second = Random.generate();
        let sender = seeded_sender(&logic, &keypair, 1_000_000_000);

        let trs = logic
            .create(
                keypair.secret(),
                Signature,
                None,
                0,
                100,
                TransactionAsset::SecondSignature {
                    public_key: *second.public(),
                },
            )
            .unwrap();
        logic.apply(&trs).unwrap();

        assert_eq!(
            logic.accounts().get(&sender.address).unwrap().second_public_key,
            Some(*second.public()),
        );
    }

    #[test]
    fn block_signature_round_trips() {
        let delegate = Random.generate();
        let mut block = test_helpers::genesis();
        block.generator_public_key = *delegate.public();

        sign_block(delegate.secret(), &mut block).unwrap();
        assert!(verify_block_signature(&block));
        assert_eq!(block.id, block_id(&block));

        block.reward += 1;
        assert!(!verify_block_signature(&block));
    }
}
