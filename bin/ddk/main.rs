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

//! DDK node application.

extern crate parity_crypto as crypto;

#[macro_use]
extern crate log;

mod config;

use std::{io::Write, process, sync::Arc, thread, time::Duration};

use clap::{App, Arg};
use crypto::{
    digest,
    publickey::{Generator, KeyPair, Random, Secret},
};
use ddk_accounts::AccountDb;
use ddk_chain::{
    logic, BlockProcessor, BlockVerifier, BlockVersion, Delegates, Forger, NullDelegates,
    PoolClient, ChainStore, TransactionLogic,
};
use ddk_pool::{
    NullSessions, Options, Sequence, SequenceConfig, TransactionPool, TransactionQueue,
};
use ddk_types::{
    account::Address,
    block::Block,
    transaction::{Transaction, TransactionAsset, TransactionKind, TransactionStatus},
};
use ethereum_types::H256;

use crate::config::Config;

fn main() {
    let matches = App::new("DDK Core")
        .version("1.0.0")
        .about("DDK blockchain node")
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .value_name("FILE")
                .help("Path to the toml configuration file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("logging")
                .long("logging")
                .short("l")
                .value_name("LOGGING")
                .help("Logging directives, e.g. info,txqueue=trace")
                .takes_value(true),
        )
        .get_matches();

    let config = match Config::load(matches.value_of("config")) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    setup_log(matches.value_of("logging").or(config.logging.mode.as_deref()));

    if let Err(err) = run(config) {
        error!(target: "ddk", "{err}");
        process::exit(1);
    }
}

fn setup_log(mode: Option<&str>) {
    let mut builder = env_logger::Builder::new();
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {} {}  {}",
            buf.timestamp(),
            record.level(),
            record.target(),
            record.args(),
        )
    });
    builder.parse(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    if let Some(mode) = mode {
        builder.parse(mode);
    }
    builder.init();
}

fn run(config: Config) -> Result<(), String> {
    let params = config.chain.params();
    let slots = params.slots();

    let accounts = Arc::new(AccountDb::new());
    let logic = Arc::new(TransactionLogic::new(accounts, params.clone()));
    let store = Arc::new(ChainStore::new());
    let delegates: Arc<dyn Delegates> = Arc::new(NullDelegates);
    let versions = BlockVersion::default();
    let verifier = Arc::new(BlockVerifier::new(
        logic.clone(),
        delegates.clone(),
        versions.clone(),
    ));
    let pool = Arc::new(TransactionPool::new(Options {
        max_shared_txs: params.max_shared_txs,
    }));
    let sequence = Arc::new(Sequence::new("main", SequenceConfig::default()));
    let queue = Arc::new(TransactionQueue::new(
        pool.clone(),
        sequence,
        Arc::new(NullSessions),
        params.transaction_queue_expire,
    ));
    let client = PoolClient::new(logic.clone(), store.clone());
    let processor = BlockProcessor::new(
        store.clone(),
        logic.clone(),
        verifier,
        pool.clone(),
        queue,
        delegates,
        client.clone(),
    );

    let forging_keys = match &config.forging.secret {
        Some(raw) => {
            let secret: Secret = Secret::copy_from_str(raw)
                .map_err(|err| format!("Invalid forging secret: {err}"))?;
            Some(KeyPair::from_secret(secret).map_err(|err| format!("Invalid forging secret: {err}"))?)
        }
        None => None,
    };

    let signer = forging_keys.clone().unwrap_or_else(|| Random.generate());
    let genesis = build_genesis(&logic, &versions, &signer, &config.premine)?;
    processor
        .install_genesis(genesis)
        .map_err(|err| err.to_string())?;
    processor.on_blockchain_ready();

    let forger = forging_keys.map(|keypair| {
        Forger::new(
            logic.clone(),
            pool.clone(),
            versions.clone(),
            keypair.secret().clone(),
        )
    });
    info!(
        target: "ddk",
        "Node started at height {}; forging {}",
        store.height(),
        if forger.is_some() { "enabled" } else { "disabled" },
    );

    let mut ticks = 0u64;
    loop {
        thread::sleep(Duration::from_secs(1));
        ticks += 1;

        if let Some(forger) = &forger {
            let last = store
                .last_block()
                .ok_or_else(|| "Blockchain is not initialized".to_string())?;
            let now = slots.now();
            if slots.slot_number(now) > slots.slot_number(last.timestamp) {
                let forged = forger
                    .forge(&client, &last, now)
                    .map_err(|err| err.to_string())
                    .and_then(|block| {
                        processor
                            .process_block(block, true, true)
                            .map_err(|err| err.to_string())
                    });
                if let Err(err) = forged {
                    warn!(target: "forge", "Failed to forge block: {err}");
                }
            }
        }

        if ticks % 30 == 0 {
            info!(target: "ddk", "{} | height {}", pool.status(), store.height());
        }
    }
}

/// Build the genesis block: the premine is minted by unsigned transfers
/// from the genesis signer, credited on installation.
fn build_genesis(
    logic: &TransactionLogic,
    versions: &BlockVersion,
    signer: &KeyPair,
    premine: &[config::Premine],
) -> Result<Block, String> {
    let mut transactions = Vec::new();
    for entry in premine {
        let recipient = Address::from_str_prefixed(&entry.address)
            .ok_or_else(|| format!("Invalid premine address {}", entry.address))?;
        let mut trs = Transaction {
            id: H256::zero(),
            kind: TransactionKind::Send,
            sender_public_key: *signer.public(),
            sender_id: Address::from_public(signer.public()),
            recipient_id: Some(recipient),
            amount: entry.amount,
            fee: 0,
            timestamp: 0,
            signature: None,
            asset: TransactionAsset::None,
            status: TransactionStatus::Created,
        };
        trs.id = logic.id(&trs);
        transactions.push(trs);
    }

    let mut payload = Vec::new();
    let mut total_amount = 0u64;
    for trs in &transactions {
        payload.extend_from_slice(&logic.bytes(trs, false));
        total_amount = total_amount.saturating_add(trs.amount);
    }

    let mut block = Block {
        id: H256::zero(),
        height: 1,
        previous_block: None,
        timestamp: 0,
        version: versions.version_at(1),
        generator_public_key: *signer.public(),
        signature: None,
        reward: 0,
        total_amount,
        total_fee: 0,
        payload_length: payload.len() as u32,
        payload_hash: H256::from_slice(&digest::sha256(&payload)),
        number_of_transactions: transactions.len() as u32,
        transactions,
    };
    logic::sign_block(signer.secret(), &mut block).map_err(|err| err.to_string())?;
    Ok(block)
}
