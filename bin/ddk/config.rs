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

//! Node configuration file.

use std::fs;

use ddk_types::params::ChainParams;
use serde::Deserialize;

/// Top-level configuration, read from a toml file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Logging directives.
    pub logging: Logging,
    /// Chain parameter overrides.
    pub chain: Chain,
    /// Forging setup.
    pub forging: Forging,
    /// Genesis balances.
    pub premine: Vec<Premine>,
}

/// Logging section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    /// `env_logger` filter string, e.g. `info,txqueue=trace`.
    pub mode: Option<String>,
}

/// Chain parameter overrides; anything unset keeps the default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Chain {
    pub epoch_time: Option<u64>,
    pub slot_interval: Option<u32>,
    pub active_delegates: Option<u32>,
    pub max_txs_per_block: Option<usize>,
    pub max_shared_txs: Option<usize>,
    pub block_slot_window: Option<usize>,
    pub transaction_queue_expire: Option<u64>,
    pub master_node_migrated_block: Option<u64>,
    pub max_votes_per_transaction: Option<usize>,
    pub min_stake_amount: Option<u64>,
    pub reward_halt_height: Option<u64>,
}

impl Chain {
    /// Chain parameters with the overrides applied.
    pub fn params(&self) -> ChainParams {
        let mut params = ChainParams::default();
        macro_rules! apply {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    params.$field = value;
                })*
            };
        }
        apply!(
            epoch_time,
            slot_interval,
            active_delegates,
            max_txs_per_block,
            max_shared_txs,
            block_slot_window,
            transaction_queue_expire,
            master_node_migrated_block,
            max_votes_per_transaction,
            min_stake_amount,
            reward_halt_height
        );
        params
    }
}

/// Forging section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Forging {
    /// Hex-encoded delegate secret; forging is off when unset.
    pub secret: Option<String>,
}

/// One genesis balance.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Premine {
    /// `DDK`-prefixed address.
    pub address: String,
    /// Initial balance, smallest unit.
    pub amount: u64,
}

impl Config {
    /// Load from a toml file, or the defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Config, String> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read config file {path}: {err}"))?;
        toml::from_str(&raw).map_err(|err| format!("Invalid config file {path}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let config: Config = toml::from_str(
            r#"
            [logging]
            mode = "info,txqueue=trace"

            [chain]
            slot_interval = 5
            active_delegates = 3

            [forging]
            secret = "aa22aa"

            [[premine]]
            address = "DDK12345"
            amount = 1000
        "#,
        )
        .unwrap();

        let params = config.chain.params();
        assert_eq!(params.slot_interval, 5);
        assert_eq!(params.active_delegates, 3);
        assert_eq!(params.max_txs_per_block, ChainParams::default().max_txs_per_block);
        assert_eq!(config.premine.len(), 1);
        assert_eq!(config.logging.mode.as_deref(), Some("info,txqueue=trace"));
    }

    #[test]
    fn empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.forging.secret.is_none());
        assert!(config.premine.is_empty());
    }
}
