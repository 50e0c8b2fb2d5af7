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

//! Accounts and address derivation.

use std::fmt;

use crypto::{digest, publickey::Public};

/// Prefix carried by every textual address on this chain.
pub const ADDRESS_PREFIX: &str = "DDK";

/// An account address.
///
/// Numerically it is the first 8 bytes of `sha256(public_key)` read as a
/// little-endian unsigned integer; textually it is that number with the
/// `DDK` prefix. Multiple components (conflict lookup, session routing,
/// verification) derive addresses on the fly, so derivation lives here
/// rather than in the crypto layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub u64);

impl Address {
    /// Derive the address of a public key.
    pub fn from_public(public: &Public) -> Address {
        let hash = digest::sha256(public.as_bytes());
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&hash[0..8]);
        Address(u64::from_le_bytes(raw))
    }

    /// Parse a `DDK`-prefixed textual address.
    pub fn from_str_prefixed(s: &str) -> Option<Address> {
        s.strip_prefix(ADDRESS_PREFIX)
            .and_then(|digits| digits.parse().ok())
            .map(Address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", ADDRESS_PREFIX, self.0)
    }
}

/// Ledger state of a single account.
///
/// `balance` reflects confirmed blocks only; `u_balance` additionally has
/// every pool transaction of this sender already deducted and is the
/// quantity new admissions are checked against. The frozen pair follows
/// the same confirmed/unconfirmed split for stake orders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Account {
    /// Account address.
    pub address: Address,
    /// Public key, installed the first time the account signs.
    pub public_key: Option<Public>,
    /// Optional second signing key (set by a SIGNATURE transaction).
    pub second_public_key: Option<Public>,
    /// Confirmed balance.
    pub balance: u64,
    /// Unconfirmed balance.
    pub u_balance: u64,
    /// Confirmed frozen (staked) amount.
    pub total_froze_amount: u64,
    /// Unconfirmed frozen (staked) amount.
    pub u_total_froze_amount: u64,
    /// Referrer recorded by a REFERRAL transaction.
    pub referral: Option<Address>,
}

impl Account {
    /// Create an empty account for `address`.
    pub fn new(address: Address) -> Account {
        Account {
            address,
            ..Default::default()
        }
    }

    /// Create an empty account owned by `public`.
    pub fn with_public_key(public: Public) -> Account {
        Account {
            address: Address::from_public(&public),
            public_key: Some(public),
            ..Default::default()
        }
    }
}
