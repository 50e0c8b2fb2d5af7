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

//! Two-phase transaction verification.
//!
//! Phase one is content verification (signature, id, shape, schedule);
//! phase two checks the transaction against unconfirmed ledger state.
//! Either phase failing short-circuits; the caller reports the outcome
//! to the sender's session.

use serde::Serialize;

use crate::client::Client;
use ddk_types::{account::Account, transaction, transaction::Transaction};

/// Session payload reporting a verification outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyMessage {
    /// Whether both phases passed.
    pub verified: bool,
    /// Rendered rejection reasons, empty on success.
    pub errors: Vec<String>,
}

impl VerifyMessage {
    /// Successful outcome.
    pub fn verified() -> VerifyMessage {
        VerifyMessage {
            verified: true,
            errors: Vec::new(),
        }
    }

    /// Failed outcome carrying the rejection reason.
    pub fn declined(error: &transaction::Error) -> VerifyMessage {
        VerifyMessage {
            verified: false,
            errors: vec![error.to_string()],
        }
    }
}

/// Transaction verifier.
///
/// Stateless; both phases delegate to the client so that the same checks
/// back admission from users and from peers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier;

impl Verifier {
    /// Run both verification phases.
    pub fn verify<C: Client>(
        client: &C,
        trs: &Transaction,
        sender: &Account,
    ) -> Result<(), transaction::Error> {
        if let Err(err) = client.verify(trs, sender) {
            debug!(target: "txqueue", "[{:?}] Rejected: {}", trs.id, err);
            return Err(err);
        }

        if let Err(err) = client.verify_unconfirmed(trs, sender) {
            debug!(target: "txqueue", "[{:?}] Rejected against unconfirmed state: {}", trs.id, err);
            return Err(err);
        }

        Ok(())
    }
}
