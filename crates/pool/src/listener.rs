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

//! Pool event listeners and per-account session notifications.

use ddk_types::{account::Address, transaction::Transaction};
use parking_lot::RwLock;

use crate::verifier::VerifyMessage;

/// Session channel verification outcomes are delivered on.
pub const POOL_VERIFY_CHANNEL: &str = "pool/verify";

/// Per-account notification sink.
///
/// Delivery is fire-and-forget best effort; admission never waits on it.
pub trait AccountSessions: Send + Sync {
    /// Deliver `message` to all sessions of `address` on `channel`.
    fn send(&self, address: Address, channel: &str, message: VerifyMessage);
}

/// Sessions sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSessions;

impl AccountSessions for NullSessions {
    fn send(&self, _address: Address, _channel: &str, _message: VerifyMessage) {}
}

/// Broadcast listeners notified about every transaction entering
/// the pool.
#[derive(Default)]
pub struct Notifier {
    listeners: RwLock<Vec<Box<dyn Fn(&Transaction) + Send + Sync>>>,
}

impl Notifier {
    /// Add a listener.
    pub fn add(&self, f: Box<dyn Fn(&Transaction) + Send + Sync>) {
        self.listeners.write().push(f);
    }

    /// Notify all listeners.
    pub fn notify(&self, trs: &Transaction) {
        for listener in &*self.listeners.read() {
            listener(trs);
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}
