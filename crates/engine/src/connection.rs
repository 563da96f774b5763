// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection cache (C1): owns at most one live SSH session per DUT,
//! redialing on demand, and records the boot ID exactly once per
//! connection lifetime so the diagnosis engine can detect an intervening
//! reboot.

use crate::error::ConnectionError;
use hostdrv_adapters::{read_boot_id, SshDialer, SshSession};
use hostdrv_core::{DutConnection, DutIdentity};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::SystemTime;

struct Entry<S> {
    session: S,
    connection: DutConnection,
}

/// Caches one live session per [`DutIdentity`]. Unhealthy sessions (any
/// fallible operation having failed through them, per
/// [`SshSession::is_healthy`]) are transparently redialed on the next
/// [`ConnectionCache::conn`] call, but the stored boot ID is never
/// refreshed: it stays the boot ID observed at the *first* dial.
pub struct ConnectionCache<D: SshDialer> {
    dialer: D,
    entries: Mutex<HashMap<DutIdentity, Entry<D::Session>>>,
}

impl<D: SshDialer> ConnectionCache<D> {
    pub fn new(dialer: D) -> Self {
        Self { dialer, entries: Mutex::new(HashMap::new()) }
    }

    /// Returns a cached healthy session, or dials a new one. The boot ID is
    /// read exactly once per connection *lifetime* (the first dial ever
    /// performed for this identity): a redial following an unhealthy
    /// session reuses the previously stored boot ID so the diagnosis engine
    /// can detect an intervening reboot.
    pub async fn conn(&self, identity: &DutIdentity) -> Result<(D::Session, DutConnection), ConnectionError> {
        if let Some(entry) = self.entries.lock().get(identity) {
            if entry.session.is_healthy() {
                return Ok((entry.session.clone(), entry.connection.clone()));
            }
        }

        let session = self.dialer.dial(&identity.target_address, &identity.key_file).await?;

        let previous_boot_id =
            self.entries.lock().get(identity).map(|e| e.connection.initial_boot_id.clone());
        let boot_id = match previous_boot_id {
            Some(id) => id,
            None => read_boot_id(&session).await?,
        };
        let connection = DutConnection::new(identity.clone(), boot_id, SystemTime::now());

        self.entries
            .lock()
            .insert(identity.clone(), Entry { session: session.clone(), connection: connection.clone() });

        Ok((session, connection))
    }

    /// Drops the cached entry for `identity`. Subsequent `conn` calls redial.
    pub fn close(&self, identity: &DutIdentity) {
        self.entries.lock().remove(identity);
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
