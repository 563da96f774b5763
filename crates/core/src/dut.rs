// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DUT connection identity and record, owned exclusively by the connection
//! cache (C1).

use crate::ids::DutId;
use std::time::SystemTime;

/// Identity of a single DUT: target address plus key material path. Two
/// connections with the same identity refer to the same physical device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DutIdentity {
    pub target_address: String,
    pub key_file: String,
}

impl DutIdentity {
    pub fn new(target_address: impl Into<String>, key_file: impl Into<String>) -> Self {
        Self {
            target_address: target_address.into(),
            key_file: key_file.into(),
        }
    }

    /// Derives the cache key used to identify a cached session.
    pub fn dut_id(&self) -> DutId {
        DutId::new(format!("{}|{}", self.target_address, self.key_file))
    }
}

/// Record owned by the connection cache for one live (or recently live)
/// DUT connection.
#[derive(Debug, Clone)]
pub struct DutConnection {
    pub identity: DutIdentity,
    /// Boot ID observed at dial time; never refreshed on reconnect so the
    /// diagnosis engine can detect an intervening reboot.
    pub initial_boot_id: String,
    pub created_at: SystemTime,
}

impl DutConnection {
    pub fn new(identity: DutIdentity, initial_boot_id: impl Into<String>, created_at: SystemTime) -> Self {
        Self {
            identity,
            initial_boot_id: initial_boot_id.into(),
            created_at,
        }
    }

    pub fn id(&self) -> DutId {
        self.identity.dut_id()
    }
}

#[cfg(test)]
#[path = "dut_tests.rs"]
mod tests;
