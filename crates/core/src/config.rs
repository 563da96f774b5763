// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator configuration surface: everything C7 needs to run one pass,
//! already parsed and validated. Loading this from a file or flags is an
//! external collaborator's job; this module owns only the typed shape and
//! its validation rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How proxy environment variables are propagated to the local runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyMode {
    #[default]
    None,
    Env,
}

/// How data files are made available to the DUT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadMode {
    #[default]
    Lazy,
    Batch,
}

/// Configuration error raised by [`OrchestratorConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target address must not be empty")]
    MissingTargetAddress,
    #[error("ssh key file must not be empty")]
    MissingKeyFile,
    #[error("total shards must be at least 1")]
    InvalidShardCount,
    #[error("shard index {index} out of range for {total} total shards")]
    ShardIndexOutOfRange { index: u32, total: u32 },
    #[error("build-artifacts URL `{0}` is not a recognized gs:// URL")]
    UnparseableBuildArtifactsUrl(String),
}

/// Full configuration for one orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub target_address: String,
    pub ssh_key_file: String,
    #[serde(default)]
    pub ssh_key_dir: Option<String>,
    pub local_runner_path: String,
    pub remote_runner_path: String,
    pub local_bundle_dir: String,
    pub remote_bundle_dir: String,
    pub local_data_dir: String,
    pub remote_data_dir: String,
    pub remote_out_dir: String,
    #[serde(default)]
    pub build_workspace: Option<String>,
    #[serde(default)]
    pub build_bundle: Option<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub shard_index: u32,
    #[serde(default = "default_total_shards")]
    pub total_shards: u32,
    #[serde(default)]
    pub check_test_deps: bool,
    #[serde(default)]
    pub collect_sys_info: bool,
    #[serde(default)]
    pub max_test_failures: u32,
    #[serde(default)]
    pub proxy: ProxyMode,
    #[serde(default)]
    pub download_mode: DownloadMode,
    #[serde(default)]
    pub extra_devserver_urls: Vec<String>,
    #[serde(default)]
    pub build_artifacts_url: Option<String>,
    #[serde(default)]
    pub extra_allowed_storage_buckets: Vec<String>,
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
    #[serde(default = "default_wait_timeout_secs")]
    pub local_runner_wait_timeout_secs: u64,
}

fn default_total_shards() -> u32 {
    1
}

fn default_heartbeat_interval_secs() -> u64 {
    10
}

fn default_wait_timeout_secs() -> u64 {
    60
}

impl OrchestratorConfig {
    /// Validates cross-field invariants and auto-augments
    /// `extra_allowed_storage_buckets` with the bucket parsed out of
    /// `build_artifacts_url`, if one is set and not already present.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.target_address.is_empty() {
            return Err(ConfigError::MissingTargetAddress);
        }
        if self.ssh_key_file.is_empty() {
            return Err(ConfigError::MissingKeyFile);
        }
        if self.total_shards == 0 {
            return Err(ConfigError::InvalidShardCount);
        }
        if self.shard_index >= self.total_shards {
            return Err(ConfigError::ShardIndexOutOfRange {
                index: self.shard_index,
                total: self.total_shards,
            });
        }
        if let Some(url) = &self.build_artifacts_url {
            let bucket = parse_gs_bucket(url)
                .ok_or_else(|| ConfigError::UnparseableBuildArtifactsUrl(url.clone()))?;
            if !self.extra_allowed_storage_buckets.contains(&bucket) {
                self.extra_allowed_storage_buckets.push(bucket);
            }
        }
        Ok(())
    }

    /// The remote bundle glob per the non-typo redesign: a wildcard when no
    /// build bundle is configured, the named bundle path when one is.
    pub fn remote_bundle_glob(&self) -> String {
        match &self.build_bundle {
            Some(bundle) => format!("{}/{}", self.remote_bundle_dir, bundle),
            None => format!("{}/*", self.remote_bundle_dir),
        }
    }
}

/// Extracts the bucket name from a `gs://bucket/path...` URL.
fn parse_gs_bucket(url: &str) -> Option<String> {
    let rest = url.strip_prefix("gs://")?;
    let bucket = rest.split('/').next()?;
    if bucket.is_empty() {
        None
    } else {
        Some(bucket.to_string())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
