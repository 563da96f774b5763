// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads an [`OrchestratorConfig`] from a TOML or JSON file on disk, picked
//! by the file's extension.

use hostdrv_core::OrchestratorConfig;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigSourceError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("failed to parse {path} as TOML: {source}")]
    Toml { path: String, #[source] source: toml::de::Error },
    #[error("failed to parse {path} as JSON: {source}")]
    Json { path: String, #[source] source: serde_json::Error },
    #[error("unrecognized config file extension in {0}; expected .toml or .json")]
    UnknownExtension(String),
}

pub fn load(path: &Path) -> Result<OrchestratorConfig, ConfigSourceError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigSourceError::Read { path: path.display().to_string(), source })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&text)
            .map_err(|source| ConfigSourceError::Toml { path: path.display().to_string(), source }),
        Some("json") => serde_json::from_str(&text)
            .map_err(|source| ConfigSourceError::Json { path: path.display().to_string(), source }),
        _ => Err(ConfigSourceError::UnknownExtension(path.display().to_string())),
    }
}
