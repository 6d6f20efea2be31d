// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Connector configuration
//!
//! Defaults applied by a connection to every transaction it begins and to
//! the query options derived for each data query.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Transaction isolation mode requested from the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TxMode {
    /// Read-write, serializable
    #[default]
    SerializableReadWrite,
    /// Read-only over a consistent snapshot
    SnapshotReadOnly,
    /// Read-only over the most recent committed data
    OnlineReadOnly,
    /// Read-only, possibly stale
    StaleReadOnly,
}

impl TxMode {
    pub fn is_read_only(&self) -> bool {
        !matches!(self, TxMode::SerializableReadWrite)
    }
}

impl std::str::FromStr for TxMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "serializable_read_write" | "serializable" => Ok(TxMode::SerializableReadWrite),
            "snapshot_read_only" | "snapshot" => Ok(TxMode::SnapshotReadOnly),
            "online_read_only" | "online" => Ok(TxMode::OnlineReadOnly),
            "stale_read_only" | "stale" => Ok(TxMode::StaleReadOnly),
            _ => Err(Error::Config(format!(
                "Unknown transaction mode: {}. Valid options: serializable, snapshot, online, stale",
                s
            ))),
        }
    }
}

impl std::fmt::Display for TxMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TxMode::SerializableReadWrite => "serializable_read_write",
            TxMode::SnapshotReadOnly => "snapshot_read_only",
            TxMode::OnlineReadOnly => "online_read_only",
            TxMode::StaleReadOnly => "stale_read_only",
        };
        write!(f, "{}", name)
    }
}

/// Settings passed to the backend when a transaction begins
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TxSettings {
    pub mode: TxMode,
}

impl TxSettings {
    pub fn new(mode: TxMode) -> Self {
        Self { mode }
    }
}

/// Statistics the backend should collect per query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatsMode {
    #[default]
    None,
    Basic,
    Full,
}

/// Connector-wide defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Settings used by `Connection::begin_tx`
    pub tx_settings: TxSettings,
    /// Keep compiled queries in the backend cache when they carry parameters
    pub keep_in_cache: bool,
    /// Statistics collection mode for data queries
    pub stats_mode: StatsMode,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            tx_settings: TxSettings::default(),
            keep_in_cache: true,
            stats_mode: StatsMode::None,
        }
    }
}

impl ConnectorConfig {
    pub fn with_tx_mode(mut self, mode: TxMode) -> Self {
        self.tx_settings.mode = mode;
        self
    }

    pub fn with_keep_in_cache(mut self, keep: bool) -> Self {
        self.keep_in_cache = keep;
        self
    }

    pub fn with_stats_mode(mut self, stats_mode: StatsMode) -> Self {
        self.stats_mode = stats_mode;
        self
    }

    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
