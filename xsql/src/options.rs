// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Options for data queries executed inside a transaction

use crate::config::{ConnectorConfig, StatsMode};
use crate::context::Context;
use crate::params::QueryParameters;

/// Per-call options handed to `NativeTransaction::execute`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteOptions {
    /// Keep the compiled query in the backend cache
    pub keep_in_cache: bool,
    pub stats_mode: StatsMode,
    /// Retry hint for the backend's retry layer; never acted on here
    pub idempotent: bool,
}

/// Derive data query options for one call.
///
/// A keep-in-cache override on the context wins; otherwise caching follows
/// the connector policy and only applies to parameterised queries.
pub fn data_query_options(
    ctx: &Context,
    params: &QueryParameters,
    config: &ConnectorConfig,
) -> ExecuteOptions {
    let keep_in_cache = ctx
        .keep_in_cache()
        .unwrap_or(config.keep_in_cache && !params.is_empty());
    ExecuteOptions {
        keep_in_cache,
        stats_mode: config.stats_mode,
        idempotent: ctx.is_idempotent(),
    }
}
