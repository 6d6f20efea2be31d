// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Native backend interface
//!
//! This module defines the seam between the adapter and the database's own
//! transaction engine:
//! - `NativeSession` begins transactions and owns the server-side session
//! - `NativeTransaction` commits, rolls back and executes queries
//! - `NativeResult` streams result sets back to the adapter
//! - `NativeError` classifies backend failures

use serde::{Deserialize, Serialize};

use crate::config::TxSettings;
use crate::context::Context;
use crate::options::ExecuteOptions;
use crate::params::QueryParameters;
use crate::value::{Type, Value};

/// Classification of a native backend failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeErrorKind {
    /// Network-level failure talking to the backend
    Transport,
    /// Backend aborted the transaction (e.g. lock invalidation)
    Aborted,
    /// Backend-side timeout
    Timeout,
    /// Backend is shedding load
    Overloaded,
    /// Server-side session is gone
    BadSession,
    /// Any other backend status
    Backend(u32),
}

/// Error reported by the native backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct NativeError {
    pub kind: NativeErrorKind,
    pub message: String,
}

impl NativeError {
    pub fn new(kind: NativeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the failure is transient from the backend's point of view
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            NativeErrorKind::Transport
                | NativeErrorKind::Aborted
                | NativeErrorKind::Overloaded
                | NativeErrorKind::BadSession
        )
    }
}

/// Column metadata of a native result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: Type,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: Type) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Server-side session able to start transactions
pub trait NativeSession: Send + Sync {
    /// Begin a new transaction with the given settings
    fn begin_transaction(
        &self,
        ctx: &Context,
        settings: &TxSettings,
    ) -> Result<Box<dyn NativeTransaction>, NativeError>;

    /// Release the server-side session
    fn close(&self, ctx: &Context) -> Result<(), NativeError>;
}

/// The backend's own transaction object
pub trait NativeTransaction: Send {
    /// Backend-assigned transaction identifier
    fn id(&self) -> &str;

    /// Commit and return whatever the commit produced
    fn commit_tx(&mut self, ctx: &Context) -> Result<Box<dyn NativeResult>, NativeError>;

    fn rollback(&mut self, ctx: &Context) -> Result<(), NativeError>;

    /// Execute a (declared) query within this transaction
    fn execute(
        &mut self,
        ctx: &Context,
        query: &str,
        params: &QueryParameters,
        options: &ExecuteOptions,
    ) -> Result<Box<dyn NativeResult>, NativeError>;
}

/// Streaming result produced by a native call
///
/// A result may hold several result sets. Rows are pulled from the current
/// set until `next_row` returns `None`, then `next_result_set` advances.
pub trait NativeResult: Send {
    /// Columns of the current result set
    fn columns(&self) -> Vec<Column>;

    /// Advance to the next result set; false when none remain
    fn next_result_set(&mut self) -> bool;

    /// Next row of the current result set
    fn next_row(&mut self) -> Option<Vec<Value>>;

    /// Error reported by the backend while producing this result
    fn err(&self) -> Option<NativeError>;

    fn close(&mut self) -> Result<(), NativeError>;
}
