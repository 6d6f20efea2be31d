// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Instrumentation hooks around transaction operations
//!
//! Each operation calls its `*_start` hook once before doing anything and its
//! `*_done` hook exactly once after it completes, with the final error (if
//! any). All hooks default to no-ops so implementors only override what they
//! observe.
//!
//! Dropping an active transaction rolls it back implicitly; that rollback
//! reports through `on_rollback_start`/`on_rollback_done` like an explicit one.

use uuid::Uuid;

use crate::error::Error;

/// Identity of the transaction an event belongs to
#[derive(Debug, Clone, Copy)]
pub struct TxEvent<'a> {
    pub conn_id: Uuid,
    pub tx_id: &'a str,
}

/// Query or exec issued inside a transaction
#[derive(Debug, Clone, Copy)]
pub struct QueryEvent<'a> {
    pub tx: TxEvent<'a>,
    pub query: &'a str,
    pub idempotent: bool,
}

pub trait TxTrace: Send + Sync {
    fn on_begin_start(&self, _conn_id: Uuid) {}
    fn on_begin_done(&self, _conn_id: Uuid, _tx_id: Option<&str>, _error: Option<&Error>) {}

    fn on_commit_start(&self, _event: &TxEvent<'_>) {}
    fn on_commit_done(&self, _event: &TxEvent<'_>, _error: Option<&Error>) {}

    fn on_rollback_start(&self, _event: &TxEvent<'_>) {}
    fn on_rollback_done(&self, _event: &TxEvent<'_>, _error: Option<&Error>) {}

    fn on_query_start(&self, _event: &QueryEvent<'_>) {}
    fn on_query_done(&self, _event: &QueryEvent<'_>, _error: Option<&Error>) {}

    fn on_exec_start(&self, _event: &QueryEvent<'_>) {}
    fn on_exec_done(&self, _event: &QueryEvent<'_>, _error: Option<&Error>) {}
}

/// Hooks that observe nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TxTrace for NoTrace {}

/// Hooks that report through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTrace;

impl LogTrace {
    fn done(op: &str, event: &TxEvent<'_>, error: Option<&Error>) {
        match error {
            None => log::debug!("{} done: conn={} tx={}", op, event.conn_id, event.tx_id),
            Some(e) => log::warn!(
                "{} failed: conn={} tx={}: {}",
                op,
                event.conn_id,
                event.tx_id,
                e
            ),
        }
    }
}

impl TxTrace for LogTrace {
    fn on_begin_start(&self, conn_id: Uuid) {
        log::debug!("begin: conn={}", conn_id);
    }

    fn on_begin_done(&self, conn_id: Uuid, tx_id: Option<&str>, error: Option<&Error>) {
        match error {
            None => log::debug!("begin done: conn={} tx={}", conn_id, tx_id.unwrap_or("")),
            Some(e) => log::warn!("begin failed: conn={}: {}", conn_id, e),
        }
    }

    fn on_commit_start(&self, event: &TxEvent<'_>) {
        log::debug!("commit: conn={} tx={}", event.conn_id, event.tx_id);
    }

    fn on_commit_done(&self, event: &TxEvent<'_>, error: Option<&Error>) {
        Self::done("commit", event, error);
    }

    fn on_rollback_start(&self, event: &TxEvent<'_>) {
        log::debug!("rollback: conn={} tx={}", event.conn_id, event.tx_id);
    }

    fn on_rollback_done(&self, event: &TxEvent<'_>, error: Option<&Error>) {
        Self::done("rollback", event, error);
    }

    fn on_query_start(&self, event: &QueryEvent<'_>) {
        log::debug!(
            "query: conn={} tx={} idempotent={} query={}",
            event.tx.conn_id,
            event.tx.tx_id,
            event.idempotent,
            event.query
        );
    }

    fn on_query_done(&self, event: &QueryEvent<'_>, error: Option<&Error>) {
        Self::done("query", &event.tx, error);
    }

    fn on_exec_start(&self, event: &QueryEvent<'_>) {
        log::debug!(
            "exec: conn={} tx={} idempotent={} query={}",
            event.tx.conn_id,
            event.tx.tx_id,
            event.idempotent,
            event.query
        );
    }

    fn on_exec_done(&self, event: &QueryEvent<'_>, error: Option<&Error>) {
        Self::done("exec", &event.tx, error);
    }
}
