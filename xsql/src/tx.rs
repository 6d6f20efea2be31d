// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction adapter
//!
//! `Tx` exposes the SQL-driver transaction surface (commit, rollback, query,
//! exec, id) on top of a native transaction handle. It owns the lifecycle
//! bookkeeping:
//! - closed connections short-circuit commit and rollback
//! - commit and rollback always clear the connection's transaction slot
//! - every failure is reclassified as `ConnectionClosed` if the connection
//!   closed in the meantime
//! - query and exec run under the caller's context, commit and rollback
//!   under the context the transaction was begun with

use std::sync::{Arc, Weak};

use uuid::Uuid;

use crate::conn::ConnState;
use crate::context::Context;
use crate::declares::query_with_declares;
use crate::error::{Error, Result};
use crate::native::{NativeResult, NativeTransaction};
use crate::options::data_query_options;
use crate::params::{to_query_params, NamedValue};
use crate::rows::{NopResult, Rows};
use crate::trace::{QueryEvent, TxEvent, TxTrace};

/// Transaction lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Active,
    Committed,
    /// Rolled back explicitly, on drop, or after a failed commit
    RolledBack,
    /// Ended locally because the stored context was done; the backend
    /// never saw a commit or rollback and expires the transaction itself
    Abandoned,
}

impl TxState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxState::Active)
    }
}

/// Exposes the backend-assigned transaction identifier
pub trait Identifiable {
    fn id(&self) -> &str;
}

pub trait Transactional {
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}

pub trait QueryCapable {
    /// Run a data query under `ctx` and return its rows
    fn query_context(&mut self, ctx: &Context, query: &str, args: &[NamedValue])
        -> Result<Rows>;
}

pub trait ExecCapable {
    /// Run a statement under `ctx` for effect only
    fn exec_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<NopResult>;
}

/// Clears the connection's transaction slot when dropped
struct ClearSlot<'a> {
    conn: &'a ConnState,
    tx_id: &'a str,
}

impl Drop for ClearSlot<'_> {
    fn drop(&mut self) {
        self.conn.clear_tx(self.tx_id);
    }
}

/// Adapter from the driver transaction surface to a native transaction
pub struct Tx {
    id: String,
    conn_id: Uuid,
    conn: Weak<ConnState>,
    ctx: Context,
    native: Box<dyn NativeTransaction>,
    trace: Arc<dyn TxTrace>,
    state: TxState,
}

impl Tx {
    pub(crate) fn new(
        conn: &Arc<ConnState>,
        ctx: Context,
        native: Box<dyn NativeTransaction>,
    ) -> Self {
        Self {
            id: native.id().to_string(),
            conn_id: conn.id,
            conn: Arc::downgrade(conn),
            ctx,
            native,
            trace: conn.trace.clone(),
            state: TxState::Active,
        }
    }

    pub fn tx_id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    /// Context stored at begin; used for commit and rollback
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The owning connection, unless it is gone or closed
    fn live_conn(&self) -> Result<Arc<ConnState>> {
        match self.conn.upgrade() {
            Some(conn) if !conn.is_closed() => Ok(conn),
            _ => Err(Error::ConnectionClosed),
        }
    }

    fn commit_inner(&mut self) -> Result<()> {
        let conn = self.live_conn()?;
        if self.state.is_terminal() {
            return Err(Error::TxDone);
        }

        let _clear = ClearSlot {
            conn: &conn,
            tx_id: &self.id,
        };
        if let Err(e) = self.ctx.err() {
            self.state = TxState::Abandoned;
            return Err(conn.check_closed(e));
        }
        self.state = TxState::RolledBack;

        let mut result = self
            .native
            .commit_tx(&self.ctx)
            .map_err(|e| conn.check_closed(Error::native(e)))?;
        self.state = TxState::Committed;

        if let Err(e) = result.close() {
            log::debug!("tx={}: failed to close commit result: {}", self.id, e);
        }
        log::debug!("conn={}: committed tx={}", self.conn_id, self.id);
        Ok(())
    }

    fn rollback_inner(&mut self) -> Result<()> {
        let conn = self.live_conn()?;

        let _clear = ClearSlot {
            conn: &conn,
            tx_id: &self.id,
        };
        if !conn.holds_tx(&self.id) {
            if !self.state.is_terminal() {
                self.state = TxState::RolledBack;
            }
            return Ok(());
        }
        if let Err(e) = self.ctx.err() {
            self.state = TxState::Abandoned;
            return Err(conn.check_closed(e));
        }
        self.state = TxState::RolledBack;

        self.native
            .rollback(&self.ctx)
            .map_err(|e| conn.check_closed(Error::native(e)))?;

        log::debug!("conn={}: rolled back tx={}", self.conn_id, self.id);
        Ok(())
    }

    /// Shared path of query and exec: translate, declare, execute
    fn execute(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<(Arc<ConnState>, Box<dyn NativeResult>)> {
        if self.state.is_terminal() {
            return Err(Error::TxDone);
        }
        let conn = self.conn.upgrade().ok_or(Error::ConnectionClosed)?;
        ctx.err().map_err(|e| conn.check_closed(e))?;

        let params = to_query_params(args)?;
        let declared = query_with_declares(query, &params);
        let options = data_query_options(ctx, &params, &conn.config);

        let mut result = self
            .native
            .execute(ctx, &declared, &params, &options)
            .map_err(|e| conn.check_closed(Error::native(e)))?;

        if let Some(e) = result.err() {
            if let Err(close_err) = result.close() {
                log::debug!("tx={}: failed to close result: {}", self.id, close_err);
            }
            return Err(conn.check_closed(Error::result_set(e)));
        }
        Ok((conn, result))
    }

    fn query_inner(&mut self, ctx: &Context, query: &str, args: &[NamedValue]) -> Result<Rows> {
        let (_, result) = self.execute(ctx, query, args)?;
        Ok(Rows::new(result))
    }

    fn exec_inner(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<NopResult> {
        let (conn, mut result) = self.execute(ctx, query, args)?;
        result
            .close()
            .map_err(|e| conn.check_closed(Error::native(e)))?;
        Ok(NopResult)
    }
}

impl Identifiable for Tx {
    fn id(&self) -> &str {
        self.native.id()
    }
}

impl Transactional for Tx {
    fn commit(&mut self) -> Result<()> {
        let trace = self.trace.clone();
        let tx_id = self.id.clone();
        let event = TxEvent {
            conn_id: self.conn_id,
            tx_id: &tx_id,
        };
        trace.on_commit_start(&event);
        let result = self.commit_inner();
        trace.on_commit_done(&event, result.as_ref().err());
        result
    }

    fn rollback(&mut self) -> Result<()> {
        let trace = self.trace.clone();
        let tx_id = self.id.clone();
        let event = TxEvent {
            conn_id: self.conn_id,
            tx_id: &tx_id,
        };
        trace.on_rollback_start(&event);
        let result = self.rollback_inner();
        trace.on_rollback_done(&event, result.as_ref().err());
        result
    }
}

impl QueryCapable for Tx {
    fn query_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<Rows> {
        let trace = self.trace.clone();
        let tx_id = self.id.clone();
        let event = QueryEvent {
            tx: TxEvent {
                conn_id: self.conn_id,
                tx_id: &tx_id,
            },
            query,
            idempotent: ctx.is_idempotent(),
        };
        trace.on_query_start(&event);
        let result = self.query_inner(ctx, query, args);
        trace.on_query_done(&event, result.as_ref().err());
        result
    }
}

impl ExecCapable for Tx {
    fn exec_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> Result<NopResult> {
        let trace = self.trace.clone();
        let tx_id = self.id.clone();
        let event = QueryEvent {
            tx: TxEvent {
                conn_id: self.conn_id,
                tx_id: &tx_id,
            },
            query,
            idempotent: ctx.is_idempotent(),
        };
        trace.on_exec_start(&event);
        let result = self.exec_inner(ctx, query, args);
        trace.on_exec_done(&event, result.as_ref().err());
        result
    }
}

impl Drop for Tx {
    fn drop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        let Some(conn) = self.conn.upgrade() else {
            return;
        };
        if conn.is_closed() || !conn.holds_tx(&self.id) {
            return;
        }

        log::warn!(
            "conn={}: tx={} dropped while active, rolling back",
            self.conn_id,
            self.id
        );
        let trace = self.trace.clone();
        let tx_id = self.id.clone();
        let event = TxEvent {
            conn_id: self.conn_id,
            tx_id: &tx_id,
        };
        trace.on_rollback_start(&event);
        let result = match self.ctx.err() {
            Err(e) => {
                self.state = TxState::Abandoned;
                Err(e)
            }
            Ok(()) => {
                self.state = TxState::RolledBack;
                self.native.rollback(&self.ctx).map_err(Error::native)
            }
        };
        conn.clear_tx(&self.id);
        let result = result.map_err(|e| conn.check_closed(e));
        trace.on_rollback_done(&event, result.as_ref().err());
        if let Err(e) = result {
            log::warn!("tx={}: rollback on drop failed: {}", self.id, e);
        }
    }
}

impl std::fmt::Debug for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tx")
            .field("id", &self.id)
            .field("conn_id", &self.conn_id)
            .field("state", &self.state)
            .finish()
    }
}
