// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Connection owning the active-transaction slot
//!
//! A connection wraps one native session and holds at most one active
//! transaction. Transactions keep a non-owning back-reference to the
//! connection state and may only clear the slot they were assigned.
//!
//! A connection is single-owner: using it from several threads at once,
//! or running several transactions on it concurrently, is out of contract.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::{ConnectorConfig, TxSettings};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::native::NativeSession;
use crate::trace::{NoTrace, TxTrace};
use crate::tx::Tx;

/// State shared between a connection and its transaction
pub(crate) struct ConnState {
    pub(crate) id: Uuid,
    closed: AtomicBool,
    current_tx: Mutex<Option<String>>,
    pub(crate) config: ConnectorConfig,
    pub(crate) trace: Arc<dyn TxTrace>,
}

impl ConnState {
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Replace `err` with `ConnectionClosed` if the connection has closed
    pub(crate) fn check_closed(&self, err: Error) -> Error {
        if self.is_closed() {
            log::debug!(
                "conn={}: reporting connection closed instead of: {}",
                self.id,
                err
            );
            return Error::ConnectionClosed;
        }
        err
    }

    pub(crate) fn holds_tx(&self, tx_id: &str) -> bool {
        self.current_tx.lock().as_deref() == Some(tx_id)
    }

    /// Clear the slot if it still refers to `tx_id`
    pub(crate) fn clear_tx(&self, tx_id: &str) -> bool {
        let mut slot = self.current_tx.lock();
        if slot.as_deref() == Some(tx_id) {
            *slot = None;
            return true;
        }
        false
    }
}

/// A database connection able to run one transaction at a time
pub struct Connection {
    state: Arc<ConnState>,
    session: Arc<dyn NativeSession>,
}

impl Connection {
    pub fn new(session: Arc<dyn NativeSession>, config: ConnectorConfig) -> Self {
        Self::with_trace(session, config, Arc::new(NoTrace))
    }

    pub fn with_trace(
        session: Arc<dyn NativeSession>,
        config: ConnectorConfig,
        trace: Arc<dyn TxTrace>,
    ) -> Self {
        let id = Uuid::new_v4();
        log::debug!("conn={}: opened", id);
        Self {
            state: Arc::new(ConnState {
                id,
                closed: AtomicBool::new(false),
                current_tx: Mutex::new(None),
                config,
                trace,
            }),
            session,
        }
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.state.config
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Reclassify `err` as `ConnectionClosed` if the connection has since closed
    pub fn check_closed(&self, err: Error) -> Error {
        self.state.check_closed(err)
    }

    /// Identifier of the active transaction, if any
    pub fn current_tx_id(&self) -> Option<String> {
        self.state.current_tx.lock().clone()
    }

    /// Begin a transaction with the connector's default settings
    pub fn begin_tx(&self, ctx: Context) -> Result<Tx> {
        let settings = self.state.config.tx_settings;
        self.begin_tx_with(ctx, settings)
    }

    /// Begin a transaction; `ctx` is kept for its commit or rollback
    pub fn begin_tx_with(&self, ctx: Context, settings: TxSettings) -> Result<Tx> {
        let trace = self.state.trace.clone();
        trace.on_begin_start(self.state.id);
        let result = self.begin_inner(ctx, settings);
        match &result {
            Ok(tx) => trace.on_begin_done(self.state.id, Some(tx.tx_id()), None),
            Err(e) => trace.on_begin_done(self.state.id, None, Some(e)),
        }
        result
    }

    fn begin_inner(&self, ctx: Context, settings: TxSettings) -> Result<Tx> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        if let Some(active) = self.current_tx_id() {
            return Err(Error::TxInProgress(active));
        }
        ctx.err()?;

        let native = self
            .session
            .begin_transaction(&ctx, &settings)
            .map_err(|e| self.check_closed(Error::native(e)))?;
        let tx_id = native.id().to_string();

        *self.state.current_tx.lock() = Some(tx_id.clone());
        log::debug!(
            "conn={}: began tx={} mode={}",
            self.state.id,
            tx_id,
            settings.mode
        );

        Ok(Tx::new(&self.state, ctx, native))
    }

    /// Close the connection and release the native session
    ///
    /// Closing twice is a no-op. An active transaction is not rolled back;
    /// its later operations fail with `ConnectionClosed`.
    pub fn close(&self, ctx: &Context) -> Result<()> {
        if self.state.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(tx_id) = self.current_tx_id() {
            log::warn!(
                "conn={}: closing with active tx={}",
                self.state.id,
                tx_id
            );
        }
        log::debug!("conn={}: closed", self.state.id);
        self.session.close(ctx).map_err(Error::native)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Err(e) = self.close(&Context::background()) {
            log::warn!("conn={}: failed to close session: {}", self.state.id, e);
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.state.id)
            .field("closed", &self.is_closed())
            .field("current_tx", &self.current_tx_id())
            .finish()
    }
}
