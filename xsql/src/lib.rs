// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! xsql - SQL driver transaction adapter
//!
//! This crate bridges a generic SQL-driver transaction contract (commit,
//! rollback, query, exec) to the native transaction API of a distributed
//! database. The native engine is consumed through the traits in [`native`];
//! everything on this side of those traits is lifecycle bookkeeping and
//! error translation.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use xsql::{Connection, ConnectorConfig, Context, NamedValue, QueryCapable, Transactional, Value};
//!
//! # fn run(session: Arc<dyn xsql::NativeSession>) -> xsql::Result<()> {
//! let conn = Connection::new(session, ConnectorConfig::default());
//! let mut tx = conn.begin_tx(Context::background())?;
//!
//! let rows = tx.query_context(
//!     &Context::background(),
//!     "SELECT * FROM t WHERE id = $p1",
//!     &[NamedValue::named("p1", Value::Int64(42))],
//! )?;
//! for row in rows {
//!     println!("{:?}", row?);
//! }
//!
//! tx.commit()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   Caller (SQL client code)              │
//! └─────────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │  xsql (this crate)                      │
//! │  - Connection (transaction slot)        │
//! │  - Tx (lifecycle + delegation)          │
//! │  - params / declares / options          │
//! │  - Rows, NopResult                      │
//! │  - TxTrace hooks                        │
//! └─────────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │  Native backend (NativeSession,         │
//! │  NativeTransaction, NativeResult)       │
//! └─────────────────────────────────────────┘
//! ```

pub mod config;
pub mod conn;
pub mod context;
pub mod declares;
pub mod error;
pub mod native;
pub mod options;
pub mod params;
pub mod rows;
pub mod trace;
pub mod tx;
pub mod value;

pub use config::{ConnectorConfig, StatsMode, TxMode, TxSettings};
pub use conn::Connection;
pub use context::{CancelHandle, Context};
pub use error::{Error, Result};
pub use native::{
    Column, NativeError, NativeErrorKind, NativeResult, NativeSession, NativeTransaction,
};
pub use options::ExecuteOptions;
pub use params::{NamedValue, QueryParameters};
pub use rows::{NopResult, Row, Rows};
pub use trace::{LogTrace, NoTrace, TxTrace};
pub use tx::{ExecCapable, Identifiable, QueryCapable, Transactional, Tx, TxState};
pub use value::{Type, Value};
