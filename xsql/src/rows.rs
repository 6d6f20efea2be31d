// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Caller-facing results
//!
//! `Rows` turns a native result into a single-pass iterator of rows.
//! `NopResult` is what exec returns: the backend reports neither insert ids
//! nor affected row counts.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::native::{Column, NativeResult};
use crate::value::Value;

/// One row of a result set
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.values.get(i))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Lazy, single-pass row sequence over a native result
///
/// The iterator yields the rows of the current result set. Once the set is
/// exhausted a backend-reported error is yielded once, then `None` forever.
/// `next_result_set` moves to the following set, if any.
pub struct Rows {
    result: Box<dyn NativeResult>,
    columns: Vec<Column>,
    names: Arc<[String]>,
    exhausted: bool,
    closed: bool,
}

impl Rows {
    pub fn new(mut result: Box<dyn NativeResult>) -> Self {
        let has_set = result.next_result_set();
        let columns = if has_set { result.columns() } else { Vec::new() };
        let names = column_names(&columns);
        Self {
            result,
            columns,
            names,
            exhausted: !has_set,
            closed: false,
        }
    }

    /// Columns of the current result set
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Move to the next result set; false when none remain
    pub fn next_result_set(&mut self) -> bool {
        if self.closed || !self.result.next_result_set() {
            self.exhausted = true;
            return false;
        }
        self.columns = self.result.columns();
        self.names = column_names(&self.columns);
        self.exhausted = false;
        true
    }

    /// Release the native result; further iteration yields nothing
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.exhausted = true;
        self.result.close().map_err(Error::native)
    }
}

fn column_names(columns: &[Column]) -> Arc<[String]> {
    columns.iter().map(|c| c.name.clone()).collect()
}

impl Iterator for Rows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.result.next_row() {
            Some(values) => Some(Ok(Row {
                columns: self.names.clone(),
                values,
            })),
            None => {
                self.exhausted = true;
                self.result.err().map(|e| Err(Error::result_set(e)))
            }
        }
    }
}

impl Drop for Rows {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to close result set: {}", e);
        }
    }
}

impl std::fmt::Debug for Rows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rows")
            .field("columns", &self.columns)
            .field("exhausted", &self.exhausted)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Result of an exec: no insert ids, no affected row counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NopResult;

impl NopResult {
    pub fn last_insert_id(&self) -> Result<i64> {
        Err(Error::Unsupported("last insert id"))
    }

    pub fn rows_affected(&self) -> Result<i64> {
        Err(Error::Unsupported("rows affected"))
    }
}
