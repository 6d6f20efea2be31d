// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Recording in-memory backend shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use xsql::trace::{QueryEvent, TxEvent};
use xsql::{
    Column, Context, Error, ExecuteOptions, NativeError, NativeResult, NativeSession,
    NativeTransaction, QueryParameters, TxSettings, TxTrace, Value,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One native call observed by the backend
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Begin(TxSettings),
    Commit(String),
    Rollback(String),
    Execute {
        tx_id: String,
        query: String,
        params: QueryParameters,
        options: ExecuteOptions,
    },
    CloseSession,
}

type ResultSets = Vec<(Vec<Column>, Vec<Vec<Value>>)>;

#[derive(Default)]
struct Shared {
    calls: Mutex<Vec<Call>>,
    commit_error: Mutex<Option<NativeError>>,
    rollback_error: Mutex<Option<NativeError>>,
    execute_error: Mutex<Option<NativeError>>,
    result_error: Mutex<Option<NativeError>>,
    result_sets: Mutex<ResultSets>,
    commit_gate: Mutex<Option<Receiver<()>>>,
    results_closed: Mutex<usize>,
}

/// Handle used by tests to script and inspect the backend
#[derive(Clone, Default)]
pub struct MockBackend {
    shared: Arc<Shared>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Arc<dyn NativeSession> {
        Arc::new(MockSession {
            shared: self.shared.clone(),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.calls.lock().clone()
    }

    pub fn commits(&self) -> usize {
        self.count(|c| matches!(c, Call::Commit(_)))
    }

    pub fn rollbacks(&self) -> usize {
        self.count(|c| matches!(c, Call::Rollback(_)))
    }

    pub fn executes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Execute { .. }))
            .collect()
    }

    pub fn results_closed(&self) -> usize {
        *self.shared.results_closed.lock()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.shared.calls.lock().iter().filter(|c| pred(c)).count()
    }

    pub fn fail_commit(&self, err: NativeError) {
        *self.shared.commit_error.lock() = Some(err);
    }

    pub fn fail_rollback(&self, err: NativeError) {
        *self.shared.rollback_error.lock() = Some(err);
    }

    pub fn fail_execute(&self, err: NativeError) {
        *self.shared.execute_error.lock() = Some(err);
    }

    pub fn fail_result(&self, err: NativeError) {
        *self.shared.result_error.lock() = Some(err);
    }

    pub fn push_result_set(&self, columns: Vec<Column>, rows: Vec<Vec<Value>>) {
        self.shared.result_sets.lock().push((columns, rows));
    }

    /// Block the next commit until a message arrives on `gate`
    pub fn gate_commit(&self, gate: Receiver<()>) {
        *self.shared.commit_gate.lock() = Some(gate);
    }

    fn record(&self, call: Call) {
        self.shared.calls.lock().push(call);
    }
}

struct MockSession {
    shared: Arc<Shared>,
}

impl NativeSession for MockSession {
    fn begin_transaction(
        &self,
        _ctx: &Context,
        settings: &TxSettings,
    ) -> Result<Box<dyn NativeTransaction>, NativeError> {
        let backend = MockBackend {
            shared: self.shared.clone(),
        };
        backend.record(Call::Begin(*settings));
        Ok(Box::new(MockTx {
            id: format!("tx-{}", Uuid::new_v4()),
            backend,
        }))
    }

    fn close(&self, _ctx: &Context) -> Result<(), NativeError> {
        self.shared.calls.lock().push(Call::CloseSession);
        Ok(())
    }
}

struct MockTx {
    id: String,
    backend: MockBackend,
}

impl NativeTransaction for MockTx {
    fn id(&self) -> &str {
        &self.id
    }

    fn commit_tx(&mut self, _ctx: &Context) -> Result<Box<dyn NativeResult>, NativeError> {
        self.backend.record(Call::Commit(self.id.clone()));
        let gate = self.backend.shared.commit_gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        if let Some(err) = self.backend.shared.commit_error.lock().clone() {
            return Err(err);
        }
        Ok(Box::new(MockResult::new(&self.backend, Vec::new(), None)))
    }

    fn rollback(&mut self, _ctx: &Context) -> Result<(), NativeError> {
        self.backend.record(Call::Rollback(self.id.clone()));
        match self.backend.shared.rollback_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn execute(
        &mut self,
        _ctx: &Context,
        query: &str,
        params: &QueryParameters,
        options: &ExecuteOptions,
    ) -> Result<Box<dyn NativeResult>, NativeError> {
        self.backend.record(Call::Execute {
            tx_id: self.id.clone(),
            query: query.to_string(),
            params: params.clone(),
            options: *options,
        });
        if let Some(err) = self.backend.shared.execute_error.lock().clone() {
            return Err(err);
        }
        let sets = std::mem::take(&mut *self.backend.shared.result_sets.lock());
        let err = self.backend.shared.result_error.lock().clone();
        Ok(Box::new(MockResult::new(&self.backend, sets, err)))
    }
}

struct MockResult {
    backend: MockBackend,
    sets: VecDeque<(Vec<Column>, VecDeque<Vec<Value>>)>,
    current: Option<(Vec<Column>, VecDeque<Vec<Value>>)>,
    err: Option<NativeError>,
}

impl MockResult {
    fn new(backend: &MockBackend, sets: ResultSets, err: Option<NativeError>) -> Self {
        Self {
            backend: backend.clone(),
            sets: sets
                .into_iter()
                .map(|(c, rows)| (c, rows.into_iter().collect()))
                .collect(),
            current: None,
            err,
        }
    }
}

impl NativeResult for MockResult {
    fn columns(&self) -> Vec<Column> {
        self.current
            .as_ref()
            .map(|(c, _)| c.clone())
            .unwrap_or_default()
    }

    fn next_result_set(&mut self) -> bool {
        self.current = self.sets.pop_front();
        self.current.is_some()
    }

    fn next_row(&mut self) -> Option<Vec<Value>> {
        self.current.as_mut().and_then(|(_, rows)| rows.pop_front())
    }

    fn err(&self) -> Option<NativeError> {
        self.err.clone()
    }

    fn close(&mut self) -> Result<(), NativeError> {
        *self.backend.shared.results_closed.lock() += 1;
        Ok(())
    }
}

/// Trace that records every hook invocation as a short string
#[derive(Default)]
pub struct RecordingTrace {
    events: Mutex<Vec<String>>,
}

impl RecordingTrace {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn push_done(&self, op: &str, error: Option<&Error>) {
        let outcome = match error {
            None => "ok".to_string(),
            Some(Error::ConnectionClosed) => "closed".to_string(),
            Some(Error::TxDone) => "done".to_string(),
            Some(e) => format!("err({})", e),
        };
        self.events.lock().push(format!("{}_done:{}", op, outcome));
    }
}

impl TxTrace for RecordingTrace {
    fn on_begin_start(&self, _conn_id: Uuid) {
        self.events.lock().push("begin_start".to_string());
    }

    fn on_begin_done(&self, _conn_id: Uuid, _tx_id: Option<&str>, error: Option<&Error>) {
        self.push_done("begin", error);
    }

    fn on_commit_start(&self, _event: &TxEvent<'_>) {
        self.events.lock().push("commit_start".to_string());
    }

    fn on_commit_done(&self, _event: &TxEvent<'_>, error: Option<&Error>) {
        self.push_done("commit", error);
    }

    fn on_rollback_start(&self, _event: &TxEvent<'_>) {
        self.events.lock().push("rollback_start".to_string());
    }

    fn on_rollback_done(&self, _event: &TxEvent<'_>, error: Option<&Error>) {
        self.push_done("rollback", error);
    }

    fn on_query_start(&self, event: &QueryEvent<'_>) {
        self.events
            .lock()
            .push(format!("query_start:idempotent={}", event.idempotent));
    }

    fn on_query_done(&self, _event: &QueryEvent<'_>, error: Option<&Error>) {
        self.push_done("query", error);
    }

    fn on_exec_start(&self, _event: &QueryEvent<'_>) {
        self.events.lock().push("exec_start".to_string());
    }

    fn on_exec_done(&self, _event: &QueryEvent<'_>, error: Option<&Error>) {
        self.push_done("exec", error);
    }
}
