// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution context carried into native calls
//!
//! A `Context` bundles a deadline, a cancellation flag shared with a
//! `CancelHandle`, and per-call hints (idempotency, keep-in-cache). A
//! transaction stores the context it was begun with for commit/rollback;
//! queries and execs take a caller-supplied context instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancelled: Option<Arc<AtomicBool>>,
    idempotent: bool,
    keep_in_cache: Option<bool>,
}

/// Cancels every context derived from the one it was created with
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl Context {
    /// Empty context: no deadline, never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set a deadline; an earlier existing deadline wins
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Attach a cancellation flag and return the handle that trips it
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let flag = self
            .cancelled
            .clone()
            .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));
        self.cancelled = Some(flag.clone());
        (self, CancelHandle { flag })
    }

    /// Mark operations under this context as safe to retry
    pub fn with_idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    pub fn with_keep_in_cache(mut self, keep: bool) -> Self {
        self.keep_in_cache = Some(keep);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_idempotent(&self) -> bool {
        self.idempotent
    }

    pub fn keep_in_cache(&self) -> Option<bool> {
        self.keep_in_cache
    }

    /// `Ok` while the context is live; cancellation takes precedence over the deadline
    pub fn err(&self) -> Result<()> {
        if let Some(flag) = &self.cancelled {
            if flag.load(Ordering::SeqCst) {
                return Err(Error::Canceled);
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        let ctx = Context::background();
        assert!(ctx.err().is_ok());
        assert!(!ctx.is_idempotent());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_cancel_propagates_to_clones() {
        let (ctx, cancel) = Context::background().with_cancel();
        let derived = ctx.clone().with_idempotent(true);
        cancel.cancel();
        assert!(matches!(ctx.err(), Err(Error::Canceled)));
        assert!(matches!(derived.err(), Err(Error::Canceled)));
    }

    #[test]
    fn test_expired_deadline() {
        let ctx = Context::background().with_timeout(Duration::ZERO);
        assert!(matches!(ctx.err(), Err(Error::DeadlineExceeded)));
    }

    #[test]
    fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = Context::background()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(60));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
