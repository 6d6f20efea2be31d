// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the transaction adapter

use std::panic::Location;

use thiserror::Error;

use crate::native::NativeError;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for adapter operations
#[derive(Error, Debug)]
pub enum Error {
    /// The owning connection was closed before or during the operation
    #[error("connection closed")]
    ConnectionClosed,

    /// The native call itself failed
    #[error("native error at {location}: {source}")]
    Native {
        #[source]
        source: NativeError,
        location: &'static Location<'static>,
    },

    /// The native call succeeded but the returned result set carries an error
    #[error("result set error at {location}: {source}")]
    ResultSet {
        #[source]
        source: NativeError,
        location: &'static Location<'static>,
    },

    /// The transaction has already been committed or rolled back
    #[error("transaction has already been committed or rolled back")]
    TxDone,

    /// The connection already holds an active transaction
    #[error("transaction already in progress: {0}")]
    TxInProgress(String),

    /// The execution context was cancelled
    #[error("context canceled")]
    Canceled,

    /// The execution context deadline passed
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Operation not supported by the backend
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Query parameter could not be translated
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a native failure, recording the caller's location.
    #[track_caller]
    pub fn native(source: NativeError) -> Self {
        Error::Native {
            source,
            location: Location::caller(),
        }
    }

    /// Wrap an error reported by a native result set, recording the caller's location.
    #[track_caller]
    pub fn result_set(source: NativeError) -> Self {
        Error::ResultSet {
            source,
            location: Location::caller(),
        }
    }

    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Error::ConnectionClosed)
    }

    /// Whether a higher retry layer may rerun the whole transaction.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Native { source, .. } | Error::ResultSet { source, .. } => {
                source.is_retryable()
            }
            _ => false,
        }
    }

    /// The underlying native error, if any.
    pub fn native_error(&self) -> Option<&NativeError> {
        match self {
            Error::Native { source, .. } | Error::ResultSet { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Source location that produced a native or result-set error.
    pub fn location(&self) -> Option<&'static Location<'static>> {
        match self {
            Error::Native { location, .. } | Error::ResultSet { location, .. } => Some(location),
            _ => None,
        }
    }
}

impl From<NativeError> for Error {
    #[track_caller]
    fn from(e: NativeError) -> Self {
        Error::native(e)
    }
}
