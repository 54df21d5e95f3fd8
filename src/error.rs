//! # Resource Errors
//!
//! This module defines the error type shared by the binder, the dispatch
//! orchestrator and the store runtime. Transport failures are carried through
//! unchanged so callers can match on the exact status or client error.

use crate::transport::TransportError;

/// Errors that can occur while binding or dispatching resource operations.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The network call failed or returned a non-success status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The received value does not fit the payload of the operation's notification kind.
    #[error("Cannot decode `{operation}` payload: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// A typed collection could not be rendered back to JSON (cached list hooks, snapshots).
    #[error("Cannot encode payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// A non-standard bound operation lacks a field with no default.
    #[error("Operation `{operation}` is missing `{missing}`")]
    IncompleteMethod {
        operation: String,
        missing: &'static str,
    },

    #[error("Invalid resource manifest: {0}")]
    Manifest(#[source] serde_json::Error),

    #[error("Store closed")]
    StoreClosed,

    #[error("Store dropped response channel")]
    StoreDropped,
}
