//! Unified error type.
//!
//! Request-level failures (transport mismatch, missing credential) are
//! expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
//! This type surfaces what can only go wrong at startup or in the listener:
//! binding a port, accepting a connection, or wiring an inconsistent catalog.

use thiserror::Error;

/// The error type returned by torii's fallible operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Socket-level failure: bind, accept.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog / chain wiring inconsistency detected at startup.
    ///
    /// Deliberately fatal: a procedure without a handler, a duplicate path,
    /// or an unmapped `(transport, auth)` pair is a build mistake, never a
    /// runtime condition.
    #[error("configuration: {0}")]
    Configuration(String),
}
