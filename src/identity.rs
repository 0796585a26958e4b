//! Verified caller identity and the verifier seam.
//!
//! The gateway never validates credentials itself — it hands the bearer token
//! to an [`IdentityVerifier`] (Firebase, an internal token service, a test
//! stub) and either attaches the result to the request or rejects the call.
//!
//! One deliberate asymmetry lives here: every [`VerificationError`] variant,
//! including the verifier being unreachable, surfaces to the caller as the
//! same `401 unauthenticated`. Callers cannot distinguish "bad token" from
//! "verifier down", so a probing client learns nothing about our
//! operational state.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// A per-request verified identity.
///
/// Allocated by the authentication stage, carried on the [`Request`]
/// (crate::Request) for the rest of the chain, and dropped with it. It never
/// outlives the request and is never shared across requests.
#[derive(Clone, Debug)]
pub struct AuthenticatedIdentity {
    subject_id: String,
    claims: HashMap<String, String>,
}

impl AuthenticatedIdentity {
    pub fn new(subject_id: impl Into<String>, claims: HashMap<String, String>) -> Self {
        Self { subject_id: subject_id.into(), claims }
    }

    /// The stable external subject id (e.g. a Firebase UID).
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Raw token claims, as string pairs.
    pub fn claims(&self) -> &HashMap<String, String> {
        &self.claims
    }

    pub fn claim(&self, key: &str) -> Option<&str> {
        self.claims.get(key).map(String::as_str)
    }
}

/// Why a credential failed to verify.
///
/// The distinction exists for logs only — the wire response is identical
/// for every variant.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("credential expired")]
    Expired,

    /// The verifier itself could not be reached. Still unauthenticated on
    /// the wire — never a 503.
    #[error("verifier unavailable: {0}")]
    Unavailable(String),
}

/// External credential verification service.
///
/// Implementations must be safe for concurrent invocation from any number of
/// simultaneous requests — the gateway calls `verify` straight from the
/// per-connection tasks with no additional serialization. The caller's
/// cancellation propagates through the future; an implementation should not
/// start expensive work after its future has been dropped.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Verifies a bearer credential and resolves it to an identity.
    async fn verify(&self, credential: &str) -> Result<AuthenticatedIdentity, VerificationError>;
}
