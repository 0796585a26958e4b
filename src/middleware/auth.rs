//! Authentication stage.
//!
//! Last in every chain that carries it: the verifier round-trip is the most
//! expensive stage, so only requests that already passed the cheaper
//! structural checks pay for it.
//!
//! The stage comes in two scopes. [`AuthScope::Always`] authenticates every
//! request (protected chains). [`AuthScope::Listed`] consults the
//! [`ProtectedProcedureSet`] first and lets unlisted procedures straight
//! through with no identity attached — that is how the registration
//! bootstrap works: `RegisterUser` is simply not listed, and its handler
//! verifies the external credential inline because there is no local
//! identity to authenticate against yet.
//!
//! Failure semantics: missing header, malformed header, bad token and
//! verifier outage all collapse to the same `401 unauthenticated` on the
//! wire. Logs keep the distinction; callers do not get it.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::ProtectedProcedureSet;
use crate::handler::BoxFuture;
use crate::identity::IdentityVerifier;
use crate::middleware::{Next, Stage};
use crate::request::Request;
use crate::response;

/// Which requests this stage authenticates.
pub enum AuthScope {
    /// Every request. Missing credential → immediate rejection.
    Always,
    /// Only requests whose path is listed; the rest pass with no identity.
    Listed(Arc<ProtectedProcedureSet>),
}

/// Bearer-credential authentication against an [`IdentityVerifier`].
pub struct AuthenticationInterceptor {
    verifier: Arc<dyn IdentityVerifier>,
    scope: AuthScope,
}

impl AuthenticationInterceptor {
    pub fn new(verifier: Arc<dyn IdentityVerifier>, scope: AuthScope) -> Self {
        Self { verifier, scope }
    }
}

impl Stage for AuthenticationInterceptor {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        if let AuthScope::Listed(protected) = &self.scope {
            if !protected.requires_identity(req.path()) {
                debug!(
                    trace_id = %req.trace_id(),
                    path = %req.path(),
                    "procedure not listed as protected, passing through"
                );
                return next(req);
            }
        }

        let verifier = Arc::clone(&self.verifier);
        Box::pin(async move {
            let Some(header) = req.header("authorization").map(str::to_owned) else {
                warn!(
                    trace_id = %req.trace_id(),
                    path = %req.path(),
                    "missing authorization header"
                );
                // Rejected before the verifier is ever called.
                return response::unauthenticated("missing authorization header");
            };

            let token = match bearer_token(&header) {
                Ok(token) => token.to_owned(),
                Err(err) => {
                    warn!(
                        trace_id = %req.trace_id(),
                        path = %req.path(),
                        error = %err,
                        "invalid authorization header format"
                    );
                    return response::unauthenticated("invalid authorization header format");
                }
            };

            match verifier.verify(&token).await {
                Ok(identity) => {
                    info!(
                        trace_id = %req.trace_id(),
                        path = %req.path(),
                        subject_id = identity.subject_id(),
                        "caller authenticated"
                    );
                    next(req.with_identity(identity)).await
                }
                Err(err) => {
                    // Verifier outage reads the same as a bad token on the
                    // wire; the log line is the only place they differ.
                    warn!(
                        trace_id = %req.trace_id(),
                        path = %req.path(),
                        error = %err,
                        "credential verification failed"
                    );
                    response::unauthenticated("authentication failed")
                }
            }
        })
    }
}

// ── Bearer extraction ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub(crate) enum CredentialError {
    #[error("authorization header must start with 'Bearer '")]
    NotBearer,
    #[error("bearer token is empty")]
    EmptyToken,
}

/// Extracts the token from `Bearer <token>`. Scheme match is exact,
/// surrounding whitespace is trimmed, an empty token is an error.
pub(crate) fn bearer_token(header: &str) -> Result<&str, CredentialError> {
    const PREFIX: &str = "Bearer ";

    let token = header.strip_prefix(PREFIX).ok_or(CredentialError::NotBearer)?.trim();
    if token.is_empty() {
        return Err(CredentialError::EmptyToken);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ErasedHandler, Handler};
    use crate::identity::{AuthenticatedIdentity, VerificationError};
    use crate::middleware::Chain;

    use async_trait::async_trait;
    use bytes::Bytes;
    use http::{HeaderMap, Method, StatusCode, Version};

    // ── bearer_token ──────────────────────────────────────────────────────────

    #[test]
    fn bearer_token_accepts_well_formed_headers() {
        assert_eq!(bearer_token("Bearer abc123").unwrap(), "abc123");
        assert_eq!(bearer_token("Bearer   padded  ").unwrap(), "padded");
    }

    #[test]
    fn bearer_token_rejects_other_schemes_and_empties() {
        assert!(matches!(bearer_token("Basic abc"), Err(CredentialError::NotBearer)));
        assert!(matches!(bearer_token("bearer abc"), Err(CredentialError::NotBearer)));
        assert!(matches!(bearer_token("Bearer "), Err(CredentialError::EmptyToken)));
        assert!(matches!(bearer_token("Bearer    "), Err(CredentialError::EmptyToken)));
    }

    // ── Stage behavior ────────────────────────────────────────────────────────

    /// Accepts exactly one token; counts invocations so tests can assert the
    /// verifier was not consulted.
    struct StubVerifier {
        valid_token: &'static str,
        calls: std::sync::atomic::AtomicUsize,
        unavailable: bool,
    }

    impl StubVerifier {
        fn accepting(token: &'static str) -> Self {
            Self { valid_token: token, calls: Default::default(), unavailable: false }
        }

        fn unreachable() -> Self {
            Self { valid_token: "", calls: Default::default(), unavailable: true }
        }

        fn call_count(&self) -> usize {
            self.calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdentityVerifier for StubVerifier {
        async fn verify(
            &self,
            credential: &str,
        ) -> Result<AuthenticatedIdentity, VerificationError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if self.unavailable {
                return Err(VerificationError::Unavailable("connection refused".into()));
            }
            if credential == self.valid_token {
                Ok(AuthenticatedIdentity::new("uid-42", Default::default()))
            } else {
                Err(VerificationError::InvalidCredential("unknown token".into()))
            }
        }
    }

    fn request(path: &str, authorization: Option<&str>) -> Request {
        let mut headers = HeaderMap::new();
        if let Some(value) = authorization {
            headers.insert("authorization", value.parse().unwrap());
        }
        Request::new(Method::POST, path, Version::HTTP_2, headers, Bytes::new())
    }

    /// Chain of just the interceptor around a handler that reports whether
    /// an identity was attached.
    fn wrap(
        verifier: Arc<StubVerifier>,
        scope: AuthScope,
    ) -> crate::handler::BoxedHandler {
        let chain = Chain::new(vec![Arc::new(AuthenticationInterceptor::new(verifier, scope))]);
        let handler = |req: Request| async move {
            match req.identity() {
                Some(id) => crate::response::text(format!("subject:{}", id.subject_id())),
                None => crate::response::text("anonymous"),
            }
        };
        chain.apply(handler.into_boxed_handler())
    }

    async fn body_text(res: crate::Response) -> String {
        use http_body_util::BodyExt;
        String::from_utf8(res.into_body().collect().await.unwrap().to_bytes().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn always_scope_rejects_missing_header_without_calling_verifier() {
        let verifier = Arc::new(StubVerifier::accepting("good"));
        let wrapped = wrap(Arc::clone(&verifier), AuthScope::Always);

        let res = wrapped.call(request("/user.v1.UserService/GetUserProfile", None)).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(verifier.call_count(), 0);
    }

    #[tokio::test]
    async fn always_scope_rejects_invalid_token() {
        let verifier = Arc::new(StubVerifier::accepting("good"));
        let wrapped = wrap(Arc::clone(&verifier), AuthScope::Always);

        let res = wrapped
            .call(request("/user.v1.UserService/GetUserProfile", Some("Bearer bad")))
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(verifier.call_count(), 1);
    }

    #[tokio::test]
    async fn always_scope_attaches_identity_on_success() {
        let verifier = Arc::new(StubVerifier::accepting("good"));
        let wrapped = wrap(verifier, AuthScope::Always);

        let res = wrapped
            .call(request("/user.v1.UserService/GetUserProfile", Some("Bearer good")))
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "subject:uid-42");
    }

    #[tokio::test]
    async fn verifier_outage_reads_as_unauthenticated() {
        let verifier = Arc::new(StubVerifier::unreachable());
        let wrapped = wrap(verifier, AuthScope::Always);

        let res = wrapped
            .call(request("/user.v1.UserService/GetUserProfile", Some("Bearer anything")))
            .await;

        // Not a 503: callers cannot tell "verifier down" from "bad token".
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn listed_scope_passes_unlisted_paths_with_no_identity() {
        let verifier = Arc::new(StubVerifier::accepting("good"));
        let protected = Arc::new(ProtectedProcedureSet::standard());
        let wrapped = wrap(Arc::clone(&verifier), AuthScope::Listed(protected));

        // RegisterUser is unlisted — passes even with a credential present,
        // and the verifier is never consulted.
        let res = wrapped
            .call(request("/user.v1.UserService/RegisterUser", Some("Bearer good")))
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "anonymous");
        assert_eq!(verifier.call_count(), 0);
    }

    #[tokio::test]
    async fn listed_scope_enforces_listed_paths() {
        let verifier = Arc::new(StubVerifier::accepting("good"));
        let protected = Arc::new(ProtectedProcedureSet::standard());
        let wrapped = wrap(verifier, AuthScope::Listed(protected));

        let res = wrapped.call(request("/user.v1.UserService/GetUserProfile", None)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
