//! Chain categories and the builder that assembles them.
//!
//! Six fixed pipelines cover the whole catalog. Which one a procedure gets
//! is a pure function of its `(transport, auth)` pair, resolved once at
//! registration — an unmapped pair is a startup error, never a runtime
//! surprise.
//!
//! Stage order inside every chain is fixed and deliberate:
//!
//! 1. **logging** — observes the raw request even when a later stage rejects
//! 2. **protocol filter** — cheapest discriminator, rejects before any RPC
//!    parsing cost is paid
//! 3. **authentication** — most expensive, paid only by requests that
//!    already passed transport validation

use std::sync::Arc;

use crate::catalog::{AuthClass, ProtectedProcedureSet, TransportClass};
use crate::error::Error;
use crate::identity::IdentityVerifier;
use crate::middleware::auth::{AuthScope, AuthenticationInterceptor};
use crate::middleware::logging::RequestLogger;
use crate::middleware::protocol::ProtocolFilter;
use crate::middleware::Chain;

/// The named pipelines the gateway knows how to build.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChainCategory {
    /// logging. REST monitoring endpoints.
    PublicHttp,
    /// logging + mandatory auth. Reserved for future REST business routes.
    ProtectedHttp,
    /// logging + protocol filter. Public RPC procedures.
    RpcPublic,
    /// logging + protocol filter + mandatory auth.
    RpcProtected,
    /// logging + protocol filter + selective auth.
    RpcSelective,
}

impl ChainCategory {
    /// The exhaustive `(transport, auth)` mapping.
    ///
    /// `(RestOnly, Selective)` has no chain: selective authentication is an
    /// RPC-layer concept, and a catalog that asks for it on a REST route is
    /// misconfigured.
    pub fn for_classes(transport: TransportClass, auth: AuthClass) -> Result<Self, Error> {
        match (transport, auth) {
            (TransportClass::RestOnly, AuthClass::Public) => Ok(Self::PublicHttp),
            (TransportClass::RestOnly, AuthClass::Protected) => Ok(Self::ProtectedHttp),
            (TransportClass::RestOnly, AuthClass::Selective) => Err(Error::Configuration(
                "no chain defined for (RestOnly, Selective)".to_owned(),
            )),
            (TransportClass::RpcOnly, AuthClass::Public) => Ok(Self::RpcPublic),
            (TransportClass::RpcOnly, AuthClass::Protected) => Ok(Self::RpcProtected),
            (TransportClass::RpcOnly, AuthClass::Selective) => Ok(Self::RpcSelective),
        }
    }

    /// Whether chains of this category carry the protocol filter.
    pub fn carries_protocol_filter(self) -> bool {
        matches!(self, Self::RpcPublic | Self::RpcProtected | Self::RpcSelective)
    }

    /// Whether chains of this category carry the authentication stage.
    pub fn carries_authentication(self) -> bool {
        matches!(self, Self::ProtectedHttp | Self::RpcProtected | Self::RpcSelective)
    }
}

/// Assembles the stage pipeline for each [`ChainCategory`].
///
/// Holds the two shared collaborators every chain may need: the identity
/// verifier and the protected-procedure set. Both are immutable after
/// startup and shared by reference into every stage instance.
pub struct ChainBuilder {
    verifier: Arc<dyn IdentityVerifier>,
    protected: Arc<ProtectedProcedureSet>,
}

impl ChainBuilder {
    pub fn new(verifier: Arc<dyn IdentityVerifier>, protected: ProtectedProcedureSet) -> Self {
        Self { verifier, protected: Arc::new(protected) }
    }

    /// Builds the ordered stage list for `category`.
    pub fn build(&self, category: ChainCategory) -> Chain {
        match category {
            ChainCategory::PublicHttp => Chain::new(vec![Arc::new(RequestLogger)]),
            ChainCategory::ProtectedHttp => Chain::new(vec![
                Arc::new(RequestLogger),
                Arc::new(self.authenticator(AuthScope::Always)),
            ]),
            ChainCategory::RpcPublic => {
                Chain::new(vec![Arc::new(RequestLogger), Arc::new(ProtocolFilter)])
            }
            ChainCategory::RpcProtected => Chain::new(vec![
                Arc::new(RequestLogger),
                Arc::new(ProtocolFilter),
                Arc::new(self.authenticator(AuthScope::Always)),
            ]),
            ChainCategory::RpcSelective => Chain::new(vec![
                Arc::new(RequestLogger),
                Arc::new(ProtocolFilter),
                Arc::new(self.authenticator(AuthScope::Listed(Arc::clone(&self.protected)))),
            ]),
        }
    }

    fn authenticator(&self, scope: AuthScope) -> AuthenticationInterceptor {
        AuthenticationInterceptor::new(Arc::clone(&self.verifier), scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AuthenticatedIdentity, VerificationError};

    use async_trait::async_trait;

    struct NullVerifier;

    #[async_trait]
    impl crate::identity::IdentityVerifier for NullVerifier {
        async fn verify(
            &self,
            _credential: &str,
        ) -> Result<AuthenticatedIdentity, VerificationError> {
            Err(VerificationError::InvalidCredential("null".into()))
        }
    }

    fn builder() -> ChainBuilder {
        ChainBuilder::new(Arc::new(NullVerifier), ProtectedProcedureSet::standard())
    }

    #[test]
    fn mapping_is_exhaustive_except_rest_selective() {
        use AuthClass::*;
        use TransportClass::*;

        assert_eq!(ChainCategory::for_classes(RestOnly, Public).unwrap(), ChainCategory::PublicHttp);
        assert_eq!(
            ChainCategory::for_classes(RestOnly, Protected).unwrap(),
            ChainCategory::ProtectedHttp
        );
        assert_eq!(ChainCategory::for_classes(RpcOnly, Public).unwrap(), ChainCategory::RpcPublic);
        assert_eq!(
            ChainCategory::for_classes(RpcOnly, Protected).unwrap(),
            ChainCategory::RpcProtected
        );
        assert_eq!(
            ChainCategory::for_classes(RpcOnly, Selective).unwrap(),
            ChainCategory::RpcSelective
        );

        assert!(matches!(
            ChainCategory::for_classes(RestOnly, Selective),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn rest_chains_never_carry_the_protocol_filter() {
        assert!(!ChainCategory::PublicHttp.carries_protocol_filter());
        assert!(!ChainCategory::ProtectedHttp.carries_protocol_filter());
        assert!(ChainCategory::RpcPublic.carries_protocol_filter());
        assert!(ChainCategory::RpcSelective.carries_protocol_filter());
    }

    #[test]
    fn stage_counts_match_the_fixed_order() {
        let b = builder();
        assert_eq!(b.build(ChainCategory::PublicHttp).len(), 1);
        assert_eq!(b.build(ChainCategory::ProtectedHttp).len(), 2);
        assert_eq!(b.build(ChainCategory::RpcPublic).len(), 2);
        assert_eq!(b.build(ChainCategory::RpcProtected).len(), 3);
        assert_eq!(b.build(ChainCategory::RpcSelective).len(), 3);
    }
}
