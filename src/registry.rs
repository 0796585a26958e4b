//! Service registry and route registrar — the startup wiring.
//!
//! [`ServiceRegistry`] collects the opaque handler implementations, one per
//! catalog path. [`RouteRegistrar`] then walks the catalog, resolves each
//! procedure's chain category, wraps its handler in the built chain and
//! inserts the binding into the [`Router`]. Everything here runs exactly
//! once; its correctness is fully determined by the catalog content, and
//! every inconsistency is a fatal [`Error::Configuration`]:
//!
//! - a procedure with no registered handler
//! - a handler registered for a path the catalog does not name
//! - two procedures sharing a path
//! - a `(transport, auth)` pair with no chain mapping

use std::collections::HashMap;

use tracing::info;

use crate::catalog::ProcedureCatalog;
use crate::chain::{ChainBuilder, ChainCategory};
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::router::{RouteBinding, Router};

/// Handler implementations keyed by procedure path.
///
/// The registry does not know about chains or classifications — it is the
/// hand-off point between dependency wiring (out of scope) and the
/// registrar.
#[derive(Default)]
pub struct ServiceRegistry {
    handlers: HashMap<String, BoxedHandler>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `path`. Last registration wins within the
    /// registry; the catalog-side uniqueness check happens at registration.
    pub fn register(&mut self, path: impl Into<String>, handler: impl Handler) -> &mut Self {
        self.handlers.insert(path.into(), handler.into_boxed_handler());
        self
    }

    fn take(&mut self, path: &str) -> Option<BoxedHandler> {
        self.handlers.remove(path)
    }

    fn remaining_paths(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}

/// Binds catalog entries to handlers through their chains.
pub struct RouteRegistrar {
    catalog: ProcedureCatalog,
    chains: ChainBuilder,
}

impl RouteRegistrar {
    pub fn new(catalog: ProcedureCatalog, chains: ChainBuilder) -> Self {
        Self { catalog, chains }
    }

    /// Builds the complete route table, consuming the registry's handlers.
    ///
    /// After this returns, every catalog procedure has exactly one binding
    /// and the router is ready to share across connection tasks.
    pub fn into_router(self, registry: &mut ServiceRegistry) -> Result<Router, Error> {
        let mut router = Router::new();

        for procedure in self.catalog.iter() {
            let handler = registry.take(procedure.path()).ok_or_else(|| {
                Error::Configuration(format!("no handler registered for `{}`", procedure.path()))
            })?;

            let category = ChainCategory::for_classes(procedure.transport(), procedure.auth())?;
            let chain = self.chains.build(category);
            let wrapped = chain.apply(handler);

            info!(
                path = procedure.path(),
                category = ?category,
                stages = chain.len(),
                "route registered"
            );
            router.add(RouteBinding::new(procedure.clone(), wrapped))?;
        }

        // A handler nothing routes to is as much a wiring mistake as a
        // route with no handler.
        let leftover = registry.remaining_paths();
        if !leftover.is_empty() {
            return Err(Error::Configuration(format!(
                "handlers registered for paths absent from the catalog: {}",
                leftover.join(", ")
            )));
        }

        Ok(router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AuthClass, Procedure, ProtectedProcedureSet};
    use crate::identity::{AuthenticatedIdentity, IdentityVerifier, VerificationError};
    use crate::request::Request;
    use crate::response;

    use std::sync::Arc;

    use async_trait::async_trait;

    struct NullVerifier;

    #[async_trait]
    impl IdentityVerifier for NullVerifier {
        async fn verify(
            &self,
            _credential: &str,
        ) -> Result<AuthenticatedIdentity, VerificationError> {
            Err(VerificationError::InvalidCredential("null".into()))
        }
    }

    fn chains() -> ChainBuilder {
        ChainBuilder::new(Arc::new(NullVerifier), ProtectedProcedureSet::standard())
    }

    async fn ok(_req: Request) -> crate::Response {
        response::text("ok")
    }

    #[test]
    fn missing_handler_is_a_configuration_error() {
        let catalog = ProcedureCatalog::new(vec![Procedure::rest("/api/ping", AuthClass::Public)]);
        let mut registry = ServiceRegistry::new();

        let err = RouteRegistrar::new(catalog, chains())
            .into_router(&mut registry)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("/api/ping"));
    }

    #[test]
    fn orphan_handler_is_a_configuration_error() {
        let catalog = ProcedureCatalog::new(vec![Procedure::rest("/api/ping", AuthClass::Public)]);
        let mut registry = ServiceRegistry::new();
        registry.register("/api/ping", ok);
        registry.register("/api/unknown", ok);

        let err = RouteRegistrar::new(catalog, chains())
            .into_router(&mut registry)
            .unwrap_err();
        assert!(err.to_string().contains("/api/unknown"));
    }

    #[test]
    fn duplicate_path_is_a_configuration_error() {
        let catalog = ProcedureCatalog::new(vec![
            Procedure::rest("/api/ping", AuthClass::Public),
            Procedure::rest("/api/ping", AuthClass::Public),
        ]);
        let mut registry = ServiceRegistry::new();
        registry.register("/api/ping", ok);

        let err = RouteRegistrar::new(catalog, chains())
            .into_router(&mut registry)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn rest_selective_is_rejected_at_registration() {
        let catalog =
            ProcedureCatalog::new(vec![Procedure::rest("/api/odd", AuthClass::Selective)]);
        let mut registry = ServiceRegistry::new();
        registry.register("/api/odd", ok);

        let err = RouteRegistrar::new(catalog, chains())
            .into_router(&mut registry)
            .unwrap_err();
        assert!(err.to_string().contains("RestOnly"));
    }

    #[test]
    fn full_standard_catalog_registers_cleanly() {
        let catalog = ProcedureCatalog::standard();
        let mut registry = ServiceRegistry::new();
        for procedure in catalog.iter() {
            registry.register(procedure.path(), ok);
        }

        let router = RouteRegistrar::new(catalog, chains()).into_router(&mut registry);
        assert!(router.is_ok());
    }
}
