//! Radix-tree route table and request-time dispatch.
//!
//! One [`matchit`] tree keyed by procedure path. Each leaf is a
//! [`RouteBinding`]: the procedure's catalog entry plus its chain-wrapped
//! handler, frozen at registration. Dispatch is the whole request-time
//! surface of the gateway — path lookup, method check, chain execution.
//! Unknown paths and method mismatches both read as the opaque 404.

use matchit::Router as MatchitRouter;

use crate::catalog::Procedure;
use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::{self, Response};

/// One registered route: catalog entry + chain-wrapped handler.
///
/// Created once by the registrar, immutable for the process lifetime.
pub struct RouteBinding {
    procedure: Procedure,
    handler: BoxedHandler,
}

impl RouteBinding {
    pub(crate) fn new(procedure: Procedure, handler: BoxedHandler) -> Self {
        Self { procedure, handler }
    }

    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }
}

/// The route table. Build it once at startup via the registrar; share it
/// read-only across every connection task.
#[derive(Default)]
pub struct Router {
    routes: MatchitRouter<RouteBinding>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl Router {
    pub(crate) fn new() -> Self {
        Self { routes: MatchitRouter::new() }
    }

    /// Inserts a binding. A duplicate path is a configuration error.
    pub(crate) fn add(&mut self, binding: RouteBinding) -> Result<(), Error> {
        let path = binding.procedure().path().to_owned();
        self.routes
            .insert(&path, binding)
            .map_err(|e| Error::Configuration(format!("invalid route `{path}`: {e}")))
    }

    /// Runs one request through its bound chain and handler.
    ///
    /// The method check mirrors what the original REST runtime produced: a
    /// POST to a GET-only monitoring route is a 404, not a 405 — so an RPC
    /// framing aimed at a REST path learns nothing either.
    pub async fn dispatch(&self, req: Request) -> Response {
        let Ok(matched) = self.routes.at(req.path()) else {
            return response::not_found();
        };
        let binding = matched.value;

        if req.method() != binding.procedure.method() {
            return response::not_found();
        }

        binding.handler.call(req).await
    }
}
