//! # torii
//!
//! A protocol-enforcing request gateway: one listener, two surfaces.
//!
//! A plain-HTTP surface carries health and monitoring endpoints. An RPC
//! surface carries business procedures, reachable through exactly two
//! framings of the same contract — binary gRPC over HTTP/2, or the
//! Connect-style JSON variant over HTTP/1.1. A plain JSON POST that merely
//! reuses a procedure's path string is neither, and is turned away with an
//! opaque `404` before any RPC machinery runs.
//!
//! ## The contract
//!
//! Business logic lives in handlers; credential validation lives in an
//! [`IdentityVerifier`]. torii owns only what sits between the socket and
//! the handler:
//!
//! - **Route classification** — every procedure is catalogued with a
//!   transport class (REST-only / RPC-only) and an auth class
//!   (public / protected / selective)
//! - **Chain composition** — each `(transport, auth)` pair maps to a fixed
//!   pipeline: logging, then protocol filter, then authentication
//! - **Protocol enforcement** — RPC-only routes reject every non-RPC
//!   framing, fail closed, without advertising their existence
//! - **Selective authentication** — a configured subset of procedures
//!   requires a verified identity; the rest pass through, including the
//!   registration bootstrap that must verify its credential in-handler
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use torii::{
//!     health, ChainBuilder, Config, ProcedureCatalog, RouteRegistrar, Server,
//!     ServiceRegistry,
//! };
//! # use torii::{AuthenticatedIdentity, IdentityVerifier, VerificationError};
//! # struct MyVerifier;
//! # #[async_trait::async_trait]
//! # impl IdentityVerifier for MyVerifier {
//! #     async fn verify(&self, _: &str) -> Result<AuthenticatedIdentity, VerificationError> {
//! #         Err(VerificationError::InvalidCredential("stub".into()))
//! #     }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), torii::Error> {
//!     let config = Config::from_env();
//!
//!     let mut registry = ServiceRegistry::new();
//!     registry.register("/api/ping", health::ping);
//!     registry.register("/api/healthz", health::healthz);
//!     registry.register("/api/health/database", health::database);
//!     registry.register("/health.v1.HealthService/Check", health::rpc_check);
//!     // …business procedure handlers…
//!     # let catalog = ProcedureCatalog::new(vec![]);
//!
//!     let chains = ChainBuilder::new(Arc::new(MyVerifier), config.protected_procedures());
//!     let router = RouteRegistrar::new(catalog, chains).into_router(&mut registry)?;
//!
//!     Server::bind(&config.addr)?.serve(router).await
//! }
//! ```

mod catalog;
mod chain;
mod config;
mod error;
mod handler;
mod identity;
mod registry;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use catalog::{
    AuthClass, Procedure, ProcedureCatalog, ProtectedProcedureSet, TransportClass,
    HEALTH_SERVICE_BASE, QUIZ_SERVICE_BASE, USER_SERVICE_BASE,
};
pub use chain::{ChainBuilder, ChainCategory};
pub use config::{init_tracing, Config};
pub use error::Error;
pub use handler::Handler;
pub use identity::{AuthenticatedIdentity, IdentityVerifier, VerificationError};
pub use registry::{RouteRegistrar, ServiceRegistry};
pub use request::Request;
pub use response::Response;
pub use router::{RouteBinding, Router};
pub use server::Server;
