//! Built-in monitoring handlers.
//!
//! The REST surface of the gateway is exactly these endpoints — everything
//! else goes through the RPC framings. They sit behind the `PublicHttp`
//! chain: logged, never filtered, never authenticated.
//!
//! | Route | Question |
//! |---|---|
//! | `/api/ping` | Is the process alive? |
//! | `/api/healthz` | Can the pod serve traffic? |
//! | `/api/health/database` | Is the datastore reachable? (stubbed — the real probe is wired in by the host application) |
//!
//! The RPC-side health procedure (`/health.v1.HealthService/Check`) answers
//! the same liveness question to RPC clients, behind the `RpcPublic` chain —
//! so even the health check is unreachable over plain JSON.

use crate::request::Request;
use crate::response::{self, Response};

/// `GET /api/ping` — liveness. No dependencies, by intent.
pub async fn ping(_req: Request) -> Response {
    response::json(&br#"{"status":"ok"}"#[..])
}

/// `GET /api/healthz` — readiness.
///
/// Replace with your own handler if the application needs a warm-up period
/// or must gate on dependency availability.
pub async fn healthz(_req: Request) -> Response {
    response::json(&br#"{"status":"healthy"}"#[..])
}

/// `GET /api/health/database` — datastore probe, stub implementation.
///
/// The real probe belongs to the host application's persistence layer;
/// this default reports healthy so a bare gateway still wires up.
pub async fn database(_req: Request) -> Response {
    response::json(&br#"{"status":"healthy","database":"connected"}"#[..])
}

/// `POST /health.v1.HealthService/Check` — RPC health check.
///
/// Reached only through an accepted RPC framing; a plain-JSON caller gets
/// the opaque 404 from the protocol filter instead.
pub async fn rpc_check(_req: Request) -> Response {
    response::json(&br#"{"status":"SERVING_STATUS_SERVING"}"#[..])
}
