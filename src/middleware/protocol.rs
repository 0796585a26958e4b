//! Protocol filter stage.
//!
//! Installed in every RPC chain, never in a REST chain. It inspects the
//! framing signature of the incoming request — content type, HTTP version,
//! RPC envelope headers — and rejects anything that is not one of the two
//! accepted framings of the RPC contract:
//!
//! - binary gRPC (and gRPC-Web) framing, typically over HTTP/2, or
//! - the Connect-style JSON-over-HTTP/1.1 variant of the *same* contract.
//!
//! A plain-JSON POST that merely reuses the path string is neither, and is
//! turned away with an opaque `404 Not Found` — not a 415. The business
//! surface is not advertised to callers on the wrong transport, so a probe
//! cannot map which procedures exist. Ambiguous or unparseable signatures
//! are treated as mismatches: this stage fails closed and never panics.

use http::{Method, Version};
use tracing::{debug, warn};

use crate::handler::BoxFuture;
use crate::middleware::{Next, Stage};
use crate::request::Request;
use crate::response;

/// Rejects requests whose framing is not an accepted RPC framing.
pub struct ProtocolFilter;

impl Stage for ProtocolFilter {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        if !is_rpc_framed(&req) {
            warn!(
                trace_id = %req.trace_id(),
                path = %req.path(),
                method = %req.method(),
                content_type = req.header("content-type").unwrap_or(""),
                framing = detect_framing(&req),
                "non-RPC request blocked on RPC-only route"
            );
            // 404, not 415: do not advertise the route to the wrong transport.
            return Box::pin(async { response::not_found() });
        }

        debug!(
            trace_id = %req.trace_id(),
            path = %req.path(),
            framing = detect_framing(&req),
            "RPC request allowed"
        );
        next(req)
    }
}

// ── Framing classification ────────────────────────────────────────────────────

/// Is this one of the two accepted RPC framings?
///
/// Both framings are POST-only; any other method is a mismatch regardless
/// of headers.
pub(crate) fn is_rpc_framed(req: &Request) -> bool {
    if req.method() != Method::POST {
        return false;
    }

    let content_type = req.header("content-type").unwrap_or("");

    has_rpc_content_type(content_type)
        || has_grpc_headers(req)
        || has_connect_headers(req)
        || is_http2_grpc(req, content_type)
}

/// Content types owned by the RPC contract: binary gRPC, gRPC-Web, and the
/// Connect streaming envelopes.
fn has_rpc_content_type(content_type: &str) -> bool {
    content_type.starts_with("application/grpc")
        || content_type.starts_with("application/grpc-web")
        || content_type.starts_with("application/connect+")
}

/// gRPC transport markers: `te: trailers` is mandatory for gRPC over HTTP/2,
/// `x-grpc-web` marks the browser framing.
fn has_grpc_headers(req: &Request) -> bool {
    if req.header("te").is_some_and(|te| te.contains("trailers")) {
        return true;
    }
    req.header("x-grpc-web").is_some()
}

/// Connect protocol markers. Connect unary JSON arrives as a plain
/// `application/json` POST — the `connect-protocol-version` header (or one
/// of the envelope headers) is what distinguishes it from an arbitrary JSON
/// call that bypasses the contract.
fn has_connect_headers(req: &Request) -> bool {
    req.header("connect-protocol-version").is_some()
        || req.header("connect-accept-encoding").is_some()
        || req.header("connect-content-encoding").is_some()
        || req.header("connect-timeout-ms").is_some()
}

/// HTTP/2 POST to a service-shaped path with at least one gRPC indicator.
fn is_http2_grpc(req: &Request, content_type: &str) -> bool {
    if req.version() != Version::HTTP_2 {
        return false;
    }
    is_service_shaped(req.path()) && (has_rpc_content_type(content_type) || has_grpc_headers(req))
}

/// RPC procedure paths follow `/package.Service/Method`.
fn is_service_shaped(path: &str) -> bool {
    path.contains('.') && path.matches('/').count() >= 2
}

/// Names the detected framing, for log lines only.
fn detect_framing(req: &Request) -> &'static str {
    let content_type = req.header("content-type").unwrap_or("");

    if has_connect_headers(req) || content_type.starts_with("application/connect+") {
        if content_type.starts_with("application/connect+") {
            return "connect-streaming";
        }
        return "connect";
    }
    if content_type.starts_with("application/grpc-web") {
        return "grpc-web";
    }
    if content_type.starts_with("application/grpc") {
        return "grpc";
    }
    if req.version() == Version::HTTP_2 && req.header("te").is_some() {
        return "grpc-http2";
    }
    "unknown"
}
