//! Outgoing response type and constructors.
//!
//! Responses are plain [`http::Response`] values carrying a fully-buffered
//! body — what hyper sends is what a stage built, nothing in between. The
//! constructors here encode the gateway's two rejection postures:
//!
//! - [`not_found`] — the opaque transport rejection. No hint that the path
//!   exists, no content-type diagnostics. A caller on the wrong framing
//!   learns nothing.
//! - [`unauthenticated`] — the explicit auth rejection, with the JSON error
//!   envelope clients already parse. Auth failures are deliberately less
//!   secretive than transport mismatches.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;

/// An outgoing response: status, headers, buffered body.
pub type Response = http::Response<Full<Bytes>>;

/// The wire error envelope: `{"code":…,"message":…}`.
#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

/// `200 OK` with an `application/json` body.
pub fn json(body: impl Into<Bytes>) -> Response {
    with_body(StatusCode::OK, "application/json", body.into())
}

/// `200 OK` with a `text/plain` body.
pub fn text(body: impl Into<String>) -> Response {
    with_body(
        StatusCode::OK,
        "text/plain; charset=utf-8",
        Bytes::from(body.into().into_bytes()),
    )
}

/// A bare status with no body.
pub fn status(code: StatusCode) -> Response {
    let mut res = Response::new(Full::new(Bytes::new()));
    *res.status_mut() = code;
    res
}

/// The opaque `404 Not Found` used for every transport rejection.
pub fn not_found() -> Response {
    status(StatusCode::NOT_FOUND)
}

/// `401` with the `unauthenticated` error envelope.
pub fn unauthenticated(message: &str) -> Response {
    error_json(StatusCode::UNAUTHORIZED, "unauthenticated", message)
}

/// An error envelope with an arbitrary status and code.
pub fn error_json(status: StatusCode, code: &str, message: &str) -> Response {
    let body = serde_json::to_vec(&ErrorBody { code, message })
        .unwrap_or_else(|_| br#"{"code":"internal","message":"encoding failure"}"#.to_vec());
    with_body(status, "application/json", Bytes::from(body))
}

fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let mut res = Response::new(Full::new(body));
    *res.status_mut() = status;
    res.headers_mut()
        .insert(http::header::CONTENT_TYPE, http::HeaderValue::from_static(content_type));
    res
}
