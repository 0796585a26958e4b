//! Incoming request type.
//!
//! The listener collects the body up front and hands every stage an owned,
//! fully-buffered [`Request`]. Stages pass it along the chain by value; the
//! authentication stage is the only one that modifies it, by attaching the
//! verified identity. Nothing here is shared across requests.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Version};
use uuid::Uuid;

use crate::identity::AuthenticatedIdentity;

/// An incoming request, buffered and ready for the chain.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    trace_id: String,
    identity: Option<Arc<AuthenticatedIdentity>>,
}

impl Request {
    /// Builds a request from its parts. A fresh trace id is assigned here —
    /// one per request, for the lifetime of the chain.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        version: Version,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            version,
            headers,
            body,
            trace_id: Uuid::new_v4().to_string(),
            identity: None,
        }
    }

    pub(crate) fn from_http(parts: http::request::Parts, body: Bytes) -> Self {
        let path = parts.uri.path().to_owned();
        Self::new(parts.method, path, parts.version, parts.headers, body)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The negotiated HTTP version — the protocol filter reads this to
    /// recognize gRPC-over-HTTP/2.
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header lookup as UTF-8. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The per-request trace id, present in every log line the chain emits.
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// The verified identity, if the authentication stage attached one.
    ///
    /// Handlers behind a `Selective` chain must tolerate `None` — an
    /// unlisted procedure passes through unauthenticated by design.
    pub fn identity(&self) -> Option<&AuthenticatedIdentity> {
        self.identity.as_deref()
    }

    /// Attaches a verified identity. Called by the authentication stage
    /// before it forwards the request down the chain.
    pub fn with_identity(mut self, identity: AuthenticatedIdentity) -> Self {
        self.identity = Some(Arc::new(identity));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::new(Method::GET, "/api/ping", Version::HTTP_11, HeaderMap::new(), Bytes::new())
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc".parse().unwrap());
        let req =
            Request::new(Method::POST, "/x", Version::HTTP_11, headers, Bytes::new());
        assert_eq!(req.header("Authorization"), Some("Bearer abc"));
        assert_eq!(req.header("AUTHORIZATION"), Some("Bearer abc"));
    }

    #[test]
    fn identity_starts_absent_and_attaches() {
        let req = request();
        assert!(req.identity().is_none());

        let req = req.with_identity(AuthenticatedIdentity::new("uid-1", Default::default()));
        assert_eq!(req.identity().unwrap().subject_id(), "uid-1");
    }

    #[test]
    fn each_request_gets_its_own_trace_id() {
        assert_ne!(request().trace_id(), request().trace_id());
    }
}
