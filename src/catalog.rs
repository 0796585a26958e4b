//! The procedure catalog: every exposed route, classified.
//!
//! Two small enums drive the entire gateway. [`TransportClass`] says which
//! framing may reach a procedure; [`AuthClass`] says whether a verified
//! identity is required. The registrar turns each `(transport, auth)` pair
//! into a middleware chain at startup — after that the catalog is read-only
//! and shared freely across connection tasks without locking.
//!
//! [`ProtectedProcedureSet`] is the data half of selective authentication:
//! a `Selective` procedure is only authenticated if its path is listed here.
//! Keeping the exception in data rather than in interceptor code makes it
//! auditable — the registration bootstrap (see [`ProcedureCatalog::standard`])
//! is just an absent entry, not a special case.

use std::collections::HashSet;

use http::Method;

// ── Classification enums ──────────────────────────────────────────────────────

/// Which framing a procedure answers to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TransportClass {
    /// Plain HTTP/JSON only. Health and monitoring endpoints.
    RestOnly,
    /// RPC framings only: binary gRPC over HTTP/2 or the Connect-style
    /// JSON-over-HTTP/1.1 variant of the same contract. Anything else is
    /// turned away before the handler runs.
    RpcOnly,
}

/// Whether a procedure requires a verified identity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AuthClass {
    /// Never authenticated.
    Public,
    /// Always authenticated.
    Protected,
    /// Authenticated only if the path is listed in the
    /// [`ProtectedProcedureSet`].
    Selective,
}

// ── Procedure ─────────────────────────────────────────────────────────────────

/// One callable route: path, accepted method, and its two classifications.
///
/// Identity is the path. Paths are unique across the catalog — the
/// registrar enforces this at startup.
#[derive(Clone, Debug)]
pub struct Procedure {
    path: String,
    method: Method,
    transport: TransportClass,
    auth: AuthClass,
}

impl Procedure {
    /// A REST monitoring route. GET only, like the original surface.
    pub fn rest(path: impl Into<String>, auth: AuthClass) -> Self {
        Self { path: path.into(), method: Method::GET, transport: TransportClass::RestOnly, auth }
    }

    /// An RPC procedure. Both accepted framings POST.
    pub fn rpc(path: impl Into<String>, auth: AuthClass) -> Self {
        Self { path: path.into(), method: Method::POST, transport: TransportClass::RpcOnly, auth }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn transport(&self) -> TransportClass {
        self.transport
    }

    pub fn auth(&self) -> AuthClass {
        self.auth
    }
}

// ── ProcedureCatalog ──────────────────────────────────────────────────────────

/// Base paths of the RPC services in the standard catalog.
pub const HEALTH_SERVICE_BASE: &str = "/health.v1.HealthService/";
pub const USER_SERVICE_BASE: &str = "/user.v1.UserService/";
pub const QUIZ_SERVICE_BASE: &str = "/quiz.v1.QuizService/";

/// The static table of every exposed procedure.
///
/// Built once at startup, walked once by the registrar, immutable afterwards.
#[derive(Clone, Debug, Default)]
pub struct ProcedureCatalog {
    procedures: Vec<Procedure>,
}

impl ProcedureCatalog {
    pub fn new(procedures: Vec<Procedure>) -> Self {
        Self { procedures }
    }

    /// The full service surface of the quiz backend this gateway fronts.
    ///
    /// `RegisterUser` is `Selective` and *not* listed in
    /// [`ProtectedProcedureSet::standard`]: its handler verifies the external
    /// credential inline, because a first-time caller has no local identity
    /// to authenticate against yet. Any future procedure needing the same
    /// bootstrap sequencing must be enumerated the same way.
    pub fn standard() -> Self {
        use AuthClass::{Public, Selective};
        Self::new(vec![
            // REST monitoring surface
            Procedure::rest("/api/ping", Public),
            Procedure::rest("/api/healthz", Public),
            Procedure::rest("/api/health/database", Public),
            // RPC health
            Procedure::rpc(format!("{HEALTH_SERVICE_BASE}Check"), Public),
            // RPC user service
            Procedure::rpc(format!("{USER_SERVICE_BASE}RegisterUser"), Selective),
            Procedure::rpc(format!("{USER_SERVICE_BASE}GetUserProfile"), Selective),
            Procedure::rpc(format!("{USER_SERVICE_BASE}UpdateUserProfile"), Selective),
            // RPC quiz service
            Procedure::rpc(format!("{QUIZ_SERVICE_BASE}ListQuizSets"), Selective),
            Procedure::rpc(format!("{QUIZ_SERVICE_BASE}GetQuizSet"), Selective),
            Procedure::rpc(format!("{QUIZ_SERVICE_BASE}SubmitQuizResult"), Selective),
            Procedure::rpc(format!("{QUIZ_SERVICE_BASE}GetUserQuizHistory"), Selective),
        ])
    }

    pub fn procedures(&self) -> &[Procedure] {
        &self.procedures
    }

    pub fn iter(&self) -> impl Iterator<Item = &Procedure> {
        self.procedures.iter()
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

// ── ProtectedProcedureSet ─────────────────────────────────────────────────────

/// The subset of `Selective` procedure paths that actually require identity.
///
/// Loaded once at startup, read-only thereafter. If hot reload is ever
/// needed, swap the whole set atomically — never mutate in place.
#[derive(Clone, Debug, Default)]
pub struct ProtectedProcedureSet {
    paths: HashSet<String>,
}

impl ProtectedProcedureSet {
    pub fn new(paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { paths: paths.into_iter().map(Into::into).collect() }
    }

    /// The procedures the original backend protects.
    pub fn standard() -> Self {
        Self::new([
            format!("{USER_SERVICE_BASE}GetUserProfile"),
            format!("{USER_SERVICE_BASE}UpdateUserProfile"),
            format!("{QUIZ_SERVICE_BASE}SubmitQuizResult"),
            format!("{QUIZ_SERVICE_BASE}GetUserQuizHistory"),
        ])
    }

    /// Does this path require a verified identity?
    pub fn requires_identity(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
