//! Runnable gateway demo — the standard catalog with stub handlers.
//!
//! Run with:
//!   LOG_LEVEL=debug cargo run --example server
//!
//! Try:
//!   curl http://localhost:8080/api/ping
//!   curl -X POST http://localhost:8080/user.v1.UserService/GetUserProfile \
//!        -H 'content-type: application/json' -d '{}'        # opaque 404
//!   curl -X POST http://localhost:8080/user.v1.UserService/GetUserProfile \
//!        -H 'content-type: application/json' \
//!        -H 'connect-protocol-version: 1' -d '{}'           # 401 unauthenticated
//!   curl -X POST http://localhost:8080/user.v1.UserService/GetUserProfile \
//!        -H 'content-type: application/json' \
//!        -H 'connect-protocol-version: 1' \
//!        -H 'authorization: Bearer demo-token' -d '{}'      # 200 with identity

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use torii::{
    health, AuthenticatedIdentity, ChainBuilder, Config, IdentityVerifier, ProcedureCatalog,
    Request, Response, RouteRegistrar, Server, ServiceRegistry, VerificationError,
};

/// Demo verifier: one hard-coded token. A real deployment plugs in its
/// identity provider's client here.
struct DemoVerifier;

#[async_trait]
impl IdentityVerifier for DemoVerifier {
    async fn verify(&self, credential: &str) -> Result<AuthenticatedIdentity, VerificationError> {
        if credential == "demo-token" {
            Ok(AuthenticatedIdentity::new("demo-subject", HashMap::new()))
        } else {
            Err(VerificationError::InvalidCredential("unknown token".into()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), torii::Error> {
    let config = Config::from_env();
    torii::init_tracing(&config);

    let verifier: Arc<dyn IdentityVerifier> = Arc::new(DemoVerifier);

    let mut registry = ServiceRegistry::new();
    registry.register("/api/ping", health::ping);
    registry.register("/api/healthz", health::healthz);
    registry.register("/api/health/database", health::database);
    registry.register("/health.v1.HealthService/Check", health::rpc_check);

    let echo = |req: Request| async move {
        let subject = req.identity().map(|id| id.subject_id().to_owned());
        match subject {
            Some(s) => json(format!(r#"{{"subject_id":"{s}"}}"#)),
            None => json(r#"{"subject_id":null}"#.to_owned()),
        }
    };
    for path in [
        "/user.v1.UserService/RegisterUser",
        "/user.v1.UserService/GetUserProfile",
        "/user.v1.UserService/UpdateUserProfile",
        "/quiz.v1.QuizService/ListQuizSets",
        "/quiz.v1.QuizService/GetQuizSet",
        "/quiz.v1.QuizService/SubmitQuizResult",
        "/quiz.v1.QuizService/GetUserQuizHistory",
    ] {
        registry.register(path, echo);
    }

    let chains = ChainBuilder::new(verifier, config.protected_procedures());
    let router = RouteRegistrar::new(ProcedureCatalog::standard(), chains)
        .into_router(&mut registry)?;

    Server::bind(&config.addr)?.serve(router).await
}

fn json(body: String) -> Response {
    let mut res = Response::new(http_body_util::Full::new(bytes::Bytes::from(body.into_bytes())));
    res.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    res
}
