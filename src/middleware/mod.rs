//! Middleware layer: stages and chains.
//!
//! A [`Stage`] intercepts one request on its way to the handler. It receives
//! the request plus a [`Next`] continuation and either calls `next` —
//! possibly with a modified request — or terminates the chain with its own
//! response. There is no fan-out: chain execution is strictly sequential
//! within a request, and fully parallel across requests.
//!
//! A [`Chain`] is an ordered stage list frozen at startup. [`Chain::apply`]
//! folds it around an erased handler, yielding a new handler the route table
//! stores — at request time the stack is already built, nothing is composed
//! on the hot path.
//!
//! Built-in stages:
//! - [`logging::RequestLogger`] — trace-id injection, start/finish lines
//! - [`protocol::ProtocolFilter`] — rejects non-RPC framings, fail closed
//! - [`auth::AuthenticationInterceptor`] — mandatory or selective bearer auth

pub mod auth;
pub mod logging;
pub mod protocol;

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;

/// The continuation a stage invokes to hand the request onward.
pub type Next = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync + 'static>;

/// One request-processing stage.
///
/// Contract: call `next(req)` to continue, or return a response to
/// short-circuit. A stage must never panic on malformed input — ambiguity
/// is resolved by rejecting, not by unwinding.
pub trait Stage: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

/// An ordered, immutable pipeline of stages.
pub struct Chain {
    stages: Vec<Arc<dyn Stage>>,
}

impl Chain {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// An empty chain: requests go straight to the handler.
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Wraps `handler` in this chain, innermost last.
    ///
    /// Folding happens right-to-left so that at request time the stages run
    /// in declaration order: `stages[0]` sees the request first.
    pub fn apply(&self, handler: BoxedHandler) -> BoxedHandler {
        let mut next: Next = Arc::new(move |req| handler.call(req));
        for stage in self.stages.iter().rev() {
            let stage = Arc::clone(stage);
            let inner = next;
            next = Arc::new(move |req| stage.handle(req, Arc::clone(&inner)));
        }
        Arc::new(ChainedHandler(next))
    }
}

/// The result of [`Chain::apply`]: a continuation masquerading as a handler,
/// so chain-wrapped and bare handlers are interchangeable in the route table.
struct ChainedHandler(Next);

impl ErasedHandler for ChainedHandler {
    fn call(&self, req: Request) -> BoxFuture {
        (self.0)(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::response;

    use std::sync::Mutex;

    use bytes::Bytes;
    use http::{HeaderMap, Method, Version};

    fn request() -> Request {
        Request::new(Method::GET, "/t", Version::HTTP_11, HeaderMap::new(), Bytes::new())
    }

    /// Records the order it ran in; optionally short-circuits.
    struct Probe {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        terminate: bool,
    }

    impl Stage for Probe {
        fn handle(&self, req: Request, next: Next) -> BoxFuture {
            self.log.lock().unwrap().push(self.name.to_owned());
            if self.terminate {
                return Box::pin(async { response::not_found() });
            }
            next(req)
        }
    }

    #[tokio::test]
    async fn stages_run_in_declaration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = Chain::new(vec![
            Arc::new(Probe { name: "first", log: Arc::clone(&log), terminate: false }),
            Arc::new(Probe { name: "second", log: Arc::clone(&log), terminate: false }),
        ]);

        let handler_log = Arc::clone(&log);
        let handler = move |_req: Request| {
            let log = Arc::clone(&handler_log);
            async move {
                log.lock().unwrap().push("handler".to_owned());
                response::text("ok")
            }
        };

        let wrapped = chain.apply(handler.into_boxed_handler());
        let res = wrapped.call(request()).await;

        assert_eq!(res.status(), http::StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), ["first", "second", "handler"]);
    }

    #[tokio::test]
    async fn terminating_stage_skips_the_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = Chain::new(vec![
            Arc::new(Probe { name: "gate", log: Arc::clone(&log), terminate: true }),
            Arc::new(Probe { name: "never", log: Arc::clone(&log), terminate: false }),
        ]);

        let handler = |_req: Request| async { response::text("unreachable") };
        let wrapped = chain.apply(handler.into_boxed_handler());
        let res = wrapped.call(request()).await;

        assert_eq!(res.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(*log.lock().unwrap(), ["gate"]);
    }

    #[tokio::test]
    async fn empty_chain_is_a_passthrough() {
        let handler = |_req: Request| async { response::text("direct") };
        let wrapped = Chain::empty().apply(handler.into_boxed_handler());
        let res = wrapped.call(request()).await;
        assert_eq!(res.status(), http::StatusCode::OK);
    }
}
