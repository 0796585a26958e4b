//! Request logging stage.
//!
//! First in every chain, by design: it observes the raw request before any
//! later stage has a chance to reject it, so a blocked call still leaves a
//! start line and a completion line with the rejection status. The trace id
//! assigned at request construction ties the two lines together.

use std::time::Instant;

use tracing::info;

use crate::handler::BoxFuture;
use crate::middleware::{Next, Stage};
use crate::request::Request;

/// Logs one start line and one completion line per request.
pub struct RequestLogger;

impl Stage for RequestLogger {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let start = Instant::now();
        let trace_id = req.trace_id().to_owned();
        let method = req.method().clone();
        let path = req.path().to_owned();
        let user_agent = req.header("user-agent").unwrap_or("").to_owned();

        info!(
            trace_id = %trace_id,
            method = %method,
            path = %path,
            user_agent = %user_agent,
            "request started"
        );

        let fut = next(req);
        Box::pin(async move {
            let res = fut.await;
            info!(
                trace_id = %trace_id,
                method = %method,
                path = %path,
                status = res.status().as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "request completed"
            );
            res
        })
    }
}
