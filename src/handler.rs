//! Handler trait and type erasure.
//!
//! The route table holds handlers of *different* concrete types — a plain
//! `async fn` for a health probe, a captured-state closure for a business
//! procedure, a chain-wrapped stack built by the registrar. Rust collections
//! hold one type, so everything is stored behind `dyn ErasedHandler`.
//!
//! The chain from user code to vtable call:
//!
//! ```text
//! async fn check(req: Request) -> Response { … }   ← handler author writes this
//!        ↓ registry.register(path, check)
//! check.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(check))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! chain.apply(handler)                             ← stages wrap the Arc
//!        ↓
//! binding.handler.call(req)  at request time       ← one vtable dispatch
//! ```
//!
//! The per-request cost is one Arc clone plus one virtual call — noise next
//! to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Pin<Box<…>>` because the runtime polls the future in place; `Send +
/// 'static` so tokio may move it across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `Arc` gives cheap, thread-safe shared ownership — one atomic increment
/// per request, no copying of captured state.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid procedure handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or `Fn` closure) with the signature:
///
/// ```text
/// async fn name(req: Request) -> Response
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it, so
/// the registrar's assumptions about handlers hold across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Because `Sealed` is private, external crates cannot name it and therefore
/// cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype that holds a concrete handler `F` and bridges it into the
/// trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        Box::pin((self.0)(req))
    }
}
