//! Observability - request IDs on top of the tracing stack.

mod request_id;

pub use request_id::{RequestId, RequestIdMiddleware};
