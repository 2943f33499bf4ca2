//! Pipeline abstraction and its implementations
//!
//! The gateway holds an `Arc<dyn Pipeline>` so the backend can be swapped
//! (remote service in production, mocks in tests).

pub mod http;
pub mod pipeline;

pub use http::HttpPipeline;
pub use pipeline::Pipeline;

#[cfg(test)]
pub use pipeline::MockPipeline;
