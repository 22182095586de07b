//! Infrastructure implementations for the Nodeflow engine.
//!
//! - `store` -- `InMemoryStore`, a DashMap-backed `WorkflowStore`
//! - `http` -- `ReqwestHttpClient`, the http node's transport

pub mod http;
pub mod store;
