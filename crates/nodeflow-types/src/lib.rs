//! Shared domain types for Nodeflow.
//!
//! This crate contains the types exchanged between the engine, its stores,
//! and its capability providers: workflow definitions, execution records,
//! LLM messages, knowledge-base chunks, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod error;
pub mod http;
pub mod knowledge;
pub mod llm;
pub mod workflow;
