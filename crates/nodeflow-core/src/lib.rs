//! Workflow execution engine for Nodeflow.
//!
//! This crate defines the engine itself (`engine`) and the "ports" it talks
//! through: the `WorkflowStore` trait (`repository`) and the capability
//! provider traits (`provider`). Infrastructure implementations live in
//! `nodeflow-infra` -- this crate never depends on a database or HTTP crate.

pub mod engine;
pub mod provider;
pub mod repository;
