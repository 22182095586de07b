//! Workflow engine core: validation, templating, ordering, and execution.
//!
//! - `validator` -- structural and semantic checks on a definition
//! - `template` -- `{{path.to.value}}` substitution against a context
//! - `context` -- per-run execution context (input + node outputs)
//! - `topo` -- deterministic topological ordering (Kahn's algorithm)
//! - `runner` -- one handler per node kind
//! - `string_ops` -- the string node's sub-operations
//! - `orchestrator` -- the execution state machine and audit logging

pub mod context;
pub mod orchestrator;
pub mod runner;
pub mod string_ops;
pub mod template;
pub mod topo;
pub mod validator;

#[cfg(test)]
pub(crate) mod testkit;
