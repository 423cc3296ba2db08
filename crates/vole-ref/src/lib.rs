//! # vole-ref
//!
//! Reference engine for Vole graph nodes.
//!
//! [`RefEngine`] implements the [`vole_core::Engine`] contract in process: each
//! node runs on its own thread once its inputs complete, handles resolve
//! through one-shot channels, and profiling nodes are answered from a
//! deterministic cost model. Tensor contents are never materialized, which
//! makes it suitable for exercising graph construction and algorithm
//! selection without a device.

pub mod config;
mod cost;
pub mod engine;
pub mod handle;

pub use config::RefEngineConfig;
pub use engine::RefEngine;
pub use handle::RefTensor;
