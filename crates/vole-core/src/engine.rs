use std::fmt;

use crate::descriptor::{Completion, OpDescriptor};
use crate::error::Result;
use crate::scale::Scale;

// Engine — the contract with the array-computation engine
//
// The core never schedules, allocates or runs anything itself. It hands the
// engine fully validated nodes and gets back handles whose contents become
// valid later. Three calls cover everything:
//
//   submit_node(inputs, output_shape, descriptor) -> handle   (returns at once)
//   zeros(shape)                                  -> handle   (returns at once)
//   wait(handle)                                  -> Completion (blocks)
//
// COMPLETION OWNERSHIP:
//
//   A profiling node's results belong to its completion. `wait` returns them
//   by value, so nothing the engine writes is ever aliased by the caller while
//   the node is still running.

/// A reference to an engine-owned tensor that may not be computed yet.
///
/// Cloning a handle must be cheap and must refer to the same node. The shape
/// is known as soon as the handle exists.
pub trait TensorHandle: Clone + Send + Sync + fmt::Debug {
    /// Shape the node was declared with.
    fn shape(&self) -> &Scale;
}

/// A lazily evaluating array engine.
///
/// Implementations must be safe to call from many threads at once.
pub trait Engine: Send + Sync {
    /// The handle type returned for submitted nodes.
    type Handle: TensorHandle;

    /// Register a node and return a handle to its (future) output.
    ///
    /// Must not block on the node's execution.
    fn submit_node(
        &self,
        inputs: &[Self::Handle],
        output_shape: Scale,
        descriptor: OpDescriptor,
    ) -> Result<Self::Handle>;

    /// Allocate a zero-filled tensor. Same deferred semantics as `submit_node`.
    fn zeros(&self, shape: Scale) -> Result<Self::Handle>;

    /// Block until `handle` (and everything it depends on) has completed.
    ///
    /// Safe to call from any thread, and idempotent: waiting again on a
    /// completed handle returns the same completion immediately.
    fn wait(&self, handle: &Self::Handle) -> Result<Completion>;
}
