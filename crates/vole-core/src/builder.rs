// Graph node builder — the single submission point
//
// Every operator call ends here with three things: its input handles, the
// output shape computed by `infer`, and a populated descriptor. The builder
// checks the input count against the descriptor and passes the triple to the
// engine, returning at once with the handle of the not-yet-computed result.
//
// By the time a node reaches `compute_one` it has already been validated and
// its shape inferred. Nothing here blocks and nothing here is shared between
// calls, so independent threads may build nodes against one engine at once.

use crate::descriptor::OpDescriptor;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::scale::Scale;

/// Submit one node to `engine` and return the handle of its output.
pub fn compute_one<E: Engine>(
    engine: &E,
    inputs: &[E::Handle],
    output_shape: Scale,
    descriptor: OpDescriptor,
) -> Result<E::Handle> {
    let expected = descriptor.arity();
    if inputs.len() != expected {
        return Err(Error::Arity {
            op: descriptor.name(),
            expected,
            got: inputs.len(),
        });
    }

    tracing::debug!(
        op = descriptor.name(),
        inputs = inputs.len(),
        output = %output_shape,
        profiling = descriptor.is_profiling(),
        "submitting node"
    );
    engine.submit_node(inputs, output_shape, descriptor)
}
