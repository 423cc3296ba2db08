// RefEngine — in-process engine that honours the deferred-handle contract
//
// Every submitted node gets its own worker thread. The worker blocks on the
// node's inputs, produces the node's completion and sends it down a one-shot
// channel; `submit_node` returns the handle before any of that happens.
//
// Workers never share a pool, so a node waiting on its inputs can never
// starve those inputs of a thread.
//
// WHAT A NODE COMPUTES:
//
//   ordinary nodes     Completion::Tensor (contents are not materialized)
//   profiling nodes    every selector in ALL, priced by `cost::rank`
//   zeros              complete at creation, no thread

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use vole_core::{
    Completion, ConvBwdDataAlgo, ConvBwdFilterAlgo, ConvFwdAlgo, Engine, Error, OpDescriptor,
    Result, Scale, TensorHandle,
};

use crate::config::RefEngineConfig;
use crate::cost::{rank, Problem};
use crate::handle::{Outcome, RefTensor};

/// What a worker does once its inputs are ready.
#[derive(Debug, Clone, Copy)]
enum Work {
    Tensor,
    ProfileForward(Problem),
    ProfileBackwardData(Problem),
    ProfileBackwardFilter(Problem),
}

impl Work {
    /// Read the problem out of the input and output shapes, so bad shapes
    /// fail at submission rather than inside a worker.
    fn plan(descriptor: &OpDescriptor, inputs: &[RefTensor], output: &Scale) -> Result<Self> {
        let shape = |i: usize| inputs[i].shape();
        Ok(match *descriptor {
            OpDescriptor::ConvForwardFindAlgorithm { geometry } => {
                Work::ProfileForward(Problem::forward(shape(0), shape(1), output, geometry)?)
            }
            OpDescriptor::ConvBackwardDataFindAlgorithm { geometry } => Work::ProfileBackwardData(
                Problem::backward_data(shape(0), shape(1), output, geometry)?,
            ),
            OpDescriptor::ConvBackwardFilterFindAlgorithm { geometry } => {
                Work::ProfileBackwardFilter(Problem::backward_filter(
                    shape(0),
                    shape(1),
                    output,
                    geometry,
                )?)
            }
            _ => Work::Tensor,
        })
    }

    fn run(self, config: &RefEngineConfig) -> Completion {
        match self {
            Work::Tensor => Completion::Tensor,
            Work::ProfileForward(p) => {
                Completion::ConvForwardAlgorithms(rank(&ConvFwdAlgo::ALL, &p, config))
            }
            Work::ProfileBackwardData(p) => {
                Completion::ConvBackwardDataAlgorithms(rank(&ConvBwdDataAlgo::ALL, &p, config))
            }
            Work::ProfileBackwardFilter(p) => {
                Completion::ConvBackwardFilterAlgorithms(rank(&ConvBwdFilterAlgo::ALL, &p, config))
            }
        }
    }
}

/// Reference implementation of [`Engine`].
///
/// Tracks shapes and dependencies, answers profiling nodes from a cost
/// model, and never materializes tensor contents.
pub struct RefEngine {
    config: RefEngineConfig,
    next_id: AtomicUsize,
    submitted: AtomicUsize,
}

impl RefEngine {
    pub fn new(config: RefEngineConfig) -> Self {
        Self {
            config,
            next_id: AtomicUsize::new(0),
            submitted: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &RefEngineConfig {
        &self.config
    }

    /// Number of nodes accepted by `submit_node`. Allocations through
    /// `zeros` are not counted.
    pub fn node_count(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for RefEngine {
    fn default() -> Self {
        Self::new(RefEngineConfig::default())
    }
}

impl Engine for RefEngine {
    type Handle = RefTensor;

    fn submit_node(
        &self,
        inputs: &[RefTensor],
        output_shape: Scale,
        descriptor: OpDescriptor,
    ) -> Result<RefTensor> {
        let op = descriptor.name();
        if inputs.len() != descriptor.arity() {
            return Err(Error::engine(format!(
                "{op} expects {} inputs, got {}",
                descriptor.arity(),
                inputs.len()
            )));
        }
        let work = Work::plan(&descriptor, inputs, &output_shape)
            .map_err(|e| Error::engine(format!("{op}: {e}")))?;

        let id = self.next_id();
        let (tx, rx) = mpsc::channel::<Outcome>();
        let deps: Vec<RefTensor> = inputs.to_vec();
        let config = self.config.clone();

        thread::Builder::new()
            .name(format!("{}-{id}", self.config.thread_name_prefix))
            .spawn(move || {
                tracing::trace!(id, op, deps = deps.len(), "node started");
                let failed = deps
                    .iter()
                    .find_map(|d| d.resolve().as_ref().err().map(|e| (d, e)));
                let outcome = match failed {
                    Some((dep, e)) => Err(format!("input {} ({}) failed: {e}", dep.id(), dep.op())),
                    None => Ok(work.run(&config)),
                };
                tracing::trace!(id, op, ok = outcome.is_ok(), "node finished");
                // The receiver is gone only if every handle was dropped.
                let _ = tx.send(outcome);
            })
            .map_err(|e| Error::engine(format!("failed to spawn worker for {op}: {e}")))?;

        self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(RefTensor::pending(id, op, output_shape, self.config.dtype, rx))
    }

    fn zeros(&self, shape: Scale) -> Result<RefTensor> {
        Ok(RefTensor::ready(self.next_id(), "zeros", shape, self.config.dtype))
    }

    fn wait(&self, handle: &RefTensor) -> Result<Completion> {
        handle.resolve().clone().map_err(Error::Engine)
    }
}
