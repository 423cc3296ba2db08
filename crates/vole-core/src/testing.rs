// Recording engine used by the unit tests in this crate.
//
// Handles complete immediately. Profiling nodes complete with one result per
// candidate algorithm, in declaration order, unless the engine was built to
// answer with the wrong completion kind.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::descriptor::{AlgoProfResult, AlgoStatus, Completion, OpDescriptor};
use crate::engine::{Engine, TensorHandle};
use crate::error::{Error, Result};
use crate::params::{ConvBwdDataAlgo, ConvBwdFilterAlgo, ConvFwdAlgo};
use crate::scale::Scale;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MockHandle {
    pub id: usize,
    pub shape: Scale,
}

impl TensorHandle for MockHandle {
    fn shape(&self) -> &Scale {
        &self.shape
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedNode {
    pub inputs: Vec<usize>,
    pub output: MockHandle,
    pub descriptor: OpDescriptor,
}

pub(crate) struct MockEngine {
    next_id: AtomicUsize,
    nodes: Mutex<Vec<RecordedNode>>,
    zeros: Mutex<Vec<Scale>>,
    waits: AtomicUsize,
    answer_with_tensor: bool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(0),
            nodes: Mutex::new(Vec::new()),
            zeros: Mutex::new(Vec::new()),
            waits: AtomicUsize::new(0),
            answer_with_tensor: false,
        }
    }

    /// An engine whose profiling nodes complete as plain tensors.
    pub fn misbehaving() -> Self {
        Self {
            answer_with_tensor: true,
            ..Self::new()
        }
    }

    /// A leaf handle, as if produced by an earlier computation.
    pub fn input(&self, shape: impl Into<Scale>) -> MockHandle {
        MockHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            shape: shape.into(),
        }
    }

    pub fn nodes(&self) -> Vec<RecordedNode> {
        self.nodes.lock().unwrap().clone()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }

    pub fn zeros_allocated(&self) -> Vec<Scale> {
        self.zeros.lock().unwrap().clone()
    }

    pub fn wait_count(&self) -> usize {
        self.waits.load(Ordering::Relaxed)
    }

    fn completion_for(&self, descriptor: &OpDescriptor) -> Completion {
        if self.answer_with_tensor {
            return Completion::Tensor;
        }
        fn results<A: Copy>(algos: &[A]) -> Vec<AlgoProfResult<A>> {
            algos
                .iter()
                .enumerate()
                .map(|(i, &algo)| AlgoProfResult {
                    algo,
                    status: AlgoStatus::Success,
                    time_ms: i as f32,
                    memory: 0,
                })
                .collect()
        }
        match descriptor {
            OpDescriptor::ConvForwardFindAlgorithm { .. } => {
                Completion::ConvForwardAlgorithms(results(&ConvFwdAlgo::ALL))
            }
            OpDescriptor::ConvBackwardDataFindAlgorithm { .. } => {
                Completion::ConvBackwardDataAlgorithms(results(&ConvBwdDataAlgo::ALL))
            }
            OpDescriptor::ConvBackwardFilterFindAlgorithm { .. } => {
                Completion::ConvBackwardFilterAlgorithms(results(&ConvBwdFilterAlgo::ALL))
            }
            _ => Completion::Tensor,
        }
    }
}

impl Engine for MockEngine {
    type Handle = MockHandle;

    fn submit_node(
        &self,
        inputs: &[MockHandle],
        output_shape: Scale,
        descriptor: OpDescriptor,
    ) -> Result<MockHandle> {
        let output = self.input(output_shape);
        self.nodes.lock().unwrap().push(RecordedNode {
            inputs: inputs.iter().map(|h| h.id).collect(),
            output: output.clone(),
            descriptor,
        });
        Ok(output)
    }

    fn zeros(&self, shape: Scale) -> Result<MockHandle> {
        self.zeros.lock().unwrap().push(shape.clone());
        Ok(self.input(shape))
    }

    fn wait(&self, handle: &MockHandle) -> Result<Completion> {
        self.waits.fetch_add(1, Ordering::Relaxed);
        let nodes = self.nodes.lock().unwrap();
        match nodes.iter().find(|n| n.output.id == handle.id) {
            Some(node) => Ok(self.completion_for(&node.descriptor)),
            None if handle.id < self.next_id.load(Ordering::Relaxed) => Ok(Completion::Tensor),
            None => Err(Error::engine(format!("unknown handle {}", handle.id))),
        }
    }
}
