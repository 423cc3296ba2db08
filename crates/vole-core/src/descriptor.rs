// OpDescriptor — what a graph node computes
//
// Every node submitted to the engine carries exactly one descriptor. The
// descriptor names the operator kind and holds the numeric parameters the
// kernel needs; the inputs and output shape travel beside it.
//
// ADDING AN OPERATOR:
//
//   1. a variant here (plus its arm in `name` and `arity`)
//   2. a shape rule in `infer`
//   3. a validation rule in `validate`
//
// The submission path in `builder` is shared by every kind.
//
// PROFILING VARIANTS
//
// The three *FindAlgorithm variants carry geometry but no algorithm selector:
// the engine enumerates the candidates itself. Their results are not written
// into any shared container. The engine hands them back by value as the
// node's `Completion` once it has finished.

use crate::params::{
    ActivationAlgorithm, ConvBwdDataAlgo, ConvBwdFilterAlgo, ConvFwdAlgo, ConvGeometry, LrnParams,
    PoolingInfo, SoftmaxAlgorithm,
};

/// Immutable parameter bundle identifying an operator kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpDescriptor {
    /// inputs: src, filter, bias
    ConvForward {
        geometry: ConvGeometry,
        algo: ConvFwdAlgo,
    },
    /// inputs: diff, filter
    ConvBackwardData {
        geometry: ConvGeometry,
        algo: ConvBwdDataAlgo,
    },
    /// inputs: diff, bottom
    ConvBackwardFilter {
        geometry: ConvGeometry,
        algo: ConvBwdFilterAlgo,
    },
    /// inputs: diff
    ConvBackwardBias,
    /// inputs: src
    SoftmaxForward { algorithm: SoftmaxAlgorithm },
    /// inputs: diff, top
    SoftmaxBackward { algorithm: SoftmaxAlgorithm },
    /// inputs: src
    ActivationForward { algorithm: ActivationAlgorithm },
    /// inputs: diff, top, bottom
    ActivationBackward { algorithm: ActivationAlgorithm },
    /// inputs: src
    PoolingForward(PoolingInfo),
    /// inputs: diff, top, bottom
    PoolingBackward(PoolingInfo),
    /// inputs: src
    LrnForward(LrnParams),
    /// inputs: top, top_diff, bottom
    LrnBackward(LrnParams),
    /// inputs: src, filter
    ConvForwardFindAlgorithm { geometry: ConvGeometry },
    /// inputs: top, bottom
    ConvBackwardFilterFindAlgorithm { geometry: ConvGeometry },
    /// inputs: top, filter
    ConvBackwardDataFindAlgorithm { geometry: ConvGeometry },
}

impl OpDescriptor {
    /// Operator name, stable across releases (used in logs and errors).
    pub fn name(&self) -> &'static str {
        match self {
            OpDescriptor::ConvForward { .. } => "conv_forward",
            OpDescriptor::ConvBackwardData { .. } => "conv_backward_data",
            OpDescriptor::ConvBackwardFilter { .. } => "conv_backward_filter",
            OpDescriptor::ConvBackwardBias => "conv_backward_bias",
            OpDescriptor::SoftmaxForward { .. } => "softmax_forward",
            OpDescriptor::SoftmaxBackward { .. } => "softmax_backward",
            OpDescriptor::ActivationForward { .. } => "activation_forward",
            OpDescriptor::ActivationBackward { .. } => "activation_backward",
            OpDescriptor::PoolingForward(_) => "pooling_forward",
            OpDescriptor::PoolingBackward(_) => "pooling_backward",
            OpDescriptor::LrnForward(_) => "lrn_forward",
            OpDescriptor::LrnBackward(_) => "lrn_backward",
            OpDescriptor::ConvForwardFindAlgorithm { .. } => "conv_forward_find_algorithm",
            OpDescriptor::ConvBackwardFilterFindAlgorithm { .. } => {
                "conv_backward_filter_find_algorithm"
            }
            OpDescriptor::ConvBackwardDataFindAlgorithm { .. } => {
                "conv_backward_data_find_algorithm"
            }
        }
    }

    /// Number of input tensors the node consumes.
    pub fn arity(&self) -> usize {
        match self {
            OpDescriptor::ConvBackwardBias
            | OpDescriptor::SoftmaxForward { .. }
            | OpDescriptor::ActivationForward { .. }
            | OpDescriptor::PoolingForward(_)
            | OpDescriptor::LrnForward(_) => 1,
            OpDescriptor::ConvBackwardData { .. }
            | OpDescriptor::ConvBackwardFilter { .. }
            | OpDescriptor::SoftmaxBackward { .. }
            | OpDescriptor::ConvForwardFindAlgorithm { .. }
            | OpDescriptor::ConvBackwardFilterFindAlgorithm { .. }
            | OpDescriptor::ConvBackwardDataFindAlgorithm { .. } => 2,
            OpDescriptor::ConvForward { .. }
            | OpDescriptor::ActivationBackward { .. }
            | OpDescriptor::PoolingBackward(_)
            | OpDescriptor::LrnBackward(_) => 3,
        }
    }

    /// Whether this node only measures algorithms instead of computing a tensor.
    pub fn is_profiling(&self) -> bool {
        matches!(
            self,
            OpDescriptor::ConvForwardFindAlgorithm { .. }
                | OpDescriptor::ConvBackwardFilterFindAlgorithm { .. }
                | OpDescriptor::ConvBackwardDataFindAlgorithm { .. }
        )
    }

    /// Convolution geometry, for the convolution kinds.
    pub fn geometry(&self) -> Option<&ConvGeometry> {
        match self {
            OpDescriptor::ConvForward { geometry, .. }
            | OpDescriptor::ConvBackwardData { geometry, .. }
            | OpDescriptor::ConvBackwardFilter { geometry, .. }
            | OpDescriptor::ConvForwardFindAlgorithm { geometry }
            | OpDescriptor::ConvBackwardFilterFindAlgorithm { geometry }
            | OpDescriptor::ConvBackwardDataFindAlgorithm { geometry } => Some(geometry),
            _ => None,
        }
    }
}

// Profiling results

/// Outcome of trying one algorithm on the probe problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgoStatus {
    Success,
    /// The algorithm cannot run with this geometry.
    NotSupported,
    /// The algorithm needs more workspace than the engine could provide.
    AllocFailed,
}

/// One measured algorithm: which one, whether it ran, how long it took and
/// how much workspace it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgoProfResult<A> {
    pub algo: A,
    pub status: AlgoStatus,
    /// Measured (or estimated) run time in milliseconds.
    pub time_ms: f32,
    /// Workspace size in bytes.
    pub memory: usize,
}

impl<A> AlgoProfResult<A> {
    pub fn is_usable(&self) -> bool {
        self.status == AlgoStatus::Success
    }
}

pub type ConvFwdAlgoProfResult = AlgoProfResult<ConvFwdAlgo>;
pub type ConvBwdDataAlgoProfResult = AlgoProfResult<ConvBwdDataAlgo>;
pub type ConvBwdFilterAlgoProfResult = AlgoProfResult<ConvBwdFilterAlgo>;

/// What a node yields once the engine has finished it.
///
/// Ordinary nodes complete as `Tensor`: their data lives in the engine and is
/// reached through the handle. Profiling nodes complete with the result list,
/// in the order the engine ranked them.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Tensor,
    ConvForwardAlgorithms(Vec<ConvFwdAlgoProfResult>),
    ConvBackwardDataAlgorithms(Vec<ConvBwdDataAlgoProfResult>),
    ConvBackwardFilterAlgorithms(Vec<ConvBwdFilterAlgoProfResult>),
}

impl Completion {
    pub fn kind(&self) -> &'static str {
        match self {
            Completion::Tensor => "tensor",
            Completion::ConvForwardAlgorithms(_) => "conv_forward_algorithms",
            Completion::ConvBackwardDataAlgorithms(_) => "conv_backward_data_algorithms",
            Completion::ConvBackwardFilterAlgorithms(_) => "conv_backward_filter_algorithms",
        }
    }
}
