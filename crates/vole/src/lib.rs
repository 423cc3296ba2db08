//! # Vole
//!
//! Convolutional-network operators that build lazily evaluated graph nodes.
//!
//! This is the top-level facade crate that re-exports everything you need.
//!
//! ## Usage
//!
//! ```rust
//! use vole::prelude::*;
//!
//! let engine = RefEngine::default();
//! let conv = Convolution::new(&engine);
//!
//! let src = ImageBatch::new(engine.zeros(Scale::from((5, 5, 3, 2)))?)?;
//! let filter = Filter::new(engine.zeros(Scale::from((3, 3, 3, 4)))?)?;
//! let bias = engine.zeros(Scale::from(4))?;
//!
//! let top = conv.conv_forward(&src, &filter, &bias, ConvInfo::default())?;
//! assert_eq!(top.shape(), &Scale::from((3, 3, 4, 2)));
//! # Ok::<(), vole::Error>(())
//! ```
//!
//! ## Architecture
//!
//! | Crate | Purpose |
//! |-------|----------|
//! | `vole-core` | Scale, shape algebra, validation, descriptors, node builder, profiler, Engine trait |
//! | `vole-ref` | Reference engine: per-node worker threads and a simulated cost model |

/// Re-export core types.
pub use vole_core::{
    compute_one, AlgoProfResult, AlgoStatus, BatchDims, Completion, Convolution, DType, Engine,
    Error, Filter, FilterDims, ImageBatch, OpDescriptor, Result, Scale, TensorHandle,
};

/// Operator parameters and algorithm selectors.
pub mod params {
    pub use vole_core::params::*;
}

/// Pure shape rules.
pub mod infer {
    pub use vole_core::infer::*;
}

/// Cross-operand validation rules.
pub mod validate {
    pub use vole_core::validate::*;
}

/// Re-export the reference engine.
pub use vole_ref::{RefEngine, RefEngineConfig, RefTensor};

/// Prelude: import this for the most common types.
pub mod prelude {
    pub use crate::params::{
        ActivationAlgorithm, ConvBwdDataAlgo, ConvBwdFilterAlgo, ConvFwdAlgo, ConvGeometry,
        ConvInfo, LrnParams, PoolingAlgorithm, PoolingInfo, SoftmaxAlgorithm,
    };
    pub use crate::{
        AlgoProfResult, AlgoStatus, Completion, Convolution, DType, Engine, Error, Filter,
        ImageBatch, RefEngine, RefEngineConfig, RefTensor, Result, Scale, TensorHandle,
    };
}
