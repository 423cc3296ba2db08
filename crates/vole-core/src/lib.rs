//! # vole-core
//!
//! Operator definitions and shape inference for convolutional network layers.
//!
//! This crate provides:
//! - [`Scale`] — dimension vectors, plus the [`BatchDims`] / [`FilterDims`] views
//! - [`Convolution`] — conv, pooling, softmax, activation and LRN node builders
//! - [`compute_one`] — the single point where nodes are handed to an engine
//! - [`Engine`] trait — the contract with a lazily evaluating array engine
//! - the algorithm profiler (`Convolution::*_find_algorithm`)
//!
//! Nothing here computes tensor contents. Every operator validates its
//! operands, derives the output shape and submits a descriptor; the engine
//! does the rest.
// - Scale: shape of an engine tensor, width first
// - params: algorithm selectors and per-operator configuration
// - infer / validate: pure shape rules, run before any submission
// - descriptor: what a node computes and what it yields on completion

pub mod builder;
pub mod convolution;
pub mod descriptor;
pub mod dtype;
pub mod engine;
pub mod error;
pub mod infer;
pub mod params;
pub mod profiler;
pub mod scale;
pub mod tensor;
pub mod validate;

#[cfg(test)]
mod testing;

pub use builder::compute_one;
pub use convolution::Convolution;
pub use descriptor::{
    AlgoProfResult, AlgoStatus, Completion, ConvBwdDataAlgoProfResult,
    ConvBwdFilterAlgoProfResult, ConvFwdAlgoProfResult, OpDescriptor,
};
pub use dtype::DType;
pub use engine::{Engine, TensorHandle};
pub use error::{Error, Result};
pub use params::{
    ActivationAlgorithm, ConvBwdDataAlgo, ConvBwdFilterAlgo, ConvFwdAlgo, ConvGeometry, ConvInfo,
    LrnParams, PoolingAlgorithm, PoolingInfo, SoftmaxAlgorithm,
};
pub use scale::{BatchDims, FilterDims, Scale};
pub use tensor::{Filter, ImageBatch};
