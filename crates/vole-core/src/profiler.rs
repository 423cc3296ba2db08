// Algorithm profiler — ask the engine which convolution algorithm is fastest
//
// Each find_* call builds a throwaway problem of the requested size out of
// zero-filled probes, submits a profiling node over it and blocks until the
// engine has tried every candidate. This is the only place in the crate that
// waits on the engine.
//
// FLOW:
//
//   shapes --validate--> dims --zeros--> probes --compute_one--> node
//        --wait--> Completion::*Algorithms(vec) --> caller
//
// The result vector is moved out of the completion. Nothing is shared with
// the engine after `wait` returns, so repeated or concurrent calls with the
// same shapes each get their own vector.

use crate::builder::compute_one;
use crate::convolution::Convolution;
use crate::descriptor::{
    Completion, ConvBwdDataAlgoProfResult, ConvBwdFilterAlgoProfResult, ConvFwdAlgoProfResult,
    OpDescriptor,
};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::infer;
use crate::params::ConvInfo;
use crate::scale::{BatchDims, FilterDims, Scale};
use crate::validate;

impl<E: Engine> Convolution<'_, E> {
    /// Profile every forward algorithm for `src_shape` convolved with
    /// `filter_shape` under the padding and stride of `info`.
    ///
    /// Blocks until the engine has finished. Results come back in the
    /// engine's ranking order.
    pub fn conv_forward_find_algorithm(
        &self,
        src_shape: &Scale,
        filter_shape: &Scale,
        info: ConvInfo,
    ) -> Result<Vec<ConvFwdAlgoProfResult>> {
        let src = BatchDims::from_scale(src_shape)?;
        let filter = FilterDims::from_scale(filter_shape)?;
        validate::check_conv_forward_channels(&src, &filter)?;
        let geometry = info.geometry();
        let out_shape = infer::conv_forward_output(&src, &filter, &geometry)?;

        let probes = [
            self.engine.zeros(src_shape.clone())?,
            self.engine.zeros(filter_shape.clone())?,
        ];
        let descriptor = OpDescriptor::ConvForwardFindAlgorithm { geometry };
        match self.profile(&probes, out_shape, descriptor)? {
            Completion::ConvForwardAlgorithms(results) => Ok(results),
            other => Err(unexpected(&descriptor, &other)),
        }
    }

    /// Profile every backward-filter algorithm. `top_shape` is the gradient
    /// arriving from above, `bottom_shape` the forward input.
    pub fn conv_backward_filter_find_algorithm(
        &self,
        top_shape: &Scale,
        bottom_shape: &Scale,
        filter_shape: &Scale,
        info: ConvInfo,
    ) -> Result<Vec<ConvBwdFilterAlgoProfResult>> {
        let top = BatchDims::from_scale(top_shape)?;
        let bottom = BatchDims::from_scale(bottom_shape)?;
        FilterDims::from_scale(filter_shape)?;
        validate::check_conv_backward_filter(&top, &bottom)?;

        let probes = [
            self.engine.zeros(top_shape.clone())?,
            self.engine.zeros(bottom_shape.clone())?,
        ];
        let descriptor = OpDescriptor::ConvBackwardFilterFindAlgorithm {
            geometry: info.geometry(),
        };
        match self.profile(&probes, filter_shape.clone(), descriptor)? {
            Completion::ConvBackwardFilterAlgorithms(results) => Ok(results),
            other => Err(unexpected(&descriptor, &other)),
        }
    }

    /// Profile every backward-data algorithm.
    pub fn conv_backward_data_find_algorithm(
        &self,
        top_shape: &Scale,
        bottom_shape: &Scale,
        filter_shape: &Scale,
        info: ConvInfo,
    ) -> Result<Vec<ConvBwdDataAlgoProfResult>> {
        let top = BatchDims::from_scale(top_shape)?;
        BatchDims::from_scale(bottom_shape)?;
        let filter = FilterDims::from_scale(filter_shape)?;
        validate::check_conv_backward_data(&top, &filter)?;

        let probes = [
            self.engine.zeros(top_shape.clone())?,
            self.engine.zeros(filter_shape.clone())?,
        ];
        let descriptor = OpDescriptor::ConvBackwardDataFindAlgorithm {
            geometry: info.geometry(),
        };
        match self.profile(&probes, bottom_shape.clone(), descriptor)? {
            Completion::ConvBackwardDataAlgorithms(results) => Ok(results),
            other => Err(unexpected(&descriptor, &other)),
        }
    }

    fn profile(
        &self,
        probes: &[E::Handle],
        output_shape: Scale,
        descriptor: OpDescriptor,
    ) -> Result<Completion> {
        let handle = compute_one(self.engine, probes, output_shape, descriptor)?;
        tracing::debug!(op = descriptor.name(), "waiting for profiling results");
        let completion = self.engine.wait(&handle)?;
        tracing::debug!(
            op = descriptor.name(),
            results = result_count(&completion),
            "profiling results received"
        );
        Ok(completion)
    }
}

fn result_count(completion: &Completion) -> usize {
    match completion {
        Completion::Tensor => 0,
        Completion::ConvForwardAlgorithms(v) => v.len(),
        Completion::ConvBackwardDataAlgorithms(v) => v.len(),
        Completion::ConvBackwardFilterAlgorithms(v) => v.len(),
    }
}

fn unexpected(descriptor: &OpDescriptor, completion: &Completion) -> Error {
    Error::UnexpectedCompletion {
        op: descriptor.name(),
        got: completion.kind(),
    }
}
