// Convolution — operator calls that build graph nodes
//
// Each call follows the same three steps:
//
//   1. validate the operands (`validate`)
//   2. compute the output shape (`infer`)
//   3. pack a descriptor and hand everything to `compute_one`
//
// A failure in steps 1 or 2 returns before the engine is touched. Calls
// return as soon as the node is registered; the result handle becomes valid
// when the engine gets round to it.
//
// INPUTS SUBMITTED AND OUTPUT SHAPE PER CALL:
//
//   conv_forward          src, filter, bias     -> conv formula
//   conv_backward_data    diff, filter          -> bottom
//   conv_backward_filter  diff, bottom          -> filter
//   conv_backward_bias    diff                  -> [feature maps]
//   softmax_forward       src                   -> src
//   softmax_backward      diff, top             -> diff
//   activation_forward    src                   -> src
//   activation_backward   diff, top, bottom     -> diff
//   pooling_forward       src                   -> pooled
//   pooling_backward      diff, top, bottom     -> bottom
//   lrn_forward           src                   -> src
//   lrn_backward          top, top_diff, bottom -> top

use crate::builder::compute_one;
use crate::descriptor::OpDescriptor;
use crate::engine::{Engine, TensorHandle};
use crate::error::Result;
use crate::infer;
use crate::params::{ActivationAlgorithm, ConvInfo, LrnParams, PoolingInfo, SoftmaxAlgorithm};
use crate::scale::BatchDims;
use crate::tensor::{Filter, ImageBatch};
use crate::validate;

/// Neural-network operator front end bound to one engine.
///
/// Holds only a shared reference, so it is as cheap to copy around (and as
/// thread-safe) as the engine itself.
///
/// # Example
/// ```ignore
/// let conv = Convolution::new(&engine);
/// let top = conv.conv_forward(&src, &filter, &bias, ConvInfo::default())?;
/// let pooled = conv.pooling_forward(&top, PoolingInfo::new(PoolingAlgorithm::Max, [2, 2], [2, 2]))?;
/// ```
pub struct Convolution<'e, E: Engine> {
    pub(crate) engine: &'e E,
}

impl<E: Engine> Clone for Convolution<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Engine> Copy for Convolution<'_, E> {}

impl<'e, E: Engine> Convolution<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &'e E {
        self.engine
    }

    // Convolution

    /// Forward convolution with bias.
    ///
    /// - `src`:    `[W, H, C_in, N]`
    /// - `filter`: `[kW, kH, C_in, C_out]`
    /// - `bias`:   `[C_out]`
    ///
    /// Returns `[W_out, H_out, C_out, N]`.
    pub fn conv_forward(
        &self,
        src: &ImageBatch<E::Handle>,
        filter: &Filter<E::Handle>,
        bias: &E::Handle,
        info: ConvInfo,
    ) -> Result<ImageBatch<E::Handle>> {
        validate::check_conv_forward(src.dims(), filter.dims(), bias.shape())?;
        let geometry = info.geometry();
        let out_shape = infer::conv_forward_output(src.dims(), filter.dims(), &geometry)?;
        let out_dims = BatchDims::from_scale(&out_shape)?;
        let descriptor = OpDescriptor::ConvForward {
            geometry,
            algo: info.forward_algorithm,
        };
        let inputs = [
            src.handle().clone(),
            filter.handle().clone(),
            bias.clone(),
        ];
        let handle = compute_one(self.engine, &inputs, out_shape, descriptor)?;
        Ok(ImageBatch::from_parts(handle, out_dims))
    }

    /// Gradient with respect to the convolution input. Shaped like `bottom`.
    pub fn conv_backward_data(
        &self,
        diff: &ImageBatch<E::Handle>,
        bottom: &ImageBatch<E::Handle>,
        filter: &Filter<E::Handle>,
        info: ConvInfo,
    ) -> Result<ImageBatch<E::Handle>> {
        validate::check_conv_backward_data(diff.dims(), filter.dims())?;
        let descriptor = OpDescriptor::ConvBackwardData {
            geometry: info.geometry(),
            algo: info.backward_data_algorithm,
        };
        let inputs = [diff.handle().clone(), filter.handle().clone()];
        let handle = compute_one(self.engine, &inputs, bottom.shape().clone(), descriptor)?;
        Ok(ImageBatch::from_parts(handle, *bottom.dims()))
    }

    /// Gradient with respect to the filters. Shaped like `filter`.
    pub fn conv_backward_filter(
        &self,
        diff: &ImageBatch<E::Handle>,
        bottom: &ImageBatch<E::Handle>,
        filter: &Filter<E::Handle>,
        info: ConvInfo,
    ) -> Result<Filter<E::Handle>> {
        validate::check_conv_backward_filter(diff.dims(), bottom.dims())?;
        let descriptor = OpDescriptor::ConvBackwardFilter {
            geometry: info.geometry(),
            algo: info.backward_filter_algorithm,
        };
        let inputs = [diff.handle().clone(), bottom.handle().clone()];
        let handle = compute_one(self.engine, &inputs, filter.shape().clone(), descriptor)?;
        Ok(Filter::from_parts(handle, *filter.dims()))
    }

    /// Gradient with respect to the bias: a 1-D tensor with one entry per
    /// feature map of `diff`.
    pub fn conv_backward_bias(&self, diff: &ImageBatch<E::Handle>) -> Result<E::Handle> {
        let out_shape = infer::conv_backward_bias_output(diff.dims());
        compute_one(
            self.engine,
            &[diff.handle().clone()],
            out_shape,
            OpDescriptor::ConvBackwardBias,
        )
    }

    // Softmax

    pub fn softmax_forward(
        &self,
        src: &ImageBatch<E::Handle>,
        algorithm: SoftmaxAlgorithm,
    ) -> Result<ImageBatch<E::Handle>> {
        let handle = compute_one(
            self.engine,
            &[src.handle().clone()],
            src.shape().clone(),
            OpDescriptor::SoftmaxForward { algorithm },
        )?;
        Ok(ImageBatch::from_parts(handle, *src.dims()))
    }

    pub fn softmax_backward(
        &self,
        diff: &ImageBatch<E::Handle>,
        top: &ImageBatch<E::Handle>,
        algorithm: SoftmaxAlgorithm,
    ) -> Result<ImageBatch<E::Handle>> {
        validate::check_softmax_backward(diff.shape(), top.shape())?;
        let inputs = [diff.handle().clone(), top.handle().clone()];
        let handle = compute_one(
            self.engine,
            &inputs,
            diff.shape().clone(),
            OpDescriptor::SoftmaxBackward { algorithm },
        )?;
        Ok(ImageBatch::from_parts(handle, *diff.dims()))
    }

    // Activation

    pub fn activation_forward(
        &self,
        src: &ImageBatch<E::Handle>,
        algorithm: ActivationAlgorithm,
    ) -> Result<ImageBatch<E::Handle>> {
        let handle = compute_one(
            self.engine,
            &[src.handle().clone()],
            src.shape().clone(),
            OpDescriptor::ActivationForward { algorithm },
        )?;
        Ok(ImageBatch::from_parts(handle, *src.dims()))
    }

    /// `top` is the forward output, `bottom` the forward input.
    pub fn activation_backward(
        &self,
        diff: &ImageBatch<E::Handle>,
        top: &ImageBatch<E::Handle>,
        bottom: &ImageBatch<E::Handle>,
        algorithm: ActivationAlgorithm,
    ) -> Result<ImageBatch<E::Handle>> {
        validate::check_activation_backward(diff.shape(), top.shape(), bottom.shape())?;
        let inputs = [
            diff.handle().clone(),
            top.handle().clone(),
            bottom.handle().clone(),
        ];
        let handle = compute_one(
            self.engine,
            &inputs,
            diff.shape().clone(),
            OpDescriptor::ActivationBackward { algorithm },
        )?;
        Ok(ImageBatch::from_parts(handle, *diff.dims()))
    }

    // Pooling

    pub fn pooling_forward(
        &self,
        src: &ImageBatch<E::Handle>,
        info: PoolingInfo,
    ) -> Result<ImageBatch<E::Handle>> {
        let out_shape = infer::pooling_forward_output(src.dims(), &info)?;
        let out_dims = BatchDims::from_scale(&out_shape)?;
        let handle = compute_one(
            self.engine,
            &[src.handle().clone()],
            out_shape,
            OpDescriptor::PoolingForward(info),
        )?;
        Ok(ImageBatch::from_parts(handle, out_dims))
    }

    /// Gradient of pooling. `top` must be the forward output for `bottom`
    /// under `info`; its spatial extent is recomputed and checked.
    pub fn pooling_backward(
        &self,
        diff: &ImageBatch<E::Handle>,
        top: &ImageBatch<E::Handle>,
        bottom: &ImageBatch<E::Handle>,
        info: PoolingInfo,
    ) -> Result<ImageBatch<E::Handle>> {
        validate::check_pooling_backward(diff.shape(), top.shape(), bottom.shape(), &info)?;
        let inputs = [
            diff.handle().clone(),
            top.handle().clone(),
            bottom.handle().clone(),
        ];
        let handle = compute_one(
            self.engine,
            &inputs,
            bottom.shape().clone(),
            OpDescriptor::PoolingBackward(info),
        )?;
        Ok(ImageBatch::from_parts(handle, *bottom.dims()))
    }

    // Local response normalization

    pub fn lrn_forward(
        &self,
        src: &ImageBatch<E::Handle>,
        params: LrnParams,
    ) -> Result<ImageBatch<E::Handle>> {
        let handle = compute_one(
            self.engine,
            &[src.handle().clone()],
            src.shape().clone(),
            OpDescriptor::LrnForward(params),
        )?;
        Ok(ImageBatch::from_parts(handle, *src.dims()))
    }

    pub fn lrn_backward(
        &self,
        top: &ImageBatch<E::Handle>,
        top_diff: &ImageBatch<E::Handle>,
        bottom: &ImageBatch<E::Handle>,
        params: LrnParams,
    ) -> Result<ImageBatch<E::Handle>> {
        validate::check_lrn_backward(top.shape(), top_diff.shape(), bottom.shape())?;
        let inputs = [
            top.handle().clone(),
            top_diff.handle().clone(),
            bottom.handle().clone(),
        ];
        let handle = compute_one(
            self.engine,
            &inputs,
            top.shape().clone(),
            OpDescriptor::LrnBackward(params),
        )?;
        Ok(ImageBatch::from_parts(handle, *top.dims()))
    }
}
