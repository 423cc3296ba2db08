// Validation rules — cross-operand checks run before any node is built
//
// Every rule returns on the first violation with an error naming the broken
// relationship. Rules take shapes, not tensors, so the algorithm profiler can
// apply them to the bare shapes it is given before allocating probes.

use crate::error::{Error, Result};
use crate::infer::pooled_extent;
use crate::params::PoolingInfo;
use crate::scale::{BatchDims, FilterDims, Scale};

fn channels_eq(context: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::ChannelMismatch {
            context,
            expected,
            got,
        });
    }
    Ok(())
}

fn images_eq(context: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::BatchMismatch {
            context,
            expected,
            got,
        });
    }
    Ok(())
}

/// Require two operands to have identical shapes.
pub fn same_shape(context: &'static str, expected: &Scale, got: &Scale) -> Result<()> {
    if expected != got {
        return Err(Error::ShapeMismatch {
            context,
            expected: expected.clone(),
            got: got.clone(),
        });
    }
    Ok(())
}

// Convolution

/// Forward convolution: input channels match the filter, bias is a vector
/// with one entry per output channel.
pub fn check_conv_forward(src: &BatchDims, filter: &FilterDims, bias: &Scale) -> Result<()> {
    check_conv_forward_channels(src, filter)?;
    if bias.num_dims() != 1 {
        return Err(Error::RankMismatch {
            context: "bias dimension mismatch",
            expected: 1,
            got: bias.num_dims(),
        });
    }
    channels_eq("bias size mismatch", filter.num_outputs, bias.dims()[0])
}

/// The channel half of the forward rule, shared with the forward profiler
/// (which runs without a bias).
pub fn check_conv_forward_channels(src: &BatchDims, filter: &FilterDims) -> Result<()> {
    channels_eq(
        "#input channels mismatch",
        filter.num_inputs,
        src.num_feature_maps,
    )
}

/// Backward-data: the incoming gradient has one channel per filter output.
pub fn check_conv_backward_data(diff: &BatchDims, filter: &FilterDims) -> Result<()> {
    channels_eq(
        "#output channels mismatch",
        filter.num_outputs,
        diff.num_feature_maps,
    )
}

/// Backward-filter: gradient and forward input cover the same images.
pub fn check_conv_backward_filter(diff: &BatchDims, bottom: &BatchDims) -> Result<()> {
    images_eq("#images mismatch", bottom.num_images, diff.num_images)
}

// Pooling

/// Pooling backward.
///
/// `top` must be exactly what a forward pass over `bottom` with `info` would
/// produce. The pooled extent is recomputed here rather than trusted, so a
/// `top` built with different parameters is caught even when `diff` and `top`
/// agree with each other.
pub fn check_pooling_backward(
    diff: &Scale,
    top: &Scale,
    bottom: &Scale,
    info: &PoolingInfo,
) -> Result<()> {
    same_shape("inputs sizes mismatch", top, diff)?;
    let diff = BatchDims::from_scale(diff)?;
    let top = BatchDims::from_scale(top)?;
    let bottom = BatchDims::from_scale(bottom)?;
    images_eq("#images mismatch", bottom.num_images, diff.num_images)?;
    channels_eq(
        "#channels mismatch",
        bottom.num_feature_maps,
        diff.num_feature_maps,
    )?;

    let (pooled_width, pooled_height) = pooled_extent(&bottom, info)?;
    same_shape(
        "height mismatch",
        &Scale::from(pooled_height),
        &Scale::from(top.height),
    )?;
    same_shape(
        "width mismatch",
        &Scale::from(pooled_width),
        &Scale::from(top.width),
    )
}

// Element-wise backward passes

pub fn check_softmax_backward(diff: &Scale, top: &Scale) -> Result<()> {
    same_shape("inputs sizes mismatch", diff, top)
}

pub fn check_activation_backward(diff: &Scale, top: &Scale, bottom: &Scale) -> Result<()> {
    same_shape("inputs sizes mismatch", diff, top)?;
    same_shape("inputs sizes mismatch", diff, bottom)
}

pub fn check_lrn_backward(top: &Scale, top_diff: &Scale, bottom: &Scale) -> Result<()> {
    same_shape("inputs sizes mismatch", top, top_diff)?;
    same_shape("inputs sizes mismatch", top, bottom)
}
