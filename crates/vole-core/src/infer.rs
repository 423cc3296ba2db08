// Shape algebra — output shape of every operator family
//
// These are pure functions of shapes and numeric parameters. They never look
// at tensor contents and never talk to the engine, so the convolution facade
// and the algorithm profiler can call them before anything is allocated.
//
// CONVOLUTION:
//
//   W_out = floor((W + 2*pad_w - kW) / stride_h) + 1
//   H_out = floor((H + 2*pad_h - kH) / stride_v) + 1
//   C_out = filter.num_outputs
//   N_out = src.num_images
//
// POOLING (ceil-mode with overlap correction):
//
//   pooled = floor((in + 2*pad - window + stride - 1) / stride) + 1
//   if (pooled - 1) * stride - in - pad >= 0 { pooled -= 1 }
//
//   The correction drops a trailing window whose start would sit at or past
//   the end of the input plus one side of padding. It is evaluated on the raw
//   formula's output, in signed arithmetic.
//
// EVERYTHING ELSE keeps a shape unchanged, except backward-bias which
// collapses a diff batch to a 1-D vector of its feature-map count.

use crate::bail_param;
use crate::error::Result;
use crate::params::{ConvGeometry, PoolingInfo};
use crate::scale::{BatchDims, FilterDims, Scale};

/// `input + 2 * pad`, rejected when it does not fit in `usize`.
fn padded_extent(input: usize, pad: usize) -> Result<usize> {
    match pad.checked_mul(2).and_then(|p| p.checked_add(input)) {
        Some(padded) => Ok(padded),
        None => bail_param!("input {} with padding {} overflows", input, pad),
    }
}

/// One spatial dimension of a convolution output.
pub fn conv_output_dim(input: usize, pad: usize, filter: usize, stride: usize) -> Result<usize> {
    if stride == 0 {
        bail_param!("convolution stride must be positive");
    }
    let padded = padded_extent(input, pad)?;
    if filter > padded {
        bail_param!(
            "filter extent {} larger than padded input {} (input {}, pad {})",
            filter,
            padded,
            input,
            pad
        );
    }
    Ok((padded - filter) / stride + 1)
}

/// Output shape of a forward convolution.
pub fn conv_forward_output(
    src: &BatchDims,
    filter: &FilterDims,
    geometry: &ConvGeometry,
) -> Result<Scale> {
    let width = conv_output_dim(
        src.width,
        geometry.pad_width,
        filter.width,
        geometry.stride_horizontal,
    )?;
    let height = conv_output_dim(
        src.height,
        geometry.pad_height,
        filter.height,
        geometry.stride_vertical,
    )?;
    Ok(Scale::new(vec![
        width,
        height,
        filter.num_outputs,
        src.num_images,
    ]))
}

/// One spatial dimension of a pooling output, including overlap correction.
pub fn pooled_dim(input: usize, pad: usize, window: usize, stride: usize) -> Result<usize> {
    if stride == 0 {
        bail_param!("pooling stride must be positive");
    }
    if window == 0 {
        bail_param!("pooling window must be positive");
    }
    let padded = padded_extent(input, pad)?;
    if window > padded {
        bail_param!(
            "pooling window {} larger than padded input {} (input {}, pad {})",
            window,
            padded,
            input,
            pad
        );
    }

    // i128 holds every intermediate for usize operands.
    let (input, pad, window, stride) = (input as i128, pad as i128, window as i128, stride as i128);
    let mut pooled = (input + 2 * pad - window + stride - 1) / stride + 1;
    if (pooled - 1) * stride - input - pad >= 0 {
        pooled -= 1;
    }
    match usize::try_from(pooled) {
        Ok(pooled) => Ok(pooled),
        Err(_) => bail_param!("pooled extent {} out of range", pooled),
    }
}

/// Pooled `(width, height)` of `src` under `info`.
pub fn pooled_extent(src: &BatchDims, info: &PoolingInfo) -> Result<(usize, usize)> {
    let width = pooled_dim(
        src.width,
        info.pad_width,
        info.window_width,
        info.stride_horizontal,
    )?;
    let height = pooled_dim(
        src.height,
        info.pad_height,
        info.window_height,
        info.stride_vertical,
    )?;
    Ok((width, height))
}

/// Output shape of a forward pooling node.
pub fn pooling_forward_output(src: &BatchDims, info: &PoolingInfo) -> Result<Scale> {
    let (width, height) = pooled_extent(src, info)?;
    Ok(Scale::new(vec![
        width,
        height,
        src.num_feature_maps,
        src.num_images,
    ]))
}

/// Output shape of a backward-bias node: one gradient per feature map.
pub fn conv_backward_bias_output(diff: &BatchDims) -> Scale {
    Scale::from(diff.num_feature_maps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PoolingAlgorithm;
    use crate::Error;
    use proptest::prelude::*;

    fn batch(w: usize, h: usize, c: usize, n: usize) -> BatchDims {
        BatchDims {
            width: w,
            height: h,
            num_feature_maps: c,
            num_images: n,
        }
    }

    #[test]
    fn test_conv_forward_basic() {
        let src = batch(5, 5, 3, 2);
        let filter = FilterDims {
            width: 3,
            height: 3,
            num_inputs: 3,
            num_outputs: 4,
        };
        let out = conv_forward_output(&src, &filter, &ConvGeometry::default()).unwrap();
        assert_eq!(out, Scale::from((3, 3, 4, 2)));
    }

    #[test]
    fn test_conv_forward_asymmetric_stride_and_pad() {
        // width: (7 + 2 - 3) / 2 + 1 = 4, height: (6 + 0 - 3) / 1 + 1 = 4
        let src = batch(7, 6, 1, 1);
        let filter = FilterDims {
            width: 3,
            height: 3,
            num_inputs: 1,
            num_outputs: 8,
        };
        let geometry = ConvGeometry {
            pad_height: 0,
            pad_width: 1,
            stride_vertical: 1,
            stride_horizontal: 2,
        };
        let out = conv_forward_output(&src, &filter, &geometry).unwrap();
        assert_eq!(out, Scale::from((4, 4, 8, 1)));
    }

    #[test]
    fn test_conv_rejects_zero_stride() {
        let err = conv_output_dim(5, 0, 3, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_conv_rejects_oversized_filter() {
        assert!(conv_output_dim(2, 0, 3, 1).is_err());
        // padding makes room for the filter
        assert_eq!(conv_output_dim(2, 1, 3, 1).unwrap(), 2);
    }

    #[test]
    fn test_pooled_dim_even_split() {
        assert_eq!(pooled_dim(4, 0, 2, 2).unwrap(), 2);
    }

    #[test]
    fn test_pooled_dim_ceil_mode() {
        // (5 - 2 + 1) / 2 + 1 = 3; last window starts at 4, inside the input
        assert_eq!(pooled_dim(5, 0, 2, 2).unwrap(), 3);
        // raw (4 - 3 + 1) / 2 + 1 = 2; (2 - 1) * 2 - 4 - 0 < 0, no correction
        assert_eq!(pooled_dim(4, 0, 3, 2).unwrap(), 2);
    }

    #[test]
    fn test_pooled_dim_overlap_correction() {
        // raw (1 + 2 - 1 + 1) / 2 + 1 = 2; (2 - 1) * 2 - 1 - 1 = 0 -> corrected to 1
        assert_eq!(pooled_dim(1, 1, 1, 2).unwrap(), 1);
        // raw (6 + 2 - 2 + 1) / 2 + 1 = 4; 3 * 2 - 6 - 1 < 0, kept
        assert_eq!(pooled_dim(6, 1, 2, 2).unwrap(), 4);
    }

    #[test]
    fn test_pooled_dim_rejects_bad_params() {
        assert!(pooled_dim(4, 0, 2, 0).is_err());
        assert!(pooled_dim(4, 0, 0, 1).is_err());
        assert!(pooled_dim(2, 0, 3, 1).is_err());
    }

    #[test]
    fn test_padding_overflow_is_invalid_parameter() {
        assert!(matches!(
            pooled_dim(usize::MAX, 1, 1, 1),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            conv_output_dim(3, usize::MAX / 2 + 1, 3, 1),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_pooled_dim_keeps_extreme_extents() {
        assert_eq!(pooled_dim(usize::MAX, 0, 1, 1).unwrap(), usize::MAX);
        assert_eq!(pooled_dim(usize::MAX, 0, 2, usize::MAX).unwrap(), 1);
    }

    #[test]
    fn test_pooling_forward_output_is_width_first() {
        let src = batch(8, 4, 16, 3);
        let info = PoolingInfo::new(PoolingAlgorithm::Max, [2, 4], [2, 4]);
        let out = pooling_forward_output(&src, &info).unwrap();
        assert_eq!(out, Scale::from((2, 2, 16, 3)));
    }

    #[test]
    fn test_backward_bias_is_one_dimensional() {
        let out = conv_backward_bias_output(&batch(3, 3, 4, 2));
        assert_eq!(out, Scale::from(4));
    }

    proptest! {
        #[test]
        fn prop_conv_dim_matches_floor_formula(
            input in 1usize..64,
            pad in 0usize..4,
            filter in 1usize..8,
            stride in 1usize..5,
        ) {
            prop_assume!(filter <= input + 2 * pad);
            let got = conv_output_dim(input, pad, filter, stride).unwrap();
            prop_assert_eq!(got, (input + 2 * pad - filter) / stride + 1);
        }

        #[test]
        fn prop_pooled_dim_is_stable_and_in_bounds(
            input in 1usize..64,
            pad in 0usize..4,
            window in 1usize..8,
            stride in 1usize..5,
        ) {
            prop_assume!(window <= input + 2 * pad);
            let first = pooled_dim(input, pad, window, stride).unwrap();
            let second = pooled_dim(input, pad, window, stride).unwrap();
            prop_assert_eq!(first, second);
            prop_assert!(first >= 1);
            // the last window never starts past the padded input
            prop_assert!((first - 1) * stride < input + 2 * pad);
            if pad <= window {
                prop_assert!((first - 1) * stride < input + pad);
            }
        }
    }
}
