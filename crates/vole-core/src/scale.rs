use std::fmt;

use crate::error::{Error, Result};

// Scale — ordered dimension list of a tensor
//
// A Scale is the shape of a tensor as the engine sees it. The order is fixed
// and meaningful. Image batches and filters are always 4-D:
//
//   ImageBatch: [width, height, num_feature_maps, num_images]
//   Filter:     [width, height, num_inputs, num_outputs]
//
// Bias tensors and the result of a backward-bias node are 1-D:
//
//   Bias:       [num_feature_maps]
//
// Two scales are equal when they have the same rank and every dimension
// matches element-wise.

/// Ordered, non-negative dimensions of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Scale(Vec<usize>);

impl Scale {
    /// Create a scale from a vector of dimension sizes.
    pub fn new(dims: Vec<usize>) -> Self {
        Scale(dims)
    }

    /// The dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of dimensions.
    pub fn num_dims(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements (product of all dimensions).
    /// An empty scale has 0 elements.
    pub fn num_elements(&self) -> usize {
        if self.0.is_empty() {
            0
        } else {
            self.0.iter().product()
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<usize> for Scale {
    /// 1-D scale.
    fn from(d: usize) -> Self {
        Scale(vec![d])
    }
}

impl From<(usize, usize)> for Scale {
    fn from((d0, d1): (usize, usize)) -> Self {
        Scale(vec![d0, d1])
    }
}

impl From<(usize, usize, usize, usize)> for Scale {
    fn from((d0, d1, d2, d3): (usize, usize, usize, usize)) -> Self {
        Scale(vec![d0, d1, d2, d3])
    }
}

impl From<Vec<usize>> for Scale {
    fn from(v: Vec<usize>) -> Self {
        Scale(v)
    }
}

impl From<&[usize]> for Scale {
    fn from(s: &[usize]) -> Self {
        Scale(s.to_vec())
    }
}

// Named readings of 4-D scales
//
// Validation and shape inference work on these instead of raw indices, so the
// same rules apply to live tensors and to the bare shapes handed to the
// algorithm profiler.

/// A 4-D scale read as an image batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchDims {
    pub width: usize,
    pub height: usize,
    pub num_feature_maps: usize,
    pub num_images: usize,
}

impl BatchDims {
    /// Read `scale` as `[width, height, num_feature_maps, num_images]`.
    pub fn from_scale(scale: &Scale) -> Result<Self> {
        match *scale.dims() {
            [width, height, num_feature_maps, num_images] => Ok(BatchDims {
                width,
                height,
                num_feature_maps,
                num_images,
            }),
            _ => Err(Error::RankMismatch {
                context: "image batch must be 4-D",
                expected: 4,
                got: scale.num_dims(),
            }),
        }
    }

    pub fn to_scale(self) -> Scale {
        Scale(vec![
            self.width,
            self.height,
            self.num_feature_maps,
            self.num_images,
        ])
    }
}

/// A 4-D scale read as a convolution filter bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDims {
    pub width: usize,
    pub height: usize,
    pub num_inputs: usize,
    pub num_outputs: usize,
}

impl FilterDims {
    /// Read `scale` as `[width, height, num_inputs, num_outputs]`.
    pub fn from_scale(scale: &Scale) -> Result<Self> {
        match *scale.dims() {
            [width, height, num_inputs, num_outputs] => Ok(FilterDims {
                width,
                height,
                num_inputs,
                num_outputs,
            }),
            _ => Err(Error::RankMismatch {
                context: "filter must be 4-D",
                expected: 4,
                got: scale.num_dims(),
            }),
        }
    }

    pub fn to_scale(self) -> Scale {
        Scale(vec![
            self.width,
            self.height,
            self.num_inputs,
            self.num_outputs,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_scale() {
        let s = Scale::from(5);
        assert_eq!(s.num_dims(), 1);
        assert_eq!(s.num_elements(), 5);
    }

    #[test]
    fn test_empty_scale_has_no_elements() {
        assert_eq!(Scale::default().num_elements(), 0);
    }

    #[test]
    fn test_equality_is_elementwise() {
        assert_eq!(Scale::from((3, 3, 4, 2)), Scale::new(vec![3, 3, 4, 2]));
        assert_ne!(Scale::from((3, 3, 4, 2)), Scale::from((3, 3, 2, 4)));
        assert_ne!(Scale::from((3, 3)), Scale::from((3, 3, 1, 1)));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Scale::from((5, 5, 3, 2))), "[5, 5, 3, 2]");
    }

    #[test]
    fn test_batch_dims_order() {
        let b = BatchDims::from_scale(&Scale::from((7, 5, 3, 2))).unwrap();
        assert_eq!(b.width, 7);
        assert_eq!(b.height, 5);
        assert_eq!(b.num_feature_maps, 3);
        assert_eq!(b.num_images, 2);
        assert_eq!(b.to_scale(), Scale::from((7, 5, 3, 2)));
    }

    #[test]
    fn test_filter_dims_rejects_wrong_rank() {
        let err = FilterDims::from_scale(&Scale::from((3, 3))).unwrap_err();
        assert!(matches!(
            err,
            Error::RankMismatch {
                expected: 4,
                got: 2,
                ..
            }
        ));
    }
}
