use crate::engine::TensorHandle;
use crate::error::Result;
use crate::scale::{BatchDims, FilterDims, Scale};

// ImageBatch / Filter — typed views over engine handles
//
// An engine handle only knows its Scale. These wrappers read that Scale with
// the meaning the convolution operators expect:
//
//   ImageBatch: [width, height, num_feature_maps, num_images]
//   Filter:     [width, height, num_inputs, num_outputs]
//
// The rank is checked once, when the view is built; after that the accessors
// are infallible. Views never read or write tensor contents. Cloning one
// clones the handle, which the engine keeps pointing at the same node.

/// A 4-D batch of images (or feature maps) held by the engine.
#[derive(Debug, Clone)]
pub struct ImageBatch<H> {
    handle: H,
    dims: BatchDims,
}

impl<H: TensorHandle> ImageBatch<H> {
    /// View `handle` as an image batch. Fails unless its shape is 4-D.
    pub fn new(handle: H) -> Result<Self> {
        let dims = BatchDims::from_scale(handle.shape())?;
        Ok(Self { handle, dims })
    }

    /// Wrap a handle whose shape was produced by this crate's shape algebra.
    pub(crate) fn from_parts(handle: H, dims: BatchDims) -> Self {
        Self { handle, dims }
    }

    pub fn width(&self) -> usize {
        self.dims.width
    }

    pub fn height(&self) -> usize {
        self.dims.height
    }

    pub fn num_feature_maps(&self) -> usize {
        self.dims.num_feature_maps
    }

    pub fn num_images(&self) -> usize {
        self.dims.num_images
    }

    pub fn dims(&self) -> &BatchDims {
        &self.dims
    }

    pub fn shape(&self) -> &Scale {
        self.handle.shape()
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn into_handle(self) -> H {
        self.handle
    }
}

/// A 4-D bank of convolution filters held by the engine.
#[derive(Debug, Clone)]
pub struct Filter<H> {
    handle: H,
    dims: FilterDims,
}

impl<H: TensorHandle> Filter<H> {
    /// View `handle` as a filter bank. Fails unless its shape is 4-D.
    pub fn new(handle: H) -> Result<Self> {
        let dims = FilterDims::from_scale(handle.shape())?;
        Ok(Self { handle, dims })
    }

    pub(crate) fn from_parts(handle: H, dims: FilterDims) -> Self {
        Self { handle, dims }
    }

    pub fn width(&self) -> usize {
        self.dims.width
    }

    pub fn height(&self) -> usize {
        self.dims.height
    }

    pub fn num_inputs(&self) -> usize {
        self.dims.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.dims.num_outputs
    }

    pub fn dims(&self) -> &FilterDims {
        &self.dims
    }

    pub fn shape(&self) -> &Scale {
        self.handle.shape()
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn into_handle(self) -> H {
        self.handle
    }
}
