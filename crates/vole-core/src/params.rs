// Operator parameters and algorithm selectors
//
// Callers describe an operator with plain values: ConvInfo for the three
// convolution passes, PoolingInfo for pooling, LrnParams for local response
// normalization. Algorithm selectors are opaque to the core. The engine
// interprets them when it runs the kernel, and the profiler reports them back
// in its results.
//
// All parameter types are Copy values, owned by the calling frame until they
// are packed into a descriptor.

/// Forward convolution kernel strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConvFwdAlgo {
    #[default]
    ImplicitGemm,
    ImplicitPrecompGemm,
    Gemm,
    Direct,
    Fft,
    FftTiling,
    Winograd,
}

impl ConvFwdAlgo {
    pub const ALL: [ConvFwdAlgo; 7] = [
        ConvFwdAlgo::ImplicitGemm,
        ConvFwdAlgo::ImplicitPrecompGemm,
        ConvFwdAlgo::Gemm,
        ConvFwdAlgo::Direct,
        ConvFwdAlgo::Fft,
        ConvFwdAlgo::FftTiling,
        ConvFwdAlgo::Winograd,
    ];
}

/// Backward-data convolution kernel strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConvBwdDataAlgo {
    #[default]
    Algo0,
    Algo1,
    Fft,
    FftTiling,
    Winograd,
}

impl ConvBwdDataAlgo {
    pub const ALL: [ConvBwdDataAlgo; 5] = [
        ConvBwdDataAlgo::Algo0,
        ConvBwdDataAlgo::Algo1,
        ConvBwdDataAlgo::Fft,
        ConvBwdDataAlgo::FftTiling,
        ConvBwdDataAlgo::Winograd,
    ];
}

/// Backward-filter convolution kernel strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConvBwdFilterAlgo {
    #[default]
    Algo0,
    Algo1,
    Fft,
    Algo3,
}

impl ConvBwdFilterAlgo {
    pub const ALL: [ConvBwdFilterAlgo; 4] = [
        ConvBwdFilterAlgo::Algo0,
        ConvBwdFilterAlgo::Algo1,
        ConvBwdFilterAlgo::Fft,
        ConvBwdFilterAlgo::Algo3,
    ];
}

/// Softmax normalization axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoftmaxAlgorithm {
    /// Normalize over all of an image's values.
    Instance,
    /// Normalize across channels at each spatial position.
    Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationAlgorithm {
    Sigmoid,
    Relu,
    Tanh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolingAlgorithm {
    Max,
    Average,
}

// Convolution

/// Padding and stride shared by every convolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConvGeometry {
    pub pad_height: usize,
    pub pad_width: usize,
    pub stride_vertical: usize,
    pub stride_horizontal: usize,
}

impl Default for ConvGeometry {
    fn default() -> Self {
        Self {
            pad_height: 0,
            pad_width: 0,
            stride_vertical: 1,
            stride_horizontal: 1,
        }
    }
}

/// Convolution configuration: geometry plus the algorithm chosen for each pass.
///
/// # Example
/// ```
/// use vole_core::params::{ConvFwdAlgo, ConvInfo};
///
/// let info = ConvInfo::default()
///     .with_padding(1, 1)
///     .with_stride(2, 2)
///     .with_forward_algorithm(ConvFwdAlgo::Winograd);
/// assert_eq!(info.pad_height, 1);
/// assert_eq!(info.stride_horizontal, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConvInfo {
    pub pad_height: usize,
    pub pad_width: usize,
    pub stride_vertical: usize,
    pub stride_horizontal: usize,
    pub forward_algorithm: ConvFwdAlgo,
    pub backward_data_algorithm: ConvBwdDataAlgo,
    pub backward_filter_algorithm: ConvBwdFilterAlgo,
}

impl Default for ConvInfo {
    fn default() -> Self {
        Self {
            pad_height: 0,
            pad_width: 0,
            stride_vertical: 1,
            stride_horizontal: 1,
            forward_algorithm: ConvFwdAlgo::default(),
            backward_data_algorithm: ConvBwdDataAlgo::default(),
            backward_filter_algorithm: ConvBwdFilterAlgo::default(),
        }
    }
}

impl ConvInfo {
    /// Set zero-padding added to both sides of each spatial dimension.
    pub fn with_padding(mut self, pad_height: usize, pad_width: usize) -> Self {
        self.pad_height = pad_height;
        self.pad_width = pad_width;
        self
    }

    pub fn with_stride(mut self, stride_vertical: usize, stride_horizontal: usize) -> Self {
        self.stride_vertical = stride_vertical;
        self.stride_horizontal = stride_horizontal;
        self
    }

    pub fn with_forward_algorithm(mut self, algo: ConvFwdAlgo) -> Self {
        self.forward_algorithm = algo;
        self
    }

    pub fn with_backward_data_algorithm(mut self, algo: ConvBwdDataAlgo) -> Self {
        self.backward_data_algorithm = algo;
        self
    }

    pub fn with_backward_filter_algorithm(mut self, algo: ConvBwdFilterAlgo) -> Self {
        self.backward_filter_algorithm = algo;
        self
    }

    /// The padding and stride part of this configuration.
    pub fn geometry(&self) -> ConvGeometry {
        ConvGeometry {
            pad_height: self.pad_height,
            pad_width: self.pad_width,
            stride_vertical: self.stride_vertical,
            stride_horizontal: self.stride_horizontal,
        }
    }
}

// Pooling

/// Pooling window, stride and padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolingInfo {
    pub algorithm: PoolingAlgorithm,
    pub window_height: usize,
    pub window_width: usize,
    pub stride_vertical: usize,
    pub stride_horizontal: usize,
    pub pad_height: usize,
    pub pad_width: usize,
}

impl PoolingInfo {
    /// Unpadded pooling with a `[height, width]` window and stride.
    pub fn new(algorithm: PoolingAlgorithm, window: [usize; 2], stride: [usize; 2]) -> Self {
        Self {
            algorithm,
            window_height: window[0],
            window_width: window[1],
            stride_vertical: stride[0],
            stride_horizontal: stride[1],
            pad_height: 0,
            pad_width: 0,
        }
    }

    pub fn with_padding(mut self, pad_height: usize, pad_width: usize) -> Self {
        self.pad_height = pad_height;
        self.pad_width = pad_width;
        self
    }
}

// Local response normalization

/// Cross-channel LRN: `b = a / (k + alpha / n * sum(a^2))^beta` over
/// `local_size` neighbouring channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LrnParams {
    pub local_size: usize,
    pub alpha: f32,
    pub beta: f32,
    pub k: f32,
}

impl Default for LrnParams {
    fn default() -> Self {
        Self {
            local_size: 5,
            alpha: 1e-4,
            beta: 0.75,
            k: 2.0,
        }
    }
}

impl LrnParams {
    pub fn new(local_size: usize, alpha: f32, beta: f32, k: f32) -> Self {
        Self {
            local_size,
            alpha,
            beta,
            k,
        }
    }
}
