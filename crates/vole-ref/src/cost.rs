// Simulated algorithm costs for profiling nodes
//
// The reference engine has no kernels to time, so a profiling node is
// answered from a deterministic model of the problem instead:
//
//   time_ms = MACs / 1e6 * relative_cost + LAUNCH_MS
//   memory  = workspace elements * dtype size
//
// MACs counts one multiply-accumulate per output element per filter tap.
//
// SUPPORT RULES:
//
//   FFT, FFT tiling   stride 1 in both directions
//   Winograd          3x3 filter and stride 1
//   everything else   always
//
// Results list usable algorithms first by ascending time, then the rest in
// declaration order.

use std::fmt;

use vole_core::{
    AlgoProfResult, AlgoStatus, BatchDims, ConvBwdDataAlgo, ConvBwdFilterAlgo, ConvFwdAlgo,
    ConvGeometry, FilterDims, Result, Scale,
};

use crate::config::RefEngineConfig;

const LAUNCH_MS: f32 = 0.01;
const FFT_TILE: usize = 32;

/// The convolution a profiling node is asked about, in forward terms:
/// `input` convolved with `filter` gives `output`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Problem {
    pub input: BatchDims,
    pub filter: FilterDims,
    pub output: BatchDims,
    pub geometry: ConvGeometry,
}

impl Problem {
    /// From a forward profiling node: inputs `src, filter`, output `top`.
    pub fn forward(src: &Scale, filter: &Scale, top: &Scale, geometry: ConvGeometry) -> Result<Self> {
        Ok(Self {
            input: BatchDims::from_scale(src)?,
            filter: FilterDims::from_scale(filter)?,
            output: BatchDims::from_scale(top)?,
            geometry,
        })
    }

    /// From a backward-filter profiling node: inputs `top, bottom`, output
    /// shaped like the filter.
    pub fn backward_filter(
        top: &Scale,
        bottom: &Scale,
        filter: &Scale,
        geometry: ConvGeometry,
    ) -> Result<Self> {
        Self::forward(bottom, filter, top, geometry)
    }

    /// From a backward-data profiling node: inputs `top, filter`, output
    /// shaped like the bottom.
    pub fn backward_data(
        top: &Scale,
        filter: &Scale,
        bottom: &Scale,
        geometry: ConvGeometry,
    ) -> Result<Self> {
        Self::forward(bottom, filter, top, geometry)
    }

    fn macs(&self) -> u64 {
        let out = &self.output;
        let f = &self.filter;
        [
            out.width,
            out.height,
            out.num_feature_maps,
            out.num_images,
            f.width,
            f.height,
            f.num_inputs,
        ]
        .iter()
        .fold(1u64, |acc, &d| acc.saturating_mul(d as u64))
    }

    fn stride_one(&self) -> bool {
        self.geometry.stride_vertical == 1 && self.geometry.stride_horizontal == 1
    }

    fn is_3x3(&self) -> bool {
        self.filter.width == 3 && self.filter.height == 3
    }

    /// Complex spectra of the padded input and output planes.
    fn fft_elements(&self) -> usize {
        let g = &self.geometry;
        let w = self.input.width.saturating_add(g.pad_width.saturating_mul(2));
        let h = self.input.height.saturating_add(g.pad_height.saturating_mul(2));
        let channels = self
            .input
            .num_feature_maps
            .saturating_add(self.output.num_feature_maps);
        product(&[2, w, h, channels, self.input.num_images])
    }

    fn fft_tile_elements(&self) -> usize {
        let channels = self
            .input
            .num_feature_maps
            .saturating_add(self.output.num_feature_maps);
        product(&[2, FFT_TILE, FFT_TILE, channels])
    }

    /// Unfolded input patches, one column per output pixel.
    fn im2col_elements(&self) -> usize {
        product(&[
            self.output.width,
            self.output.height,
            self.output.num_images,
            self.filter.width,
            self.filter.height,
            self.filter.num_inputs,
        ])
    }

    /// Transformed 4x4 filter tiles.
    fn winograd_elements(&self) -> usize {
        product(&[16, self.filter.num_inputs, self.filter.num_outputs])
    }

    fn estimate_ms(&self, relative_cost: f32) -> f32 {
        self.macs() as f32 / 1.0e6 * relative_cost + LAUNCH_MS
    }
}

/// An algorithm selector the cost model knows how to price.
pub(crate) trait Candidate: Copy + fmt::Debug {
    /// Time multiplier relative to a plain GEMM.
    fn relative_cost(self) -> f32;
    fn supports(self, problem: &Problem) -> bool;
    fn workspace_elements(self, problem: &Problem) -> usize;
}

impl Candidate for ConvFwdAlgo {
    fn relative_cost(self) -> f32 {
        match self {
            ConvFwdAlgo::ImplicitGemm => 1.0,
            ConvFwdAlgo::ImplicitPrecompGemm => 0.85,
            ConvFwdAlgo::Gemm => 0.7,
            ConvFwdAlgo::Direct => 1.6,
            ConvFwdAlgo::Fft => 0.5,
            ConvFwdAlgo::FftTiling => 0.6,
            ConvFwdAlgo::Winograd => 0.4,
        }
    }

    fn supports(self, problem: &Problem) -> bool {
        match self {
            ConvFwdAlgo::Fft | ConvFwdAlgo::FftTiling => problem.stride_one(),
            ConvFwdAlgo::Winograd => problem.stride_one() && problem.is_3x3(),
            _ => true,
        }
    }

    fn workspace_elements(self, problem: &Problem) -> usize {
        match self {
            ConvFwdAlgo::ImplicitGemm | ConvFwdAlgo::Direct => 0,
            ConvFwdAlgo::ImplicitPrecompGemm => {
                product(&[problem.output.width, problem.output.height])
            }
            ConvFwdAlgo::Gemm => problem.im2col_elements(),
            ConvFwdAlgo::Fft => problem.fft_elements(),
            ConvFwdAlgo::FftTiling => problem.fft_tile_elements(),
            ConvFwdAlgo::Winograd => problem.winograd_elements(),
        }
    }
}

impl Candidate for ConvBwdDataAlgo {
    fn relative_cost(self) -> f32 {
        match self {
            ConvBwdDataAlgo::Algo0 => 1.2,
            ConvBwdDataAlgo::Algo1 => 0.9,
            ConvBwdDataAlgo::Fft => 0.55,
            ConvBwdDataAlgo::FftTiling => 0.65,
            ConvBwdDataAlgo::Winograd => 0.45,
        }
    }

    fn supports(self, problem: &Problem) -> bool {
        match self {
            ConvBwdDataAlgo::Fft | ConvBwdDataAlgo::FftTiling => problem.stride_one(),
            ConvBwdDataAlgo::Winograd => problem.stride_one() && problem.is_3x3(),
            _ => true,
        }
    }

    fn workspace_elements(self, problem: &Problem) -> usize {
        match self {
            ConvBwdDataAlgo::Algo0 | ConvBwdDataAlgo::Algo1 => 0,
            ConvBwdDataAlgo::Fft => problem.fft_elements(),
            ConvBwdDataAlgo::FftTiling => problem.fft_tile_elements(),
            ConvBwdDataAlgo::Winograd => problem.winograd_elements(),
        }
    }
}

impl Candidate for ConvBwdFilterAlgo {
    fn relative_cost(self) -> f32 {
        match self {
            ConvBwdFilterAlgo::Algo0 => 1.3,
            ConvBwdFilterAlgo::Algo1 => 0.95,
            ConvBwdFilterAlgo::Fft => 0.6,
            ConvBwdFilterAlgo::Algo3 => 1.1,
        }
    }

    fn supports(self, problem: &Problem) -> bool {
        match self {
            ConvBwdFilterAlgo::Fft => problem.stride_one(),
            _ => true,
        }
    }

    fn workspace_elements(self, problem: &Problem) -> usize {
        match self {
            ConvBwdFilterAlgo::Algo0 => 0,
            ConvBwdFilterAlgo::Algo1 | ConvBwdFilterAlgo::Algo3 => {
                product(&[
                    problem.filter.width,
                    problem.filter.height,
                    problem.filter.num_inputs,
                ])
            }
            ConvBwdFilterAlgo::Fft => problem.fft_elements(),
        }
    }
}

/// Price every candidate for `problem` and rank the results.
pub(crate) fn rank<A: Candidate>(
    candidates: &[A],
    problem: &Problem,
    config: &RefEngineConfig,
) -> Vec<AlgoProfResult<A>> {
    let elem = config.dtype.size_in_bytes();
    let mut results: Vec<AlgoProfResult<A>> = candidates
        .iter()
        .map(|&algo| price(algo, problem, config.workspace_limit, elem))
        .collect();
    results.sort_by(|a, b| {
        (!a.is_usable())
            .cmp(&!b.is_usable())
            .then(a.time_ms.total_cmp(&b.time_ms))
    });
    results
}

fn price<A: Candidate>(
    algo: A,
    problem: &Problem,
    workspace_limit: Option<usize>,
    elem: usize,
) -> AlgoProfResult<A> {
    if !algo.supports(problem) {
        return AlgoProfResult {
            algo,
            status: AlgoStatus::NotSupported,
            time_ms: f32::INFINITY,
            memory: 0,
        };
    }

    let memory = algo.workspace_elements(problem).saturating_mul(elem);
    // usize::MAX marks a size that saturated while being computed.
    let over_limit = workspace_limit.map_or(false, |limit| memory > limit);
    if memory == usize::MAX || over_limit {
        tracing::warn!(
            ?algo,
            memory,
            limit = ?workspace_limit,
            "algorithm workspace cannot be allocated"
        );
        return AlgoProfResult {
            algo,
            status: AlgoStatus::AllocFailed,
            time_ms: f32::INFINITY,
            memory,
        };
    }

    AlgoProfResult {
        algo,
        status: AlgoStatus::Success,
        time_ms: problem.estimate_ms(algo.relative_cost()),
        memory,
    }
}

/// Element count of a workspace, pinned at `usize::MAX` when it does not fit.
fn product(dims: &[usize]) -> usize {
    dims.iter().fold(1usize, |acc, &d| acc.saturating_mul(d))
}
