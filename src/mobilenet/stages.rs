use log::debug;
use rand::Rng;

use crate::{
    ArchErr, Result,
    configs::ArchConfig,
    sampling::{pad_stages, sample_channel_multipliers, sample_kernel_sizes},
};

/// Output channels of the stem followed by the pointwise convolution of every block.
pub const BASE_CHANNELS: [usize; 14] = [
    32, 64, 128, 128, 256, 256, 512, 512, 512, 512, 512, 512, 1024, 1024,
];

/// Kernel size of the depthwise convolution of every block, the first one is shared with the stem.
pub const BASE_KERNELS: [usize; 13] = [3; 13];

/// Blocks per stage.
pub const REPEATS: [usize; 5] = [1, 2, 2, 6, 2];

/// Stride of the first block of each stage.
pub const STRIDES: [usize; 5] = [1, 2, 2, 2, 2];

/// One depthwise + pointwise block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub stride: usize,
    pub first: bool,
}

impl Block {
    /// The stride of the block's depthwise convolution.
    pub fn depthwise_stride(&self) -> usize {
        if self.first { self.stride } else { 1 }
    }
}

/// Flattens the repeat and stride schedule into one entry per block.
pub fn block_schedule() -> Vec<Block> {
    REPEATS
        .iter()
        .zip(STRIDES)
        .flat_map(|(&repeats, stride)| {
            (0..repeats).map(move |j| Block {
                stride,
                first: j == 0,
            })
        })
        .collect()
}

/// The concrete per stage channels and kernel sizes of one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    pub channels: Vec<usize>,
    pub kernels: Vec<usize>,
}

impl StagePlan {
    pub fn baseline() -> Self {
        Self {
            channels: BASE_CHANNELS.to_vec(),
            kernels: BASE_KERNELS.to_vec(),
        }
    }

    /// Resolves the plan of `cfg`: the baseline, or a draw from its sample space when
    /// `cfg.sample` is set.
    ///
    /// Sampled lists that come up short are padded with a multiplier of 1 and a kernel size
    /// of 3.
    pub fn from_config<R: Rng + ?Sized>(cfg: &ArchConfig, rng: &mut R) -> Self {
        let space = &cfg.sample_space;
        let mut multipliers =
            sample_channel_multipliers(&space.channel, BASE_CHANNELS.len(), rng);
        let mut kernels = sample_kernel_sizes(&space.kernelsize, BASE_KERNELS.len(), rng);

        if !cfg.sample {
            return Self::baseline();
        }

        pad_stages(&mut multipliers, BASE_CHANNELS.len(), 1.);
        pad_stages(&mut kernels, BASE_KERNELS.len(), 3);
        debug!("sampled multipliers {multipliers:?} and kernel sizes {kernels:?}");

        let channels = BASE_CHANNELS
            .iter()
            .zip(&multipliers)
            .map(|(&base, &m)| (base as f32 * m).round() as usize)
            .collect();

        Self { channels, kernels }
    }

    /// The channel count after stage `index`.
    pub fn channel(&self, index: usize) -> Result<usize> {
        self.channels
            .get(index)
            .copied()
            .ok_or(ArchErr::MissingStage {
                what: "channel",
                index,
                len: self.channels.len(),
            })
    }

    /// The kernel size of stage `index`.
    pub fn kernel(&self, index: usize) -> Result<usize> {
        self.kernels
            .get(index)
            .copied()
            .ok_or(ArchErr::MissingStage {
                what: "kernel size",
                index,
                len: self.kernels.len(),
            })
    }

    /// A readable identity of the plan, kernel sizes then channels, e.g. `3_3_5-32_64_128`.
    pub fn signature(&self) -> String {
        format!("{}-{}", join(&self.kernels), join(&self.channels))
    }
}

fn join(values: &[usize]) -> String {
    values
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join("_")
}
