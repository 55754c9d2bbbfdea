//! Draws concrete architectural parameters from a sample space.

use rand::{Rng, seq::IndexedRandom};

use crate::configs::ChannelRange;

/// Sampled lists shorter than this are padded before use.
pub const PAD_THRESHOLD: usize = 13;

/// Draws `count` channel multipliers from `range`.
///
/// # Returns
/// `count` multipliers, or none at all if the range holds no value.
pub fn sample_channel_multipliers<R: Rng + ?Sized>(
    range: &ChannelRange,
    count: usize,
    rng: &mut R,
) -> Vec<f32> {
    let len = range.len();
    if len == 0 {
        return Vec::new();
    }

    (0..count)
        .filter_map(|_| range.get(rng.random_range(0..len)))
        .collect()
}

/// Draws `count` kernel sizes from `kernel_sizes`.
///
/// # Returns
/// `count` kernel sizes, or none at all if `kernel_sizes` is empty.
pub fn sample_kernel_sizes<R: Rng + ?Sized>(
    kernel_sizes: &[usize],
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    (0..count)
        .map_while(|_| kernel_sizes.choose(&mut *rng).copied())
        .collect()
}

/// Appends `fill` to `values` until it is `len` long, but only if it is shorter than
/// [`PAD_THRESHOLD`]. Longer lists are left as they are, even when still shorter than `len`.
pub fn pad_stages<T: Clone>(values: &mut Vec<T>, len: usize, fill: T) {
    if values.len() < PAD_THRESHOLD && values.len() < len {
        values.resize(len, fill);
    }
}
