use ndarray::{Array2, ArrayView1, ArrayView2};

/// A fully connected projection, `x · w + b`.
///
/// # Arguments
/// * `x` - The input, `[n, cin]`.
/// * `weights` - `[cin, units]`.
/// * `biases` - `[units]`.
pub(crate) fn dense(
    x: ArrayView2<f32>,
    weights: ArrayView2<f32>,
    biases: ArrayView1<f32>,
) -> Array2<f32> {
    x.dot(&weights) + &biases
}
