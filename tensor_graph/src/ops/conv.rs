use ndarray::{Array4, ArrayView3, ArrayView4, Axis, parallel::prelude::*};

use super::{Padding, Window};
use crate::Result;

/// Spatial geometry shared by both convolution kinds.
struct Geometry {
    rows: Window,
    cols: Window,
    stride: usize,
    h: usize,
    w: usize,
}

impl Geometry {
    fn new(
        op: &'static str,
        (h, w): (usize, usize),
        kernel: usize,
        stride: usize,
        padding: Padding,
    ) -> Result<Self> {
        Ok(Self {
            rows: Window::new(op, h, kernel, stride, padding)?,
            cols: Window::new(op, w, kernel, stride, padding)?,
            stride,
            h,
            w,
        })
    }

    /// Calls `f(out_y, out_x, in_y, in_x, k_y, k_x)` for every kernel tap that lands inside the
    /// input.
    fn for_each_tap<F>(&self, kernel: usize, mut f: F)
    where
        F: FnMut(usize, usize, usize, usize, usize, usize),
    {
        for oy in 0..self.rows.out {
            for ky in 0..kernel {
                let Some(iy) = self.rows.source(oy, ky, self.stride, self.h) else {
                    continue;
                };

                for ox in 0..self.cols.out {
                    for kx in 0..kernel {
                        if let Some(ix) = self.cols.source(ox, kx, self.stride, self.w) {
                            f(oy, ox, iy, ix, ky, kx);
                        }
                    }
                }
            }
        }
    }
}

/// Standard convolution over an NHWC input.
///
/// # Arguments
/// * `x` - The input, `[n, h, w, cin]`.
/// * `weights` - The filters, `[k, k, cin, cout]`.
/// * `stride` - The stride on both spatial axes.
/// * `padding` - The border policy.
pub(crate) fn conv2d(
    x: ArrayView4<f32>,
    weights: ArrayView4<f32>,
    stride: usize,
    padding: Padding,
) -> Result<Array4<f32>> {
    let (n, h, w, cin) = x.dim();
    let (kernel, _, _, cout) = weights.dim();
    let geometry = Geometry::new("conv2d", (h, w), kernel, stride, padding)?;

    let mut out = Array4::zeros((n, geometry.rows.out, geometry.cols.out, cout));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(x.axis_iter(Axis(0)))
        .for_each(|(mut out, x)| {
            geometry.for_each_tap(kernel, |oy, ox, iy, ix, ky, kx| {
                for ci in 0..cin {
                    let v = x[[iy, ix, ci]];
                    for co in 0..cout {
                        out[[oy, ox, co]] += v * weights[[ky, kx, ci, co]];
                    }
                }
            });
        });

    Ok(out)
}

/// Depthwise convolution with a channel multiplier of one.
///
/// # Arguments
/// * `x` - The input, `[n, h, w, c]`.
/// * `weights` - One filter per channel, `[k, k, c]`.
/// * `stride` - The stride on both spatial axes.
/// * `padding` - The border policy.
pub(crate) fn depthwise_conv2d(
    x: ArrayView4<f32>,
    weights: ArrayView3<f32>,
    stride: usize,
    padding: Padding,
) -> Result<Array4<f32>> {
    let (n, h, w, c) = x.dim();
    let kernel = weights.dim().0;
    let geometry = Geometry::new("depthwise_conv2d", (h, w), kernel, stride, padding)?;

    let mut out = Array4::zeros((n, geometry.rows.out, geometry.cols.out, c));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(x.axis_iter(Axis(0)))
        .for_each(|(mut out, x)| {
            geometry.for_each_tap(kernel, |oy, ox, iy, ix, ky, kx| {
                for ch in 0..c {
                    out[[oy, ox, ch]] += x[[iy, ix, ch]] * weights[[ky, kx, ch]];
                }
            });
        });

    Ok(out)
}

#[cfg(test)]
mod tests {
    use ndarray::{Array, Array3};

    use super::*;

    #[test]
    fn pointwise_identity() {
        let x = Array::from_shape_fn((1, 3, 3, 2), |(_, i, j, c)| (i * 3 + j) as f32 + c as f32);
        let mut weights = Array4::zeros((1, 1, 2, 2));
        weights[[0, 0, 0, 0]] = 1.;
        weights[[0, 0, 1, 1]] = 1.;

        let out = conv2d(x.view(), weights.view(), 1, Padding::Same).unwrap();
        assert_eq!(out, x);
    }

    #[test]
    fn same_padding_sums_neighbourhood() {
        let x = Array4::ones((1, 3, 3, 1));
        let weights = Array4::ones((3, 3, 1, 1));

        let out = conv2d(x.view(), weights.view(), 1, Padding::Same).unwrap();
        assert_eq!(out.dim(), (1, 3, 3, 1));
        assert_eq!(out[[0, 1, 1, 0]], 9.);
        assert_eq!(out[[0, 0, 0, 0]], 4.);
        assert_eq!(out[[0, 0, 1, 0]], 6.);
    }

    #[test]
    fn strided_output_shape() {
        let x = Array4::ones((2, 7, 5, 3));
        let weights = Array4::ones((3, 3, 3, 4));

        let out = conv2d(x.view(), weights.view(), 2, Padding::Same).unwrap();
        assert_eq!(out.dim(), (2, 4, 3, 4));
    }

    #[test]
    fn depthwise_keeps_channels_apart() {
        let x = Array::from_shape_fn((1, 2, 2, 2), |(_, _, _, c)| (c + 1) as f32);
        let weights = Array3::ones((1, 1, 2));

        let out = depthwise_conv2d(x.view(), weights.view(), 1, Padding::Valid).unwrap();
        assert_eq!(out, x);

        let weights = Array3::ones((2, 2, 2));
        let out = depthwise_conv2d(x.view(), weights.view(), 1, Padding::Valid).unwrap();
        assert_eq!(out.dim(), (1, 1, 1, 2));
        assert_eq!(out[[0, 0, 0, 0]], 4.);
        assert_eq!(out[[0, 0, 0, 1]], 8.);
    }
}
