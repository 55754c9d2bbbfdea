mod act;
mod conv;
mod dense;
mod norm;
mod pool;
mod window;

pub use act::ActFn;
pub use window::Padding;

pub(crate) use conv::{conv2d, depthwise_conv2d};
pub(crate) use dense::dense;
pub(crate) use norm::batch_norm;
pub(crate) use pool::{flatten, reduce_mean};
pub(crate) use window::Window;

use crate::{GraphErr, Result};

/// The epsilon every batch norm op is created with.
pub const BATCH_NORM_EPS: f32 = 1e-3;

/// The operation a graph node performs on its input.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Placeholder,
    Conv2d {
        filters: usize,
        kernel: usize,
        stride: usize,
        padding: Padding,
    },
    DepthwiseConv2d {
        kernel: usize,
        stride: usize,
        padding: Padding,
    },
    BatchNorm {
        eps: f32,
    },
    Activation(ActFn),
    ReduceMean {
        axes: Vec<usize>,
        keep_dims: bool,
    },
    Flatten,
    Dense {
        units: usize,
    },
}

impl Op {
    /// A short name for the kind of op, used in errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Op::Placeholder => "placeholder",
            Op::Conv2d { .. } => "conv2d",
            Op::DepthwiseConv2d { .. } => "depthwise_conv2d",
            Op::BatchNorm { .. } => "batch_norm",
            Op::Activation(_) => "activation",
            Op::ReduceMean { .. } => "reduce_mean",
            Op::Flatten => "flatten",
            Op::Dense { .. } => "dense",
        }
    }

    /// Infers the output shape of this op given its input shape.
    ///
    /// # Returns
    /// The output shape or an error if the input or the op's attributes are invalid.
    pub fn infer(&self, input: &[usize]) -> Result<Vec<usize>> {
        let op = self.kind();
        if self.checked_size(input).is_none() {
            return Err(GraphErr::ParamOverflow { op });
        }

        match *self {
            Op::Placeholder => Ok(input.to_vec()),
            Op::Conv2d {
                filters,
                kernel,
                stride,
                padding,
            } => {
                let [n, h, w, _] = nhwc(op, input)?;
                if filters == 0 {
                    return Err(GraphErr::ZeroDim { op, what: "filter count" });
                }

                let rows = Window::new(op, h, kernel, stride, padding)?;
                let cols = Window::new(op, w, kernel, stride, padding)?;
                Ok(vec![n, rows.out, cols.out, filters])
            }
            Op::DepthwiseConv2d {
                kernel,
                stride,
                padding,
            } => {
                let [n, h, w, c] = nhwc(op, input)?;
                let rows = Window::new(op, h, kernel, stride, padding)?;
                let cols = Window::new(op, w, kernel, stride, padding)?;
                Ok(vec![n, rows.out, cols.out, c])
            }
            Op::BatchNorm { .. } | Op::Activation(_) => Ok(input.to_vec()),
            Op::ReduceMean {
                ref axes,
                keep_dims,
            } => {
                let rank = input.len();
                if let Some(&axis) = axes.iter().find(|&&axis| axis >= rank) {
                    return Err(GraphErr::InvalidAxis { op, axis, rank });
                }

                let shape = input
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &d)| match axes.contains(&i) {
                        true if keep_dims => Some(1),
                        true => None,
                        false => Some(d),
                    })
                    .collect();

                Ok(shape)
            }
            Op::Flatten => match input.split_first() {
                Some((&n, rest)) => Ok(vec![n, rest.iter().product()]),
                None => Err(GraphErr::RankMismatch {
                    op,
                    got: 0,
                    expected: 1,
                }),
            },
            Op::Dense { units } => {
                if input.len() != 2 {
                    return Err(GraphErr::RankMismatch {
                        op,
                        got: input.len(),
                        expected: 2,
                    });
                }
                if units == 0 {
                    return Err(GraphErr::ZeroDim { op, what: "unit count" });
                }

                Ok(vec![input[0], units])
            }
        }
    }

    /// Returns the amount of parameters this op owns given its input shape.
    ///
    /// Saturates at `usize::MAX`, ops whose count overflows are rejected by [`Op::infer`].
    pub fn size(&self, input: &[usize]) -> usize {
        self.checked_size(input).unwrap_or(usize::MAX)
    }

    /// Returns the amount of parameters this op owns, `None` if it doesn't fit in a `usize`.
    pub fn checked_size(&self, input: &[usize]) -> Option<usize> {
        let channels = input.last().copied().unwrap_or_default();

        match *self {
            Op::Conv2d {
                filters, kernel, ..
            } => kernel
                .checked_mul(kernel)?
                .checked_mul(channels)?
                .checked_mul(filters),
            Op::DepthwiseConv2d { kernel, .. } => {
                kernel.checked_mul(kernel)?.checked_mul(channels)
            }
            Op::BatchNorm { .. } => channels.checked_mul(2),
            Op::Dense { units } => channels.checked_add(1)?.checked_mul(units),
            _ => Some(0),
        }
    }
}

fn nhwc(op: &'static str, shape: &[usize]) -> Result<[usize; 4]> {
    shape.try_into().map_err(|_| GraphErr::RankMismatch {
        op,
        got: shape.len(),
        expected: 4,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conv_shapes() {
        let conv = Op::Conv2d {
            filters: 32,
            kernel: 3,
            stride: 2,
            padding: Padding::Same,
        };

        assert_eq!(conv.infer(&[1, 224, 224, 3]).unwrap(), [1, 112, 112, 32]);
        assert_eq!(conv.size(&[1, 224, 224, 3]), 3 * 3 * 3 * 32);
        assert!(matches!(
            conv.infer(&[224, 224, 3]),
            Err(GraphErr::RankMismatch { expected: 4, .. })
        ));
    }

    #[test]
    fn depthwise_preserves_channels() {
        let dw = Op::DepthwiseConv2d {
            kernel: 5,
            stride: 2,
            padding: Padding::Same,
        };

        assert_eq!(dw.infer(&[1, 56, 56, 128]).unwrap(), [1, 28, 28, 128]);
        assert_eq!(dw.size(&[1, 56, 56, 128]), 5 * 5 * 128);
    }

    #[test]
    fn reduce_mean_shapes() {
        let keep = Op::ReduceMean {
            axes: vec![1, 2],
            keep_dims: true,
        };
        let drop = Op::ReduceMean {
            axes: vec![1, 2],
            keep_dims: false,
        };

        assert_eq!(keep.infer(&[1, 7, 7, 1024]).unwrap(), [1, 1, 1, 1024]);
        assert_eq!(drop.infer(&[1, 7, 7, 1024]).unwrap(), [1, 1024]);
        assert!(matches!(
            keep.infer(&[1, 1024]),
            Err(GraphErr::InvalidAxis { axis: 2, rank: 2, .. })
        ));
    }

    #[test]
    fn dense_needs_flat_input_and_units() {
        assert_eq!(Op::Dense { units: 10 }.infer(&[1, 64]).unwrap(), [1, 10]);
        assert_eq!(Op::Dense { units: 10 }.size(&[1, 64]), 650);
        assert!(Op::Dense { units: 10 }.infer(&[1, 1, 1, 64]).is_err());
        assert!(matches!(
            Op::Dense { units: 0 }.infer(&[1, 64]),
            Err(GraphErr::ZeroDim { .. })
        ));
    }

    #[test]
    fn oversized_kernels_overflow_into_an_error() {
        let conv = Op::Conv2d {
            filters: 32,
            kernel: usize::MAX / 2,
            stride: 2,
            padding: Padding::Same,
        };
        let dw = Op::DepthwiseConv2d {
            kernel: 1 << 40,
            stride: 1,
            padding: Padding::Same,
        };

        assert_eq!(conv.checked_size(&[1, 224, 224, 3]), None);
        assert_eq!(conv.size(&[1, 224, 224, 3]), usize::MAX);
        assert!(matches!(
            conv.infer(&[1, 224, 224, 3]),
            Err(GraphErr::ParamOverflow { op: "conv2d" })
        ));
        assert!(matches!(
            dw.infer(&[1, 112, 112, 32]),
            Err(GraphErr::ParamOverflow { op: "depthwise_conv2d" })
        ));
    }

    #[test]
    fn flatten_collapses_tail() {
        assert_eq!(Op::Flatten.infer(&[2, 1, 1, 8]).unwrap(), [2, 8]);
    }
}
