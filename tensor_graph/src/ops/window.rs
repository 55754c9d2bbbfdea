use crate::{GraphErr, Result};

/// How a sliding window treats the borders of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// Zero padded so that `out = ceil(in / stride)`, the smaller half of the padding goes first.
    Same,
    /// No padding, the window must fit inside the input.
    Valid,
}

/// The placement of a one dimensional window over an input axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub out: usize,
    pub pad_before: usize,
}

impl Window {
    pub fn new(
        op: &'static str,
        size: usize,
        kernel: usize,
        stride: usize,
        padding: Padding,
    ) -> Result<Self> {
        if kernel == 0 {
            return Err(GraphErr::ZeroDim { op, what: "kernel" });
        }
        if stride == 0 {
            return Err(GraphErr::ZeroDim { op, what: "stride" });
        }

        match padding {
            Padding::Same => {
                let out = size.div_ceil(stride);
                let total = ((out - 1) * stride).saturating_add(kernel).saturating_sub(size);
                Ok(Self {
                    out,
                    pad_before: total / 2,
                })
            }
            Padding::Valid if kernel > size => Err(GraphErr::KernelTooLarge { op, kernel, size }),
            Padding::Valid => Ok(Self {
                out: (size - kernel) / stride + 1,
                pad_before: 0,
            }),
        }
    }

    /// Maps an output position plus a kernel offset back to the input, `None` when it lands on
    /// padding.
    pub fn source(&self, out: usize, offset: usize, stride: usize, size: usize) -> Option<usize> {
        (out * stride + offset)
            .checked_sub(self.pad_before)
            .filter(|&i| i < size)
    }
}
