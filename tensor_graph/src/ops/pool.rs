use ndarray::{ArrayD, ArrayViewD, Axis};

use crate::{GraphErr, Result};

/// Averages `x` over `axes`, which must be sorted and unique.
pub(crate) fn reduce_mean(
    x: ArrayViewD<f32>,
    axes: &[usize],
    keep_dims: bool,
) -> Result<ArrayD<f32>> {
    let mut y = x.to_owned();

    for &axis in axes.iter().rev() {
        y = y.mean_axis(Axis(axis)).ok_or(GraphErr::ZeroDim {
            op: "reduce_mean",
            what: "reduced axis",
        })?;

        if keep_dims {
            y = y.insert_axis(Axis(axis));
        }
    }

    Ok(y)
}

/// Collapses every axis but the first.
pub(crate) fn flatten(x: ArrayViewD<f32>) -> Result<ArrayD<f32>> {
    let n = x.shape().first().copied().unwrap_or(1);
    let rest = if n == 0 { 0 } else { x.len() / n };

    Ok(x
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order(vec![n, rest])?)
}

#[cfg(test)]
mod tests {
    use ndarray::Array;

    use super::*;

    #[test]
    fn global_average_keeps_dims() {
        let x = Array::from_shape_fn((1, 2, 2, 2), |(_, i, j, c)| {
            (i * 2 + j) as f32 * (c + 1) as f32
        })
        .into_dyn();

        let y = reduce_mean(x.view(), &[1, 2], true).unwrap();
        assert_eq!(y.shape(), &[1, 1, 1, 2]);
        assert_eq!(y[[0, 0, 0, 0]], 1.5);
        assert_eq!(y[[0, 0, 0, 1]], 3.);
    }

    #[test]
    fn reduce_without_keep_dims() {
        let x = ArrayD::from_elem(vec![2, 3, 4], 1.);
        let y = reduce_mean(x.view(), &[1, 2], false).unwrap();
        assert_eq!(y.shape(), &[2]);
    }

    #[test]
    fn flatten_keeps_batch() {
        let x = ArrayD::from_elem(vec![2, 1, 1, 8], 0.);
        let y = flatten(x.view()).unwrap();
        assert_eq!(y.shape(), &[2, 8]);
    }
}
