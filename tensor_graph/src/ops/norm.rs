use ndarray::{ArrayD, ArrayView1, ArrayViewD, Axis};

use crate::{GraphErr, Result};

/// Batch normalization over every axis but the last one, using the statistics of the batch.
///
/// # Arguments
/// * `x` - The input, channels last.
/// * `gamma` - The per channel scale.
/// * `beta` - The per channel shift.
/// * `eps` - Added to the variance before taking its root.
pub(crate) fn batch_norm(
    x: ArrayViewD<f32>,
    gamma: ArrayView1<f32>,
    beta: ArrayView1<f32>,
    eps: f32,
) -> Result<ArrayD<f32>> {
    let shape = x.shape().to_vec();
    let c = shape.last().copied().unwrap_or_default();
    if c == 0 {
        return Err(GraphErr::ZeroDim {
            op: "batch_norm",
            what: "channel count",
        });
    }

    let rows = x.len() / c;
    let x = x
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order((rows, c))?;

    let mean = x.mean_axis(Axis(0)).ok_or(GraphErr::ZeroDim {
        op: "batch_norm",
        what: "batch",
    })?;
    let var = x.var_axis(Axis(0), 0.);
    let scale = (var + eps).mapv_into(f32::sqrt);

    let y = (x - &mean) / &scale * &gamma + &beta;
    Ok(y.into_shape_with_order(shape)?)
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, array};

    use super::*;

    #[test]
    fn normalizes_each_channel() {
        let x = array![[1., 10.], [3., 30.]].into_dyn();
        let gamma = Array1::ones(2);
        let beta = Array1::zeros(2);

        let y = batch_norm(x.view(), gamma.view(), beta.view(), 0.).unwrap();
        assert_eq!(y.shape(), &[2, 2]);

        for (got, expected) in y.iter().zip([-1., -1., 1., 1.]) {
            assert!((got - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn constant_input_collapses_to_beta() {
        let x = ArrayD::from_elem(vec![1, 2, 2, 3], 5.);
        let gamma = Array1::from_elem(3, 2.);
        let beta = Array1::from_vec(vec![0.5, -0.5, 1.]);

        let y = batch_norm(x.view(), gamma.view(), beta.view(), 1e-3).unwrap();
        assert_eq!(y.shape(), &[1, 2, 2, 3]);
        assert!((y[[0, 1, 1, 2]] - 1.).abs() < 1e-6);
        assert!((y[[0, 0, 1, 1]] + 0.5).abs() < 1e-6);
    }
}
