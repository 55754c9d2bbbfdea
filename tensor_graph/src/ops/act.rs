use ndarray::ArrayD;

/// Element-wise activation functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActFn {
    Relu,
    Relu6,
    Sigmoid { amp: f32 },
}
use ActFn::*;

impl ActFn {
    pub fn sigmoid(amp: f32) -> Self {
        Sigmoid { amp }
    }

    pub fn f(&self, x: f32) -> f32 {
        match *self {
            Relu => x.max(0.),
            Relu6 => x.clamp(0., 6.),
            Sigmoid { amp } => amp / (1. + (-x).exp()),
        }
    }

    pub(crate) fn forward(&self, x: ArrayD<f32>) -> ArrayD<f32> {
        x.mapv_into(|x| self.f(x))
    }
}
