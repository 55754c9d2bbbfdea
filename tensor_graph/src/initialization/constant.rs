use std::iter;

use super::ParamGen;

/// Repeats one value up to a limit, used for batch norm scales and shifts and for biases.
pub struct ConstParamGen {
    value: f32,
    remaining: usize,
}

impl ConstParamGen {
    /// Creates a new `ConstParamGen`.
    ///
    /// # Arguments
    /// * `value` - The value to repeat.
    /// * `limit` - How many times to repeat it.
    pub fn new(value: f32, limit: usize) -> Self {
        Self {
            value,
            remaining: limit,
        }
    }

    pub fn zeros(limit: usize) -> Self {
        Self::new(0., limit)
    }

    pub fn ones(limit: usize) -> Self {
        Self::new(1., limit)
    }
}

impl ParamGen for ConstParamGen {
    fn remaining(&self) -> usize {
        self.remaining
    }

    fn fill(&mut self, params: &mut Vec<f32>, n: usize) -> usize {
        let n = n.min(self.remaining);
        self.remaining -= n;
        params.extend(iter::repeat_n(self.value, n));
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_when_limit_is_zero() {
        let mut param_gen = ConstParamGen::zeros(0);
        let mut params = Vec::new();

        assert_eq!(param_gen.fill(&mut params, 1), 0);
        assert!(params.is_empty());
    }

    #[test]
    fn fills_are_capped_by_the_limit() {
        let mut param_gen = ConstParamGen::ones(4);
        let mut params = vec![0.];

        assert_eq!(param_gen.fill(&mut params, 3), 3);
        assert_eq!(param_gen.remaining(), 1);
        assert_eq!(param_gen.fill(&mut params, 3), 1);
        assert_eq!(params, [0., 1., 1., 1., 1.]);
        assert_eq!(param_gen.remaining(), 0);
    }
}
