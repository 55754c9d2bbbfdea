use super::ParamGen;

/// Walks a list of parameter generators in order.
///
/// A graph hands one generator per parametrized node, each owning exactly that node's
/// parameters, so the chain lays values out in node order.
pub struct ChainedParamGen {
    param_gens: Vec<Box<dyn ParamGen>>,
    curr: usize,
}

impl ChainedParamGen {
    pub fn new(param_gens: Vec<Box<dyn ParamGen>>) -> Self {
        Self {
            param_gens,
            curr: 0,
        }
    }
}

impl ParamGen for ChainedParamGen {
    fn remaining(&self) -> usize {
        self.param_gens[self.curr..]
            .iter()
            .map(|param_gen| param_gen.remaining())
            .sum()
    }

    fn fill(&mut self, params: &mut Vec<f32>, n: usize) -> usize {
        let mut filled = 0;

        while filled < n && self.curr < self.param_gens.len() {
            match self.param_gens[self.curr].fill(params, n - filled) {
                0 => self.curr += 1,
                appended => filled += appended,
            }
        }

        filled
    }
}

#[cfg(test)]
mod tests {
    use super::{super::ConstParamGen, *};

    #[test]
    fn empty() {
        let mut param_gen = ChainedParamGen::new(vec![]);
        let mut params = Vec::new();

        assert_eq!(param_gen.remaining(), 0);
        assert_eq!(param_gen.fill(&mut params, 1), 0);
    }

    #[test]
    fn spans_generators() {
        let param_gens: Vec<Box<dyn ParamGen>> = vec![
            Box::new(ConstParamGen::zeros(1)),
            Box::new(ConstParamGen::ones(3)),
        ];
        let mut param_gen = ChainedParamGen::new(param_gens);
        let mut params = Vec::new();

        assert_eq!(param_gen.remaining(), 4);
        assert_eq!(param_gen.fill(&mut params, 2), 2);
        assert_eq!(param_gen.fill(&mut params, 5), 2);
        assert_eq!(params, [0., 1., 1., 1.]);
        assert_eq!(param_gen.remaining(), 0);
    }

    #[test]
    fn skips_empty_generators() {
        let param_gens: Vec<Box<dyn ParamGen>> = vec![
            Box::new(ConstParamGen::new(7., 0)),
            Box::new(ChainedParamGen::new(vec![Box::new(ConstParamGen::new(2., 1))])),
            Box::new(ConstParamGen::new(3., 1)),
        ];
        let mut param_gen = ChainedParamGen::new(param_gens);
        let mut params = Vec::new();

        assert_eq!(param_gen.fill(&mut params, 4), 2);
        assert_eq!(params, [2., 3.]);
    }
}
