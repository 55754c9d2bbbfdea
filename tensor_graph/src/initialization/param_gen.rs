/// Produces the initial values of one stretch of a graph's flat parameter vector.
pub trait ParamGen {
    /// How many values are left before the generator is exhausted.
    fn remaining(&self) -> usize;

    /// Appends at most `n` values to `params`.
    ///
    /// # Returns
    /// How many values were appended, zero once the generator is exhausted.
    fn fill(&mut self, params: &mut Vec<f32>, n: usize) -> usize;
}
