use std::{cell::RefCell, collections::HashMap, fmt::Display, rc::Rc};

use log::debug;
use ndarray::{ArrayD, ArrayView1, ArrayView2, ArrayView3, ArrayView4, ArrayViewD, Ix2, Ix4};
use rand::Rng;

use crate::{
    GraphErr, Result,
    initialization::{ChainedParamGen, ConstParamGen, ParamGen, RandParamGen},
    ops::{self, ActFn, BATCH_NORM_EPS, Op, Padding},
    tensor::{NodeId, Tensor},
};

/// A node of the graph: one named op applied to at most one input.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    op: Op,
    input: Option<NodeId>,
    shape: Vec<usize>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn input(&self) -> Option<NodeId> {
        self.input
    }

    /// The output shape of the node.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

/// An append only graph of tensor operations.
///
/// Every op checks its input and infers its output shape when it is added, so an invalid
/// network fails while it is being built rather than when it is run. Parameters are not owned
/// by the graph: they live in a flat slice laid out in node order, see [`Graph::size`].
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    names: HashMap<String, NodeId>,
    params: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the node that produces `tensor`.
    pub fn node(&self, tensor: &Tensor) -> Result<&Node> {
        self.check(tensor)?;
        Ok(&self.nodes[tensor.node().index()])
    }

    /// Looks up the output of the op named `name`.
    pub fn find(&self, name: &str) -> Option<Tensor> {
        let &id = self.names.get(name)?;
        Some(Tensor::new(id, self.nodes[id.index()].shape.clone()))
    }

    /// Declares an input of the graph.
    ///
    /// # Arguments
    /// * `name` - The op name.
    /// * `shape` - The full shape of the input, batch included.
    pub fn placeholder(&mut self, name: &str, shape: &[usize]) -> Result<Tensor> {
        if shape.contains(&0) {
            return Err(GraphErr::ZeroDim {
                op: "placeholder",
                what: "dimension",
            });
        }

        self.push(name, Op::Placeholder, None, shape.to_vec())
    }

    pub fn conv2d(
        &mut self,
        x: &Tensor,
        filters: usize,
        kernel: usize,
        stride: usize,
        padding: Padding,
        name: &str,
    ) -> Result<Tensor> {
        let op = Op::Conv2d {
            filters,
            kernel,
            stride,
            padding,
        };
        self.apply(name, op, x)
    }

    pub fn depthwise_conv2d(
        &mut self,
        x: &Tensor,
        kernel: usize,
        stride: usize,
        padding: Padding,
        name: &str,
    ) -> Result<Tensor> {
        let op = Op::DepthwiseConv2d {
            kernel,
            stride,
            padding,
        };
        self.apply(name, op, x)
    }

    pub fn batch_norm(&mut self, x: &Tensor, name: &str) -> Result<Tensor> {
        self.apply(name, Op::BatchNorm { eps: BATCH_NORM_EPS }, x)
    }

    pub fn activation(&mut self, x: &Tensor, act_fn: ActFn, name: &str) -> Result<Tensor> {
        self.apply(name, Op::Activation(act_fn), x)
    }

    /// Averages over `axes`, keeping them as size one dimensions if `keep_dims` is set.
    pub fn reduce_mean(
        &mut self,
        x: &Tensor,
        axes: &[usize],
        keep_dims: bool,
        name: &str,
    ) -> Result<Tensor> {
        let mut axes = axes.to_vec();
        axes.sort_unstable();
        axes.dedup();

        self.apply(name, Op::ReduceMean { axes, keep_dims }, x)
    }

    pub fn flatten(&mut self, x: &Tensor, name: &str) -> Result<Tensor> {
        self.apply(name, Op::Flatten, x)
    }

    /// A fully connected layer with biases over a `[batch, features]` input.
    pub fn fc_layer(&mut self, x: &Tensor, units: usize, name: &str) -> Result<Tensor> {
        self.apply(name, Op::Dense { units }, x)
    }

    /// Returns the amount of parameters in the graph.
    pub fn size(&self) -> usize {
        self.params
    }

    /// Builds the default parameter generator of this graph: Kaiming normal weights, unit batch
    /// norm scales and zero shifts and biases.
    ///
    /// # Arguments
    /// * `rng` - The random number generator every weight is drawn from.
    ///
    /// # Returns
    /// A generator of exactly `self.size()` parameters.
    pub fn param_gen<R: Rng + 'static>(&self, rng: Rc<RefCell<R>>) -> Result<ChainedParamGen> {
        let mut param_gens: Vec<Box<dyn ParamGen>> = Vec::new();

        for node in &self.nodes {
            let input = self.input_shape(node);
            let channels = input.last().copied().unwrap_or_default();

            match node.op {
                Op::Conv2d { kernel, .. } => {
                    let limit = node.op.size(input);
                    let fan_in = kernel * kernel * channels;
                    let param_gen = RandParamGen::kaiming(rng.clone(), limit, fan_in)
                        .map_err(|e| init_err(node, e))?;
                    param_gens.push(Box::new(param_gen));
                }
                Op::DepthwiseConv2d { kernel, .. } => {
                    let limit = node.op.size(input);
                    let fan_in = kernel * kernel;
                    let param_gen = RandParamGen::kaiming(rng.clone(), limit, fan_in)
                        .map_err(|e| init_err(node, e))?;
                    param_gens.push(Box::new(param_gen));
                }
                Op::BatchNorm { .. } => {
                    param_gens.push(Box::new(ConstParamGen::ones(channels)));
                    param_gens.push(Box::new(ConstParamGen::zeros(channels)));
                }
                Op::Dense { units } => {
                    let limit = channels * units;
                    let param_gen = RandParamGen::kaiming(rng.clone(), limit, channels)
                        .map_err(|e| init_err(node, e))?;
                    param_gens.push(Box::new(param_gen));
                    param_gens.push(Box::new(ConstParamGen::zeros(units)));
                }
                _ => {}
            }
        }

        Ok(ChainedParamGen::new(param_gens))
    }

    /// Draws the whole parameter vector of the graph from `param_gen`.
    pub fn init_params(&self, param_gen: &mut dyn ParamGen) -> Result<Vec<f32>> {
        let expected = self.size();
        let got = param_gen.remaining();
        if got < expected {
            return Err(GraphErr::ParamGenExhausted { got, expected });
        }

        let mut params = Vec::with_capacity(expected);
        param_gen.fill(&mut params, expected);
        Ok(params)
    }

    /// Evaluates the graph up to `fetch`.
    ///
    /// # Arguments
    /// * `params` - The parameters of the whole graph, laid out in node order.
    /// * `feeds` - A value for every placeholder `fetch` depends on.
    /// * `fetch` - The tensor to compute.
    ///
    /// # Returns
    /// The value of `fetch` or an error if the parameters or the feeds don't fit the graph.
    pub fn forward(
        &self,
        params: &[f32],
        feeds: &[(&Tensor, ArrayViewD<f32>)],
        fetch: &Tensor,
    ) -> Result<ArrayD<f32>> {
        self.check(fetch)?;

        let expected = self.size();
        if params.len() != expected {
            return Err(GraphErr::SizeMismatch {
                what: "params",
                got: params.len(),
                expected,
            });
        }

        let last = fetch.node().index();
        let mut values: Vec<Option<ArrayD<f32>>> = vec![None; last + 1];
        let mut front = ParamCursor::new(params);

        for (i, node) in self.nodes[..=last].iter().enumerate() {
            let size = node.op.size(self.input_shape(node));
            let params = front.next(size).ok_or(GraphErr::SizeMismatch {
                what: "params",
                got: params.len(),
                expected,
            })?;

            let value = match node.input {
                None => Self::feed(node, NodeId(i), feeds)?,
                Some(input) => {
                    let x = values[input.index()]
                        .as_ref()
                        .ok_or(GraphErr::UnknownTensor(input.index()))?;
                    Self::eval(node, params, x.view())?
                }
            };

            values[i] = Some(value);
        }

        values
            .pop()
            .flatten()
            .ok_or(GraphErr::UnknownTensor(last))
    }

    fn feed(node: &Node, id: NodeId, feeds: &[(&Tensor, ArrayViewD<f32>)]) -> Result<ArrayD<f32>> {
        let (_, value) = feeds
            .iter()
            .find(|(tensor, _)| tensor.node() == id)
            .ok_or_else(|| GraphErr::MissingFeed(node.name.clone()))?;

        if value.shape() != node.shape.as_slice() {
            return Err(GraphErr::FeedShapeMismatch {
                name: node.name.clone(),
                got: value.shape().to_vec(),
                expected: node.shape.clone(),
            });
        }

        Ok(value.to_owned())
    }

    fn eval(node: &Node, params: &[f32], x: ArrayViewD<f32>) -> Result<ArrayD<f32>> {
        let channels = x.shape().last().copied().unwrap_or_default();

        let y = match node.op {
            Op::Placeholder => x.to_owned(),
            Op::Conv2d {
                filters,
                kernel,
                stride,
                padding,
            } => {
                let x = x.into_dimensionality::<Ix4>()?;
                let w = ArrayView4::from_shape((kernel, kernel, channels, filters), params)?;
                ops::conv2d(x, w, stride, padding)?.into_dyn()
            }
            Op::DepthwiseConv2d {
                kernel,
                stride,
                padding,
            } => {
                let x = x.into_dimensionality::<Ix4>()?;
                let w = ArrayView3::from_shape((kernel, kernel, channels), params)?;
                ops::depthwise_conv2d(x, w, stride, padding)?.into_dyn()
            }
            Op::BatchNorm { eps } => {
                let (gamma, beta) = params.split_at(channels);
                ops::batch_norm(x, ArrayView1::from(gamma), ArrayView1::from(beta), eps)?
            }
            Op::Activation(act_fn) => act_fn.forward(x.to_owned()),
            Op::ReduceMean {
                ref axes,
                keep_dims,
            } => ops::reduce_mean(x, axes, keep_dims)?,
            Op::Flatten => ops::flatten(x)?,
            Op::Dense { units } => {
                let x = x.into_dimensionality::<Ix2>()?;
                let (w, b) = params.split_at(channels * units);
                let w = ArrayView2::from_shape((channels, units), w)?;
                ops::dense(x, w, ArrayView1::from(b)).into_dyn()
            }
        };

        Ok(y)
    }

    fn apply(&mut self, name: &str, op: Op, x: &Tensor) -> Result<Tensor> {
        self.check(x)?;
        let shape = op.infer(x.shape())?;
        let params = self
            .params
            .checked_add(op.size(x.shape()))
            .ok_or(GraphErr::ParamOverflow { op: op.kind() })?;

        let out = self.push(name, op, Some(x.node()), shape)?;
        self.params = params;
        Ok(out)
    }

    fn push(
        &mut self,
        name: &str,
        op: Op,
        input: Option<NodeId>,
        shape: Vec<usize>,
    ) -> Result<Tensor> {
        if self.names.contains_key(name) {
            return Err(GraphErr::DuplicateName(name.to_string()));
        }

        let id = NodeId(self.nodes.len());
        debug!("{name}: {} -> {shape:?}", op.kind());

        self.names.insert(name.to_string(), id);
        self.nodes.push(Node {
            name: name.to_string(),
            op,
            input,
            shape: shape.clone(),
        });

        Ok(Tensor::new(id, shape))
    }

    fn check(&self, tensor: &Tensor) -> Result<()> {
        let id = tensor.node().index();

        match self.nodes.get(id) {
            Some(node) if node.shape == tensor.shape() => Ok(()),
            _ => Err(GraphErr::UnknownTensor(id)),
        }
    }

    fn input_shape(&self, node: &Node) -> &[usize] {
        node.input
            .map(|id| self.nodes[id.index()].shape.as_slice())
            .unwrap_or_default()
    }
}

fn init_err(node: &Node, reason: impl Display) -> GraphErr {
    GraphErr::Init {
        node: node.name.clone(),
        reason: reason.to_string(),
    }
}

/// Hands out consecutive slices of the flat parameter vector.
struct ParamCursor<'a> {
    rest: &'a [f32],
}

impl<'a> ParamCursor<'a> {
    fn new(params: &'a [f32]) -> Self {
        Self { rest: params }
    }

    fn next(&mut self, size: usize) -> Option<&'a [f32]> {
        if size > self.rest.len() {
            return None;
        }

        let (head, rest) = self.rest.split_at(size);
        self.rest = rest;
        Some(head)
    }
}
