use crate::{GraphErr, Result};

/// Index of a node in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A symbolic handle to the output of a graph node.
///
/// The shape is known as soon as the node is created, spatial tensors are laid out as
/// `[batch, height, width, channels]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tensor {
    node: NodeId,
    shape: Vec<usize>,
}

impl Tensor {
    pub(crate) fn new(node: NodeId, shape: Vec<usize>) -> Self {
        Self { node, shape }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// The last dimension.
    pub fn channels(&self) -> Option<usize> {
        self.shape.last().copied()
    }

    /// Returns the height and width of a rank 4 tensor.
    pub fn spatial(&self) -> Result<(usize, usize)> {
        match self.shape[..] {
            [_, h, w, _] => Ok((h, w)),
            _ => Err(GraphErr::RankMismatch {
                op: "spatial",
                got: self.rank(),
                expected: 4,
            }),
        }
    }
}
