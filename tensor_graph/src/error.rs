use std::{
    error::Error,
    fmt::{self, Display},
};

use ndarray::ShapeError;

/// The result type used in the entire tensor graph crate.
pub type Result<T> = std::result::Result<T, GraphErr>;

/// The tensor graph's error type.
#[derive(Debug)]
pub enum GraphErr {
    RankMismatch {
        op: &'static str,
        got: usize,
        expected: usize,
    },
    ZeroDim {
        op: &'static str,
        what: &'static str,
    },
    KernelTooLarge {
        op: &'static str,
        kernel: usize,
        size: usize,
    },
    InvalidAxis {
        op: &'static str,
        axis: usize,
        rank: usize,
    },
    DuplicateName(String),
    UnknownTensor(usize),
    MissingFeed(String),
    FeedShapeMismatch {
        name: String,
        got: Vec<usize>,
        expected: Vec<usize>,
    },
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    ParamOverflow {
        op: &'static str,
    },
    ParamGenExhausted {
        got: usize,
        expected: usize,
    },
    /// The initializer of `node` rejected its distribution's parameters.
    Init {
        node: String,
        reason: String,
    },
    Shape(ShapeError),
}

impl Display for GraphErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GraphErr::RankMismatch { op, got, expected } => {
                format!("{op} expects a rank {expected} tensor, got rank {got}")
            }
            GraphErr::ZeroDim { op, what } => format!("{op} got a zero {what}"),
            GraphErr::KernelTooLarge { op, kernel, size } => format!(
                "{op} kernel of size {kernel} does not fit a valid window over {size} elements"
            ),
            GraphErr::InvalidAxis { op, axis, rank } => {
                format!("{op} axis {axis} is out of bounds for a rank {rank} tensor")
            }
            GraphErr::DuplicateName(name) => format!("an op named {name} already exists"),
            GraphErr::UnknownTensor(id) => {
                format!("tensor {id} does not belong to this graph")
            }
            GraphErr::MissingFeed(name) => format!("placeholder {name} was not fed"),
            GraphErr::FeedShapeMismatch {
                name,
                got,
                expected,
            } => format!("placeholder {name} expects shape {expected:?}, was fed {got:?}"),
            GraphErr::SizeMismatch {
                what,
                got,
                expected,
            } => format!("There's a size mismatch for {what}, got {got} and expected {expected}"),
            GraphErr::ParamGenExhausted { got, expected } => format!(
                "The parameter generator was exhausted after {got} of {expected} parameters"
            ),
            GraphErr::ParamOverflow { op } => {
                format!("{op} has more parameters than can be addressed")
            }
            GraphErr::Init { node, reason } => {
                format!("can't initialize the parameters of {node}: {reason}")
            }
            GraphErr::Shape(e) => format!("shape error: {e}"),
        };

        write!(f, "{s}")
    }
}

impl Error for GraphErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GraphErr::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for GraphErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}
