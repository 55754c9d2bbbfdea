//! A small symbolic tensor graph: ops are checked and their output shapes inferred as they are
//! added, and the resulting graph can be evaluated on the CPU given a flat parameter vector.

pub mod error;
mod graph;
pub mod initialization;
pub mod ops;
mod tensor;

pub use error::{GraphErr, Result};
pub use graph::{Graph, Node};
pub use ops::{ActFn, Op, Padding};
pub use tensor::{NodeId, Tensor};
