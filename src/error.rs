use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use tensor_graph::GraphErr;

/// The result type used across the architecture generator.
pub type Result<T> = std::result::Result<T, ArchErr>;

/// The architecture generator's error type.
///
/// The builder performs no validation of its own: an invalid configuration surfaces as the
/// `Graph` error of the op that could not be built.
#[derive(Debug)]
pub enum ArchErr {
    Graph(GraphErr),
    MissingStage {
        what: &'static str,
        index: usize,
        len: usize,
    },
    Config(serde_json::Error),
    Io(io::Error),
}

impl Display for ArchErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchErr::Graph(e) => write!(f, "graph error: {e}"),
            ArchErr::MissingStage { what, index, len } => write!(
                f,
                "stage {index} has no {what}, only {len} {what} values were planned"
            ),
            ArchErr::Config(e) => write!(f, "invalid config: {e}"),
            ArchErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for ArchErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ArchErr::Graph(e) => Some(e),
            ArchErr::Config(e) => Some(e),
            ArchErr::Io(e) => Some(e),
            ArchErr::MissingStage { .. } => None,
        }
    }
}

impl From<GraphErr> for ArchErr {
    fn from(value: GraphErr) -> Self {
        Self::Graph(value)
    }
}

impl From<serde_json::Error> for ArchErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value)
    }
}

impl From<io::Error> for ArchErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
