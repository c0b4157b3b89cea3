use core::fmt;

/// Result alias for `spine`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the similarity, spanning-tree and perplexity engines.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput,

    /// Matrix dimension mismatch (usize).
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Shape mismatch (string description).
    ShapeMismatch {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// A matrix entry that cannot be a probability mass (negative, NaN or infinite).
    InvalidValue {
        /// Row of the offending entry.
        row: usize,
        /// Column of the offending entry.
        col: usize,
        /// The offending value.
        value: f64,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// The runtime reported (or was configured with) zero workers.
    NoWorkers,

    /// The worker pool could not be constructed.
    ThreadPool(String),

    /// A node id outside `[0, n_nodes)`.
    NodeOutOfRange {
        /// Requested node.
        node: usize,
        /// Number of nodes in the structure.
        n_nodes: usize,
    },

    /// An edge whose two endpoints coincide.
    SelfLoop {
        /// The repeated endpoint.
        node: usize,
    },

    /// Edge set handed to Kruskal is not weight-ascending.
    UnsortedEdges {
        /// Index of the first edge lighter than its predecessor.
        position: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected}, actual {actual}")
            }
            Error::InvalidValue { row, col, value } => {
                write!(f, "invalid probability {value} at ({row}, {col})")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::NoWorkers => write!(f, "no worker threads available"),
            Error::ThreadPool(msg) => write!(f, "failed to build worker pool: {msg}"),
            Error::NodeOutOfRange { node, n_nodes } => {
                write!(f, "node {node} out of range for {n_nodes} nodes")
            }
            Error::SelfLoop { node } => write!(f, "self-loop on node {node}"),
            Error::UnsortedEdges { position } => {
                write!(f, "edges not sorted by ascending weight at position {position}")
            }
        }
    }
}

impl std::error::Error for Error {}
