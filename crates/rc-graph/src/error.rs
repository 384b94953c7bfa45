//! Graph-specific error types.

use rc_core::{BlockId, PackageId, PortId, RcError};

/// Flowsheet wiring errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateBlock { name: String },

    DuplicatePort { block: String, port: String },

    UnknownBlock { name: String },

    UnknownPort { block: String, port: String },

    /// Arcs run from an outlet to an inlet.
    WrongDirection { arc: String },

    /// A port takes part in at most one arc.
    PortAlreadyConnected { arc: String, port: String },

    /// Both arc endpoints must use the same property package.
    PackageMismatch {
        arc: String,
        source: PackageId,
        dest: PackageId,
    },

    SelfLoop { arc: String, block: BlockId },

    Cycle { block: String },

    InvalidPortRef { port: PortId },
}

pub type GraphResult<T> = Result<T, GraphError>;

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateBlock { name } => write!(f, "Block '{}' already exists", name),
            GraphError::DuplicatePort { block, port } => {
                write!(f, "Block '{}' already has a port '{}'", block, port)
            }
            GraphError::UnknownBlock { name } => write!(f, "No block named '{}'", name),
            GraphError::UnknownPort { block, port } => {
                write!(f, "Block '{}' has no port '{}'", block, port)
            }
            GraphError::WrongDirection { arc } => {
                write!(f, "Arc '{}' must run from an outlet to an inlet", arc)
            }
            GraphError::PortAlreadyConnected { arc, port } => {
                write!(f, "Arc '{}': port '{}' is already connected", arc, port)
            }
            GraphError::PackageMismatch { arc, source, dest } => write!(
                f,
                "Arc '{}' joins property packages {} and {}",
                arc, source.0, dest.0
            ),
            GraphError::SelfLoop { arc, block } => {
                write!(f, "Arc '{}' connects block {} to itself", arc, block)
            }
            GraphError::Cycle { block } => {
                write!(f, "Flowsheet has a cycle through block '{}'", block)
            }
            GraphError::InvalidPortRef { port } => write!(f, "Port {} does not exist", port),
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for RcError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::Cycle { .. } | GraphError::InvalidPortRef { .. } => RcError::Invariant {
                what: "flowsheet graph",
            },
            _ => RcError::InvalidArg {
                what: "flowsheet wiring",
            },
        }
    }
}
