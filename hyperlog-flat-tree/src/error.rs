use thiserror::Error;

/// Errors from flat-tree arithmetic.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FlatTreeError {
    /// An argument violated the function's input contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
