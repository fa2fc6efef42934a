use hyperlog_flat_tree::FlatTreeError;
use thiserror::Error;

/// Errors from building or resuming a Merkle [`Stream`](crate::Stream).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MerkleError {
    /// Resumed roots do not form the full-roots decomposition of the leaf
    /// count they imply.
    #[error("invalid roots: expected {expected:?}, found {found:?}")]
    InvalidRoots {
        /// Root indices implied by the leaf count.
        expected: Vec<u64>,
        /// Root indices that were supplied.
        found: Vec<u64>,
    },

    /// Flat-tree arithmetic rejected an argument.
    #[error("flat tree error: {0}")]
    FlatTree(#[from] FlatTreeError),
}
