use hyperlog_bitfield::BitfieldError;
use hyperlog_flat_tree::FlatTreeError;
use thiserror::Error;

/// Errors returned by [`TreeIndex`](crate::TreeIndex) operations.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TreeIndexError {
    /// Flat-tree arithmetic rejected an argument while assembling a proof.
    #[error("flat tree error: {0}")]
    FlatTree(#[from] FlatTreeError),

    /// A compressed tree index could not be decoded.
    #[error("bitfield error: {0}")]
    Bitfield(#[from] BitfieldError),
}
