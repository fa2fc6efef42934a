//! Index of the Merkle tree nodes held locally.
//!
//! A [`TreeIndex`] keeps one bit per flat-tree node. Setting a node whose
//! sibling is already present marks the parent too, so the set bits always
//! describe which subtrees can be hashed and verified without asking a peer.
//!
//! On top of that bitfield the index answers three questions used during
//! replication:
//!
//! - [`TreeIndex::digest`]: a compact summary of which nodes around an index
//!   we already hold, sent to a peer with a request.
//! - [`TreeIndex::proof`]: the node list a peer needs to verify an index,
//!   given the digest it sent.
//! - [`TreeIndex::verified_by`]: the rightmost node the verified region
//!   containing an index reaches.

#![warn(missing_docs)]

mod error;
mod tree_index;

pub use error::TreeIndexError;
pub use tree_index::{Proof, TreeIndex, Verification};

/// Alias for `core::result::Result<T, TreeIndexError>`.
pub type Result<T> = core::result::Result<T, TreeIndexError>;
