//! Append-only Merkle hash stream.
//!
//! Each appended block becomes a leaf at flat-tree index `2 * n`. Whenever the
//! two newest roots are siblings they are merged into their parent, so the
//! roots always form the full-roots decomposition of the leaf count:
//!
//! ```text
//! append a, b, c:       1          roots = [1, 4]
//!                      / \
//!                     0   2   4
//! ```
//!
//! Hashing is pluggable through [`NodeHasher`]. [`Blake2b512Hasher`] is the
//! default; [`Blake3Hasher`] uses domain-separated BLAKE3.

#![warn(missing_docs)]

mod error;
mod hasher;
mod node;
mod stream;

pub use error::MerkleError;
pub use hasher::{Blake2b512Hasher, Blake3Hasher, Hash32, Hash64, NodeHasher};
pub use node::{Node, NodeKind, PartialNode};
pub use stream::Stream;

/// Alias for `core::result::Result<T, MerkleError>`.
pub type Result<T> = core::result::Result<T, MerkleError>;
