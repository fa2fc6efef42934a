//! Flat-tree index arithmetic.
//!
//! A complete binary tree is flattened into a single `u64` space: leaves
//! take the even numbers, internal nodes the odd ones, and a node's depth
//! is the number of trailing one bits in its identifier.
//!
//! ```text
//!               7
//!         3           11
//!      1     5     9     13
//!     0 2   4 6   8 10 12  14
//! ```
//!
//! # Core items
//!
//! - Pure functions ([`index`], [`depth`], [`offset`], [`parent`],
//!   [`sibling`], [`children`], [`spans`], [`full_roots`], ...).
//! - [`TreeIterator`]: an O(1)-per-step cursor that keeps depth and offset
//!   in sync while walking the tree.

#![warn(missing_docs)]

mod error;
mod iterator;
mod tree;


pub use error::FlatTreeError;
pub use iterator::TreeIterator;
pub use tree::{
    children, count, depth, full_roots, index, left_child, left_span, offset, parent, right_child,
    right_span, sibling, spans, uncle,
};

/// Alias for `core::result::Result<T, FlatTreeError>`.
pub type Result<T> = core::result::Result<T, FlatTreeError>;
