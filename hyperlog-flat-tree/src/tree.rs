//! Pure flat-tree functions.
//!
//! Every function is total over `u64` node identifiers except
//! [`full_roots`], which rejects odd limits.

use crate::{FlatTreeError, Result};

/// Return the node identifier at `depth` and `offset`.
pub fn index(depth: u64, offset: u64) -> u64 {
    (offset << (depth + 1)) | ((1 << depth) - 1)
}

/// Return the depth of `node`: the number of trailing one bits.
///
/// Leaves (even identifiers) have depth 0.
pub fn depth(node: u64) -> u64 {
    (!node).trailing_zeros() as u64
}

/// Return the offset of `node`: its zero-based position among the nodes of
/// the same depth, counted from the left edge of the tree.
pub fn offset(node: u64) -> u64 {
    if is_even(node) {
        return node / 2;
    }
    node >> (depth(node) + 1)
}

/// Return the parent of `node`.
pub fn parent(node: u64) -> u64 {
    index(depth(node) + 1, offset(node) / 2)
}

/// Return the sibling of `node`.
pub fn sibling(node: u64) -> u64 {
    index(depth(node), offset(node) ^ 1)
}

/// Return the sibling of the parent of `node`.
pub fn uncle(node: u64) -> u64 {
    let parent = parent(node);
    index(depth(parent), offset(parent) ^ 1)
}

/// Return the `(left, right)` children of `node`, or `None` for a leaf.
pub fn children(node: u64) -> Option<(u64, u64)> {
    if is_even(node) {
        return None;
    }
    let depth = depth(node);
    let offset = offset(node) * 2;
    Some((index(depth - 1, offset), index(depth - 1, offset + 1)))
}

/// Return the left child of `node`, or `None` for a leaf.
pub fn left_child(node: u64) -> Option<u64> {
    if is_even(node) {
        return None;
    }
    Some(index(depth(node) - 1, offset(node) * 2))
}

/// Return the right child of `node`, or `None` for a leaf.
pub fn right_child(node: u64) -> Option<u64> {
    if is_even(node) {
        return None;
    }
    Some(index(depth(node) - 1, offset(node) * 2 + 1))
}

/// Return the leftmost and rightmost leaves covered by `node`.
///
/// A leaf spans only itself.
pub fn spans(node: u64) -> (u64, u64) {
    (left_span(node), right_span(node))
}

/// Return the leftmost leaf covered by `node`.
pub fn left_span(node: u64) -> u64 {
    if is_even(node) {
        return node;
    }
    offset(node) * (2 << depth(node))
}

/// Return the rightmost leaf covered by `node`.
pub fn right_span(node: u64) -> u64 {
    if is_even(node) {
        return node;
    }
    (offset(node) + 1) * (2 << depth(node)) - 2
}

/// Return the number of nodes in the subtree rooted at `node`, including
/// `node` itself.
pub fn count(node: u64) -> u64 {
    (2 << depth(node)) - 1
}

/// Decompose the leaves `[0, limit / 2)` into the roots of maximal complete
/// subtrees, ordered left to right.
///
/// The roots mirror the set bits of the leaf count: for a count of 9 the
/// result covers a block of 8 leaves and a block of 1.
///
/// ```text
///        7
///    3       11
///  1   5   9    13
/// 0 2 4 6 8 10 12 14 16     full_roots(18) == [7, 16]
/// ```
///
/// Returns [`FlatTreeError::InvalidArgument`] if `limit` is odd, since an
/// odd limit does not name a leaf boundary.
pub fn full_roots(limit: u64) -> Result<Vec<u64>> {
    if !is_even(limit) {
        return Err(FlatTreeError::InvalidArgument(format!(
            "full_roots limit must be even, got {}",
            limit
        )));
    }

    let mut remaining = limit / 2;
    let mut roots = Vec::with_capacity(remaining.count_ones() as usize);
    let mut offset = 0;
    while remaining > 0 {
        // largest power of two that still fits
        let factor = 1u64 << (63 - remaining.leading_zeros());
        roots.push(offset + factor - 1);
        offset += 2 * factor;
        remaining -= factor;
    }
    Ok(roots)
}

#[inline]
pub(crate) fn is_even(node: u64) -> bool {
    node & 1 == 0
}
