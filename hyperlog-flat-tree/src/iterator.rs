//! Incremental flat-tree cursor.

use crate::tree::{depth, is_even, offset};

/// A cursor over flat-tree nodes that updates its position in O(1) per
/// step.
///
/// The cursor keeps the current node's offset and `factor = 2^(depth + 1)`
/// alongside its index, so moving to a neighbour, parent or child never
/// re-derives depth from the identifier. Every state it reaches agrees with
/// the pure functions in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeIterator {
    index: u64,
    offset: u64,
    factor: u64,
}

impl TreeIterator {
    /// Create a cursor positioned at `index`.
    pub fn new(index: u64) -> Self {
        let mut iter = TreeIterator {
            index: 0,
            offset: 0,
            factor: 2,
        };
        iter.seek(index);
        iter
    }

    /// The node the cursor is positioned at.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// The offset of the current node.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// `2^(depth + 1)` for the current node.
    pub fn factor(&self) -> u64 {
        self.factor
    }

    /// The depth of the current node.
    pub fn depth(&self) -> u64 {
        self.factor.trailing_zeros() as u64 - 1
    }

    /// Reposition the cursor at `index`, recomputing offset and factor.
    pub fn seek(&mut self, index: u64) {
        self.index = index;
        if is_even(index) {
            self.offset = index / 2;
            self.factor = 2;
        } else {
            self.offset = offset(index);
            self.factor = 1 << (depth(index) + 1);
        }
    }

    /// Whether the current node is a left child.
    pub fn is_left(&self) -> bool {
        is_even(self.offset)
    }

    /// Whether the current node is a right child.
    pub fn is_right(&self) -> bool {
        !self.is_left()
    }

    /// Move to the previous node at the same depth. Stays put at offset 0.
    pub fn prev(&mut self) -> u64 {
        if self.offset == 0 {
            return self.index;
        }
        self.offset -= 1;
        self.index -= self.factor;
        self.index
    }

    /// Move to the next node at the same depth.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        self.offset += 1;
        self.index += self.factor;
        self.index
    }

    /// Move to the sibling of the current node.
    pub fn sibling(&mut self) -> u64 {
        if self.is_left() {
            self.next()
        } else {
            self.prev()
        }
    }

    /// Move to the parent of the current node.
    pub fn parent(&mut self) -> u64 {
        if is_even(self.offset) {
            self.index += self.factor / 2;
            self.offset /= 2;
        } else {
            self.index -= self.factor / 2;
            self.offset = (self.offset - 1) / 2;
        }
        self.factor *= 2;
        self.index
    }

    /// Move to the leftmost leaf spanned by the current node.
    pub fn left_span(&mut self) -> u64 {
        self.index = self.index + 1 - self.factor / 2;
        self.offset = self.index / 2;
        self.factor = 2;
        self.index
    }

    /// Move to the rightmost leaf spanned by the current node.
    pub fn right_span(&mut self) -> u64 {
        self.index = self.index + self.factor / 2 - 1;
        self.offset = self.index / 2;
        self.factor = 2;
        self.index
    }

    /// Move to the left child. Stays put on a leaf.
    pub fn left_child(&mut self) -> u64 {
        if self.factor == 2 {
            return self.index;
        }
        self.factor /= 2;
        self.index -= self.factor / 2;
        self.offset *= 2;
        self.index
    }

    /// Move to the right child. Stays put on a leaf.
    pub fn right_child(&mut self) -> u64 {
        if self.factor == 2 {
            return self.index;
        }
        self.factor /= 2;
        self.index += self.factor / 2;
        self.offset = 2 * self.offset + 1;
        self.index
    }
}
