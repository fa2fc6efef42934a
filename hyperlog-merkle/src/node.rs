//! Merkle nodes.

use std::fmt;

use hyperlog_flat_tree as flat;

/// Whether a node hashes block data or two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Hash of an appended block.
    Leaf,
    /// Hash of two child hashes.
    Parent,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf => f.write_str("leaf"),
            NodeKind::Parent => f.write_str("parent"),
        }
    }
}

/// A node whose hash has not been computed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialNode {
    index: u64,
    parent: u64,
    kind: NodeKind,
    data: Option<Vec<u8>>,
}

impl PartialNode {
    /// A leaf at `index` carrying `data`.
    pub fn leaf(index: u64, data: Vec<u8>) -> Self {
        PartialNode {
            index,
            parent: flat::parent(index),
            kind: NodeKind::Leaf,
            data: Some(data),
        }
    }

    /// An internal node at `index`. Internal nodes carry no data.
    pub fn internal(index: u64) -> Self {
        PartialNode {
            index,
            parent: flat::parent(index),
            kind: NodeKind::Parent,
            data: None,
        }
    }

    /// Flat-tree index of the node.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Flat-tree index of the node's parent.
    pub fn parent(&self) -> u64 {
        self.parent
    }

    /// Leaf or parent.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Block data for leaves.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

/// An immutable hashed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<H> {
    index: u64,
    parent: u64,
    kind: NodeKind,
    data: Option<Vec<u8>>,
    hash: H,
}

impl<H> Node<H> {
    /// Attach `hash` to `partial`.
    pub fn new(partial: PartialNode, hash: H) -> Self {
        Node {
            index: partial.index,
            parent: partial.parent,
            kind: partial.kind,
            data: partial.data,
            hash,
        }
    }

    /// Flat-tree index of the node.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Flat-tree index of the node's parent.
    pub fn parent(&self) -> u64 {
        self.parent
    }

    /// Leaf or parent.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns `true` for leaves.
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    /// Block data for leaves; `None` for parents.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// The node hash.
    pub fn hash(&self) -> &H {
        &self.hash
    }
}

impl<H: AsRef<[u8]>> fmt::Display for Node<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}: {}",
            self.kind,
            self.index,
            self.parent,
            hex::encode(self.hash.as_ref())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_nodes() {
        let leaf = PartialNode::leaf(10, b"hello".to_vec());
        assert_eq!(leaf.index(), 10);
        assert_eq!(leaf.parent(), 9);
        assert_eq!(leaf.kind(), NodeKind::Leaf);
        assert_eq!(leaf.data(), Some(&b"hello"[..]));

        let internal = PartialNode::internal(3);
        assert_eq!(internal.parent(), 7);
        assert_eq!(internal.kind(), NodeKind::Parent);
        assert_eq!(internal.data(), None);
    }

    #[test]
    fn test_parent_agrees_before_and_after_hashing() {
        for partial in [PartialNode::leaf(6, Vec::new()), PartialNode::internal(11)] {
            let parent = partial.parent();
            assert_eq!(Node::new(partial, [0u8; 1]).parent(), parent);
        }
    }

    #[test]
    fn test_node_keeps_partial_fields() {
        let node = Node::new(PartialNode::internal(5), [0xabu8; 4]);
        assert_eq!(node.index(), 5);
        assert_eq!(node.parent(), 3);
        assert!(!node.is_leaf());
        assert_eq!(node.data(), None);
        assert_eq!(node.hash(), &[0xab; 4]);
    }

    #[test]
    fn test_display() {
        let node = Node::new(PartialNode::leaf(2, b"x".to_vec()), [0x01u8, 0xff]);
        assert_eq!(node.to_string(), "leaf 2 -> 1: 01ff");

        let node = Node::new(PartialNode::internal(1), [0u8; 2]);
        assert_eq!(node.to_string(), "parent 1 -> 3: 0000");
    }
}
