//! Node hashing strategies.
//!
//! - [`Blake2b512Hasher`]: leaf = `blake2b512(data)`, parent =
//!   `blake2b512(left || right)`.
//! - [`Blake3Hasher`]: leaf = `blake3(0x00 || data)`, parent =
//!   `blake3(0x01 || left || right)`.

use std::fmt;

use blake2::{Blake2b512, Digest};

use crate::{Node, PartialNode};

/// A 64-byte digest.
pub type Hash64 = [u8; 64];
/// A 32-byte digest.
pub type Hash32 = [u8; 32];

/// Domain tag prepended to BLAKE3 leaf inputs.
const LEAF_TAG: u8 = 0x00;
/// Domain tag prepended to BLAKE3 parent inputs.
const PARENT_TAG: u8 = 0x01;

/// Hashes leaves and parents for a [`Stream`](crate::Stream) and builds the
/// nodes that carry those hashes.
pub trait NodeHasher {
    /// The digest type stored in every node.
    type Hash: Clone + AsRef<[u8]> + fmt::Debug + Eq + Send + Sync;

    /// Hash the data of a leaf.
    fn hash_leaf(&self, data: &[u8]) -> Self::Hash;

    /// Hash a parent from the hashes of its children.
    fn hash_parent(&self, left: &Self::Hash, right: &Self::Hash) -> Self::Hash;

    /// Combine a partial node with its hash.
    fn build(&self, partial: PartialNode, hash: Self::Hash) -> Node<Self::Hash> {
        Node::new(partial, hash)
    }
}

/// BLAKE2b with a 512-bit output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake2b512Hasher;

impl Blake2b512Hasher {
    fn digest(parts: &[&[u8]]) -> Hash64 {
        let mut hasher = Blake2b512::new();
        for part in parts {
            hasher.update(part);
        }
        let mut hash = [0u8; 64];
        hash.copy_from_slice(&hasher.finalize());
        hash
    }
}

impl NodeHasher for Blake2b512Hasher {
    type Hash = Hash64;

    fn hash_leaf(&self, data: &[u8]) -> Hash64 {
        Self::digest(&[data])
    }

    fn hash_parent(&self, left: &Hash64, right: &Hash64) -> Hash64 {
        Self::digest(&[left.as_slice(), right.as_slice()])
    }
}

/// Domain-separated BLAKE3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3Hasher;

impl NodeHasher for Blake3Hasher {
    type Hash = Hash32;

    fn hash_leaf(&self, data: &[u8]) -> Hash32 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[LEAF_TAG]);
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    fn hash_parent(&self, left: &Hash32, right: &Hash32) -> Hash32 {
        let mut input = [0u8; 65];
        input[0] = PARENT_TAG;
        input[1..33].copy_from_slice(left);
        input[33..65].copy_from_slice(right);
        *blake3::hash(&input).as_bytes()
    }
}
