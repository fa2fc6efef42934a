//! Node presence tracking, digests and proofs.

use hyperlog_bitfield::Bitfield;
use hyperlog_flat_tree::{self as flat, TreeIterator};
use log::{debug, trace};

use crate::Result;

/// Where the verified region around an index ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verification {
    /// One past the rightmost verified leaf, as a leaf index. Zero when the
    /// queried index is not held.
    pub node: u64,
    /// The last node visited while descending the right edge.
    pub top: u64,
}

/// The nodes a peer needs in order to verify `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    index: u64,
    verified_by: u64,
    nodes: Vec<u64>,
}

impl Proof {
    /// The index being proven.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// The anchor leaf the proof is verified against, or 0 when the peer
    /// already holds a verified ancestor.
    pub fn verified_by(&self) -> u64 {
        self.verified_by
    }

    /// Node indices to send, starting with [`Proof::index`].
    pub fn nodes(&self) -> &[u64] {
        &self.nodes
    }

    /// Consume the proof, returning its node list.
    pub fn into_nodes(self) -> Vec<u64> {
        self.nodes
    }
}

/// One presence bit per flat-tree node.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    bitfield: Bitfield,
}

impl TreeIndex {
    /// An empty index over a default-sized bitfield.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing bitfield.
    pub fn with_bitfield(bitfield: Bitfield) -> Self {
        TreeIndex { bitfield }
    }

    /// The underlying bitfield.
    pub fn bitfield(&self) -> &Bitfield {
        &self.bitfield
    }

    /// Whether `index` is held.
    pub fn get(&self, index: u64) -> bool {
        self.bitfield.get_bit(index)
    }

    /// Mark `index` as held, then mark every ancestor whose children are
    /// both held. Returns `false` if `index` was already set.
    pub fn set(&mut self, mut index: u64) -> bool {
        if !self.bitfield.set_bit(index, true) {
            return false;
        }
        while self.bitfield.get_bit(flat::sibling(index)) {
            index = flat::parent(index);
            if !self.bitfield.set_bit(index, true) {
                break;
            }
        }
        true
    }

    /// Summarise which nodes on the path from `index` to its root are held.
    ///
    /// Returns 1 when `index` itself is held, or when the path reaches a held
    /// ancestor with every sibling along the way held. Otherwise bit 0 is set
    /// when a held ancestor was found and bit `k` (for `k >= 1`) is set when
    /// the sibling at level `k - 1` is held.
    pub fn digest(&self, index: u64) -> u64 {
        if self.get(index) {
            return 1;
        }

        let mut digest = 0;
        let mut next = flat::sibling(index);
        let max = (next + 2).max(self.bitfield.len());
        let mut bit = 2;
        let mut parent = flat::parent(next);

        while flat::right_span(next) < max || flat::left_span(parent) > 0 {
            if self.get(next) {
                digest |= bit;
            }
            if self.get(parent) {
                digest |= 2 * bit | 1;
                if digest + 1 == 4 * bit {
                    return 1;
                }
                return digest;
            }
            next = flat::sibling(parent);
            parent = flat::parent(next);
            bit *= 2;
        }
        digest
    }

    /// Find how far the verified region containing `index` extends to the
    /// right.
    pub fn verified_by(&self, index: u64) -> Verification {
        if !self.get(index) {
            return Verification::default();
        }

        let mut top = index;
        while self.get(flat::parent(top)) && self.get(flat::sibling(top)) {
            top = flat::parent(top);
        }

        let mut iter = TreeIterator::new(top);
        while iter.factor() > 2 {
            iter.next();
            iter.left_child();
            while !self.get(iter.index()) && iter.factor() > 2 {
                iter.left_child();
            }
        }

        let top = iter.index();
        let node = if self.get(top) { top + 2 } else { top };
        Verification { node, top }
    }

    /// Build the proof for `index` against a peer that sent
    /// `remote_digest`.
    ///
    /// `remote_tree` collects the nodes the digest says the peer already
    /// holds; a scratch tree is used when it is `None`. Returns `Ok(None)`
    /// when `index` is not held locally.
    pub fn proof(
        &self,
        index: u64,
        remote_digest: u64,
        remote_tree: Option<&mut TreeIndex>,
    ) -> Result<Option<Proof>> {
        if !self.get(index) {
            return Ok(None);
        }

        let mut nodes = vec![index];
        if remote_digest == 1 {
            return Ok(Some(Proof {
                index,
                verified_by: 0,
                nodes,
            }));
        }

        let mut scratch;
        let remote = match remote_tree {
            Some(tree) => tree,
            None => {
                scratch = TreeIndex::default();
                &mut scratch
            }
        };

        let has_root = remote_digest & 1 == 1;
        let mut digest = remote_digest >> 1;
        let mut next = index;
        let len = self.bitfield.len();
        while digest > 0 {
            // past the local tree or the top of the index space, so no
            // remaining level holds anything locally
            if flat::depth(next) >= 62 || (flat::left_span(next) == 0 && next >= len) {
                trace!("digest for {} stopped at {}", index, next);
                break;
            }
            if digest == 1 && has_root {
                if self.get(next) {
                    remote.set(next);
                }
                // holding a root implies holding every root to its left
                for root in flat::full_roots(flat::right_span(next) + 2)? {
                    if self.get(root) {
                        remote.set(root);
                    }
                }
                break;
            }
            let sibling = flat::sibling(next);
            if digest & 1 == 1 && self.get(sibling) {
                remote.set(sibling);
            }
            next = flat::parent(next);
            digest >>= 1;
        }

        next = index;
        while !remote.get(next) {
            let sibling = flat::sibling(next);
            if !self.get(sibling) {
                let verified_by = self.verified_by(next).node;
                let roots = flat::full_roots(verified_by)?;
                nodes.extend(
                    roots
                        .into_iter()
                        .filter(|root| *root != next && !remote.get(*root)),
                );
                debug!(
                    "proof for {} anchored at {} with {} nodes",
                    index,
                    verified_by,
                    nodes.len()
                );
                return Ok(Some(Proof {
                    index,
                    verified_by,
                    nodes,
                }));
            }
            if !remote.get(sibling) {
                nodes.push(sibling);
            }
            next = flat::parent(next);
        }

        trace!("proof for {} reached remote node {}", index, next);
        Ok(Some(Proof {
            index,
            verified_by: 0,
            nodes,
        }))
    }

    /// Number of leaves in the verified run starting at leaf 0.
    pub fn blocks(&self) -> u64 {
        let mut top = 0;
        let mut next = 0;
        let max = self.bitfield.len();

        while flat::right_span(next) < max {
            next = flat::parent(next);
            if self.get(next) {
                top = next;
            }
        }

        let node = if self.get(top) {
            self.verified_by(top).node
        } else {
            0
        };
        node / 2
    }

    /// Root nodes of the verified run starting at leaf 0.
    pub fn roots(&self) -> Result<Vec<u64>> {
        Ok(flat::full_roots(2 * self.blocks())?)
    }

    /// The bitfield image, run-length encoded when that is smaller. The
    /// flag reports whether the bytes are encoded.
    pub fn to_compressed(&self) -> (Vec<u8>, bool) {
        self.bitfield.to_compressed()
    }

    /// Rebuild an index from [`TreeIndex::to_compressed`] output whose
    /// bitfield image is at most `max_byte_length` bytes.
    pub fn from_compressed(
        page_size: usize,
        bytes: &[u8],
        encoded: bool,
        max_byte_length: u64,
    ) -> Result<Self> {
        Ok(Self::with_bitfield(Bitfield::from_compressed(
            page_size,
            bytes,
            encoded,
            max_byte_length,
        )?))
    }
}
