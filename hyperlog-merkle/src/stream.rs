//! The append-only hash stream.

use std::sync::Arc;

use hyperlog_flat_tree as flat;
use log::{debug, trace};
use parking_lot::Mutex;

use crate::{MerkleError, Node, NodeHasher, PartialNode, Result};

#[derive(Debug)]
struct StreamState<H> {
    roots: Vec<Arc<Node<H>>>,
    nodes: Vec<Arc<Node<H>>>,
    blocks: u64,
}

/// Builds Merkle nodes as blocks are appended.
///
/// All state sits behind one mutex that [`Stream::append`] holds for the
/// leaf insertion and the whole merge cascade, so a stream can be shared
/// between threads by reference.
#[derive(Debug)]
pub struct Stream<N: NodeHasher> {
    hasher: N,
    state: Mutex<StreamState<N::Hash>>,
}

impl<N: NodeHasher + Default> Default for Stream<N> {
    fn default() -> Self {
        Self::new(N::default())
    }
}

impl<N: NodeHasher> Stream<N> {
    /// An empty stream.
    pub fn new(hasher: N) -> Self {
        Stream {
            hasher,
            state: Mutex::new(StreamState {
                roots: Vec::new(),
                nodes: Vec::new(),
                blocks: 0,
            }),
        }
    }

    /// Resume from previously built roots and nodes.
    ///
    /// The block count is taken from the right span of the last root, and
    /// the root indices must be exactly the full roots of that many leaves.
    pub fn with_nodes(
        hasher: N,
        roots: Vec<Arc<Node<N::Hash>>>,
        nodes: Vec<Arc<Node<N::Hash>>>,
    ) -> Result<Self> {
        let blocks = roots
            .last()
            .map_or(0, |root| flat::right_span(root.index()) / 2 + 1);
        let expected = flat::full_roots(2 * blocks)?;
        let found: Vec<u64> = roots.iter().map(|root| root.index()).collect();
        if expected != found {
            return Err(MerkleError::InvalidRoots { expected, found });
        }

        debug!(
            "resuming stream at {} blocks with {} nodes",
            blocks,
            nodes.len()
        );
        Ok(Stream {
            hasher,
            state: Mutex::new(StreamState {
                roots,
                nodes,
                blocks,
            }),
        })
    }

    /// Append a block and merge completed sibling roots. Returns the leaf
    /// index of the block.
    pub fn append(&self, data: &[u8]) -> u64 {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let index = 2 * state.blocks;
        let hash = self.hasher.hash_leaf(data);
        let leaf = Arc::new(
            self.hasher
                .build(PartialNode::leaf(index, data.to_vec()), hash),
        );
        state.roots.push(Arc::clone(&leaf));
        state.nodes.push(leaf);
        state.blocks += 1;

        while let [.., left, right] = state.roots.as_slice() {
            if left.parent() != right.parent() {
                break;
            }
            let hash = self.hasher.hash_parent(left.hash(), right.hash());
            let parent = Arc::new(self.hasher.build(PartialNode::internal(left.parent()), hash));
            trace!(
                "merged {} and {} into {}",
                left.index(),
                right.index(),
                parent.index()
            );

            let len = state.roots.len();
            state.roots.truncate(len - 2);
            state.roots.push(Arc::clone(&parent));
            state.nodes.push(parent);
        }

        index
    }

    /// The current roots, left to right.
    pub fn roots(&self) -> Vec<Arc<Node<N::Hash>>> {
        self.state.lock().roots.clone()
    }

    /// Every node built so far, in creation order.
    pub fn nodes(&self) -> Vec<Arc<Node<N::Hash>>> {
        self.state.lock().nodes.clone()
    }

    /// Number of appended blocks.
    pub fn blocks(&self) -> u64 {
        self.state.lock().blocks
    }

    /// The hasher in use.
    pub fn hasher(&self) -> &N {
        &self.hasher
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::*;
    use crate::{Blake2b512Hasher, Blake3Hasher};

    fn counts<N: NodeHasher>(stream: &Stream<N>) -> (usize, usize) {
        let nodes = stream.nodes();
        let leaves = nodes.iter().filter(|node| node.is_leaf()).count();
        (leaves, nodes.len() - leaves)
    }

    fn root_indices<N: NodeHasher>(stream: &Stream<N>) -> Vec<u64> {
        stream.roots().iter().map(|root| root.index()).collect()
    }

    #[test]
    fn test_new_stream_is_empty() {
        let stream = Stream::new(Blake2b512Hasher);
        assert!(stream.roots().is_empty());
        assert!(stream.nodes().is_empty());
        assert_eq!(stream.blocks(), 0);
    }

    #[test]
    fn test_append_counts() {
        let stream = Stream::<Blake2b512Hasher>::default();

        assert_eq!(stream.append(b"hello, world!"), 0);
        assert_eq!(counts(&stream), (1, 0));

        assert_eq!(stream.append(b"foo"), 2);
        assert_eq!(counts(&stream), (2, 1));

        assert_eq!(stream.append(b"bar"), 4);
        assert_eq!(counts(&stream), (3, 1));
        assert_eq!(root_indices(&stream), vec![1, 4]);

        assert_eq!(stream.append(b"baz"), 6);
        assert_eq!(counts(&stream), (4, 3));
        assert_eq!(root_indices(&stream), vec![3]);
        assert_eq!(stream.blocks(), 4);
    }

    #[test]
    fn test_parent_hash() {
        let stream = Stream::new(Blake2b512Hasher);
        stream.append(b"a");
        stream.append(b"b");

        let hasher = stream.hasher();
        let expected = hasher.hash_parent(&hasher.hash_leaf(b"a"), &hasher.hash_leaf(b"b"));

        let roots = stream.roots();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].index(), 1);
        assert_eq!(roots[0].hash(), &expected);
        assert_eq!(roots[0].data(), None);

        let nodes = stream.nodes();
        assert_eq!(nodes[0].data(), Some(&b"a"[..]));
        assert_eq!(nodes[1].data(), Some(&b"b"[..]));
    }

    #[test]
    fn test_resume_matches_uninterrupted_stream() {
        let full = Stream::new(Blake3Hasher);
        let partial = Stream::new(Blake3Hasher);
        for block in [b"a", b"b", b"c"] {
            full.append(block);
            partial.append(block);
        }

        let resumed =
            Stream::with_nodes(Blake3Hasher, partial.roots(), partial.nodes()).expect("resume");
        assert_eq!(resumed.blocks(), 3);

        assert_eq!(full.append(b"d"), 6);
        assert_eq!(resumed.append(b"d"), 6);
        assert_eq!(root_indices(&resumed), vec![3]);
        assert_eq!(resumed.roots()[0].hash(), full.roots()[0].hash());
        assert_eq!(resumed.nodes().len(), full.nodes().len());
    }

    #[test]
    fn test_resume_rejects_incomplete_roots() {
        let stream = Stream::new(Blake2b512Hasher);
        stream.append(b"a");
        stream.append(b"b");
        let leaf = Arc::clone(&stream.nodes()[1]);

        assert_matches!(
            Stream::with_nodes(Blake2b512Hasher, vec![leaf], Vec::new()),
            Err(MerkleError::InvalidRoots { expected, found })
                if expected == vec![1] && found == vec![2]
        );

        let empty = Stream::with_nodes(Blake2b512Hasher, Vec::new(), Vec::new()).expect("empty");
        assert_eq!(empty.blocks(), 0);
    }

    #[test]
    fn test_concurrent_appends() {
        let stream = Stream::new(Blake2b512Hasher);
        thread::scope(|scope| {
            for worker in 0..4u8 {
                let stream = &stream;
                scope.spawn(move || {
                    for block in 0..50u8 {
                        stream.append(&[worker, block]);
                    }
                });
            }
        });

        assert_eq!(stream.blocks(), 200);
        assert_eq!(
            root_indices(&stream),
            flat::full_roots(400).expect("even limit")
        );
        let (leaves, parents) = counts(&stream);
        assert_eq!(leaves, 200);
        assert_eq!(parents, 200 - stream.roots().len());
    }

    proptest! {
        #[test]
        fn roots_are_full_roots(blocks in 0u64..300) {
            let stream = Stream::new(Blake3Hasher);
            for block in 0..blocks {
                stream.append(&block.to_le_bytes());
            }
            prop_assert_eq!(stream.blocks(), blocks);
            prop_assert_eq!(root_indices(&stream), flat::full_roots(2 * blocks).expect("even"));
        }
    }
}
