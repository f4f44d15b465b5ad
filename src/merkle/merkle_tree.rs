// src/merkle/merkle_tree.rs
//! Merkle Tree implementation for exit proofs
//!
//! Leaves and inner nodes are domain separated and sibling pairs are hashed in
//! sorted order, so a proof is just the list of siblings from leaf to root.

use crate::Hash;
use sha2::{Digest, Sha256};

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// Hash raw leaf bytes into a tree leaf
pub fn hash_leaf(leaf: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(leaf);
    hasher.finalize().into()
}

/// Hash two sibling nodes, order independent
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Merkle Tree implementation
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// Hashed leaves of the tree
    leaves: Vec<Hash>,

    /// Root of the tree
    root: Hash,
}

impl MerkleTree {
    /// Create a new Merkle tree from already hashed leaves
    pub fn new(leaves: Vec<Hash>) -> Self {
        let mut tree = Self {
            leaves,
            root: [0; 32],
        };

        if !tree.leaves.is_empty() {
            tree.root = tree.calculate_root();
        }

        tree
    }

    /// Create a Merkle tree from raw leaf encodings
    pub fn from_leaf_bytes<B: AsRef<[u8]>>(leaves: &[B]) -> Self {
        Self::new(leaves.iter().map(|leaf| hash_leaf(leaf.as_ref())).collect())
    }

    /// Get the root of the tree
    pub fn root(&self) -> Hash {
        self.root
    }

    /// Calculate the root of the tree
    fn calculate_root(&self) -> Hash {
        let mut current_level = self.leaves.clone();

        while current_level.len() > 1 {
            current_level = Self::next_level(&current_level);
        }

        current_level[0]
    }

    fn next_level(level: &[Hash]) -> Vec<Hash> {
        level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                // An odd node is paired with itself
                [single] => hash_pair(single, single),
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect()
    }

    /// Generate a Merkle proof for a leaf
    pub fn generate_proof(&self, index: usize) -> Vec<Hash> {
        if index >= self.leaves.len() {
            return Vec::new();
        }

        let mut proof = Vec::new();
        let mut current_index = index;
        let mut current_level = self.leaves.clone();

        while current_level.len() > 1 {
            let sibling_index = current_index ^ 1;
            let sibling = current_level
                .get(sibling_index)
                .copied()
                .unwrap_or(current_level[current_index]);
            proof.push(sibling);

            current_level = Self::next_level(&current_level);
            current_index /= 2;
        }

        proof
    }

    /// Verify a Merkle proof for an already hashed leaf
    pub fn verify_proof(root: &Hash, leaf: &Hash, proof: &[Hash]) -> bool {
        let computed = proof
            .iter()
            .fold(*leaf, |current, sibling| hash_pair(&current, sibling));

        computed == *root
    }

    /// Get the number of leaves in the tree
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}
