// src/merkle/leaf_verifier.rs
//! Leaf inclusion verification against a frozen root

use super::merkle_tree::{hash_leaf, MerkleTree};
use crate::Hash;

/// Checks that an encoded leaf is included under `root`.
///
/// Implementations must be pure reads: an exit claim is only marked after
/// verification returns, and nothing may change in between.
pub trait LeafVerifier {
    /// True if `leaf` is included under `root` along `proof`
    fn verify(&self, root: &Hash, leaf: &[u8], proof: &[Hash]) -> bool;
}

/// Verifier for trees built with [`MerkleTree`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256MerkleVerifier;

impl LeafVerifier for Sha256MerkleVerifier {
    fn verify(&self, root: &Hash, leaf: &[u8], proof: &[Hash]) -> bool {
        MerkleTree::verify_proof(root, &hash_leaf(leaf), proof)
    }
}
