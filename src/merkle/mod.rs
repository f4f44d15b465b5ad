// src/merkle/mod.rs
//! Merkle proofs for exit claims
//!
//! The controller only depends on [`LeafVerifier`]. The bundled SHA-256 tree
//! and [`StateTreeBuilder`] produce roots and proofs in the matching layout.

mod leaf_verifier;
mod merkle_tree;
mod state_tree;

pub use leaf_verifier::{LeafVerifier, Sha256MerkleVerifier};
pub use merkle_tree::{hash_leaf, hash_pair, MerkleTree};
pub use state_tree::{StateTree, StateTreeBuilder};
