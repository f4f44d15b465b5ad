// src/merkle/state_tree.rs
//! Layout of the rollup state tree and proof construction
//!
//! The state root is the parent of two subtrees: the account side, holding
//! account and asset leaves, and the NFT tree. Every account-side proof
//! therefore ends with the NFT root as its topmost sibling, which is what lets
//! an exit claim authenticate the NFT root it presents.

use super::merkle_tree::{hash_pair, MerkleTree};
use crate::desert::{AccountExitData, AssetExitData, NftExitData};
use crate::{AccountId, AssetId, Hash, NftIndex};
use std::collections::BTreeMap;

/// Collects leaves for a [`StateTree`]
#[derive(Debug, Clone, Default)]
pub struct StateTreeBuilder {
    accounts: Vec<AccountExitData>,
    assets: Vec<(AccountId, AssetExitData)>,
    nfts: Vec<NftExitData>,
}

impl StateTreeBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account leaf
    pub fn account(mut self, account: AccountExitData) -> Self {
        self.accounts.push(account);
        self
    }

    /// Add an asset balance leaf owned by `account_id`
    pub fn asset(mut self, account_id: AccountId, asset: AssetExitData) -> Self {
        self.assets.push((account_id, asset));
        self
    }

    /// Add an NFT leaf
    pub fn nft(mut self, nft: NftExitData) -> Self {
        self.nfts.push(nft);
        self
    }

    /// Build the tree
    pub fn build(self) -> StateTree {
        let mut leaves = Vec::with_capacity(self.accounts.len() + self.assets.len());
        let mut account_positions = BTreeMap::new();
        let mut asset_positions = BTreeMap::new();

        for account in &self.accounts {
            account_positions.insert(account.account_id, leaves.len());
            leaves.push(account.leaf_bytes());
        }
        for (account_id, asset) in &self.assets {
            asset_positions.insert((*account_id, asset.asset_id), leaves.len());
            leaves.push(asset.leaf_bytes(*account_id));
        }

        let nft_leaves: Vec<Vec<u8>> = self.nfts.iter().map(NftExitData::leaf_bytes).collect();
        let nft_positions = self
            .nfts
            .iter()
            .enumerate()
            .map(|(position, nft)| (nft.nft_index, position))
            .collect();

        StateTree {
            account_side: MerkleTree::from_leaf_bytes(&leaves),
            nft_tree: MerkleTree::from_leaf_bytes(&nft_leaves),
            account_positions,
            asset_positions,
            nft_positions,
        }
    }
}

/// A built state tree able to produce exit proofs
#[derive(Debug, Clone)]
pub struct StateTree {
    account_side: MerkleTree,
    nft_tree: MerkleTree,
    account_positions: BTreeMap<AccountId, usize>,
    asset_positions: BTreeMap<(AccountId, AssetId), usize>,
    nft_positions: BTreeMap<NftIndex, usize>,
}

impl StateTree {
    /// Root committing to accounts, assets and NFTs
    pub fn state_root(&self) -> Hash {
        hash_pair(&self.account_side.root(), &self.nft_tree.root())
    }

    /// Root of the NFT subtree
    pub fn nft_root(&self) -> Hash {
        self.nft_tree.root()
    }

    /// Root of the account side, the sibling of the NFT root
    pub fn account_side_root(&self) -> Hash {
        self.account_side.root()
    }

    /// Proof of an account leaf under the state root
    pub fn account_proof(&self, account_id: AccountId) -> Option<Vec<Hash>> {
        let position = *self.account_positions.get(&account_id)?;
        Some(self.account_side_proof(position))
    }

    /// Proof of an asset leaf under the state root
    pub fn asset_proof(&self, account_id: AccountId, asset_id: AssetId) -> Option<Vec<Hash>> {
        let position = *self.asset_positions.get(&(account_id, asset_id))?;
        Some(self.account_side_proof(position))
    }

    /// Proof of an NFT leaf under the NFT root
    pub fn nft_proof(&self, nft_index: NftIndex) -> Option<Vec<Hash>> {
        let position = *self.nft_positions.get(&nft_index)?;
        Some(self.nft_tree.generate_proof(position))
    }

    fn account_side_proof(&self, position: usize) -> Vec<Hash> {
        let mut proof = self.account_side.generate_proof(position);
        proof.push(self.nft_tree.root());
        proof
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::{LeafVerifier, Sha256MerkleVerifier};

    fn account(account_id: AccountId) -> AccountExitData {
        AccountExitData {
            account_id,
            l1_address: [account_id as u8; 20],
            pub_key_x: [1; 32],
            pub_key_y: [2; 32],
            nonce: 0,
            collection_nonce: 0,
        }
    }

    #[test]
    fn test_proofs_verify_against_state_root() {
        let asset = AssetExitData {
            asset_id: 0,
            amount: 500,
            offer_canceled_or_finalized: 0,
        };
        let nft = NftExitData {
            nft_index: 9,
            owner_account_index: 2,
            creator_account_index: 2,
            creator_treasury_rate: 0,
            collection_id: 0,
            content_hash: [[3; 32], [4; 32]],
            content_type: 0,
        };
        let tree = StateTreeBuilder::new()
            .account(account(2))
            .account(account(3))
            .asset(2, asset.clone())
            .nft(nft.clone())
            .build();
        let verifier = Sha256MerkleVerifier;
        let root = tree.state_root();

        let account_proof = tree.account_proof(2).unwrap();
        assert_eq!(account_proof.last(), Some(&tree.nft_root()));
        assert!(verifier.verify(&root, &account(2).leaf_bytes(), &account_proof));

        let asset_proof = tree.asset_proof(2, 0).unwrap();
        assert!(verifier.verify(&root, &asset.leaf_bytes(2), &asset_proof));
        assert!(!verifier.verify(&root, &asset.leaf_bytes(3), &asset_proof));

        let nft_proof = tree.nft_proof(9).unwrap();
        assert!(verifier.verify(&tree.nft_root(), &nft.leaf_bytes(), &nft_proof));

        assert!(tree.account_proof(4).is_none());
    }
}
