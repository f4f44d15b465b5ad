// src/desert/claim.rs
//! Exit claims in the operator tooling's JSON format
//!
//! Keys are PascalCase, roots and proof elements are hex strings with or
//! without a `0x` prefix. Short hex values are left-padded to 32 bytes.
//! Amounts may be JSON numbers or decimal strings.
//!
//! Public keys differ between the two claim kinds. Asset claims carry them as
//! 256-bit integers (decimal, or hex with a `0x` prefix) while NFT claims carry
//! bare hex. NFT claims name either the NFT root or the account-side root
//! (`AssetRoot`); in the latter case the NFT root is the top sibling of the
//! account proof and the pair must hash to the block's state root.

use super::exit_data::{AccountExitData, AssetExitData, NftExitData};
use crate::error_handling::{DesertError, DesertResult};
use crate::finalization::StoredBlockInfo;
use crate::merkle::hash_pair;
use crate::{AccountId, AssetId, Hash, L1Address, NftIndex};
use serde::Deserialize;
use std::path::Path;

/// A parsed asset exit claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetExitClaim {
    /// Block the claim is made against
    pub block_info: StoredBlockInfo,

    /// NFT root claimed alongside the account side
    pub nft_root: Hash,

    /// Asset leaf
    pub asset_exit: AssetExitData,

    /// Account leaf
    pub account_exit: AccountExitData,

    /// Proof of the asset leaf
    pub asset_proof: Vec<Hash>,

    /// Proof of the account leaf
    pub account_proof: Vec<Hash>,
}

/// A parsed NFT exit claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftExitClaim {
    /// Block the claim is made against
    pub block_info: StoredBlockInfo,

    /// NFT root the NFT proofs lead to
    pub nft_root: Hash,

    /// Account-side root, when the claim names it
    pub asset_root: Option<Hash>,

    /// Account leaf
    pub account_exit: AccountExitData,

    /// NFT leaves
    pub nfts: Vec<NftExitData>,

    /// Proof of the account leaf
    pub account_proof: Vec<Hash>,

    /// One proof per NFT
    pub nft_proofs: Vec<Vec<Hash>>,
}

impl AssetExitClaim {
    /// Parse a claim from JSON text
    pub fn from_json_str(json: &str) -> DesertResult<Self> {
        let raw: RawAssetExitClaim = serde_json::from_str(json)
            .map_err(|e| DesertError::Serialization(format!("invalid asset exit claim: {}", e)))?;

        Ok(Self {
            block_info: raw.stored_block_info.parse()?,
            nft_root: parse_hash("NftRoot", &raw.nft_root)?,
            asset_exit: raw.asset_exit_data.parse()?,
            account_exit: raw.account_exit_data.parse(KeyEncoding::Integer)?,
            asset_proof: parse_proof("AssetMerkleProof", &raw.asset_merkle_proof)?,
            account_proof: parse_proof("AccountMerkleProof", &raw.account_merkle_proof)?,
        })
    }

    /// Read and parse a claim file
    pub fn from_file(path: impl AsRef<Path>) -> DesertResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

impl NftExitClaim {
    /// Parse a claim from JSON text
    pub fn from_json_str(json: &str) -> DesertResult<Self> {
        let raw: RawNftExitClaim = serde_json::from_str(json)
            .map_err(|e| DesertError::Serialization(format!("invalid nft exit claim: {}", e)))?;

        let nfts = raw
            .exit_nfts
            .iter()
            .map(RawNftExitData::parse)
            .collect::<DesertResult<Vec<_>>>()?;
        let nft_proofs = raw
            .nft_merkle_proofs
            .iter()
            .map(|proof| parse_proof("NftMerkleProofs", proof))
            .collect::<DesertResult<Vec<_>>>()?;

        let block_info = raw.stored_block_info.parse()?;
        let account_proof = parse_proof("AccountMerkleProof", &raw.account_merkle_proof)?;
        let asset_root = raw
            .asset_root
            .as_deref()
            .map(|root| parse_hash("AssetRoot", root))
            .transpose()?;
        let nft_root = match (&raw.nft_root, asset_root) {
            (Some(nft_root), _) => parse_hash("NftRoot", nft_root)?,
            (None, Some(_)) => *account_proof.last().ok_or_else(|| {
                DesertError::Serialization(
                    "AccountMerkleProof: empty, cannot take the nft root from it".to_string(),
                )
            })?,
            (None, None) => {
                return Err(DesertError::Serialization(
                    "invalid nft exit claim: missing field `NftRoot` or `AssetRoot`".to_string(),
                ))
            }
        };

        if let Some(asset_root) = asset_root {
            if hash_pair(&asset_root, &nft_root) != block_info.state_root {
                return Err(DesertError::ProofRejected(format!(
                    "asset root 0x{} and nft root 0x{} do not form state root 0x{}",
                    hex::encode(asset_root),
                    hex::encode(nft_root),
                    hex::encode(block_info.state_root)
                )));
            }
        }

        Ok(Self {
            block_info,
            nft_root,
            asset_root,
            account_exit: raw.account_exit_data.parse(KeyEncoding::Hex)?,
            nfts,
            account_proof,
            nft_proofs,
        })
    }

    /// Read and parse a claim file
    pub fn from_file(path: impl AsRef<Path>) -> DesertResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawAssetExitClaim {
    stored_block_info: RawBlockInfo,
    nft_root: String,
    asset_exit_data: RawAssetExitData,
    account_exit_data: RawAccountExitData,
    asset_merkle_proof: Vec<String>,
    account_merkle_proof: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawNftExitClaim {
    stored_block_info: RawBlockInfo,
    nft_root: Option<String>,
    asset_root: Option<String>,
    account_exit_data: RawAccountExitData,
    exit_nfts: Vec<RawNftExitData>,
    account_merkle_proof: Vec<String>,
    nft_merkle_proofs: Vec<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawBlockInfo {
    block_size: u16,
    block_number: u32,
    priority_operations: u64,
    pending_onchain_operations_hash: String,
    timestamp: u64,
    state_root: String,
    commitment: String,
}

impl RawBlockInfo {
    fn parse(&self) -> DesertResult<StoredBlockInfo> {
        Ok(StoredBlockInfo {
            block_size: self.block_size,
            block_number: self.block_number,
            priority_operations: self.priority_operations,
            pending_onchain_operations_hash: parse_hash(
                "PendingOnchainOperationsHash",
                &self.pending_onchain_operations_hash,
            )?,
            timestamp: self.timestamp,
            state_root: parse_hash("StateRoot", &self.state_root)?,
            commitment: parse_hash("Commitment", &self.commitment)?,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawAssetExitData {
    asset_id: AssetId,
    amount: RawNumber,
    offer_canceled_or_finalized: RawNumber,
}

impl RawAssetExitData {
    fn parse(&self) -> DesertResult<AssetExitData> {
        Ok(AssetExitData {
            asset_id: self.asset_id,
            amount: self.amount.parse_u128("Amount")?,
            offer_canceled_or_finalized: self
                .offer_canceled_or_finalized
                .parse_u128("OfferCanceledOrFinalized")?,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawAccountExitData {
    account_id: AccountId,
    l1_address: String,
    pub_key_x: RawNumber,
    pub_key_y: RawNumber,
    nonce: u64,
    collection_nonce: u64,
}

/// How a claim writes public key coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyEncoding {
    /// 256-bit integer, decimal unless `0x`-prefixed
    Integer,

    /// Hex digits, prefix optional
    Hex,
}

impl RawAccountExitData {
    fn parse(&self, keys: KeyEncoding) -> DesertResult<AccountExitData> {
        Ok(AccountExitData {
            account_id: self.account_id,
            l1_address: parse_address("L1Address", &self.l1_address)?,
            pub_key_x: self.pub_key_x.parse_key("PubKeyX", keys)?,
            pub_key_y: self.pub_key_y.parse_key("PubKeyY", keys)?,
            nonce: self.nonce,
            collection_nonce: self.collection_nonce,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawNftExitData {
    nft_index: NftIndex,
    owner_account_index: AccountId,
    creator_account_index: AccountId,
    creator_treasury_rate: u16,
    collection_id: u64,
    nft_content_hash1: String,
    nft_content_hash2: String,
    nft_content_type: u8,
}

impl RawNftExitData {
    fn parse(&self) -> DesertResult<NftExitData> {
        Ok(NftExitData {
            nft_index: self.nft_index,
            owner_account_index: self.owner_account_index,
            creator_account_index: self.creator_account_index,
            creator_treasury_rate: self.creator_treasury_rate,
            collection_id: self.collection_id,
            content_hash: [
                parse_hash("NftContentHash1", &self.nft_content_hash1)?,
                parse_hash("NftContentHash2", &self.nft_content_hash2)?,
            ],
            content_type: self.nft_content_type,
        })
    }
}

/// Integers that exceed u64 in practice, so tooling writes them as strings
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(u64),
    Text(String),
}

impl RawNumber {
    fn parse_u128(&self, field: &str) -> DesertResult<u128> {
        match self {
            RawNumber::Number(value) => Ok(u128::from(*value)),
            RawNumber::Text(text) => text.trim().parse::<u128>().map_err(|e| {
                DesertError::Serialization(format!("{}: invalid amount {:?}: {}", field, text, e))
            }),
        }
    }

    fn parse_key(&self, field: &str, keys: KeyEncoding) -> DesertResult<Hash> {
        match (self, keys) {
            (RawNumber::Number(value), KeyEncoding::Integer) => {
                let mut key = [0u8; 32];
                key[24..].copy_from_slice(&value.to_be_bytes());
                Ok(key)
            }
            (RawNumber::Number(value), KeyEncoding::Hex) => Err(DesertError::Serialization(format!(
                "{}: expected a hex string, got the number {}",
                field, value
            ))),
            (RawNumber::Text(text), KeyEncoding::Integer) => {
                let text = text.trim();
                if text.starts_with("0x") || text.starts_with("0X") {
                    parse_hash(field, text)
                } else {
                    parse_decimal_u256(field, text)
                }
            }
            (RawNumber::Text(text), KeyEncoding::Hex) => parse_hash(field, text),
        }
    }
}

/// Big-endian bytes of a decimal integer below 2^256
fn parse_decimal_u256(field: &str, digits: &str) -> DesertResult<Hash> {
    if digits.is_empty() {
        return Err(DesertError::Serialization(format!("{}: empty integer", field)));
    }

    let mut value = [0u8; 32];
    for c in digits.chars() {
        let digit = c.to_digit(10).ok_or_else(|| {
            DesertError::Serialization(format!("{}: invalid decimal digit {:?}", field, c))
        })?;

        // value = value * 10 + digit
        let mut carry = digit;
        for byte in value.iter_mut().rev() {
            let next = u32::from(*byte) * 10 + carry;
            *byte = (next & 0xff) as u8;
            carry = next >> 8;
        }
        if carry != 0 {
            return Err(DesertError::Serialization(format!(
                "{}: {} does not fit in 256 bits",
                field, digits
            )));
        }
    }
    Ok(value)
}

fn decode_hex(field: &str, value: &str, max_len: usize) -> DesertResult<Vec<u8>> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    let padded;
    let digits = if digits.len() % 2 == 1 {
        padded = format!("0{}", digits);
        padded.as_str()
    } else {
        digits
    };

    let bytes = hex::decode(digits)
        .map_err(|e| DesertError::Serialization(format!("{}: invalid hex: {}", field, e)))?;
    if bytes.len() > max_len {
        return Err(DesertError::Serialization(format!(
            "{}: {} bytes, expected at most {}",
            field,
            bytes.len(),
            max_len
        )));
    }
    Ok(bytes)
}

fn parse_hash(field: &str, value: &str) -> DesertResult<Hash> {
    let bytes = decode_hex(field, value, 32)?;
    let mut hash = [0u8; 32];
    hash[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(hash)
}

fn parse_address(field: &str, value: &str) -> DesertResult<L1Address> {
    let bytes = decode_hex(field, value, 20)?;
    L1Address::try_from(bytes.as_slice()).map_err(|_| {
        DesertError::Serialization(format!("{}: expected 20 bytes, got {}", field, bytes.len()))
    })
}

fn parse_proof(field: &str, proof: &[String]) -> DesertResult<Vec<Hash>> {
    proof.iter().map(|element| parse_hash(field, element)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::{LeafVerifier, Sha256MerkleVerifier, StateTree, StateTreeBuilder};
    use serde_json::json;

    fn hexes(proof: &[Hash]) -> Vec<String> {
        proof.iter().map(hex::encode).collect()
    }

    fn account() -> AccountExitData {
        AccountExitData {
            account_id: 3,
            l1_address: [0xabu8; 20],
            pub_key_x: [1; 32],
            pub_key_y: [2; 32],
            nonce: 9,
            collection_nonce: 1,
        }
    }

    fn block_json(state_root: &Hash) -> serde_json::Value {
        json!({
            "BlockSize": 1,
            "BlockNumber": 4,
            "PriorityOperations": 0,
            "PendingOnchainOperationsHash": hex::encode([0u8; 32]),
            "Timestamp": 1_700_000_000u64,
            "StateRoot": hex::encode(state_root),
            "Commitment": format!("0x{}", hex::encode([5u8; 32])),
        })
    }

    #[test]
    fn test_asset_claim_parses_and_verifies() {
        let asset = AssetExitData {
            asset_id: 0,
            amount: 55_000_000_000,
            offer_canceled_or_finalized: 0,
        };
        let tree = StateTreeBuilder::new()
            .account(account())
            .asset(3, asset.clone())
            .build();
        let asset_proof = tree.asset_proof(3, 0).unwrap();
        let account_proof = tree.account_proof(3).unwrap();

        let claim = json!({
            "StoredBlockInfo": block_json(&tree.state_root()),
            "NftRoot": hex::encode(tree.nft_root()),
            "AssetExitData": {
                "AssetId": 0,
                "Amount": "55000000000",
                "OfferCanceledOrFinalized": 0,
            },
            "AccountExitData": {
                "AccountId": 3,
                "L1Address": format!("0x{}", hex::encode([0xabu8; 20])),
                "PubKeyX": format!("0x{}", hex::encode([1u8; 32])),
                "PubKeyY": format!("0x{}", hex::encode([2u8; 32])),
                "Nonce": 9,
                "CollectionNonce": 1,
            },
            "AssetMerkleProof": hexes(&asset_proof),
            "AccountMerkleProof": hexes(&account_proof),
        });

        let parsed = AssetExitClaim::from_json_str(&claim.to_string()).unwrap();

        assert_eq!(parsed.asset_exit, asset);
        assert_eq!(parsed.account_exit, account());
        assert_eq!(parsed.block_info.block_number, 4);
        assert_eq!(parsed.block_info.commitment, [5; 32]);
        assert_eq!(parsed.nft_root, tree.nft_root());

        let verifier = Sha256MerkleVerifier;
        assert!(verifier.verify(
            &tree.state_root(),
            &parsed.asset_exit.leaf_bytes(3),
            &parsed.asset_proof
        ));
        assert!(verifier.verify(
            &tree.state_root(),
            &parsed.account_exit.leaf_bytes(),
            &parsed.account_proof
        ));
    }

    fn exit_nft() -> NftExitData {
        NftExitData {
            nft_index: 12,
            owner_account_index: 3,
            creator_account_index: 1,
            creator_treasury_rate: 50,
            collection_id: 2,
            content_hash: [[7; 32], [8; 32]],
            content_type: 0,
        }
    }

    /// NFT claim without a root field
    fn nft_claim(tree: &StateTree) -> serde_json::Value {
        json!({
            "StoredBlockInfo": block_json(&tree.state_root()),
            "AccountExitData": {
                "AccountId": 3,
                "L1Address": hex::encode([0xabu8; 20]),
                "PubKeyX": hex::encode([1u8; 32]),
                "PubKeyY": hex::encode([2u8; 32]),
                "Nonce": 9,
                "CollectionNonce": 1,
            },
            "ExitNfts": [{
                "NftIndex": 12,
                "OwnerAccountIndex": 3,
                "CreatorAccountIndex": 1,
                "CreatorTreasuryRate": 50,
                "CollectionId": 2,
                "NftContentHash1": hex::encode([7u8; 32]),
                "NftContentHash2": hex::encode([8u8; 32]),
                "NftContentType": 0,
            }],
            "AccountMerkleProof": hexes(&tree.account_proof(3).unwrap()),
            "NftMerkleProofs": [hexes(&tree.nft_proof(12).unwrap())],
        })
    }

    fn nft_tree() -> StateTree {
        StateTreeBuilder::new()
            .account(account())
            .nft(exit_nft())
            .build()
    }

    #[test]
    fn test_nft_claim_parses() {
        let tree = nft_tree();
        let mut claim = nft_claim(&tree);
        claim["NftRoot"] = json!(hex::encode(tree.nft_root()));

        let parsed = NftExitClaim::from_json_str(&claim.to_string()).unwrap();

        assert_eq!(parsed.nfts, vec![exit_nft()]);
        assert_eq!(parsed.account_exit, account());
        assert_eq!(parsed.nft_proofs.len(), 1);
        assert_eq!(parsed.nft_root, tree.nft_root());
        assert_eq!(parsed.asset_root, None);
    }

    #[test]
    fn test_nft_claim_with_asset_root_takes_nft_root_from_account_proof() {
        let tree = nft_tree();
        let mut claim = nft_claim(&tree);
        claim["AssetRoot"] = json!(hex::encode(tree.account_side_root()));

        let parsed = NftExitClaim::from_json_str(&claim.to_string()).unwrap();

        assert_eq!(parsed.nft_root, tree.nft_root());
        assert_eq!(parsed.asset_root, Some(tree.account_side_root()));
        assert!(Sha256MerkleVerifier.verify(
            &parsed.nft_root,
            &parsed.nfts[0].leaf_bytes(),
            &parsed.nft_proofs[0]
        ));
    }

    #[test]
    fn test_nft_claim_with_foreign_asset_root_rejected() {
        let tree = nft_tree();
        let mut claim = nft_claim(&tree);
        claim["AssetRoot"] = json!(hex::encode([0x99u8; 32]));

        let result = NftExitClaim::from_json_str(&claim.to_string());
        assert!(matches!(result, Err(DesertError::ProofRejected(_))));
    }

    #[test]
    fn test_nft_claim_without_any_root_rejected() {
        let tree = nft_tree();
        let result = NftExitClaim::from_json_str(&nft_claim(&tree).to_string());
        assert!(matches!(result, Err(DesertError::Serialization(_))));
    }

    #[test]
    fn test_asset_claim_reads_decimal_pub_keys() {
        let mut owner = account();
        owner.pub_key_x = [0; 32];
        owner.pub_key_x[30..].copy_from_slice(&[0x30, 0x39]);
        owner.pub_key_y = [0xff; 32];
        let asset = AssetExitData {
            asset_id: 1,
            amount: 10,
            offer_canceled_or_finalized: 0,
        };
        let tree = StateTreeBuilder::new()
            .account(owner.clone())
            .asset(3, asset.clone())
            .build();

        let claim = json!({
            "StoredBlockInfo": block_json(&tree.state_root()),
            "NftRoot": hex::encode(tree.nft_root()),
            "AssetExitData": {
                "AssetId": 1,
                "Amount": 10,
                "OfferCanceledOrFinalized": 0,
            },
            "AccountExitData": {
                "AccountId": 3,
                "L1Address": hex::encode([0xabu8; 20]),
                "PubKeyX": "12345",
                "PubKeyY": U256_MAX,
                "Nonce": 9,
                "CollectionNonce": 1,
            },
            "AssetMerkleProof": hexes(&tree.asset_proof(3, 1).unwrap()),
            "AccountMerkleProof": hexes(&tree.account_proof(3).unwrap()),
        });

        let parsed = AssetExitClaim::from_json_str(&claim.to_string()).unwrap();

        assert_eq!(parsed.account_exit, owner);
        assert!(Sha256MerkleVerifier.verify(
            &tree.state_root(),
            &parsed.account_exit.leaf_bytes(),
            &parsed.account_proof
        ));
    }

    const U256_MAX: &str =
        "115792089237316195423570985008687907853269984665640564039457584007913129639935";

    #[test]
    fn test_integer_pub_key_forms() {
        let mut expected = [0u8; 32];
        expected[30..].copy_from_slice(&[0x30, 0x39]);

        let decimal = RawNumber::Text("12345".to_string());
        let prefixed = RawNumber::Text("0x3039".to_string());
        let number = RawNumber::Number(12_345);
        for raw in [decimal, prefixed, number] {
            assert_eq!(raw.parse_key("PubKeyX", KeyEncoding::Integer).unwrap(), expected);
        }

        // Bare hex digits in an NFT claim keep their hex meaning
        let bare = RawNumber::Text("3039".to_string());
        assert_eq!(bare.parse_key("PubKeyX", KeyEncoding::Hex).unwrap(), expected);
        assert!(RawNumber::Number(1)
            .parse_key("PubKeyX", KeyEncoding::Hex)
            .is_err());
    }

    #[test]
    fn test_decimal_pub_key_bounds() {
        assert_eq!(parse_decimal_u256("PubKeyY", U256_MAX).unwrap(), [0xff; 32]);

        let too_big = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(matches!(
            parse_decimal_u256("PubKeyY", too_big),
            Err(DesertError::Serialization(_))
        ));
        assert!(parse_decimal_u256("PubKeyY", "").is_err());
        assert!(parse_decimal_u256("PubKeyY", "12a").is_err());
    }

    #[test]
    fn test_short_hex_is_left_padded() {
        let hash = parse_hash("PubKeyX", "0x1").unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_bad_address_rejected() {
        assert!(parse_address("L1Address", "0xabcd").is_err());
        assert!(parse_address("L1Address", "zz").is_err());
        assert!(parse_hash("StateRoot", &"11".repeat(33)).is_err());
    }

    #[test]
    fn test_missing_field_is_serialization_error() {
        let result = AssetExitClaim::from_json_str(r#"{"NftRoot": "00"}"#);
        assert!(matches!(result, Err(DesertError::Serialization(_))));
    }
}
