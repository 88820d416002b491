//! Claim call arguments handed to the transaction layer.

use serde::{Deserialize, Serialize};

use merkledrop_core::{Address, Hash, Leaf, U256};

use crate::merkle::MerkleProof;

/// Arguments of `airdrop(bytes32[] witnesses, uint256 totalAssigned,
/// uint256 claimedAmount)`, plus the claiming account and leaf position
/// for display.
///
/// JSON form: hashes as `0x`-prefixed hex, amounts as decimal strings in
/// the token's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimCall {
    pub account: Address,
    pub leaf_index: usize,
    #[serde(with = "hex_hashes")]
    pub witnesses: Vec<Hash>,
    #[serde(with = "decimal_amount")]
    pub total_assigned: U256,
    #[serde(with = "decimal_amount")]
    pub claimed_amount: U256,
}

impl ClaimCall {
    pub fn new(leaf: Leaf, proof: MerkleProof, claimed_amount: U256) -> Self {
        Self {
            account: leaf.address,
            leaf_index: proof.leaf_index,
            witnesses: proof.siblings,
            total_assigned: leaf.amount,
            claimed_amount,
        }
    }

    /// Assigned amount left unclaimed if this call succeeds.
    pub fn remaining(&self) -> U256 {
        self.total_assigned.saturating_sub(self.claimed_amount)
    }
}

mod hex_hashes {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use merkledrop_core::Hash;

    pub fn serialize<S: Serializer>(hashes: &[Hash], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(hashes.iter().map(|h| format!("0x{}", hex::encode(h))))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Hash>, D::Error> {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .iter()
            .map(|s| {
                let mut out = [0u8; 32];
                hex::decode_to_slice(s.trim_start_matches("0x"), &mut out)
                    .map_err(|e| D::Error::custom(format!("bad witness '{}': {}", s, e)))?;
                Ok(out)
            })
            .collect()
    }
}

mod decimal_amount {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use merkledrop_core::U256;

    pub fn serialize<S: Serializer>(amount: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        merkledrop_core::parse_amount(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merkledrop_core::parse_address;

    fn sample() -> ClaimCall {
        let address = parse_address("0xe856fe9c604C03E43860703334D639a7bc6617D9").unwrap();
        let leaf = Leaf::new(address, U256::from(200u64));
        let proof = MerkleProof {
            leaf_index: 3,
            leaf: [0u8; 32],
            siblings: vec![[0xAB; 32], [0x01; 32]],
        };
        ClaimCall::new(leaf, proof, U256::from(50u64))
    }

    #[test]
    fn test_claim_call_fields() {
        let call = sample();
        assert_eq!(call.leaf_index, 3);
        assert_eq!(call.witnesses.len(), 2);
        assert_eq!(call.total_assigned, U256::from(200u64));
        assert_eq!(call.remaining(), U256::from(150u64));
    }

    #[test]
    fn test_claim_call_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["leafIndex"], 3);
        assert_eq!(
            json["witnesses"][0],
            format!("0x{}", "ab".repeat(32)).as_str()
        );
        assert_eq!(json["totalAssigned"], "200");
        assert_eq!(json["claimedAmount"], "50");
    }

    #[test]
    fn test_claim_call_amounts_are_decimal() {
        let address = parse_address("0xe856fe9c604C03E43860703334D639a7bc6617D9").unwrap();
        let one_token = merkledrop_core::parse_tokens("1").unwrap();
        let leaf = Leaf::new(address, one_token * U256::from(3u64));
        let proof = MerkleProof {
            leaf_index: 0,
            leaf: [0u8; 32],
            siblings: vec![],
        };
        let json = serde_json::to_value(ClaimCall::new(leaf, proof, one_token)).unwrap();
        assert_eq!(json["claimedAmount"], "1000000000000000000");
        assert_eq!(json["totalAssigned"], "3000000000000000000");
    }

    #[test]
    fn test_hex_amount_rejected() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["claimedAmount"] = serde_json::Value::String("0x32".to_string());
        assert!(serde_json::from_value::<ClaimCall>(json).is_err());
    }

    #[test]
    fn test_claim_call_json_parse_back() {
        let call = sample();
        let text = serde_json::to_string(&call).unwrap();
        let parsed: ClaimCall = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, call);
    }

    #[test]
    fn test_bad_witness_rejected() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["witnesses"][0] = serde_json::Value::String("0x1234".to_string());
        assert!(serde_json::from_value::<ClaimCall>(json).is_err());
    }
}
