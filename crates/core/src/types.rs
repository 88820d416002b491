use alloy_primitives::utils::{format_ether, parse_ether};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{MerkleDropError, Result};

/// 32-byte keccak-256 digest
pub type Hash = [u8; 32];

/// A single allowlist entry: an address and its assigned amount in the
/// token's smallest unit.
///
/// Serialize-only: textual input goes through `Leaf::parse` or `RawEntry`
/// so the address checks always run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Leaf {
    pub address: Address,
    pub amount: U256,
}

impl Leaf {
    pub fn new(address: Address, amount: U256) -> Self {
        Self { address, amount }
    }

    /// Parse a leaf from its textual form, validating both fields.
    pub fn parse(address: &str, amount: &str) -> Result<Self> {
        Ok(Self {
            address: parse_address(address)?,
            amount: parse_amount(amount)?,
        })
    }
}

/// Byte encoding applied to a leaf before it enters the tree.
///
/// | Encoding   | Leaf hash                                              |
/// |------------|--------------------------------------------------------|
/// | `Packed`   | `keccak256(address[20] ‖ amount_be[32])`               |
/// | `Standard` | `keccak256(keccak256(pad32(address) ‖ amount_be[32]))` |
///
/// `Packed` matches `keccak256(abi.encodePacked(account, amount))` in the
/// claiming contract. `Standard` is OpenZeppelin's leaf hash (double-hashed
/// `abi.encode`) only. The tree layout is the same for both encodings:
/// leaves in allowlist order, adjacent pairs, odd node promoted. A root
/// from OpenZeppelin's `StandardMerkleTree`, which sorts leaves and uses a
/// complete-tree layout, only agrees when the leaf count is a power of two
/// and the leaves are already in sorted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeafEncoding {
    #[default]
    Packed,
    Standard,
}

impl LeafEncoding {
    /// Serialize a leaf into the preimage of its (first) hash.
    pub fn encode(&self, leaf: &Leaf) -> Vec<u8> {
        let amount: [u8; 32] = leaf.amount.to_be_bytes();
        match self {
            Self::Packed => {
                let mut out = Vec::with_capacity(52);
                out.extend_from_slice(leaf.address.as_slice());
                out.extend_from_slice(&amount);
                out
            }
            Self::Standard => {
                let mut out = vec![0u8; 12];
                out.extend_from_slice(leaf.address.as_slice());
                out.extend_from_slice(&amount);
                out
            }
        }
    }
}

impl std::fmt::Display for LeafEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Packed => write!(f, "packed"),
            Self::Standard => write!(f, "standard"),
        }
    }
}

impl std::str::FromStr for LeafEncoding {
    type Err = MerkleDropError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "packed" => Ok(Self::Packed),
            "standard" => Ok(Self::Standard),
            other => Err(MerkleDropError::validation(format!(
                "unknown leaf encoding '{}' (expected 'packed' or 'standard')",
                other
            ))),
        }
    }
}

/// Parse a 20-byte address from hex, with or without the `0x` prefix.
///
/// Checksums are not enforced: the allowlist compares raw bytes, so
/// mixed-case and lower-case spellings of one address are the same leaf.
/// The zero address is rejected.
pub fn parse_address(addr_str: &str) -> Result<Address> {
    let trimmed = addr_str.trim();
    let cleaned = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if cleaned.len() != 40 {
        return Err(MerkleDropError::validation(format!(
            "address '{}' must be 40 hex chars, got {}",
            trimmed,
            cleaned.len()
        )));
    }
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut bytes).map_err(|e| {
        MerkleDropError::validation(format!("address '{}' is not hex: {}", trimmed, e))
    })?;
    let address = Address::from(bytes);
    if address.is_zero() {
        return Err(MerkleDropError::validation("zero address not allowed"));
    }
    Ok(address)
}

/// Parse an amount in the token's smallest unit from a decimal integer.
///
/// Signs, fractions, exponents and values above `2^256 - 1` are rejected.
pub fn parse_amount(amount_str: &str) -> Result<U256> {
    let trimmed = amount_str.trim();
    if trimmed.is_empty() {
        return Err(MerkleDropError::validation("amount is empty"));
    }
    if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_digit()) {
        let reason = match bad {
            '-' => "negative",
            '.' => "non-integral",
            _ => "not a decimal integer",
        };
        return Err(MerkleDropError::validation(format!(
            "amount '{}' is {}",
            trimmed, reason
        )));
    }
    U256::from_str_radix(trimmed, 10).map_err(|e| {
        MerkleDropError::validation(format!("amount '{}' out of range: {}", trimmed, e))
    })
}

/// Parse a whole-token amount (e.g. `"100"` or `"2.5"`) into the smallest
/// unit, assuming 18 decimals.
pub fn parse_tokens(tokens: &str) -> Result<U256> {
    let trimmed = tokens.trim();
    let well_formed = !trimmed.is_empty()
        && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.')
        && trimmed.matches('.').count() <= 1
        && trimmed != ".";
    if !well_formed {
        return Err(MerkleDropError::validation(format!(
            "token amount '{}' is not a non-negative decimal",
            trimmed
        )));
    }
    parse_ether(trimmed).map_err(|e| {
        MerkleDropError::validation(format!("token amount '{}' invalid: {}", trimmed, e))
    })
}

/// Render a smallest-unit amount as whole tokens with 18 decimals.
pub fn format_tokens(amount: U256) -> String {
    format_ether(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xe856fe9c604C03E43860703334D639a7bc6617D9";

    #[test]
    fn test_parse_address_with_prefix() {
        let addr = parse_address(ADDR).unwrap();
        assert_eq!(addr.as_slice()[0], 0xe8);
        assert_eq!(addr.as_slice()[19], 0xd9);
    }

    #[test]
    fn test_parse_address_case_insensitive() {
        let mixed = parse_address(ADDR).unwrap();
        let lower = parse_address(&ADDR.to_lowercase()).unwrap();
        let bare = parse_address(&ADDR[2..]).unwrap();
        assert_eq!(mixed, lower);
        assert_eq!(mixed, bare);
    }

    #[test]
    fn test_parse_address_invalid_length() {
        let err = parse_address("0x1234").unwrap_err();
        assert!(matches!(err, MerkleDropError::Validation(_)));
        // 21 bytes
        assert!(parse_address(&format!("{}00", ADDR)).is_err());
    }

    #[test]
    fn test_parse_address_invalid_hex() {
        assert!(parse_address("0xzz56fe9c604C03E43860703334D639a7bc6617D9").is_err());
    }

    #[test]
    fn test_parse_address_zero_rejected() {
        let zero = format!("0x{}", "0".repeat(40));
        assert!(parse_address(&zero).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100").unwrap(), U256::from(100u64));
        assert_eq!(parse_amount(" 0 ").unwrap(), U256::ZERO);
        let max = U256::MAX.to_string();
        assert_eq!(parse_amount(&max).unwrap(), U256::MAX);
    }

    #[test]
    fn test_parse_amount_rejects_malformed() {
        for bad in ["", "-1", "1.5", "1e18", "0x10", "abc"] {
            assert!(
                matches!(parse_amount(bad), Err(MerkleDropError::Validation(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_amount_overflow() {
        let too_big = format!("{}0", U256::MAX);
        assert!(parse_amount(&too_big).is_err());
    }

    #[test]
    fn test_parse_tokens() {
        let hundred = parse_tokens("100").unwrap();
        assert_eq!(hundred, U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64)));
        let half = parse_tokens("0.5").unwrap();
        assert_eq!(half, U256::from(500_000_000_000_000_000u64));
        assert!(parse_tokens("-1").is_err());
        assert!(parse_tokens("1.2.3").is_err());
        assert!(parse_tokens("").is_err());
    }

    #[test]
    fn test_format_tokens() {
        let amount = parse_tokens("100").unwrap();
        assert!(format_tokens(amount).starts_with("100."));
    }

    #[test]
    fn test_packed_encoding_layout() {
        let leaf = Leaf::parse(ADDR, "256").unwrap();
        let bytes = LeafEncoding::Packed.encode(&leaf);
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[..20], leaf.address.as_slice());
        assert_eq!(bytes[50], 1);
        assert_eq!(bytes[51], 0);
    }

    #[test]
    fn test_standard_encoding_layout() {
        let leaf = Leaf::parse(ADDR, "1").unwrap();
        let bytes = LeafEncoding::Standard.encode(&leaf);
        assert_eq!(bytes.len(), 64);
        assert_eq!(bytes[..12], [0u8; 12]);
        assert_eq!(&bytes[12..32], leaf.address.as_slice());
        assert_eq!(bytes[63], 1);
    }

    #[test]
    fn test_leaf_parse_rejects_zero_address() {
        let zero = format!("0x{}", "0".repeat(40));
        assert!(matches!(
            Leaf::parse(&zero, "1"),
            Err(MerkleDropError::Validation(_))
        ));
        let json = serde_json::to_value(Leaf::parse(ADDR, "7").unwrap()).unwrap();
        assert!(json.get("address").is_some());
    }

    #[test]
    fn test_leaf_encoding_from_str() {
        assert_eq!("packed".parse::<LeafEncoding>().unwrap(), LeafEncoding::Packed);
        assert_eq!("Standard".parse::<LeafEncoding>().unwrap(), LeafEncoding::Standard);
        assert!("sorted".parse::<LeafEncoding>().is_err());
        assert_eq!(LeafEncoding::default(), LeafEncoding::Packed);
    }

    #[test]
    fn test_leaf_encoding_serde() {
        let json = serde_json::to_string(&LeafEncoding::Standard).unwrap();
        assert_eq!(json, "\"standard\"");
    }
}
