use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleDropError {
    #[error("Invalid leaf data: {0}")]
    Validation(String),

    #[error("Cannot build a Merkle tree from an empty allowlist")]
    EmptyTree,

    #[error("Address not in allowlist: {0}")]
    NotFound(String),

    #[error("Merkle root mismatch: expected 0x{expected}, built 0x{actual}")]
    EncodingMismatch { expected: String, actual: String },

    #[error("Invalid claim: {0}")]
    InvalidClaim(String),
}

impl MerkleDropError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Root mismatch between a configured root and the rebuilt tree.
    pub fn root_mismatch(expected: &[u8; 32], actual: &[u8; 32]) -> Self {
        Self::EncodingMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        }
    }
}

pub type Result<T> = std::result::Result<T, MerkleDropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = MerkleDropError::validation("bad address");
        assert_eq!(err.to_string(), "Invalid leaf data: bad address");
    }

    #[test]
    fn test_error_display_empty_tree() {
        let err = MerkleDropError::EmptyTree;
        assert_eq!(
            err.to_string(),
            "Cannot build a Merkle tree from an empty allowlist"
        );
    }

    #[test]
    fn test_error_display_not_found() {
        let err = MerkleDropError::NotFound("0xabc".to_string());
        assert_eq!(err.to_string(), "Address not in allowlist: 0xabc");
    }

    #[test]
    fn test_error_display_root_mismatch() {
        let err = MerkleDropError::root_mismatch(&[0xAA; 32], &[0xBB; 32]);
        assert_eq!(
            err.to_string(),
            format!(
                "Merkle root mismatch: expected 0x{}, built 0x{}",
                "aa".repeat(32),
                "bb".repeat(32)
            )
        );
    }

    #[test]
    fn test_error_display_invalid_claim() {
        let err = MerkleDropError::InvalidClaim("zero amount".to_string());
        assert_eq!(err.to_string(), "Invalid claim: zero amount");
    }
}
