//! Integrity tags over premium context data

use askmarket_types::IntegrityTag;
use sha2::{Digest, Sha256};

/// Compute the SHA256 integrity tag of premium context data
///
/// Metadata only: the tag is published for off-chain verification and
/// never decides whether an operation succeeds.
pub fn integrity_tag(context_data: &str) -> IntegrityTag {
    let mut hasher = Sha256::new();
    hasher.update(context_data.as_bytes());
    IntegrityTag(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_is_hex_sha256() {
        let tag = integrity_tag("");
        assert_eq!(
            tag.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_tag_is_deterministic() {
        assert_eq!(integrity_tag("context"), integrity_tag("context"));
        assert_ne!(integrity_tag("context"), integrity_tag("context "));
    }
}
