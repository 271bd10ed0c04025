use sha2::{Digest, Sha256};

/// SHA-256 of the raw file bytes as 64 lowercase hex characters.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
