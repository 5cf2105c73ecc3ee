/// Reset token digests
///
/// Reset tokens are looked up by their SHA-256 digest so a leaked
/// `reset_tokens` table cannot be replayed.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of a reset token
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
