use bcrypt::{hash, verify, BcryptError};
use log::warn;

// Minimum cost accepted by bcrypt.
const MOCK_HASH_COST: u32 = 4;

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, MOCK_HASH_COST)
}

pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or_else(|e| {
        warn!("Failed to verify bcrypt password hash: {}", e);
        false
    })
}
