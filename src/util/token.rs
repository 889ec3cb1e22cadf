use argon2::password_hash::rand_core::{OsRng, RngCore};
use uuid::Uuid;

/// Auth token keys are 20 random bytes in lowercase hex.
pub const AUTH_TOKEN_KEY_LEN: usize = 40;

#[must_use]
pub fn new_auth_token_key() -> String {
    let mut buf = [0u8; AUTH_TOKEN_KEY_LEN / 2];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

#[must_use]
pub fn new_verification_token() -> Uuid {
    Uuid::new_v4()
}
