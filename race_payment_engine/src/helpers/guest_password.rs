//! # Guest registration passwords
//!
//! Non-members register with their name and a password, and use the same pair to look the registration up later.
//! Only a salted hash is stored:
//!
//! ```text
//!    {salt}${hash}
//! ```
//!
//! where `salt` is 16 random bytes and `hash` is `Blake2b512(domain || salt || password)`, both hex encoded.
use blake2::{Blake2b512, Digest};

const DOMAIN: &[u8] = b"RegistrationGuestPassword.v1";

pub fn hash_guest_password(password: &str) -> String {
    let salt: [u8; 16] = rand::random();
    let hash = digest(&salt, password);
    format!("{}${}", to_hex(&salt), to_hex(&hash))
}

/// Returns false for malformed hashes rather than an error, since there is nothing a caller could do about it.
pub fn verify_guest_password(password: &str, stored: &str) -> bool {
    let Some((salt, hash)) = stored.split_once('$') else {
        return false;
    };
    let Some(salt) = from_hex(salt) else {
        return false;
    };
    to_hex(&digest(&salt, password)) == hash
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Blake2b512::new();
    hasher.update(DOMAIN);
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len()).step_by(2).map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok()).collect()
}
