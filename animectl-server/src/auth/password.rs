//! Password encoding
//!
//! Stored form: `{sha256}<salt>$<digest>` where `digest` is the hex
//! SHA-256 of the salt followed by the raw password. `{noop}<plain>` is
//! accepted for fixtures and local configs.

use constant_time_eq::constant_time_eq;
use rand::Rng;
use sha2::{Digest, Sha256};

const SHA256_PREFIX: &str = "{sha256}";
const NOOP_PREFIX: &str = "{noop}";
const SALT_LEN: usize = 16;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn digest(salt: &str, raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(raw.as_bytes());
    to_hex(&hasher.finalize())
}

/// Encode a raw password with a fresh random salt.
pub fn encode(raw: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
    encode_with_salt(raw, &to_hex(&salt))
}

/// Encode a raw password with a caller-supplied salt.
pub fn encode_with_salt(raw: &str, salt: &str) -> String {
    format!("{}{}${}", SHA256_PREFIX, salt, digest(salt, raw))
}

/// Check a raw password against its stored encoding.
///
/// Unknown encodings never match.
pub fn matches(raw: &str, encoded: &str) -> bool {
    if let Some(rest) = encoded.strip_prefix(SHA256_PREFIX) {
        let Some((salt, expected)) = rest.split_once('$') else {
            return false;
        };
        return constant_time_eq(digest(salt, raw).as_bytes(), expected.as_bytes());
    }

    if let Some(plain) = encoded.strip_prefix(NOOP_PREFIX) {
        return constant_time_eq(raw.as_bytes(), plain.as_bytes());
    }

    false
}
