//! Salted SHA-256 password hashes, stored as `<salt hex>$<digest hex>`.

use sha2::{Digest, Sha256};

const SALT_BYTES: usize = 16;

pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_BYTES] = rand::random();
    format!("{}${}", hex::encode(salt), digest(&salt, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, expected)) = stored.split_once('$') else {
        return false;
    };
    match hex::decode(salt_hex) {
        Ok(salt) => digest(&salt, password) == expected,
        Err(_) => false,
    }
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
