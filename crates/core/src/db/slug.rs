//! Random slug generation for externally visible identifiers.
//!
//! Slugs are 5 characters over `[0-9A-Za-z]` (62^5 ≈ 916 million values),
//! assigned server-side. Uniqueness is enforced by the database; the store
//! retries generation on collision.

use rand::Rng;

pub const SLUG_LEN: usize = 5;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Draw a fresh candidate slug.
pub fn new_slug() -> String {
    let mut rng = rand::thread_rng();
    (0..SLUG_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
