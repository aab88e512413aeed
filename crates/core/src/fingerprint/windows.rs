//! Sliding-window hashing over equivalence fingerprint streams.
//!
//! A symbol with `len` instructions and window width `W` owns exactly
//! `len - W + 1` windows at positions `0..=len - W`, or none at all when the
//! symbol is shorter than one window. Window hashes depend only on the
//! covered fingerprints, never on the position.

use super::Hasher64;

/// One indexed window: the hash of `W` consecutive equivalence fingerprints
/// starting at instruction `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHash {
    pub pos: i64,
    pub hash: u64,
}

/// Hash every width-`width` window of the stream.
pub fn extract_windows(stream: &[u64], width: usize, seed: u64) -> Vec<WindowHash> {
    if width == 0 || stream.len() < width {
        return Vec::new();
    }
    stream
        .windows(width)
        .enumerate()
        .map(|(i, window)| {
            let mut h = Hasher64::new(seed);
            for &fingerprint in window {
                h.write_u64(fingerprint);
            }
            WindowHash { pos: i as i64, hash: h.finish() }
        })
        .collect()
}
