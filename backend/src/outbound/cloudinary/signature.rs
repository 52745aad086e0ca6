//! Request signing for authenticated uploads.
//!
//! Parameters are sorted by name, joined as `k=v` pairs with `&`, suffixed
//! with the API secret and hashed with SHA-256.

use sha2::{Digest, Sha256};

/// Algorithm name sent alongside the signature.
pub(super) const SIGNATURE_ALGORITHM: &str = "sha256";

pub(super) fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_unstable_by(|left, right| left.0.cmp(right.0));
    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
