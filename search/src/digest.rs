//! Domain-separated SHA-256 digests for search artifacts.
//!
//! Format: `"sha256:<hex_digest>"` over `domain || data`. Each artifact kind
//! has its own null-terminated domain prefix so equal byte strings of
//! different kinds never collide.

use sha2::{Digest, Sha256};

/// Domain prefix for expansion-order digests.
pub const DOMAIN_EXPANSION_LOG: &[u8] = b"TESSERA::EXPANSION_LOG::V1\0";

/// Domain prefix for plan digests.
pub const DOMAIN_PLAN: &[u8] = b"TESSERA::PLAN::V1\0";

#[must_use]
pub fn canonical_hash(domain: &[u8], data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
