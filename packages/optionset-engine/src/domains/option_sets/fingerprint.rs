//! Tenant-scoped content fingerprints.
//!
//! A fingerprint is the SHA-256 of the tenant id followed by the canonical
//! byte sequence, hex-encoded. Folding the tenant into the hash input means
//! byte-identical option sets in two tenants never share a fingerprint, so a
//! fingerprint lookup can never leak rows across tenants.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::common::TenantId;
use crate::domains::option_sets::canonical::CanonicalOptionSet;

/// Hex-encoded SHA-256 content fingerprint, unique per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the content fingerprint for a canonicalized option set.
///
/// Pure function: identical inputs always produce identical output, which is
/// what makes re-extraction idempotent.
pub fn fingerprint(tenant_id: TenantId, canonical: &CanonicalOptionSet) -> ContentFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(tenant_id.as_uuid().as_bytes());
    hasher.update(canonical.canonical_bytes());
    ContentFingerprint(hex::encode(hasher.finalize()))
}
