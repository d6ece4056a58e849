//! Hash-to-scalar helper (spec §4.1): domain tag + big-endian u64 fields,
//! SHA-512 digest reduced mod `q`.

use sha2::{Digest, Sha512};

use crate::crypto::group::Scalar;

pub fn hash_to_scalar(domain_tag: &[u8], fields_be_u64: &[u64]) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(domain_tag);
    for field in fields_be_u64 {
        hasher.update(field.to_be_bytes());
    }
    let digest = hasher.finalize();
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&digest);
    Scalar::from_bytes_mod_order_wide(&wide)
}

/// Domain tag for per-hand key derivation (spec §4.1, §4.5.3):
/// `"OCP/handkey/v1" || epochId || tableId || handId` as 8-byte little-endian
/// fields. Spec §4.1 states the fields are little-endian here specifically
/// (unlike the generic helper above, which is big-endian) — this function
/// reproduces that literally rather than reusing `hash_to_scalar`.
pub fn hand_key_scalar(epoch_id: u64, table_id: u64, hand_id: u64) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(b"OCP/handkey/v1");
    hasher.update(epoch_id.to_le_bytes());
    hasher.update(table_id.to_le_bytes());
    hasher.update(hand_id.to_le_bytes());
    let digest = hasher.finalize();
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&digest);
    Scalar::from_bytes_mod_order_wide(&wide)
}
